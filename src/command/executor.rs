//! Command execution - turns complete commands into collaborator calls

use crate::command::model::{slot, ActionKind, Command, CustomAction};
use crate::core::error::{LaiaError, Result};
use crate::core::types::LocaleTag;
use crate::pipeline::search;
use async_trait::async_trait;
use std::sync::Arc;

/// Day a weather report is requested for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherDay {
    Today,
    Tomorrow,
}

impl WeatherDay {
    fn from_slot(value: Option<&str>) -> Self {
        match value {
            Some("tomorrow") => WeatherDay::Tomorrow,
            _ => WeatherDay::Today,
        }
    }
}

/// Side effects a command can have on the rest of the app.
///
/// Implemented by the host: note storage, app launcher, link opener.
#[async_trait]
pub trait ActionSink: Send + Sync {
    async fn create_note(&self, content: &str) -> Result<()>;

    async fn create_list(&self, name: &str) -> Result<()>;

    /// Append to the named list, or to the most recent list when `None`
    async fn append_list_item(&self, list: Option<&str>, item: &str) -> Result<()>;

    async fn insert_into_latest_note(&self, text: &str) -> Result<()>;

    async fn launch_app(&self, app: &str) -> Result<()>;

    async fn open_url(&self, url: &str) -> Result<()>;

    async fn execute_tag(&self, tag: &str) -> Result<()>;

    async fn call_contact(&self, contact: &str) -> Result<()>;

    /// Human readable forecast, already localized
    async fn weather_report(&self, location: &str, day: WeatherDay, locale: LocaleTag)
        -> Result<String>;

    /// Run a user-defined shortcut identified by its action data
    async fn run_shortcut(&self, data: &str) -> Result<()>;
}

/// Executes complete commands against an [`ActionSink`]
#[derive(Clone)]
pub struct CommandExecutor {
    sink: Arc<dyn ActionSink>,
    search_base_url: String,
    weather_location: String,
}

impl CommandExecutor {
    pub fn new(
        sink: Arc<dyn ActionSink>,
        search_base_url: impl Into<String>,
        weather_location: impl Into<String>,
    ) -> Self {
        Self {
            sink,
            search_base_url: search_base_url.into(),
            weather_location: weather_location.into(),
        }
    }

    /// Run the command and return the confirmation shown to the user
    pub async fn execute(&self, command: &Command) -> Result<String> {
        if let Some(missing) = command.missing_slot() {
            return Err(LaiaError::ActionError(format!(
                "{} is missing slot '{}'",
                command.name, missing
            )));
        }

        let locale = command.locale;
        let value = |name| slot_value(command, name);

        let response = match &command.action {
            ActionKind::CreateNote => {
                self.sink.create_note(value(slot::CONTENT)).await?;
                confirm(locale, "Nota creada", "Nota creada", "Note created", value(slot::CONTENT))
            }
            ActionKind::AddToList => {
                let item = value(slot::ITEM);
                self.sink.append_list_item(command.slot(slot::LIST), item).await?;
                confirm(locale, "Afegit a la llista", "Añadido a la lista", "Added to the list", item)
            }
            ActionKind::CreateList => {
                self.sink.create_list(value(slot::NAME)).await?;
                confirm(locale, "Llista creada", "Lista creada", "List created", value(slot::NAME))
            }
            ActionKind::InsertText => {
                self.sink.insert_into_latest_note(value(slot::TEXT)).await?;
                match locale {
                    LocaleTag::Ca => "Text inserit a l'última nota".to_string(),
                    LocaleTag::Es => "Texto insertado en la última nota".to_string(),
                    LocaleTag::En => "Text inserted into the latest note".to_string(),
                }
            }
            ActionKind::OpenApp => {
                self.sink.launch_app(value(slot::APP)).await?;
                opening(locale, value(slot::APP))
            }
            ActionKind::OpenUrl => {
                let url = search::page_url(value(slot::URL))?;
                self.sink.open_url(&url).await?;
                opening(locale, value(slot::URL))
            }
            ActionKind::WebSearch => {
                let query = value(slot::QUERY);
                let url = search::search_url(&self.search_base_url, query)?;
                self.sink.open_url(&url).await?;
                match locale {
                    LocaleTag::Ca => format!("Cercant {}", query),
                    LocaleTag::Es => format!("Buscando {}", query),
                    LocaleTag::En => format!("Searching for {}", query),
                }
            }
            ActionKind::Weather => {
                let day = WeatherDay::from_slot(command.slot(slot::WHEN));
                self.sink
                    .weather_report(&self.weather_location, day, locale)
                    .await?
            }
            ActionKind::RunTag => {
                self.sink.execute_tag(value(slot::TAG)).await?;
                confirm(locale, "Etiqueta executada", "Etiqueta ejecutada", "Tag executed", value(slot::TAG))
            }
            ActionKind::Call => {
                let contact = value(slot::CONTACT);
                self.sink.call_contact(contact).await?;
                match locale {
                    LocaleTag::Ca => format!("Trucant a {}", contact),
                    LocaleTag::Es => format!("Llamando a {}", contact),
                    LocaleTag::En => format!("Calling {}", contact),
                }
            }
            ActionKind::Custom { action, data } => {
                self.run_custom(*action, data, command.slot(slot::QUERY)).await?;
                let name = command.name.strip_prefix("custom:").unwrap_or(&command.name);
                confirm(locale, "Ordre executada", "Comando ejecutado", "Command executed", name)
            }
        };

        tracing::info!(command = %command.name, action = command.action.label(), "Command executed");
        Ok(response)
    }

    async fn run_custom(&self, action: CustomAction, data: &str, query: Option<&str>) -> Result<()> {
        match action {
            CustomAction::OpenApp => self.sink.launch_app(data).await,
            CustomAction::OpenUrl => self.sink.open_url(data).await,
            CustomAction::Search => {
                let url = search::append_query(data, query.unwrap_or_default());
                self.sink.open_url(&url).await
            }
            CustomAction::Custom => self.sink.run_shortcut(data).await,
        }
    }
}

fn slot_value<'a>(command: &'a Command, name: &str) -> &'a str {
    command.slot(name).unwrap_or_default()
}

fn confirm(locale: LocaleTag, ca: &str, es: &str, en: &str, detail: &str) -> String {
    let label = match locale {
        LocaleTag::Ca => ca,
        LocaleTag::Es => es,
        LocaleTag::En => en,
    };
    format!("{}: {}", label, detail)
}

fn opening(locale: LocaleTag, target: &str) -> String {
    match locale {
        LocaleTag::Ca => format!("Obrint {}", target),
        LocaleTag::Es => format!("Abriendo {}", target),
        LocaleTag::En => format!("Opening {}", target),
    }
}

/// Localized apology used when a collaborator call fails
pub fn failure_message(locale: LocaleTag) -> &'static str {
    match locale {
        LocaleTag::Ca => "No he pogut completar l'acció.",
        LocaleTag::Es => "No he podido completar la acción.",
        LocaleTag::En => "I couldn't complete that action.",
    }
}
