//! Parameter resolution - clarifying questions and slot filling
//!
//! An incomplete command opens a pending command and yields the question
//! for its first missing slot. The next turn is offered as that slot's
//! value; an accepted value completes the command, a rejected one hands the
//! utterance back to the rest of the pipeline.

use crate::command::executor::{failure_message, CommandExecutor};
use crate::command::model::{slot, ActionKind, Command};
use crate::command::session::Session;
use crate::command::state::CommandStateManager;
use crate::core::error::{LaiaError, Result};
use crate::core::types::LocaleTag;
use crate::pipeline::ResolutionOutcome;

/// What happened to a follow-up turn offered as a slot value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillOutcome {
    /// The value was stored; the command may still lack further slots
    Filled(Command),
    /// The user withdrew the pending command
    Cancelled,
    /// The value does not fit the slot. `kept` tells whether the pending
    /// command is still waiting.
    Rejected { kept: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotCheck {
    Accept,
    /// Reject and keep waiting for a usable answer
    RejectKeep,
    /// Reject and drop the pending command
    RejectClear,
}

fn check_slot(slot_name: &str, value: &str) -> SlotCheck {
    let value = value.trim_matches(|c: char| c.is_whitespace() || c.is_ascii_punctuation());
    if value.is_empty() {
        return SlotCheck::RejectKeep;
    }
    if slot_name == slot::URL && (value.contains(char::is_whitespace) || !value.contains('.')) {
        return SlotCheck::RejectClear;
    }
    SlotCheck::Accept
}

const CANCEL_CA: &[&str] = &["cancel·la", "cancel·lar", "deixa-ho", "oblida-ho"];
const CANCEL_ES: &[&str] = &["cancela", "cancelar", "olvídalo", "déjalo"];
const CANCEL_EN: &[&str] = &["cancel", "never mind", "forget it"];

/// True if the whole utterance is a cancel word for the locale
pub fn is_cancel(text: &str, locale: LocaleTag) -> bool {
    let text = text
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_punctuation())
        .to_lowercase();
    let words = match locale {
        LocaleTag::Ca => CANCEL_CA,
        LocaleTag::Es => CANCEL_ES,
        LocaleTag::En => CANCEL_EN,
    };
    text == "cancel" || words.contains(&text.as_str())
}

pub fn cancel_acknowledgement(locale: LocaleTag) -> &'static str {
    match locale {
        LocaleTag::Ca => "D'acord, cancel·lat.",
        LocaleTag::Es => "Vale, cancelado.",
        LocaleTag::En => "Okay, cancelled.",
    }
}

/// Clarifying question for a missing slot, keyed by action
pub fn question(action: &ActionKind, locale: LocaleTag) -> &'static str {
    use LocaleTag::{Ca, En, Es};

    match (action, locale) {
        (ActionKind::CreateNote, Ca) => "Què s'ha d'anotar?",
        (ActionKind::CreateNote, Es) => "¿Qué hay que apuntar?",
        (ActionKind::CreateNote, En) => "What should I note?",
        (ActionKind::AddToList, Ca) => "Què s'ha d'afegir?",
        (ActionKind::AddToList, Es) => "¿Qué hay que añadir?",
        (ActionKind::AddToList, En) => "What should I add?",
        (ActionKind::CreateList, Ca) => "Què s'ha de crear?",
        (ActionKind::CreateList, Es) => "¿Qué hay que crear?",
        (ActionKind::CreateList, En) => "What should I create?",
        (ActionKind::InsertText, Ca) => "Què s'ha d'inserir?",
        (ActionKind::InsertText, Es) => "¿Qué hay que insertar?",
        (ActionKind::InsertText, En) => "What should I insert?",
        (ActionKind::OpenApp, Ca) => "Quina aplicació vols obrir?",
        (ActionKind::OpenApp, Es) => "¿Qué aplicación quieres abrir?",
        (ActionKind::OpenApp, En) => "Which app should I open?",
        (ActionKind::OpenUrl, Ca) => "Quina web vols obrir?",
        (ActionKind::OpenUrl, Es) => "¿Qué web quieres abrir?",
        (ActionKind::OpenUrl, En) => "Which website should I open?",
        (ActionKind::WebSearch, Ca) => "Què vols cercar?",
        (ActionKind::WebSearch, Es) => "¿Qué quieres buscar?",
        (ActionKind::WebSearch, En) => "What should I search for?",
        (ActionKind::RunTag, Ca) => "Quina etiqueta vols executar?",
        (ActionKind::RunTag, Es) => "¿Qué etiqueta quieres ejecutar?",
        (ActionKind::RunTag, En) => "Which tag should I run?",
        (ActionKind::Call, Ca) => "A qui vols trucar?",
        (ActionKind::Call, Es) => "¿A quién quieres llamar?",
        (ActionKind::Call, En) => "Who should I call?",
        (_, Ca) => "Em falta informació. Pots concretar-ho?",
        (_, Es) => "Me falta información. ¿Puedes concretarlo?",
        (_, En) => "I need a bit more detail. Can you be more specific?",
    }
}

/// Drives a command to either a question or an executed action
#[derive(Clone)]
pub struct ParameterResolver {
    state: CommandStateManager,
    executor: CommandExecutor,
}

impl ParameterResolver {
    pub fn new(state: CommandStateManager, executor: CommandExecutor) -> Self {
        Self { state, executor }
    }

    pub fn state(&self) -> &CommandStateManager {
        &self.state
    }

    /// Ask for the first missing slot, or execute a complete command.
    ///
    /// Never returns `Deferred` or `Unhandled`.
    pub async fn resolve(&self, command: Command, session: &mut Session) -> ResolutionOutcome {
        if let Some(missing) = command.missing_slot() {
            let question = question(&command.action, command.locale);
            let missing = missing.to_string();
            self.state.open(session, command, &missing);
            return ResolutionOutcome::NeedsParameter {
                question: question.to_string(),
            };
        }

        let locale = command.locale;
        match self.executor.execute(&command).await {
            Ok(response) => ResolutionOutcome::Executed { response },
            Err(e) => {
                tracing::warn!(command = %command.name, error = %e, "Command execution failed");
                ResolutionOutcome::Executed {
                    response: failure_message(locale).to_string(),
                }
            }
        }
    }

    /// Offer `value` to the pending command.
    ///
    /// Errors with [`LaiaError::NoPendingCommand`] when the session is idle.
    pub fn offer(&self, session: &mut Session, value: &str, locale: LocaleTag) -> Result<FillOutcome> {
        let requested = session
            .pending()
            .map(|p| p.requested_slot.clone())
            .ok_or(LaiaError::NoPendingCommand)?;

        if is_cancel(value, locale) {
            self.state.cancel(session);
            return Ok(FillOutcome::Cancelled);
        }

        match check_slot(&requested, value) {
            SlotCheck::Accept => {
                tracing::debug!(slot = %requested, len = value.trim().len(), "Slot filled");
                let command = self.state.fill(session, value)?;
                Ok(FillOutcome::Filled(command))
            }
            SlotCheck::RejectKeep => {
                tracing::warn!(slot = %requested, len = value.len(), "Slot value rejected");
                Ok(FillOutcome::Rejected { kept: true })
            }
            SlotCheck::RejectClear => {
                tracing::warn!(slot = %requested, len = value.len(), "Slot value rejected, dropping command");
                self.state.cancel(session);
                Ok(FillOutcome::Rejected { kept: false })
            }
        }
    }
}
