//! Laia - Entry Point
//!
//! Interactive console for the resolution pipeline. Typed lines resolve as
//! keyboard input; `/voice <text>` resolves as dictated input.

use async_trait::async_trait;
use clap::Parser;
use laia::command::executor::{ActionSink, WeatherDay};
use laia::core::config::ResolverConfig;
use laia::core::error::Result;
use laia::core::types::LocaleTag;
use laia::llm::client::{ChatBackend, LlmClient};
use laia::pipeline::{Orchestrator, ResolutionOutcome, SessionHandle, Speaker};
use laia::rules::load_custom_commands;

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::runtime::Runtime;

/// Laia command console
#[derive(Parser, Debug)]
#[command(name = "laia")]
#[command(about = "Resolve launcher commands, questions and follow-up answers")]
struct Args {
    /// Resolver configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra custom commands file with [[custom_commands]] entries
    #[arg(long)]
    commands: Option<PathBuf>,

    /// App language tag, e.g. ca-ES, es-ES, en-US
    #[arg(long, default_value = "ca-ES")]
    locale: String,
}

/// Keeps notes and lists in memory and prints everything else
#[derive(Default)]
struct ConsoleSink {
    notes: Mutex<Vec<String>>,
    lists: Mutex<Vec<(String, Vec<String>)>>,
}

#[async_trait]
impl ActionSink for ConsoleSink {
    async fn create_note(&self, content: &str) -> Result<()> {
        let mut notes = self.notes.lock().unwrap_or_else(PoisonError::into_inner);
        notes.push(content.to_string());
        println!("  [note #{}] {}", notes.len(), content);
        Ok(())
    }

    async fn create_list(&self, name: &str) -> Result<()> {
        let mut lists = self.lists.lock().unwrap_or_else(PoisonError::into_inner);
        lists.push((name.to_string(), Vec::new()));
        println!("  [list] {}", name);
        Ok(())
    }

    async fn append_list_item(&self, list: Option<&str>, item: &str) -> Result<()> {
        let mut lists = self.lists.lock().unwrap_or_else(PoisonError::into_inner);
        let index = match list {
            Some(name) => lists.iter().position(|(n, _)| n.eq_ignore_ascii_case(name)),
            None => lists.len().checked_sub(1),
        };
        let index = match index {
            Some(i) => i,
            None => {
                lists.push((list.unwrap_or("llista").to_string(), Vec::new()));
                lists.len() - 1
            }
        };
        lists[index].1.push(item.to_string());
        println!("  [list {}] + {}", lists[index].0, item);
        Ok(())
    }

    async fn insert_into_latest_note(&self, text: &str) -> Result<()> {
        let mut notes = self.notes.lock().unwrap_or_else(PoisonError::into_inner);
        match notes.last_mut() {
            Some(note) => {
                note.push('\n');
                note.push_str(text);
            }
            None => notes.push(text.to_string()),
        }
        println!("  [note #{}] += {}", notes.len(), text);
        Ok(())
    }

    async fn launch_app(&self, app: &str) -> Result<()> {
        println!("  [launch] {}", app);
        Ok(())
    }

    async fn open_url(&self, url: &str) -> Result<()> {
        println!("  [open] {}", url);
        Ok(())
    }

    async fn execute_tag(&self, tag: &str) -> Result<()> {
        println!("  [tag] {}", tag);
        Ok(())
    }

    async fn call_contact(&self, contact: &str) -> Result<()> {
        println!("  [call] {}", contact);
        Ok(())
    }

    async fn weather_report(&self, location: &str, day: WeatherDay, locale: LocaleTag) -> Result<String> {
        let report = match (locale, day) {
            (LocaleTag::Ca, WeatherDay::Today) => format!("Avui a {}: sense dades meteorològiques", location),
            (LocaleTag::Ca, WeatherDay::Tomorrow) => format!("Demà a {}: sense dades meteorològiques", location),
            (LocaleTag::Es, WeatherDay::Today) => format!("Hoy en {}: sin datos meteorológicos", location),
            (LocaleTag::Es, WeatherDay::Tomorrow) => format!("Mañana en {}: sin datos meteorológicos", location),
            (LocaleTag::En, WeatherDay::Today) => format!("Today in {}: no weather data", location),
            (LocaleTag::En, WeatherDay::Tomorrow) => format!("Tomorrow in {}: no weather data", location),
        };
        Ok(report)
    }

    async fn run_shortcut(&self, data: &str) -> Result<()> {
        println!("  [shortcut] {}", data);
        Ok(())
    }
}

struct ConsoleSpeaker;

#[async_trait]
impl Speaker for ConsoleSpeaker {
    async fn speak(&self, text: &str, locale: LocaleTag) {
        println!("  [tts:{}] {}", locale, text);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("laia=debug")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ResolverConfig::load(path)?,
        None => ResolverConfig::default(),
    };
    if let Some(path) = &args.commands {
        config.custom_commands.extend(load_custom_commands(path)?);
    }

    let locale = LocaleTag::from_language_tag(&args.locale);

    let rt = Runtime::new()?;

    let backend: Option<Arc<dyn ChatBackend>> = match LlmClient::from_config(&config) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            tracing::warn!(error = %e, "Running without AI; unanswered questions go to web search");
            None
        }
    };

    let orchestrator = Orchestrator::new(config, Arc::new(ConsoleSink::default()), backend)?
        .with_speaker(Arc::new(ConsoleSpeaker));
    let session = SessionHandle::new(locale);

    println!("\n=== LAIA ===");
    println!("Locale: {}", session.locale());
    println!();
    println!("Commands:");
    println!("  <text>          - Typed utterance");
    println!("  /voice <text>   - Dictated utterance (normalized before matching)");
    println!("  /cancel         - Leave the conversation (drops any pending question)");
    println!("  /quit           - Exit");
    println!();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input == "/quit" {
            break;
        }

        if input == "/cancel" {
            rt.block_on(session.navigate_away());
            println!("(conversation reset)");
            continue;
        }

        let utterance = match input.strip_prefix("/voice ") {
            Some(text) => session.voice(text),
            None => session.typed(input),
        };

        let outcome = rt.block_on(session.resolve(&orchestrator, &utterance));
        display_outcome(&outcome);
    }

    println!("Adéu!");
    Ok(())
}

fn display_outcome(outcome: &ResolutionOutcome) {
    match outcome {
        ResolutionOutcome::Executed { response } => println!("{}", response),
        ResolutionOutcome::NeedsParameter { question } => println!("{}", question),
        ResolutionOutcome::Deferred { search_url } => println!("(searching) {}", search_url),
        ResolutionOutcome::Unhandled => {}
    }
}
