//! Shared collaborators for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use laia::command::executor::{ActionSink, WeatherDay};
use laia::core::config::ResolverConfig;
use laia::core::error::{LaiaError, Result};
use laia::core::types::LocaleTag;
use laia::llm::client::ChatBackend;
use laia::llm::context::Prompt;
use laia::pipeline::{Orchestrator, Speaker};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

/// Records every side effect as a line of text
#[derive(Default)]
pub struct RecordingSink {
    pub actions: Mutex<Vec<String>>,
    pub notes: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().unwrap().clone()
    }

    pub fn notes(&self) -> Vec<String> {
        self.notes.lock().unwrap().clone()
    }

    fn log(&self, line: String) {
        self.actions.lock().unwrap().push(line);
    }
}

#[async_trait]
impl ActionSink for RecordingSink {
    async fn create_note(&self, content: &str) -> Result<()> {
        self.notes.lock().unwrap().push(content.to_string());
        self.log(format!("note:{}", content));
        Ok(())
    }

    async fn create_list(&self, name: &str) -> Result<()> {
        self.log(format!("list:{}", name));
        Ok(())
    }

    async fn append_list_item(&self, list: Option<&str>, item: &str) -> Result<()> {
        self.log(format!("item:{}:{}", list.unwrap_or("-"), item));
        Ok(())
    }

    async fn insert_into_latest_note(&self, text: &str) -> Result<()> {
        self.log(format!("insert:{}", text));
        Ok(())
    }

    async fn launch_app(&self, app: &str) -> Result<()> {
        self.log(format!("app:{}", app));
        Ok(())
    }

    async fn open_url(&self, url: &str) -> Result<()> {
        self.log(format!("url:{}", url));
        Ok(())
    }

    async fn execute_tag(&self, tag: &str) -> Result<()> {
        self.log(format!("tag:{}", tag));
        Ok(())
    }

    async fn call_contact(&self, contact: &str) -> Result<()> {
        self.log(format!("call:{}", contact));
        Ok(())
    }

    async fn weather_report(&self, location: &str, day: WeatherDay, _locale: LocaleTag) -> Result<String> {
        self.log(format!("weather:{}:{:?}", location, day));
        Ok(format!("Sol a {}", location))
    }

    async fn run_shortcut(&self, data: &str) -> Result<()> {
        self.log(format!("shortcut:{}", data));
        Ok(())
    }
}

/// Chat backend with a canned reply that keeps every prompt it receives
pub struct ScriptedBackend {
    reply: std::result::Result<String, String>,
    delay: Option<Duration>,
    pub prompts: Mutex<Vec<Prompt>>,
    pub called: Notify,
}

impl ScriptedBackend {
    pub fn answering(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            delay: None,
            prompts: Mutex::new(Vec::new()),
            called: Notify::new(),
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            reply: Err(error.to_string()),
            delay: None,
            prompts: Mutex::new(Vec::new()),
            called: Notify::new(),
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::answering("massa tard")
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.clone());
        self.called.notify_one();
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone().map_err(LaiaError::LlmError)
    }
}

/// Collects spoken responses
#[derive(Default)]
pub struct RecordingSpeaker {
    pub spoken: Mutex<Vec<String>>,
}

#[async_trait]
impl Speaker for RecordingSpeaker {
    async fn speak(&self, text: &str, _locale: LocaleTag) {
        self.spoken.lock().unwrap().push(text.to_string());
    }
}

pub fn orchestrator(
    config: ResolverConfig,
    backend: Option<Arc<ScriptedBackend>>,
) -> (Orchestrator, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let backend = backend.map(|b| b as Arc<dyn ChatBackend>);
    let orchestrator = Orchestrator::new(config, sink.clone(), backend).unwrap();
    (orchestrator, sink)
}
