//! Resolver configuration with documented defaults
//!
//! All tunables of the resolution pipeline are collected here. Every field
//! has a default, so an empty TOML file is a valid configuration.

use crate::core::error::{LaiaError, Result};
use crate::core::types::LocaleTag;
use crate::rules::custom::CustomCommandRule;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How long a clarifying question may stay open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingExpiry {
    /// The pending command stays open until filled, cancelled or superseded
    Never,
    /// The pending command is dropped when its answer has not arrived
    /// within this many turns of the question
    AfterTurns(u64),
}

impl Default for PendingExpiry {
    fn default() -> Self {
        Self::Never
    }
}

/// Launcher feature level
///
/// `Basic` keeps only the enhanced command tier; legacy phrasings and
/// user-authored custom commands are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LauncherMode {
    Basic,
    #[default]
    Advanced,
}

/// Remote chat model settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    /// Chat-completion endpoint. Anthropic URLs switch the wire format.
    pub api_url: String,
    pub model: String,
    /// Upper bound on a single AI call. A slower answer is abandoned and
    /// the utterance handed to web search.
    pub timeout_secs: u64,
    /// Environment variable holding the API credential
    pub api_key_env: String,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            api_url: "https://openrouter.ai/api/v1/chat/completions".into(),
            model: "openai/gpt-4o-mini".into(),
            timeout_secs: 30,
            api_key_env: "LAIA_API_KEY".into(),
        }
    }
}

/// Extra phrases per locale, appended to the built-in lists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalePhrases {
    pub ca: Vec<String>,
    pub es: Vec<String>,
    pub en: Vec<String>,
}

impl LocalePhrases {
    pub fn for_locale(&self, locale: LocaleTag) -> &[String] {
        match locale {
            LocaleTag::Ca => &self.ca,
            LocaleTag::Es => &self.es,
            LocaleTag::En => &self.en,
        }
    }
}

/// Configuration for the command resolution pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Last year the chat model is considered to know about.
    ///
    /// Any non-command utterance mentioning a later year goes straight to
    /// web search without calling the model.
    pub knowledge_cutoff_year: u32,

    /// Base URL for search hand-offs; the utterance is appended as `q`
    pub search_base_url: String,

    pub pending_expiry: PendingExpiry,

    pub launcher_mode: LauncherMode,

    /// Speak command confirmations and AI answers for voice-origin input
    pub voice_response: bool,

    /// Location used by weather commands
    pub weather_location: String,

    pub ai: AiSettings,

    /// Additional "I don't know" phrases screened in AI answers
    pub uncertainty_phrases: LocalePhrases,

    /// Additional phrases marking a question as beyond the knowledge cutoff
    pub future_phrases: LocalePhrases,

    /// User-authored commands, in evaluation order. Malformed entries are
    /// dropped with a warning.
    #[serde(deserialize_with = "crate::rules::deserialize_custom_commands")]
    pub custom_commands: Vec<CustomCommandRule>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            knowledge_cutoff_year: 2023,
            search_base_url: "https://www.google.com/search".into(),
            pending_expiry: PendingExpiry::Never,
            launcher_mode: LauncherMode::Advanced,
            voice_response: false,
            weather_location: "Barcelona".into(),
            ai: AiSettings::default(),
            uncertainty_phrases: LocalePhrases::default(),
            future_phrases: LocalePhrases::default(),
            custom_commands: Vec::new(),
        }
    }
}

impl ResolverConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ResolverConfig = toml::from_str(content)?;
        config.validate().map_err(LaiaError::ConfigError)?;
        Ok(config)
    }

    /// Load from a TOML file on disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.ai.timeout_secs == 0 {
            return Err("ai.timeout_secs must be positive".into());
        }

        if let PendingExpiry::AfterTurns(0) = self.pending_expiry {
            return Err("pending_expiry.after_turns must be at least 1".into());
        }

        if let Err(e) = url::Url::parse(&self.search_base_url) {
            return Err(format!(
                "search_base_url ({}) is not a valid URL: {}",
                self.search_base_url, e
            ));
        }

        if self.ai.api_key_env.trim().is_empty() {
            return Err("ai.api_key_env must name an environment variable".into());
        }

        Ok(())
    }

    /// Read the AI credential from the configured environment variable.
    ///
    /// Empty values count as "not configured".
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.ai.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}
