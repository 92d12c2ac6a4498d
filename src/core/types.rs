//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a conversation session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Conversation turn counter (one per resolved utterance)
pub type Turn = u64;

/// Locale selecting rule tables and phrase lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocaleTag {
    Ca,
    Es,
    En,
}

impl LocaleTag {
    pub const ALL: [LocaleTag; 3] = [LocaleTag::Ca, LocaleTag::Es, LocaleTag::En];

    /// Parse an app language tag such as `"ca-ES"` or `"en_US"`.
    ///
    /// Unknown languages fall back to Catalan, the app's default language.
    pub fn from_language_tag(tag: &str) -> Self {
        let primary = tag
            .split(|c| c == '-' || c == '_')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "es" => LocaleTag::Es,
            "en" => LocaleTag::En,
            _ => LocaleTag::Ca,
        }
    }

    /// Short code, as used in config keys
    pub fn code(self) -> &'static str {
        match self {
            LocaleTag::Ca => "ca",
            LocaleTag::Es => "es",
            LocaleTag::En => "en",
        }
    }

    /// English name of the language, used in the AI system preamble
    pub fn language_name(self) -> &'static str {
        match self {
            LocaleTag::Ca => "Catalan",
            LocaleTag::Es => "Spanish",
            LocaleTag::En => "English",
        }
    }
}

impl Default for LocaleTag {
    fn default() -> Self {
        Self::Ca
    }
}

impl fmt::Display for LocaleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Where an utterance came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    Voice,
    Typed,
}

/// One unit of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    pub origin: Origin,
    pub locale: LocaleTag,
}

impl Utterance {
    pub fn new(text: impl Into<String>, origin: Origin, locale: LocaleTag) -> Self {
        Self {
            text: text.into(),
            origin,
            locale,
        }
    }

    pub fn typed(text: impl Into<String>, locale: LocaleTag) -> Self {
        Self::new(text, Origin::Typed, locale)
    }

    pub fn voice(text: impl Into<String>, locale: LocaleTag) -> Self {
        Self::new(text, Origin::Voice, locale)
    }

    pub fn is_voice(&self) -> bool {
        self.origin == Origin::Voice
    }
}
