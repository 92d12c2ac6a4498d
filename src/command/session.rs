//! Conversation sessions
//!
//! A session is the unit of isolation: it owns the single pending command
//! slot and the transcript used as AI context. Two sessions never share
//! state.

use crate::command::state::PendingCommand;
use crate::core::types::{LocaleTag, SessionId, Turn, Utterance};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Slot values answered to a clarifying question. Shown to the user,
    /// never sent to the AI.
    pub private: bool,
    /// Confirmation or question produced by the command pipeline
    pub command_feedback: bool,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            private: false,
            command_feedback: false,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            private: false,
            command_feedback: false,
        }
    }

    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    pub fn feedback(mut self) -> Self {
        self.command_feedback = true;
        self
    }
}

/// Ordered conversation history
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Messages the AI is allowed to see
    pub fn ai_context(&self) -> Vec<ChatMessage> {
        self.messages.iter().filter(|m| !m.private).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// True if any message contains the given text
    pub fn contains_text(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.content.contains(needle))
    }
}

/// State of one conversation
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    /// App language; utterances built through the session carry it
    pub locale: LocaleTag,
    pub(crate) pending: Option<PendingCommand>,
    pub transcript: Transcript,
    turn: Turn,
}

impl Session {
    pub fn new(locale: LocaleTag) -> Self {
        Self {
            id: SessionId::new(),
            locale,
            pending: None,
            transcript: Transcript::new(),
            turn: 0,
        }
    }

    /// Current turn number (number of utterances resolved so far)
    pub fn turn(&self) -> Turn {
        self.turn
    }

    pub(crate) fn advance_turn(&mut self) -> Turn {
        self.turn += 1;
        self.turn
    }

    pub fn pending(&self) -> Option<&PendingCommand> {
        self.pending.as_ref()
    }

    /// Keyboard input in the session's language
    pub fn typed(&self, text: impl Into<String>) -> Utterance {
        Utterance::typed(text, self.locale)
    }

    /// Dictated input in the session's language
    pub fn voice(&self, text: impl Into<String>) -> Utterance {
        Utterance::voice(text, self.locale)
    }
}
