//! Build chat prompts from the conversation
//!
//! The prompt is the system preamble, the visible part of the transcript
//! and the new utterance, in that order. Private slot answers never reach
//! the model.

use crate::command::session::{ChatMessage, Role};
use crate::core::types::LocaleTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptRole {
    System,
    User,
    Assistant,
}

impl PromptRole {
    pub fn as_str(self) -> &'static str {
        match self {
            PromptRole::System => "system",
            PromptRole::User => "user",
            PromptRole::Assistant => "assistant",
        }
    }
}

impl From<Role> for PromptRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => PromptRole::User,
            Role::Assistant => PromptRole::Assistant,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

impl PromptMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::User,
            content: content.into(),
        }
    }
}

/// Everything sent to the chat model for one question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    /// Conversation, oldest first, ending with the new user turn
    pub messages: Vec<PromptMessage>,
}

/// System instructions: answer language and knowledge cutoff
pub fn system_preamble(locale: LocaleTag, cutoff_year: u32) -> String {
    format!(
        "You are a helpful assistant. Always respond in {lang}, regardless of the language \
         of the user's input. Your knowledge cutoff date is November {year}. If a user asks \
         about events or information after November {year}, politely inform them that your \
         knowledge is limited and suggest they search online for current information.",
        lang = locale.language_name(),
        year = cutoff_year,
    )
}

pub fn build_prompt(
    history: &[ChatMessage],
    utterance: &str,
    locale: LocaleTag,
    cutoff_year: u32,
) -> Prompt {
    let mut messages: Vec<PromptMessage> = history
        .iter()
        .filter(|m| !m.private)
        .map(|m| PromptMessage {
            role: m.role.into(),
            content: m.content.clone(),
        })
        .collect();
    messages.push(PromptMessage::user(utterance));

    Prompt {
        system: system_preamble(locale, cutoff_year),
        messages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preamble_names_language_and_cutoff() {
        let preamble = system_preamble(LocaleTag::Es, 2023);
        assert!(preamble.contains("Always respond in Spanish"));
        assert!(preamble.contains("November 2023"));
    }

    #[test]
    fn test_prompt_skips_private_and_ends_with_utterance() {
        let history = vec![
            ChatMessage::user("apunta"),
            ChatMessage::assistant("Què s'ha d'anotar?").feedback(),
            ChatMessage::user("contrasenya del wifi: gat123").private(),
            ChatMessage::assistant("Nota creada").feedback().private(),
        ];
        let prompt = build_prompt(&history, "qui va escriure Tirant lo Blanc", LocaleTag::Ca, 2023);

        assert_eq!(prompt.messages.len(), 3);
        assert!(!prompt.messages.iter().any(|m| m.content.contains("gat123")));
        let last = prompt.messages.last().unwrap();
        assert_eq!(last.role, PromptRole::User);
        assert_eq!(last.content, "qui va escriure Tirant lo Blanc");
    }
}
