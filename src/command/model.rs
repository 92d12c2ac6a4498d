//! Commands produced by rule matches

use crate::core::types::LocaleTag;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Slot names shared by rules, the resolver and the executor
pub mod slot {
    pub const CONTENT: &str = "content";
    pub const ITEM: &str = "item";
    pub const LIST: &str = "list";
    pub const NAME: &str = "name";
    pub const TEXT: &str = "text";
    pub const APP: &str = "app";
    pub const URL: &str = "url";
    pub const QUERY: &str = "query";
    pub const WHEN: &str = "when";
    pub const TAG: &str = "tag";
    pub const CONTACT: &str = "contact";
}

/// Which rule set produced a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Enhanced,
    Legacy,
    Custom,
}

/// What a user-authored rule does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomAction {
    OpenApp,
    OpenUrl,
    Search,
    Custom,
}

/// Target action of a command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    CreateNote,
    AddToList,
    CreateList,
    InsertText,
    OpenApp,
    OpenUrl,
    WebSearch,
    Weather,
    RunTag,
    Call,
    /// User-authored rule; `data` is the rule's action data
    Custom { action: CustomAction, data: String },
}

impl ActionKind {
    /// Stable label used in logs
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::CreateNote => "create_note",
            ActionKind::AddToList => "add_to_list",
            ActionKind::CreateList => "create_list",
            ActionKind::InsertText => "insert_text",
            ActionKind::OpenApp => "open_app",
            ActionKind::OpenUrl => "open_url",
            ActionKind::WebSearch => "web_search",
            ActionKind::Weather => "weather",
            ActionKind::RunTag => "run_tag",
            ActionKind::Call => "call",
            ActionKind::Custom { .. } => "custom",
        }
    }
}

/// A matched command, possibly still missing required slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Identifier of the rule that produced it
    pub name: String,
    pub action: ActionKind,
    pub slots: BTreeMap<String, String>,
    /// Slots that must be filled before execution, in asking order
    pub required: Vec<String>,
    pub tier: Tier,
    pub locale: LocaleTag,
}

impl Command {
    pub fn new(
        name: impl Into<String>,
        action: ActionKind,
        tier: Tier,
        locale: LocaleTag,
    ) -> Self {
        Self {
            name: name.into(),
            action,
            slots: BTreeMap::new(),
            required: Vec::new(),
            tier,
            locale,
        }
    }

    pub fn with_required(mut self, slot: &str) -> Self {
        self.required.push(slot.to_string());
        self
    }

    pub fn with_slot(mut self, slot: &str, value: impl Into<String>) -> Self {
        self.slots.insert(slot.to_string(), value.into());
        self
    }

    pub fn slot(&self, name: &str) -> Option<&str> {
        self.slots.get(name).map(String::as_str)
    }

    /// First required slot without a value
    pub fn missing_slot(&self) -> Option<&str> {
        self.required
            .iter()
            .find(|s| !self.slots.contains_key(s.as_str()))
            .map(String::as_str)
    }

    pub fn is_complete(&self) -> bool {
        self.missing_slot().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_slot_in_required_order() {
        let cmd = Command::new("list.add", ActionKind::AddToList, Tier::Enhanced, LocaleTag::Ca)
            .with_required(slot::ITEM)
            .with_required(slot::LIST);
        assert_eq!(cmd.missing_slot(), Some(slot::ITEM));

        let cmd = cmd.with_slot(slot::ITEM, "pa");
        assert_eq!(cmd.missing_slot(), Some(slot::LIST));

        let cmd = cmd.with_slot(slot::LIST, "compra");
        assert!(cmd.is_complete());
    }

    #[test]
    fn test_optional_slots_do_not_block() {
        let cmd = Command::new("weather", ActionKind::Weather, Tier::Enhanced, LocaleTag::En);
        assert!(cmd.is_complete());
        assert_eq!(cmd.slot(slot::WHEN), None);
    }

    #[test]
    fn test_custom_action_serialization() {
        let json = serde_json::to_string(&CustomAction::OpenApp).unwrap();
        assert_eq!(json, "\"open_app\"");
    }
}
