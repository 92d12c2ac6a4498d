//! Ordered pattern rules and the tier abstraction

use crate::command::model::{ActionKind, Command, Tier};
use crate::core::error::{LaiaError, Result};
use crate::core::types::LocaleTag;
use ahash::AHashMap;
use regex::Regex;
use std::sync::Arc;

/// One rule set consulted during matching.
///
/// Evaluation within a table is first-match-wins over a fixed order, so a
/// table is a pure function of `(text, locale)`.
pub trait RuleTable: Send + Sync {
    fn tier(&self) -> Tier;

    fn match_command(&self, text: &str, locale: LocaleTag) -> Option<Command>;
}

impl<T: RuleTable + ?Sized> RuleTable for Arc<T> {
    fn tier(&self) -> Tier {
        (**self).tier()
    }

    fn match_command(&self, text: &str, locale: LocaleTag) -> Option<Command> {
        (**self).match_command(text, locale)
    }
}

#[derive(Debug, Clone)]
struct SlotSpec {
    name: &'static str,
    required: bool,
}

/// A trigger pattern plus its slot declaration and target action.
///
/// Slots are read from named capture groups of the same name. A required
/// slot whose group did not participate yields an incomplete command.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub id: &'static str,
    /// Human readable example, used for conflict reports
    pub description: &'static str,
    pattern: Regex,
    action: ActionKind,
    slots: Vec<SlotSpec>,
    fixed: Vec<(&'static str, &'static str)>,
}

impl PatternRule {
    /// Compile a case-insensitive rule
    pub fn new(
        id: &'static str,
        description: &'static str,
        pattern: &str,
        action: ActionKind,
    ) -> Result<Self> {
        let pattern = Regex::new(&format!("(?i){}", pattern)).map_err(|source| {
            LaiaError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;
        Ok(Self {
            id,
            description,
            pattern,
            action,
            slots: Vec::new(),
            fixed: Vec::new(),
        })
    }

    pub fn required(mut self, slot: &'static str) -> Self {
        self.slots.push(SlotSpec {
            name: slot,
            required: true,
        });
        self
    }

    pub fn optional(mut self, slot: &'static str) -> Self {
        self.slots.push(SlotSpec {
            name: slot,
            required: false,
        });
        self
    }

    /// Slot value implied by the rule itself
    pub fn fixed(mut self, slot: &'static str, value: &'static str) -> Self {
        self.fixed.push((slot, value));
        self
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text.trim())
    }

    pub fn apply(&self, text: &str, tier: Tier, locale: LocaleTag) -> Option<Command> {
        let captures = self.pattern.captures(text.trim())?;
        let mut command = Command::new(self.id, self.action.clone(), tier, locale);

        for (slot, value) in &self.fixed {
            command = command.with_slot(slot, *value);
        }

        for spec in &self.slots {
            if spec.required {
                command = command.with_required(spec.name);
            }
            let value = captures
                .name(spec.name)
                .map(|m| m.as_str().trim())
                .filter(|v| !v.is_empty());
            if let Some(value) = value {
                command = command.with_slot(spec.name, value);
            }
        }

        Some(command)
    }
}

/// Per-locale ordered rules for one tier
#[derive(Debug, Clone)]
pub struct PatternTable {
    tier: Tier,
    by_locale: AHashMap<LocaleTag, Vec<PatternRule>>,
}

impl PatternTable {
    pub fn new(tier: Tier) -> Self {
        Self {
            tier,
            by_locale: AHashMap::new(),
        }
    }

    pub fn with_locale(mut self, locale: LocaleTag, rules: Vec<PatternRule>) -> Self {
        self.by_locale.insert(locale, rules);
        self
    }

    pub fn rules(&self, locale: LocaleTag) -> &[PatternRule] {
        self.by_locale
            .get(&locale)
            .map(|r| r.as_slice())
            .unwrap_or(&[])
    }
}

impl RuleTable for PatternTable {
    fn tier(&self) -> Tier {
        self.tier
    }

    fn match_command(&self, text: &str, locale: LocaleTag) -> Option<Command> {
        self.rules(locale)
            .iter()
            .find_map(|rule| rule.apply(text, self.tier, locale))
    }
}

/// Tiers in precedence order; the first tier with a match wins.
#[derive(Default)]
pub struct TieredRules {
    tiers: Vec<Box<dyn RuleTable>>,
}

impl TieredRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, table: impl RuleTable + 'static) -> Self {
        self.tiers.push(Box::new(table));
        self
    }

    pub fn match_command(&self, text: &str, locale: LocaleTag) -> Option<Command> {
        self.tiers.iter().find_map(|table| {
            let command = table.match_command(text, locale);
            if let Some(cmd) = &command {
                tracing::debug!(rule = %cmd.name, tier = ?table.tier(), "Rule matched");
            }
            command
        })
    }
}
