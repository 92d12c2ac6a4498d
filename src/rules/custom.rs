//! User-authored command rules
//!
//! Patterns are regular expressions written by the user in settings. They
//! are compiled once into an immutable snapshot; editing the rule list
//! swaps in a freshly compiled snapshot. Unparseable patterns are rejected
//! at authoring time by [`CustomCommandRule::validate`] and skipped (with a
//! warning) when compiling, never at match time.

use crate::command::model::{slot, ActionKind, Command, CustomAction, Tier};
use crate::core::error::{LaiaError, Result};
use crate::core::types::LocaleTag;
use crate::rules::table::PatternRule;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

/// A custom command as persisted in settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomCommandRule {
    pub name: String,
    pub pattern: String,
    pub action: CustomAction,
    pub action_data: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl CustomCommandRule {
    /// Authoring-time check. Rejects empty fields and invalid patterns.
    pub fn validate(&self) -> Result<()> {
        self.compile().map(|_| ())
    }

    /// Check the fields and build the case-insensitive matcher
    pub fn compile(&self) -> Result<Regex> {
        if self.name.trim().is_empty() {
            return Err(LaiaError::ConfigError("custom command needs a name".into()));
        }
        if self.pattern.trim().is_empty() {
            return Err(LaiaError::ConfigError(format!(
                "custom command '{}' needs a pattern",
                self.name
            )));
        }
        if self.action_data.trim().is_empty() {
            return Err(LaiaError::ConfigError(format!(
                "custom command '{}' needs action data",
                self.name
            )));
        }
        compile_pattern(&self.pattern)
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("(?i){}", pattern)).map_err(|source| LaiaError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

#[derive(Debug, Clone)]
struct CompiledCustomRule {
    rule: CustomCommandRule,
    regex: Regex,
}

/// Immutable compiled snapshot of the user's rules
#[derive(Debug, Clone, Default)]
pub struct CompiledCustomRules {
    rules: Vec<CompiledCustomRule>,
}

impl CompiledCustomRules {
    /// Compile in order, skipping rules that fail validation.
    ///
    /// Returns the snapshot and the names of skipped rules.
    pub fn compile(rules: &[CustomCommandRule]) -> (Self, Vec<String>) {
        let mut compiled = Vec::with_capacity(rules.len());
        let mut skipped = Vec::new();

        for rule in rules {
            match rule.compile() {
                Ok(regex) => compiled.push(CompiledCustomRule {
                    rule: rule.clone(),
                    regex,
                }),
                Err(e) => {
                    tracing::warn!(rule = %rule.name, error = %e, "Skipping malformed custom command");
                    skipped.push(rule.name.clone());
                }
            }
        }

        (Self { rules: compiled }, skipped)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn match_command(&self, text: &str, locale: LocaleTag) -> Option<Command> {
        let text = text.trim();
        self.rules
            .iter()
            .filter(|c| c.rule.enabled)
            .find_map(|c| {
                let captures = c.regex.captures(text)?;
                let query = captures
                    .get(1)
                    .map(|m| m.as_str().trim())
                    .filter(|q| !q.is_empty())
                    .unwrap_or(text);
                let action = ActionKind::Custom {
                    action: c.rule.action,
                    data: c.rule.action_data.clone(),
                };
                Some(
                    Command::new(format!("custom:{}", c.rule.name), action, Tier::Custom, locale)
                        .with_slot(slot::QUERY, query),
                )
            })
    }
}

/// Shared, hot-swappable custom rule snapshot
#[derive(Debug, Default)]
pub struct CustomCommandCache {
    current: RwLock<Arc<CompiledCustomRules>>,
}

impl CustomCommandCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rules(rules: &[CustomCommandRule]) -> Self {
        let cache = Self::new();
        cache.replace(rules);
        cache
    }

    /// Recompile after an edit. Returns the names of skipped rules.
    pub fn replace(&self, rules: &[CustomCommandRule]) -> Vec<String> {
        let (compiled, skipped) = CompiledCustomRules::compile(rules);
        tracing::info!(
            compiled = compiled.len(),
            skipped = skipped.len(),
            "Custom commands reloaded"
        );
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(compiled);
        skipped
    }

    pub fn snapshot(&self) -> Arc<CompiledCustomRules> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn match_command(&self, text: &str, locale: LocaleTag) -> Option<Command> {
        self.snapshot().match_command(text, locale)
    }
}

/// Example phrases of built-in rules that a custom pattern would capture
pub fn find_conflicts(pattern: &str, builtin: &[PatternRule]) -> Result<Vec<String>> {
    let custom = compile_pattern(pattern)?;
    let mut conflicts: Vec<String> = Vec::new();

    for rule in builtin {
        if custom.is_match(rule.description) && !conflicts.iter().any(|c| c == rule.description) {
            conflicts.push(rule.description.to_string());
        }
    }

    Ok(conflicts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::enhanced;

    fn rule(name: &str, pattern: &str, action: CustomAction, data: &str) -> CustomCommandRule {
        CustomCommandRule {
            name: name.into(),
            pattern: pattern.into(),
            action,
            action_data: data.into(),
            enabled: true,
        }
    }

    #[test]
    fn test_validate_rejects_bad_pattern() {
        let bad = rule("bad", "([unclosed", CustomAction::OpenUrl, "https://x.cat");
        assert!(matches!(bad.validate(), Err(LaiaError::InvalidPattern { .. })));
    }

    #[test]
    fn test_compile_gives_case_insensitive_matcher() {
        let radio = rule("radio", "^posa la ràdio$", CustomAction::OpenUrl, "https://radio.cat");
        let regex = radio.compile().unwrap();
        assert!(regex.is_match("Posa la Ràdio"));
        assert!(radio.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_data() {
        let bad = rule("empty", "^hola$", CustomAction::OpenUrl, "  ");
        assert!(matches!(bad.validate(), Err(LaiaError::ConfigError(_))));
    }

    #[test]
    fn test_malformed_rule_skipped_others_kept() {
        let rules = vec![
            rule("bad", "([unclosed", CustomAction::OpenUrl, "https://x.cat"),
            rule("radio", "^posa la ràdio$", CustomAction::OpenUrl, "https://radio.cat"),
        ];
        let (compiled, skipped) = CompiledCustomRules::compile(&rules);
        assert_eq!(compiled.len(), 1);
        assert_eq!(skipped, vec!["bad".to_string()]);
        assert!(compiled.match_command("Posa la ràdio", LocaleTag::Ca).is_some());
    }

    #[test]
    fn test_disabled_rule_never_matches() {
        let mut radio = rule("radio", "^posa la ràdio$", CustomAction::OpenUrl, "https://radio.cat");
        radio.enabled = false;
        let (compiled, skipped) = CompiledCustomRules::compile(&[radio]);
        assert!(skipped.is_empty());
        assert!(compiled.match_command("posa la ràdio", LocaleTag::Ca).is_none());
    }

    #[test]
    fn test_search_capture_becomes_query() {
        let yt = rule(
            "youtube",
            "^posa (.+) a youtube$",
            CustomAction::Search,
            "https://www.youtube.com/results?search_query=",
        );
        let cache = CustomCommandCache::from_rules(&[yt]);
        let cmd = cache.match_command("posa Txarango a youtube", LocaleTag::Ca).unwrap();
        assert_eq!(cmd.slot(slot::QUERY), Some("Txarango"));
        assert_eq!(cmd.tier, Tier::Custom);
        assert_eq!(cmd.name, "custom:youtube");
    }

    #[test]
    fn test_replace_invalidates_previous_snapshot() {
        let cache = CustomCommandCache::from_rules(&[rule(
            "radio",
            "^posa la ràdio$",
            CustomAction::OpenUrl,
            "https://radio.cat",
        )]);
        assert!(cache.match_command("posa la ràdio", LocaleTag::Ca).is_some());

        cache.replace(&[]);
        assert!(cache.match_command("posa la ràdio", LocaleTag::Ca).is_none());
    }

    #[test]
    fn test_find_conflicts_with_builtin() {
        let table = enhanced::table().unwrap();
        let conflicts = find_conflicts("^apunta", table.rules(LocaleTag::Ca)).unwrap();
        assert_eq!(conflicts, vec!["apunta compra llet".to_string()]);

        let none = find_conflicts("^posa la ràdio$", table.rules(LocaleTag::Ca)).unwrap();
        assert!(none.is_empty());
    }
}
