//! Legacy tier: older phrasings kept for compatibility
//!
//! These rules predate multi-turn slot filling, so every slot is demanded
//! by the pattern itself. User-authored custom commands are consulted
//! before the built-in legacy phrases.

use crate::command::model::{slot, ActionKind, Command, Tier};
use crate::core::error::Result;
use crate::core::types::LocaleTag;
use crate::rules::custom::CustomCommandCache;
use crate::rules::table::{PatternRule, PatternTable, RuleTable};
use std::sync::Arc;

pub fn builtin_table() -> Result<PatternTable> {
    Ok(PatternTable::new(Tier::Legacy)
        .with_locale(LocaleTag::Ca, catalan()?)
        .with_locale(LocaleTag::Es, spanish()?)
        .with_locale(LocaleTag::En, english()?))
}

fn catalan() -> Result<Vec<PatternRule>> {
    Ok(vec![
        PatternRule::new(
            "legacy.note",
            "vull apuntar comprar pa",
            r"^(?:vull\s+)?(?:apuntar|anotar|apunta)\s+(?P<content>.+)$",
            ActionKind::CreateNote,
        )?
        .required(slot::CONTENT),
        PatternRule::new(
            "legacy.list",
            "afegir ous a la llista",
            r"^afegir\s+(?P<item>.+?)\s+a\s+la\s+llista(?:\s+(?:de\s+)?(?P<list>.+))?$",
            ActionKind::AddToList,
        )?
        .required(slot::ITEM)
        .optional(slot::LIST),
        PatternRule::new(
            "legacy.weather",
            "el temps",
            r"^(?:el\s+)?temps(?:\s+d'avui)?$",
            ActionKind::Weather,
        )?
        .fixed(slot::WHEN, "today"),
        PatternRule::new(
            "legacy.app",
            "obrir calculadora",
            r"^obrir\s+(?P<app>.+)$",
            ActionKind::OpenApp,
        )?
        .required(slot::APP),
        PatternRule::new(
            "legacy.search",
            "cercar restaurants",
            r"^cercar\s+(?P<query>.+)$",
            ActionKind::WebSearch,
        )?
        .required(slot::QUERY),
        PatternRule::new(
            "legacy.call",
            "trucar a 600123123",
            r"^trucar\s+(?:a\s+)?(?P<contact>.+)$",
            ActionKind::Call,
        )?
        .required(slot::CONTACT),
    ])
}

fn spanish() -> Result<Vec<PatternRule>> {
    Ok(vec![
        PatternRule::new(
            "legacy.note",
            "quiero apuntar comprar pan",
            r"^(?:quiero\s+)?(?:apuntar|anotar|apunta)\s+(?P<content>.+)$",
            ActionKind::CreateNote,
        )?
        .required(slot::CONTENT),
        PatternRule::new(
            "legacy.list",
            "añadir huevos a la lista",
            r"^añadir\s+(?P<item>.+?)\s+a\s+la\s+lista(?:\s+(?:de\s+)?(?P<list>.+))?$",
            ActionKind::AddToList,
        )?
        .required(slot::ITEM)
        .optional(slot::LIST),
        PatternRule::new(
            "legacy.weather",
            "el tiempo",
            r"^(?:el\s+)?tiempo(?:\s+de\s+hoy)?$",
            ActionKind::Weather,
        )?
        .fixed(slot::WHEN, "today"),
        PatternRule::new(
            "legacy.app",
            "abrir calculadora",
            r"^abrir\s+(?P<app>.+)$",
            ActionKind::OpenApp,
        )?
        .required(slot::APP),
        PatternRule::new(
            "legacy.search",
            "buscar restaurantes",
            r"^buscar\s+(?P<query>.+)$",
            ActionKind::WebSearch,
        )?
        .required(slot::QUERY),
        PatternRule::new(
            "legacy.call",
            "llamar a 600123123",
            r"^llamar\s+(?:a\s+)?(?P<contact>.+)$",
            ActionKind::Call,
        )?
        .required(slot::CONTACT),
    ])
}

fn english() -> Result<Vec<PatternRule>> {
    Ok(vec![
        PatternRule::new(
            "legacy.note",
            "jot down buy bread",
            r"^(?:i\s+want\s+to\s+)?(?:note|jot\s+down|remember)\s+(?P<content>.+)$",
            ActionKind::CreateNote,
        )?
        .required(slot::CONTENT),
        PatternRule::new(
            "legacy.weather",
            "weather",
            r"^(?:the\s+)?weather(?:\s+today)?$",
            ActionKind::Weather,
        )?
        .fixed(slot::WHEN, "today"),
        PatternRule::new(
            "legacy.app",
            "launch calculator",
            r"^launch\s+(?P<app>.+)$",
            ActionKind::OpenApp,
        )?
        .required(slot::APP),
        PatternRule::new(
            "legacy.search",
            "find restaurants",
            r"^find\s+(?P<query>.+)$",
            ActionKind::WebSearch,
        )?
        .required(slot::QUERY),
        PatternRule::new(
            "legacy.call",
            "phone 600123123",
            r"^(?:phone|dial)\s+(?P<contact>.+)$",
            ActionKind::Call,
        )?
        .required(slot::CONTACT),
    ])
}

/// Legacy tier as seen by the pipeline: custom commands, then built-ins
pub struct LegacyTable {
    custom: Arc<CustomCommandCache>,
    builtin: Arc<PatternTable>,
}

impl LegacyTable {
    pub fn new(custom: Arc<CustomCommandCache>) -> Result<Self> {
        Ok(Self {
            custom,
            builtin: Arc::new(builtin_table()?),
        })
    }

    /// Built-in legacy rules, without the custom commands
    pub fn builtin(&self) -> Arc<PatternTable> {
        Arc::clone(&self.builtin)
    }
}

impl RuleTable for LegacyTable {
    fn tier(&self) -> Tier {
        Tier::Legacy
    }

    fn match_command(&self, text: &str, locale: LocaleTag) -> Option<Command> {
        self.custom
            .match_command(text, locale)
            .or_else(|| self.builtin.match_command(text, locale))
    }
}
