//! Knowledge-cutoff guard
//!
//! Questions about anything after the model's cutoff are sent to web search
//! instead of the model. The check is pure and runs before any AI call.

use crate::core::config::{LocalePhrases, ResolverConfig};
use crate::core::types::LocaleTag;
use ahash::AHashMap;

/// Years mentioned in the text: standalone runs of exactly four digits
pub fn mentioned_years(text: &str) -> impl Iterator<Item = u32> + '_ {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|run| run.len() == 4)
        .filter_map(|run| run.parse().ok())
}

fn builtin_phrases(locale: LocaleTag, cutoff: u32) -> Vec<String> {
    match locale {
        LocaleTag::Ca => vec![
            format!("després de novembre de {cutoff}"),
            format!("després de {cutoff}"),
            format!("després del {cutoff}"),
            "després de novembre".to_string(),
            format!("despres de novembre de {cutoff}"),
            format!("despres de {cutoff}"),
            format!("despres del {cutoff}"),
        ],
        LocaleTag::Es => vec![
            format!("después de noviembre de {cutoff}"),
            format!("después de {cutoff}"),
            format!("después del {cutoff}"),
            "después de noviembre".to_string(),
            format!("despues de {cutoff}"),
            format!("despues del {cutoff}"),
        ],
        LocaleTag::En => vec![
            format!("after november {cutoff}"),
            format!("after {cutoff}"),
            format!("since {cutoff}"),
        ],
    }
}

/// Detects questions beyond the knowledge cutoff
#[derive(Debug, Clone)]
pub struct FutureKnowledgeGuard {
    cutoff_year: u32,
    phrases: AHashMap<LocaleTag, Vec<String>>,
}

impl FutureKnowledgeGuard {
    pub fn new(cutoff_year: u32, extra: &LocalePhrases) -> Self {
        let phrases = LocaleTag::ALL
            .into_iter()
            .map(|locale| {
                let mut list = builtin_phrases(locale, cutoff_year);
                list.extend(extra.for_locale(locale).iter().map(|p| p.to_lowercase()));
                (locale, list)
            })
            .collect();
        Self {
            cutoff_year,
            phrases,
        }
    }

    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(config.knowledge_cutoff_year, &config.future_phrases)
    }

    pub fn is_beyond_cutoff(&self, text: &str, locale: LocaleTag) -> bool {
        if let Some(year) = mentioned_years(text).find(|&y| y > self.cutoff_year) {
            tracing::debug!(year, cutoff = self.cutoff_year, "Year beyond cutoff");
            return true;
        }

        let lower = text.to_lowercase();
        self.phrases
            .get(&locale)
            .is_some_and(|list| list.iter().any(|p| lower.contains(p.as_str())))
    }
}
