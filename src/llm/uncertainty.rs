//! Screening of AI answers for low-confidence phrasing

use crate::core::config::{LocalePhrases, ResolverConfig};
use crate::core::types::LocaleTag;
use ahash::AHashMap;

const CA: &[&str] = &[
    "no tinc informació",
    "no puc ajudar",
    "no sé",
    "no estic segur",
    "no disposo",
    "no tinc accés",
];

const ES: &[&str] = &[
    "no tengo información",
    "no puedo ayudar",
    "no sé",
    "no estoy segur",
    "no dispongo",
    "no tengo acceso",
];

const EN: &[&str] = &["i don't have", "i can't", "i don't know", "i'm not sure"];

/// Lowercase and fold typographic apostrophes so "I don’t know" matches
fn fold(text: &str) -> String {
    text.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'")
}

/// Locale-keyed uncertainty phrases, checked by case-insensitive containment
#[derive(Debug, Clone)]
pub struct UncertaintyScreen {
    phrases: AHashMap<LocaleTag, Vec<String>>,
}

impl UncertaintyScreen {
    pub fn new(extra: &LocalePhrases) -> Self {
        let phrases = LocaleTag::ALL
            .into_iter()
            .map(|locale| {
                let builtin = match locale {
                    LocaleTag::Ca => CA,
                    LocaleTag::Es => ES,
                    LocaleTag::En => EN,
                };
                let list = builtin
                    .iter()
                    .map(|p| fold(p))
                    .chain(extra.for_locale(locale).iter().map(|p| fold(p)))
                    .collect();
                (locale, list)
            })
            .collect();
        Self { phrases }
    }

    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(&config.uncertainty_phrases)
    }

    /// The first phrase of the locale's list found in `answer`
    pub fn find<'a>(&'a self, answer: &str, locale: LocaleTag) -> Option<&'a str> {
        let folded = fold(answer);
        self.phrases
            .get(&locale)?
            .iter()
            .find(|p| folded.contains(p.as_str()))
            .map(String::as_str)
    }

    pub fn is_uncertain(&self, answer: &str, locale: LocaleTag) -> bool {
        self.find(answer, locale).is_some()
    }
}

impl Default for UncertaintyScreen {
    fn default() -> Self {
        Self::new(&LocalePhrases::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalan_uncertainty() {
        let screen = UncertaintyScreen::default();
        assert_eq!(
            screen.find("No tinc informació sobre això", LocaleTag::Ca),
            Some("no tinc informació")
        );
        assert!(!screen.is_uncertain("Barcelona té 1,6 milions d'habitants", LocaleTag::Ca));
    }

    #[test]
    fn test_typographic_apostrophe() {
        let screen = UncertaintyScreen::default();
        assert!(screen.is_uncertain("Sorry, I don\u{2019}t know that.", LocaleTag::En));
    }

    #[test]
    fn test_lists_are_per_locale() {
        let screen = UncertaintyScreen::default();
        assert!(screen.is_uncertain("No estoy seguro de eso", LocaleTag::Es));
        assert!(!screen.is_uncertain("I'm not sure", LocaleTag::Ca));
    }

    #[test]
    fn test_extra_phrases() {
        let extra = LocalePhrases {
            ca: vec!["Ni idea".into()],
            ..LocalePhrases::default()
        };
        let screen = UncertaintyScreen::new(&extra);
        assert!(screen.is_uncertain("ni idea, la veritat", LocaleTag::Ca));
    }
}
