//! Canonicalize dictated text before command matching
//!
//! Speech-to-text output carries noise keyboard input never has: filler
//! words, split or mis-heard command verbs, spelled-out numbers, stray
//! sentence punctuation and inconsistent Unicode composition. Only
//! voice-origin utterances go through here; typed text is matched as is.
//!
//! Letter case is kept: rules match case-insensitively, and slot values
//! are taken from this text, so a dictated "Maria" stays "Maria".

use crate::core::types::LocaleTag;
use crate::text::numbers::NumberLexicon;
use ahash::AHashMap;
use unicode_normalization::UnicodeNormalization;

/// Per-locale substitution data
#[derive(Debug, Clone)]
pub struct NormalizationTable {
    /// Whole tokens dropped from dictation ("eh", "um"). Hesitation sounds
    /// only; anything that is also a word of the language stays.
    fillers: Vec<&'static str>,
    /// Whole-word phrase corrections, longest phrases first
    homophones: Vec<(Vec<&'static str>, &'static str)>,
    numbers: NumberLexicon,
}

const SHARED_FILLERS: &[&str] = &["eh", "ehm", "mm", "mmm", "hmm", "uh", "uhm"];

impl NormalizationTable {
    pub fn for_locale(locale: LocaleTag) -> Self {
        let (extra_fillers, homophones): (&[&str], &[(&str, &str)]) = match locale {
            LocaleTag::Ca => (
                &["ehem"],
                &[
                    ("a punt a", "apunta"),
                    ("a punta", "apunta"),
                    ("a fegeix", "afegeix"),
                    ("afegix", "afegeix"),
                    ("inserix", "insereix"),
                    ("cancela", "cancel·la"),
                ],
            ),
            LocaleTag::Es => (
                &["ehh", "mmh"],
                &[
                    ("a punta", "apunta"),
                    ("a ñade", "añade"),
                    ("añada", "añade"),
                    ("a bre", "abre"),
                ],
            ),
            LocaleTag::En => (
                &["erm", "uhh", "um"],
                &[
                    ("right down", "write down"),
                    ("at to", "add to"),
                ],
            ),
        };

        let fillers = SHARED_FILLERS
            .iter()
            .chain(extra_fillers.iter())
            .copied()
            .collect();

        let mut homophones: Vec<(Vec<&'static str>, &'static str)> = homophones
            .iter()
            .map(|(from, to)| (from.split_whitespace().collect(), *to))
            .collect();
        homophones.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Self {
            fillers,
            homophones,
            numbers: NumberLexicon::for_locale(locale),
        }
    }

    fn is_filler(&self, token: &str) -> bool {
        let token = bare(token).to_lowercase();
        self.fillers.contains(&token.as_str())
    }

    fn apply_homophones(&self, tokens: Vec<String>) -> Vec<String> {
        let mut out = Vec::with_capacity(tokens.len());
        let mut i = 0;

        'outer: while i < tokens.len() {
            for (phrase, replacement) in &self.homophones {
                let end = i + phrase.len();
                if end <= tokens.len()
                    && tokens[i..end]
                        .iter()
                        .zip(phrase.iter())
                        .all(|(t, p)| bare(t).to_lowercase() == *p)
                {
                    let last = &tokens[end - 1];
                    out.push(format!("{}{}", replacement, &last[bare(last).len()..]));
                    i = end;
                    continue 'outer;
                }
            }
            out.push(tokens[i].clone());
            i += 1;
        }

        out
    }
}

/// Locale-scoped text canonicalizer
///
/// `normalize` is pure, total and idempotent.
#[derive(Debug, Clone)]
pub struct Normalizer {
    tables: AHashMap<LocaleTag, NormalizationTable>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        let tables = LocaleTag::ALL
            .iter()
            .map(|&locale| (locale, NormalizationTable::for_locale(locale)))
            .collect();
        Self { tables }
    }

    pub fn normalize(&self, text: &str, locale: LocaleTag) -> String {
        let composed: String = text.nfc().collect();
        let cleaned: String = fix_typography(&composed).nfc().collect();
        let tokens: Vec<String> = cleaned.split_whitespace().map(String::from).collect();

        let tokens = match self.tables.get(&locale) {
            Some(table) => {
                let tokens = tokens.into_iter().filter(|t| !table.is_filler(t)).collect();
                let tokens = table.apply_homophones(tokens);
                table.numbers.convert(&tokens)
            }
            None => tokens,
        };

        tokens
            .join(" ")
            .trim_end_matches(|c: char| is_sentence_punctuation(c) || c.is_whitespace())
            .to_string()
    }
}

/// Replace typographic variants dictation engines emit
fn fix_typography(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let chars: Vec<char> = text.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        match c {
            '¿' | '¡' => {}
            '\u{2018}' | '\u{2019}' | '\u{02BC}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            // Catalan geminated l: "l•l", "l.l" and the legacy ŀ ligature
            '\u{2022}' | '\u{2219}' | '\u{2027}' | '.'
                if i > 1
                    && chars[i - 2].is_alphabetic()
                    && matches!(chars[i - 1], 'l' | 'L')
                    && matches!(chars.get(i + 1), Some('l') | Some('L')) =>
            {
                out.push('·')
            }
            '\u{0140}' => out.push_str("l·"),
            '\u{013F}' => out.push_str("L·"),
            _ => out.push(c),
        }
    }

    out
}

pub(crate) fn is_sentence_punctuation(c: char) -> bool {
    matches!(c, ',' | '.' | ';' | ':' | '?' | '!')
}

/// Token without trailing sentence punctuation
fn bare(token: &str) -> &str {
    token.trim_end_matches(is_sentence_punctuation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_filler_removal() {
        let n = Normalizer::new();
        assert_eq!(n.normalize("eh apunta ehm compra llet", LocaleTag::Ca), "apunta compra llet");
        assert_eq!(n.normalize("Uhm, apunta pa", LocaleTag::Ca), "apunta pa");
    }

    #[test]
    fn test_pronouns_and_demonstratives_kept() {
        let n = Normalizer::new();
        assert_eq!(n.normalize("apunta em truca", LocaleTag::Ca), "apunta em truca");
        assert_eq!(n.normalize("añade este libro", LocaleTag::Es), "añade este libro");
    }

    #[test]
    fn test_case_preserved() {
        let n = Normalizer::new();
        assert_eq!(
            n.normalize("A punta truca la Maria.", LocaleTag::Ca),
            "apunta truca la Maria"
        );
        assert_eq!(n.normalize("Call Joan", LocaleTag::En), "Call Joan");
    }

    #[test]
    fn test_split_verb_rejoined() {
        let n = Normalizer::new();
        assert_eq!(n.normalize("A punta compra llet.", LocaleTag::Ca), "apunta compra llet");
        assert_eq!(n.normalize("a ñade pan", LocaleTag::Es), "añade pan");
        assert_eq!(n.normalize("right down buy milk", LocaleTag::En), "write down buy milk");
    }

    #[test]
    fn test_spanish_inverted_marks_stripped() {
        let n = Normalizer::new();
        assert_eq!(n.normalize("¿Qué tiempo hace?", LocaleTag::Es), "Qué tiempo hace");
    }

    #[test]
    fn test_geminated_l() {
        let n = Normalizer::new();
        assert_eq!(n.normalize("cancel.la", LocaleTag::Ca), "cancel·la");
        assert_eq!(n.normalize("col•lecció", LocaleTag::Ca), "col·lecció");
    }

    #[test]
    fn test_year_words_become_digits() {
        let n = Normalizer::new();
        assert_eq!(
            n.normalize("Què ha passat el dos mil vint-i-sis?", LocaleTag::Ca),
            "Què ha passat el 2026"
        );
    }

    #[test]
    fn test_decomposed_accents_composed() {
        let n = Normalizer::new();
        // "què" with a combining grave accent
        let decomposed = "que\u{0300}";
        assert_eq!(n.normalize(decomposed, LocaleTag::Ca), "què");
    }

    #[test]
    fn test_curly_apostrophe() {
        let n = Normalizer::new();
        assert_eq!(n.normalize("l\u{2019}etiqueta", LocaleTag::Ca), "l'etiqueta");
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(
            words in prop::collection::vec(
                prop::sample::select(vec![
                    "a", "punta", "punt", "apunta", "eh", "dos", "mil", "vint-i-sis",
                    "treinta", "y", "cinco", "un", "nou", "right", "down", "hundred",
                    "and", "two", "compra", "llet", "cancel.la", "¿qué", "hace?", "mil,",
                    "A", "Punta", "Dos", "Maria", "EH", "em", "este",
                ]),
                0..12,
            ),
            locale in prop::sample::select(LocaleTag::ALL.to_vec()),
        ) {
            let n = Normalizer::new();
            let text = words.join(" ");
            let once = n.normalize(&text, locale);
            let twice = n.normalize(&once, locale);
            prop_assert_eq!(once, twice);
        }
    }
}
