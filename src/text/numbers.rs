//! Spoken number words to digits
//!
//! Dictation spells numbers out ("dos mil vint-i-sis"). The knowledge-cutoff
//! guard and slot values need digits, so runs of number words are folded
//! into a single decimal token.
//!
//! A run is only rewritten when it is unambiguous: two or more number words,
//! or a single word worth at least 20. Lone small words stay as words since
//! several of them double as ordinary vocabulary ("set", "nou", "one").

use crate::core::types::LocaleTag;
use crate::text::normalize::is_sentence_punctuation;
use ahash::AHashMap;

/// Grammatical role of a number word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberWord {
    /// 0-99, including composite tens
    Unit(u64),
    /// Whole hundreds written as one word (200 "doscientos", 100 "cent")
    Hundreds(u64),
    /// Multiplies the preceding unit by 100 ("two hundred", "dos-cents")
    HundredMul,
    /// Multiplies everything so far by 1000
    Thousand,
    /// Joins tens and units ("treinta y dos", "hundred and five")
    Connector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Last {
    Tens,
    Small,
    Hundred,
    Thousand,
    Connector,
}

#[derive(Debug, Default)]
struct Accumulator {
    total: u64,
    current: u64,
    last: Option<Last>,
    has_thousand: bool,
}

impl Accumulator {
    fn push(&mut self, word: NumberWord) -> bool {
        match word {
            NumberWord::Unit(n) => {
                match self.last {
                    None | Some(Last::Hundred) | Some(Last::Thousand) | Some(Last::Connector) => {}
                    Some(Last::Tens) if n < 10 => {
                        self.current += n;
                        self.last = Some(Last::Small);
                        return true;
                    }
                    _ => return false,
                }
                self.current += n;
                self.last = Some(if n >= 20 && n % 10 == 0 {
                    Last::Tens
                } else {
                    Last::Small
                });
                true
            }
            NumberWord::Hundreds(n) => match self.last {
                None | Some(Last::Thousand) => {
                    self.current += n;
                    self.last = Some(Last::Hundred);
                    true
                }
                _ => false,
            },
            NumberWord::HundredMul => match self.last {
                Some(Last::Small) if self.current > 0 && self.current < 10 => {
                    self.current *= 100;
                    self.last = Some(Last::Hundred);
                    true
                }
                None | Some(Last::Thousand) => {
                    self.current += 100;
                    self.last = Some(Last::Hundred);
                    true
                }
                _ => false,
            },
            NumberWord::Thousand => {
                if self.has_thousand || self.last == Some(Last::Connector) {
                    return false;
                }
                let multiplier = if self.current == 0 { 1 } else { self.current };
                self.total += multiplier * 1000;
                self.current = 0;
                self.has_thousand = true;
                self.last = Some(Last::Thousand);
                true
            }
            NumberWord::Connector => match self.last {
                Some(Last::Tens) | Some(Last::Hundred) => {
                    self.last = Some(Last::Connector);
                    true
                }
                _ => false,
            },
        }
    }

    fn value(&self) -> u64 {
        self.total + self.current
    }
}

/// Number vocabulary for one locale
#[derive(Debug, Clone)]
pub struct NumberLexicon {
    words: AHashMap<&'static str, NumberWord>,
}

const CA_UNITS: &[(&str, u64)] = &[
    ("zero", 0), ("u", 1), ("un", 1), ("una", 1), ("dos", 2), ("dues", 2),
    ("tres", 3), ("quatre", 4), ("cinc", 5), ("sis", 6), ("set", 7),
    ("vuit", 8), ("nou", 9), ("deu", 10), ("onze", 11), ("dotze", 12),
    ("tretze", 13), ("catorze", 14), ("quinze", 15), ("setze", 16),
    ("disset", 17), ("divuit", 18), ("dinou", 19), ("vint", 20),
    ("trenta", 30), ("quaranta", 40), ("cinquanta", 50), ("seixanta", 60),
    ("setanta", 70), ("vuitanta", 80), ("noranta", 90),
];

const ES_UNITS: &[(&str, u64)] = &[
    ("cero", 0), ("un", 1), ("uno", 1), ("una", 1), ("dos", 2), ("tres", 3),
    ("cuatro", 4), ("cinco", 5), ("seis", 6), ("siete", 7), ("ocho", 8),
    ("nueve", 9), ("diez", 10), ("once", 11), ("doce", 12), ("trece", 13),
    ("catorce", 14), ("quince", 15), ("dieciséis", 16), ("dieciseis", 16),
    ("diecisiete", 17), ("dieciocho", 18), ("diecinueve", 19), ("veinte", 20),
    ("veintiuno", 21), ("veintiún", 21), ("veintidós", 22), ("veintidos", 22),
    ("veintitrés", 23), ("veintitres", 23), ("veinticuatro", 24),
    ("veinticinco", 25), ("veintiséis", 26), ("veintiseis", 26),
    ("veintisiete", 27), ("veintiocho", 28), ("veintinueve", 29),
    ("treinta", 30), ("cuarenta", 40), ("cincuenta", 50), ("sesenta", 60),
    ("setenta", 70), ("ochenta", 80), ("noventa", 90),
];

const ES_HUNDREDS: &[(&str, u64)] = &[
    ("cien", 100), ("ciento", 100), ("doscientos", 200), ("doscientas", 200),
    ("trescientos", 300), ("trescientas", 300), ("cuatrocientos", 400),
    ("cuatrocientas", 400), ("quinientos", 500), ("quinientas", 500),
    ("seiscientos", 600), ("seiscientas", 600), ("setecientos", 700),
    ("setecientas", 700), ("ochocientos", 800), ("ochocientas", 800),
    ("novecientos", 900), ("novecientas", 900),
];

const EN_UNITS: &[(&str, u64)] = &[
    ("zero", 0), ("one", 1), ("two", 2), ("three", 3), ("four", 4),
    ("five", 5), ("six", 6), ("seven", 7), ("eight", 8), ("nine", 9),
    ("ten", 10), ("eleven", 11), ("twelve", 12), ("thirteen", 13),
    ("fourteen", 14), ("fifteen", 15), ("sixteen", 16), ("seventeen", 17),
    ("eighteen", 18), ("nineteen", 19), ("twenty", 20), ("thirty", 30),
    ("forty", 40), ("fifty", 50), ("sixty", 60), ("seventy", 70),
    ("eighty", 80), ("ninety", 90),
];

impl NumberLexicon {
    pub fn for_locale(locale: LocaleTag) -> Self {
        let mut words = AHashMap::new();
        match locale {
            LocaleTag::Ca => {
                for &(w, n) in CA_UNITS {
                    words.insert(w, NumberWord::Unit(n));
                }
                words.insert("cent", NumberWord::Hundreds(100));
                words.insert("cents", NumberWord::HundredMul);
                words.insert("centes", NumberWord::HundredMul);
                words.insert("mil", NumberWord::Thousand);
            }
            LocaleTag::Es => {
                for &(w, n) in ES_UNITS {
                    words.insert(w, NumberWord::Unit(n));
                }
                for &(w, n) in ES_HUNDREDS {
                    words.insert(w, NumberWord::Hundreds(n));
                }
                words.insert("mil", NumberWord::Thousand);
                words.insert("y", NumberWord::Connector);
            }
            LocaleTag::En => {
                for &(w, n) in EN_UNITS {
                    words.insert(w, NumberWord::Unit(n));
                }
                words.insert("hundred", NumberWord::HundredMul);
                words.insert("thousand", NumberWord::Thousand);
                words.insert("and", NumberWord::Connector);
            }
        }
        Self { words }
    }

    /// Look up a token, resolving hyphenated compounds ("vint-i-sis",
    /// "dos-cents", "twenty-six") into a single word.
    fn lookup(&self, token: &str) -> Option<NumberWord> {
        if let Some(word) = self.words.get(token) {
            return Some(*word);
        }
        if !token.contains('-') {
            return None;
        }

        let mut acc = Accumulator::default();
        for part in token.split('-').filter(|p| *p != "i") {
            let word = self.words.get(part)?;
            if *word == NumberWord::Connector || !acc.push(*word) {
                return None;
            }
        }
        if acc.has_thousand {
            return None;
        }
        let value = acc.value();
        match acc.last {
            Some(Last::Hundred) => Some(NumberWord::Hundreds(value)),
            _ if value < 100 => Some(NumberWord::Unit(value)),
            _ => None,
        }
    }

    /// Rewrite qualifying runs of number words in a token list.
    pub fn convert(&self, tokens: &[String]) -> Vec<String> {
        let mut out = Vec::with_capacity(tokens.len());
        let mut i = 0;

        while i < tokens.len() {
            let (consumed, value) = self.longest_run(&tokens[i..]);
            let qualifies = consumed >= 2 || (consumed == 1 && value >= 20);
            if qualifies {
                let trailing = trailing_punctuation(&tokens[i + consumed - 1]);
                out.push(format!("{}{}", value, trailing));
                i += consumed;
            } else {
                out.push(tokens[i].clone());
                i += 1;
            }
        }

        out
    }

    /// Returns (tokens consumed, value). Trailing connectors are not consumed.
    fn longest_run(&self, tokens: &[String]) -> (usize, u64) {
        let mut acc = Accumulator::default();
        let mut consumed = 0;
        let mut committed = (0, 0);

        for token in tokens {
            let bare = token.trim_end_matches(is_sentence_punctuation);
            let Some(word) = self.lookup(&bare.to_lowercase()) else {
                break;
            };
            if !acc.push(word) {
                break;
            }
            consumed += 1;
            if word != NumberWord::Connector {
                committed = (consumed, acc.value());
            }
            if bare.len() != token.len() {
                break;
            }
        }

        committed
    }
}

fn trailing_punctuation(token: &str) -> &str {
    let bare = token.trim_end_matches(is_sentence_punctuation);
    &token[bare.len()..]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(locale: LocaleTag, text: &str) -> String {
        let tokens: Vec<String> = text.split_whitespace().map(String::from).collect();
        NumberLexicon::for_locale(locale).convert(&tokens).join(" ")
    }

    #[test]
    fn test_catalan_year() {
        assert_eq!(convert(LocaleTag::Ca, "el dos mil vint-i-sis"), "el 2026");
        assert_eq!(convert(LocaleTag::Ca, "mil nou-cents noranta-dos"), "1992");
        assert_eq!(convert(LocaleTag::Ca, "Dos mil vint-i-sis"), "2026");
    }

    #[test]
    fn test_spanish_year_with_connector() {
        assert_eq!(convert(LocaleTag::Es, "en dos mil veinticinco"), "en 2025");
        assert_eq!(convert(LocaleTag::Es, "treinta y dos euros"), "32 euros");
        assert_eq!(convert(LocaleTag::Es, "ciento cinco"), "105");
    }

    #[test]
    fn test_english_hundreds() {
        assert_eq!(
            convert(LocaleTag::En, "two thousand twenty-six"),
            "2026"
        );
        assert_eq!(convert(LocaleTag::En, "three hundred and five"), "305");
    }

    #[test]
    fn test_lone_small_words_untouched() {
        assert_eq!(convert(LocaleTag::Ca, "crea un nou document"), "crea un nou document");
        assert_eq!(convert(LocaleTag::En, "add one apple"), "add one apple");
    }

    #[test]
    fn test_trailing_connector_not_consumed() {
        assert_eq!(convert(LocaleTag::Es, "treinta y nada"), "30 y nada");
    }

    #[test]
    fn test_trailing_punctuation_kept() {
        assert_eq!(convert(LocaleTag::Ca, "el dos mil vint-i-sis?"), "el 2026?");
    }

    #[test]
    fn test_adjacent_units_split() {
        // "dos tres" is not a number, and each word is too small on its own
        assert_eq!(convert(LocaleTag::Ca, "dos tres"), "dos tres");
    }
}
