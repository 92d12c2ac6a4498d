//! Enhanced tier: slot-aware rules consulted first
//!
//! Order matters. URL rules precede app rules ("obre google.com" is a web
//! page, not an app) and tomorrow-weather precedes today-weather.

use crate::command::model::{slot, ActionKind, Tier};
use crate::core::error::Result;
use crate::core::types::LocaleTag;
use crate::rules::table::{PatternRule, PatternTable};

/// Host-like token: letters, digits, dots and dashes ending in a TLD
const URL: &str = r"(?P<url>[\w.-]+\.[a-z]{2,}(?:/\S*)?)";

pub fn table() -> Result<PatternTable> {
    Ok(PatternTable::new(Tier::Enhanced)
        .with_locale(LocaleTag::Ca, catalan()?)
        .with_locale(LocaleTag::Es, spanish()?)
        .with_locale(LocaleTag::En, english()?))
}

fn catalan() -> Result<Vec<PatternRule>> {
    Ok(vec![
        PatternRule::new(
            "url.open",
            "obre la web exemple.cat",
            &format!(r"^(?:obre|ves a)(?:\s+la\s+(?:web|pàgina))?\s+{URL}$"),
            ActionKind::OpenUrl,
        )?
        .required(slot::URL),
        PatternRule::new(
            "tag.run",
            "executa l'etiqueta feina",
            r"^(?:executa|activa)\s+(?:l'etiqueta|etiqueta)(?:\s+(?P<tag>.+))?$",
            ActionKind::RunTag,
        )?
        .required(slot::TAG),
        PatternRule::new(
            "list.add",
            "afegeix pa a la llista de la compra",
            r"^afegeix(?:\s+(?P<item>.+?))?(?:\s+a\s+la\s+llista(?:\s+(?:de\s+)?(?P<list>.+))?)?$",
            ActionKind::AddToList,
        )?
        .required(slot::ITEM)
        .optional(slot::LIST),
        PatternRule::new(
            "list.create",
            "crea una llista de la compra",
            r"^crea(?:\s+una\s+llista)?(?:\s+(?:de|anomenada))?(?:\s+(?P<name>.+))?$",
            ActionKind::CreateList,
        )?
        .required(slot::NAME),
        PatternRule::new(
            "text.insert",
            "insereix trucar al metge",
            r"^insereix(?:\s+(?P<text>.+))?$",
            ActionKind::InsertText,
        )?
        .required(slot::TEXT),
        PatternRule::new(
            "note.create",
            "apunta compra llet",
            r"^(?:apunta|anota|pren nota)(?:[:,]?\s+(?P<content>.+))?$",
            ActionKind::CreateNote,
        )?
        .required(slot::CONTENT),
        PatternRule::new(
            "weather.tomorrow",
            "quin temps farà demà",
            r"^quin\s+temps\s+(?:farà(?:\s+demà)?|fa\s+demà)$",
            ActionKind::Weather,
        )?
        .fixed(slot::WHEN, "tomorrow"),
        PatternRule::new(
            "weather.today",
            "quin temps fa",
            r"^quin\s+temps\s+fa(?:\s+avui)?$",
            ActionKind::Weather,
        )?
        .fixed(slot::WHEN, "today"),
        PatternRule::new(
            "search.web",
            "cerca receptes de canelons",
            r"^(?:cerca|busca)(?:\s+(?P<query>.+))?$",
            ActionKind::WebSearch,
        )?
        .required(slot::QUERY),
        PatternRule::new(
            "contact.call",
            "truca a la mare",
            r"^truca(?:\s+a)?(?:\s+(?P<contact>.+))?$",
            ActionKind::Call,
        )?
        .required(slot::CONTACT),
        PatternRule::new(
            "app.open",
            "obre whatsapp",
            r"^obre(?:\s+l'(?:app|aplicació))?(?:\s+(?P<app>.+))?$",
            ActionKind::OpenApp,
        )?
        .required(slot::APP),
    ])
}

fn spanish() -> Result<Vec<PatternRule>> {
    Ok(vec![
        PatternRule::new(
            "url.open",
            "abre la web ejemplo.es",
            &format!(r"^(?:abre|ve a)(?:\s+la\s+(?:web|página))?\s+{URL}$"),
            ActionKind::OpenUrl,
        )?
        .required(slot::URL),
        PatternRule::new(
            "tag.run",
            "ejecuta la etiqueta trabajo",
            r"^(?:ejecuta|activa)\s+(?:la\s+)?etiqueta(?:\s+(?P<tag>.+))?$",
            ActionKind::RunTag,
        )?
        .required(slot::TAG),
        PatternRule::new(
            "list.add",
            "añade pan a la lista de la compra",
            r"^añade(?:\s+(?P<item>.+?))?(?:\s+a\s+la\s+lista(?:\s+(?:de\s+)?(?P<list>.+))?)?$",
            ActionKind::AddToList,
        )?
        .required(slot::ITEM)
        .optional(slot::LIST),
        PatternRule::new(
            "list.create",
            "crea una lista de la compra",
            r"^crea(?:\s+una\s+lista)?(?:\s+(?:de|llamada))?(?:\s+(?P<name>.+))?$",
            ActionKind::CreateList,
        )?
        .required(slot::NAME),
        PatternRule::new(
            "text.insert",
            "inserta llamar al médico",
            r"^inserta(?:\s+(?P<text>.+))?$",
            ActionKind::InsertText,
        )?
        .required(slot::TEXT),
        PatternRule::new(
            "note.create",
            "apunta comprar leche",
            r"^(?:apunta|anota|toma nota)(?:[:,]?\s+(?P<content>.+))?$",
            ActionKind::CreateNote,
        )?
        .required(slot::CONTENT),
        PatternRule::new(
            "weather.tomorrow",
            "qué tiempo hará mañana",
            r"^qu[eé]\s+tiempo\s+(?:hará(?:\s+mañana)?|hace\s+mañana)$",
            ActionKind::Weather,
        )?
        .fixed(slot::WHEN, "tomorrow"),
        PatternRule::new(
            "weather.today",
            "qué tiempo hace",
            r"^qu[eé]\s+tiempo\s+hace(?:\s+hoy)?$",
            ActionKind::Weather,
        )?
        .fixed(slot::WHEN, "today"),
        PatternRule::new(
            "search.web",
            "busca recetas de paella",
            r"^busca(?:\s+(?P<query>.+))?$",
            ActionKind::WebSearch,
        )?
        .required(slot::QUERY),
        PatternRule::new(
            "contact.call",
            "llama a mamá",
            r"^llama(?:\s+a)?(?:\s+(?P<contact>.+))?$",
            ActionKind::Call,
        )?
        .required(slot::CONTACT),
        PatternRule::new(
            "app.open",
            "abre whatsapp",
            r"^abre(?:\s+la\s+(?:app|aplicación))?(?:\s+(?P<app>.+))?$",
            ActionKind::OpenApp,
        )?
        .required(slot::APP),
    ])
}

fn english() -> Result<Vec<PatternRule>> {
    Ok(vec![
        PatternRule::new(
            "url.open",
            "open the website example.com",
            &format!(r"^(?:open|go to)(?:\s+the\s+(?:website|page))?\s+{URL}$"),
            ActionKind::OpenUrl,
        )?
        .required(slot::URL),
        PatternRule::new(
            "tag.run",
            "run the tag work",
            r"^run(?:\s+the)?\s+tag(?:\s+(?P<tag>.+))?$",
            ActionKind::RunTag,
        )?
        .required(slot::TAG),
        PatternRule::new(
            "list.add",
            "add bread to the list groceries",
            r"^add(?:\s+(?P<item>.+?))?(?:\s+to\s+(?:the\s+|my\s+)?list(?:\s+(?P<list>.+))?)?$",
            ActionKind::AddToList,
        )?
        .required(slot::ITEM)
        .optional(slot::LIST),
        PatternRule::new(
            "list.create",
            "create a list called groceries",
            r"^create(?:\s+a)?(?:\s+list)?(?:\s+(?:called|named))?(?:\s+(?P<name>.+))?$",
            ActionKind::CreateList,
        )?
        .required(slot::NAME),
        PatternRule::new(
            "text.insert",
            "insert call the doctor",
            r"^insert(?:\s+(?P<text>.+))?$",
            ActionKind::InsertText,
        )?
        .required(slot::TEXT),
        PatternRule::new(
            "note.create",
            "note buy milk",
            r"^(?:note|write down|take a note)(?:[:,]?\s+(?P<content>.+))?$",
            ActionKind::CreateNote,
        )?
        .required(slot::CONTENT),
        PatternRule::new(
            "weather.tomorrow",
            "what's the weather tomorrow",
            r"^(?:what(?:'s|\s+is|\s+will)|how(?:'s|\s+is))\s+the\s+weather\b.*\btomorrow$",
            ActionKind::Weather,
        )?
        .fixed(slot::WHEN, "tomorrow"),
        PatternRule::new(
            "weather.today",
            "what's the weather",
            r"^(?:what(?:'s|\s+is)|how(?:'s|\s+is))\s+the\s+weather(?:\s+like)?(?:\s+today)?$",
            ActionKind::Weather,
        )?
        .fixed(slot::WHEN, "today"),
        PatternRule::new(
            "search.web",
            "search for pasta recipes",
            r"^(?:search(?:\s+for)?|look\s+up|google)(?:\s+(?P<query>.+))?$",
            ActionKind::WebSearch,
        )?
        .required(slot::QUERY),
        PatternRule::new(
            "contact.call",
            "call mom",
            r"^call(?:\s+(?P<contact>.+))?$",
            ActionKind::Call,
        )?
        .required(slot::CONTACT),
        PatternRule::new(
            "app.open",
            "open whatsapp",
            r"^open(?:\s+the)?(?:\s+app)?(?:\s+(?P<app>.+))?$",
            ActionKind::OpenApp,
        )?
        .required(slot::APP),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::table::RuleTable;

    fn matched(text: &str, locale: LocaleTag) -> crate::command::model::Command {
        table()
            .unwrap()
            .match_command(text, locale)
            .unwrap_or_else(|| panic!("no rule matched {:?}", text))
    }

    #[test]
    fn test_bare_note_verb_is_incomplete() {
        let cmd = matched("apunta", LocaleTag::Ca);
        assert_eq!(cmd.action, ActionKind::CreateNote);
        assert_eq!(cmd.missing_slot(), Some(slot::CONTENT));
    }

    #[test]
    fn test_note_with_content() {
        let cmd = matched("apunta: compra llet", LocaleTag::Ca);
        assert_eq!(cmd.slot(slot::CONTENT), Some("compra llet"));
    }

    #[test]
    fn test_list_add_with_list_name() {
        let cmd = matched("afegeix pa a la llista de la compra", LocaleTag::Ca);
        assert_eq!(cmd.action, ActionKind::AddToList);
        assert_eq!(cmd.slot(slot::ITEM), Some("pa"));
        assert_eq!(cmd.slot(slot::LIST), Some("la compra"));

        let cmd = matched("add eggs to my list groceries", LocaleTag::En);
        assert_eq!(cmd.slot(slot::ITEM), Some("eggs"));
        assert_eq!(cmd.slot(slot::LIST), Some("groceries"));
    }

    #[test]
    fn test_list_add_without_list_is_complete() {
        let cmd = matched("añade pan", LocaleTag::Es);
        assert_eq!(cmd.slot(slot::ITEM), Some("pan"));
        assert!(cmd.is_complete());
    }

    #[test]
    fn test_url_rule_precedes_app_rule() {
        let cmd = matched("obre viquipedia.org", LocaleTag::Ca);
        assert_eq!(cmd.action, ActionKind::OpenUrl);
        assert_eq!(cmd.slot(slot::URL), Some("viquipedia.org"));

        let cmd = matched("obre whatsapp", LocaleTag::Ca);
        assert_eq!(cmd.action, ActionKind::OpenApp);
        assert_eq!(cmd.slot(slot::APP), Some("whatsapp"));
    }

    #[test]
    fn test_weather_variants() {
        assert_eq!(matched("quin temps fa", LocaleTag::Ca).slot(slot::WHEN), Some("today"));
        assert_eq!(matched("Quin temps farà demà", LocaleTag::Ca).slot(slot::WHEN), Some("tomorrow"));
        assert_eq!(matched("qué tiempo hace", LocaleTag::Es).slot(slot::WHEN), Some("today"));
        assert_eq!(matched("what's the weather", LocaleTag::En).slot(slot::WHEN), Some("today"));
        assert_eq!(
            matched("what will the weather be like tomorrow", LocaleTag::En).slot(slot::WHEN),
            Some("tomorrow")
        );
    }

    #[test]
    fn test_create_list_strips_article() {
        let cmd = matched("crea una llista de vacances", LocaleTag::Ca);
        assert_eq!(cmd.slot(slot::NAME), Some("vacances"));
        assert_eq!(matched("crea", LocaleTag::Ca).missing_slot(), Some(slot::NAME));
    }

    #[test]
    fn test_verb_prefix_is_not_enough() {
        let t = table().unwrap();
        assert!(t.match_command("crear un compte", LocaleTag::Ca).is_none());
        assert!(t.match_command("apuntaré més tard", LocaleTag::Ca).is_none());
        assert!(t.match_command("random question", LocaleTag::En).is_none());
    }

    #[test]
    fn test_rule_order_is_stable() {
        let a = table().unwrap();
        let b = table().unwrap();
        for locale in LocaleTag::ALL {
            let ids_a: Vec<_> = a.rules(locale).iter().map(|r| r.id).collect();
            let ids_b: Vec<_> = b.rules(locale).iter().map(|r| r.id).collect();
            assert_eq!(ids_a, ids_b);
            assert!(!ids_a.is_empty());
        }
    }
}
