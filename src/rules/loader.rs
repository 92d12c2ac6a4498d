//! Load custom commands from TOML files
//!
//! ```toml
//! [[custom_commands]]
//! name = "Ràdio"
//! pattern = "^posa la ràdio$"
//! action = "open_url"
//! action_data = "https://www.ccma.cat/catradio/directe/"
//! enabled = true
//! ```

use crate::core::error::Result;
use crate::rules::custom::CustomCommandRule;
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::Path;

#[derive(Deserialize)]
struct CommandsFile {
    #[serde(default, deserialize_with = "deserialize_custom_commands")]
    custom_commands: Vec<CustomCommandRule>,
}

/// Load custom commands from a settings file. A missing file means none.
pub fn load_custom_commands(path: &Path) -> Result<Vec<CustomCommandRule>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)?;
    parse_custom_commands(&content)
}

/// Parse `[[custom_commands]]` entries.
///
/// Malformed entries are skipped with a warning; only a document that is
/// not TOML at all is an error.
pub fn parse_custom_commands(content: &str) -> Result<Vec<CustomCommandRule>> {
    let file: CommandsFile = toml::from_str(content)?;
    Ok(file.custom_commands)
}

/// Lenient `custom_commands` array: each entry is deserialized and
/// validated on its own, and bad entries are dropped instead of failing
/// the whole document. Shared by settings files and the resolver config.
pub fn deserialize_custom_commands<'de, D>(
    deserializer: D,
) -> std::result::Result<Vec<CustomCommandRule>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Vec::<toml::Value>::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match accept_entry(entry) {
            Ok(rule) => Some(rule),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping custom command entry");
                None
            }
        })
        .collect())
}

fn accept_entry(entry: toml::Value) -> Result<CustomCommandRule> {
    let rule = entry.try_into::<CustomCommandRule>()?;
    rule.validate()?;
    Ok(rule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::model::CustomAction;
    use crate::core::error::LaiaError;

    #[test]
    fn test_parse_custom_commands() {
        let toml = r#"
            [[custom_commands]]
            name = "Ràdio"
            pattern = "^posa la ràdio$"
            action = "open_url"
            action_data = "https://www.ccma.cat/catradio/directe/"

            [[custom_commands]]
            name = "Spotify"
            pattern = "^música$"
            action = "open_app"
            action_data = "com.spotify.music"
            enabled = false
        "#;

        let rules = parse_custom_commands(toml).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].action, CustomAction::OpenUrl);
        assert!(rules[0].enabled);
        assert!(!rules[1].enabled);
    }

    #[test]
    fn test_malformed_entries_skipped() {
        let toml = r#"
            [[custom_commands]]
            name = "no pattern"
            action = "open_url"
            action_data = "https://example.com"

            [[custom_commands]]
            name = "bad regex"
            pattern = "([unclosed"
            action = "open_url"
            action_data = "https://example.com"

            [[custom_commands]]
            name = "unknown action"
            pattern = "^x$"
            action = "teleport"
            action_data = "somewhere"

            [[custom_commands]]
            name = "ok"
            pattern = "^cerca (.+) a la viquipèdia$"
            action = "search"
            action_data = "https://ca.wikipedia.org/w/index.php?search="
        "#;

        let rules = parse_custom_commands(toml).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "ok");
    }

    #[test]
    fn test_missing_action_data_skipped() {
        let toml = r#"
            [[custom_commands]]
            name = "buida"
            pattern = "^res$"
            action = "open_url"
        "#;
        assert!(parse_custom_commands(toml).unwrap().is_empty());
    }

    #[test]
    fn test_document_without_commands() {
        assert!(parse_custom_commands("title = \"x\"").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(matches!(
            parse_custom_commands("[[custom_commands"),
            Err(LaiaError::TomlError(_))
        ));
    }

    #[test]
    fn test_missing_file_means_no_commands() {
        let rules = load_custom_commands(Path::new("/nonexistent/laia/commands.toml")).unwrap();
        assert!(rules.is_empty());
    }
}
