//! Command rules: enhanced and legacy tiers plus user-authored commands

pub mod custom;
pub mod enhanced;
pub mod legacy;
mod loader;
pub mod table;

pub use custom::{find_conflicts, CompiledCustomRules, CustomCommandCache, CustomCommandRule};
pub use legacy::LegacyTable;
pub use loader::{deserialize_custom_commands, load_custom_commands, parse_custom_commands};
pub use table::{PatternRule, PatternTable, RuleTable, TieredRules};
