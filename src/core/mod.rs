pub mod config;
pub mod error;
pub mod types;

pub use config::{AiSettings, LauncherMode, PendingExpiry, ResolverConfig};
pub use error::{LaiaError, Result};
pub use types::{LocaleTag, Origin, SessionId, Turn, Utterance};
