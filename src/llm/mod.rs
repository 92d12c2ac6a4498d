//! Chat model integration
//!
//! The model is a fallback: it only sees utterances no command rule
//! matched and that are not beyond the knowledge cutoff, and its answers
//! are screened before reaching the user.

pub mod client;
pub mod context;
pub mod fallback;
pub mod guard;
pub mod uncertainty;

pub use client::{ApiFormat, ChatBackend, LlmClient};
pub use context::{build_prompt, system_preamble, Prompt, PromptMessage, PromptRole};
pub use fallback::{AiFailure, AiFallbackClient, AiResult};
pub use guard::FutureKnowledgeGuard;
pub use uncertainty::UncertaintyScreen;
