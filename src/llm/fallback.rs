//! AI fallback for utterances no rule understood

use crate::command::session::ChatMessage;
use crate::core::config::ResolverConfig;
use crate::core::types::LocaleTag;
use crate::llm::client::ChatBackend;
use crate::llm::context::build_prompt;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Why no answer came back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiFailure {
    /// No credential, so no backend
    NotConfigured,
    Timeout,
    /// The caller abandoned the request
    Cancelled,
    Backend(String),
}

impl fmt::Display for AiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiFailure::NotConfigured => write!(f, "AI not configured"),
            AiFailure::Timeout => write!(f, "AI call timed out"),
            AiFailure::Cancelled => write!(f, "AI call cancelled"),
            AiFailure::Backend(e) => write!(f, "{}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiResult {
    Answered { text: String },
    Failed { reason: AiFailure },
}

/// Sends the conversation to the chat model under a time bound
#[derive(Clone)]
pub struct AiFallbackClient {
    backend: Option<Arc<dyn ChatBackend>>,
    timeout: Duration,
    cutoff_year: u32,
}

impl AiFallbackClient {
    pub fn new(backend: Option<Arc<dyn ChatBackend>>, timeout: Duration, cutoff_year: u32) -> Self {
        Self {
            backend,
            timeout,
            cutoff_year,
        }
    }

    pub fn from_config(config: &ResolverConfig, backend: Option<Arc<dyn ChatBackend>>) -> Self {
        Self::new(
            backend,
            Duration::from_secs(config.ai.timeout_secs),
            config.knowledge_cutoff_year,
        )
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Ask the model about `utterance` with `history` as context.
    ///
    /// Never errors: every failure is folded into [`AiResult::Failed`].
    pub async fn ask(
        &self,
        history: &[ChatMessage],
        utterance: &str,
        locale: LocaleTag,
        cancel: &CancellationToken,
    ) -> AiResult {
        let Some(backend) = &self.backend else {
            return AiResult::Failed {
                reason: AiFailure::NotConfigured,
            };
        };

        let prompt = build_prompt(history, utterance, locale, self.cutoff_year);
        tracing::debug!(messages = prompt.messages.len(), %locale, "Asking AI");

        let call = tokio::time::timeout(self.timeout, backend.complete(&prompt));
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AiFailure::Cancelled),
            result = call => match result {
                Ok(Ok(text)) => Ok(text),
                Ok(Err(e)) => Err(AiFailure::Backend(e.to_string())),
                Err(_) => Err(AiFailure::Timeout),
            },
        };

        match outcome {
            Ok(text) => AiResult::Answered { text },
            Err(reason) => {
                tracing::warn!(%reason, "AI call failed");
                AiResult::Failed { reason }
            }
        }
    }
}
