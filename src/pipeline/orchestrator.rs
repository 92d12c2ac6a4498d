//! Utterance resolution
//!
//! Fixed priority, first terminal result wins:
//! 1. pending command fill
//! 2. rule tiers (enhanced, then legacy with custom commands)
//! 3. knowledge-cutoff guard
//! 4. AI fallback, or web search when no credential is configured

use crate::command::executor::{ActionSink, CommandExecutor};
use crate::command::resolver::ParameterResolver;
use crate::command::session::{ChatMessage, Session};
use crate::command::state::CommandStateManager;
use crate::core::config::{LauncherMode, ResolverConfig};
use crate::core::error::{LaiaError, Result};
use crate::core::types::{LocaleTag, Utterance};
use crate::llm::client::ChatBackend;
use crate::llm::fallback::AiFallbackClient;
use crate::llm::guard::FutureKnowledgeGuard;
use crate::llm::uncertainty::UncertaintyScreen;
use crate::pipeline::search;
use crate::pipeline::stage::{Stage, StageContext, StageOutcome};
use crate::pipeline::stages::{AiStage, GuardStage, PendingStage, RuleStage};
use crate::rules::custom::{find_conflicts, CustomCommandCache, CustomCommandRule};
use crate::rules::enhanced;
use crate::rules::legacy::LegacyTable;
use crate::rules::table::{PatternTable, TieredRules};
use crate::text::Normalizer;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// What the presentation layer should do with an utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    /// Show (and maybe speak) a confirmation or answer
    Executed { response: String },
    /// Ask the user for a missing value
    NeedsParameter { question: String },
    /// Open a web search instead of answering
    Deferred { search_url: String },
    /// Nothing to do; the call was abandoned or the input was blank
    Unhandled,
}

/// Text-to-speech collaborator
#[async_trait]
pub trait Speaker: Send + Sync {
    async fn speak(&self, text: &str, locale: LocaleTag);
}

pub struct Orchestrator {
    config: ResolverConfig,
    normalizer: Normalizer,
    state: CommandStateManager,
    stages: Vec<Box<dyn Stage>>,
    custom: Arc<CustomCommandCache>,
    enhanced: Arc<PatternTable>,
    legacy: Arc<PatternTable>,
    speaker: Option<Arc<dyn Speaker>>,
}

impl Orchestrator {
    /// Build the pipeline. `backend` is `None` when no AI credential exists.
    pub fn new(
        config: ResolverConfig,
        sink: Arc<dyn ActionSink>,
        backend: Option<Arc<dyn ChatBackend>>,
    ) -> Result<Self> {
        config.validate().map_err(LaiaError::ConfigError)?;

        let custom = Arc::new(CustomCommandCache::new());
        let skipped = custom.replace(&config.custom_commands);
        if !skipped.is_empty() {
            tracing::warn!(?skipped, "Some custom commands were not loaded");
        }

        let enhanced = Arc::new(enhanced::table()?);
        let legacy_table = LegacyTable::new(Arc::clone(&custom))?;
        let legacy = legacy_table.builtin();

        let mut tiers = TieredRules::new().push(Arc::clone(&enhanced));
        if config.launcher_mode == LauncherMode::Advanced {
            tiers = tiers.push(legacy_table);
        }
        let tiers = Arc::new(tiers);

        let state = CommandStateManager::new(config.pending_expiry);
        let executor = CommandExecutor::new(
            sink,
            config.search_base_url.clone(),
            config.weather_location.clone(),
        );
        let resolver = ParameterResolver::new(state, executor);
        let has_ai = backend.is_some();
        let ai = AiFallbackClient::from_config(&config, backend);

        let stages: Vec<Box<dyn Stage>> = vec![
            Box::new(PendingStage::new(resolver.clone(), Arc::clone(&tiers))),
            Box::new(RuleStage::new(tiers, resolver.clone())),
            Box::new(GuardStage::new(
                FutureKnowledgeGuard::from_config(&config),
                config.search_base_url.clone(),
            )),
            Box::new(AiStage::new(
                ai,
                UncertaintyScreen::from_config(&config),
                resolver,
                config.search_base_url.clone(),
            )),
        ];

        tracing::info!(
            mode = ?config.launcher_mode,
            ai = if has_ai { "configured" } else { "search only" },
            "Resolver ready"
        );

        Ok(Self {
            config,
            normalizer: Normalizer::new(),
            state,
            stages,
            custom,
            enhanced,
            legacy,
            speaker: None,
        })
    }

    pub fn with_speaker(mut self, speaker: Arc<dyn Speaker>) -> Self {
        self.speaker = Some(speaker);
        self
    }

    /// Swap in an edited custom command list. Returns the skipped names.
    pub fn set_custom_commands(&self, rules: &[CustomCommandRule]) -> Vec<String> {
        self.custom.replace(rules)
    }

    /// Built-in phrases a custom pattern would shadow or be shadowed by
    pub fn find_conflicts(&self, pattern: &str, locale: LocaleTag) -> Result<Vec<String>> {
        let mut conflicts = find_conflicts(pattern, self.enhanced.rules(locale))?;
        conflicts.extend(find_conflicts(pattern, self.legacy.rules(locale))?);
        Ok(conflicts)
    }

    /// Text used for matching. Only voice input is normalized.
    pub fn matching_text(&self, utterance: &Utterance) -> String {
        if utterance.is_voice() {
            self.normalizer.normalize(&utterance.text, utterance.locale)
        } else {
            utterance.text.trim().to_string()
        }
    }

    pub async fn resolve(&self, utterance: &Utterance, session: &mut Session) -> ResolutionOutcome {
        self.resolve_with_cancel(utterance, session, &CancellationToken::new())
            .await
    }

    /// Resolve one utterance. Never fails; errors become web-search hand-offs.
    pub async fn resolve_with_cancel(
        &self,
        utterance: &Utterance,
        session: &mut Session,
        cancel: &CancellationToken,
    ) -> ResolutionOutcome {
        let text = self.matching_text(utterance);
        if text.is_empty() {
            return ResolutionOutcome::Unhandled;
        }

        session.advance_turn();
        self.state.expire_stale(session);

        let mut ctx = StageContext::new(utterance, text, session, cancel);
        let mut outcome = ResolutionOutcome::Unhandled;

        for stage in &self.stages {
            match stage.run(&mut ctx).await {
                StageOutcome::Handled(result) => {
                    tracing::debug!(stage = stage.name(), "Stage handled utterance");
                    outcome = result;
                    break;
                }
                StageOutcome::Unhandled => {
                    tracing::debug!(stage = stage.name(), "Stage passed");
                }
                StageOutcome::Error(e) => {
                    tracing::warn!(stage = stage.name(), error = %e, "Stage failed, deferring");
                    outcome = self.defer(&utterance.text);
                    break;
                }
            }
        }

        let private_turn = ctx.private_turn;
        let answered_by_ai = ctx.answered_by_ai;
        drop(ctx);

        record(session, utterance, &outcome, private_turn, answered_by_ai);
        self.speak(utterance, &outcome).await;
        outcome
    }

    fn defer(&self, raw: &str) -> ResolutionOutcome {
        match search::search_url(&self.config.search_base_url, raw) {
            Ok(search_url) => ResolutionOutcome::Deferred { search_url },
            Err(e) => {
                tracing::warn!(error = %e, "Could not build search URL");
                ResolutionOutcome::Unhandled
            }
        }
    }

    async fn speak(&self, utterance: &Utterance, outcome: &ResolutionOutcome) {
        let ResolutionOutcome::Executed { response } = outcome else {
            return;
        };
        if !(self.config.voice_response && utterance.is_voice()) {
            return;
        }
        if let Some(speaker) = &self.speaker {
            speaker.speak(response, utterance.locale).await;
        }
    }
}

/// Append the turn to the transcript. Deferred and unhandled turns leave
/// no trace.
fn record(
    session: &mut Session,
    utterance: &Utterance,
    outcome: &ResolutionOutcome,
    private_turn: bool,
    answered_by_ai: bool,
) {
    let reply = match outcome {
        ResolutionOutcome::Executed { response } if answered_by_ai => ChatMessage::assistant(response),
        ResolutionOutcome::Executed { response } => ChatMessage::assistant(response).feedback(),
        ResolutionOutcome::NeedsParameter { question } => ChatMessage::assistant(question).feedback(),
        ResolutionOutcome::Deferred { .. } | ResolutionOutcome::Unhandled => return,
    };

    let user = ChatMessage::user(utterance.text.clone());
    if private_turn {
        session.transcript.push(user.private());
        session.transcript.push(reply.private());
    } else {
        session.transcript.push(user);
        session.transcript.push(reply);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_string(&ResolutionOutcome::Deferred {
            search_url: "https://www.google.com/search?q=x".into(),
        })
        .unwrap();
        assert_eq!(
            json,
            r#"{"kind":"deferred","search_url":"https://www.google.com/search?q=x"}"#
        );
    }

    #[test]
    fn test_deferred_turn_not_recorded() {
        let mut session = Session::new(LocaleTag::Ca);
        let utterance = Utterance::typed("què ha passat el 2026", LocaleTag::Ca);
        let outcome = ResolutionOutcome::Deferred {
            search_url: "https://www.google.com/search?q=x".into(),
        };
        record(&mut session, &utterance, &outcome, false, false);
        assert!(session.transcript.is_empty());
    }

    #[test]
    fn test_private_fill_recorded_private() {
        let mut session = Session::new(LocaleTag::Ca);
        let utterance = Utterance::typed("compra llet", LocaleTag::Ca);
        let outcome = ResolutionOutcome::Executed {
            response: "Nota creada: compra llet".into(),
        };
        record(&mut session, &utterance, &outcome, true, false);
        assert_eq!(session.transcript.len(), 2);
        assert!(session.transcript.ai_context().is_empty());
    }
}
