//! The four resolution stages, in pipeline order

use crate::command::resolver::{cancel_acknowledgement, FillOutcome, ParameterResolver};
use crate::llm::fallback::{AiFailure, AiFallbackClient, AiResult};
use crate::llm::guard::FutureKnowledgeGuard;
use crate::llm::uncertainty::UncertaintyScreen;
use crate::pipeline::search;
use crate::pipeline::stage::{Stage, StageContext, StageOutcome};
use crate::pipeline::ResolutionOutcome;
use crate::rules::table::TieredRules;
use async_trait::async_trait;
use std::sync::Arc;

fn deferred(base: &str, ctx: &StageContext<'_>) -> StageOutcome {
    match search::search_url(base, &ctx.utterance.text) {
        Ok(search_url) => StageOutcome::Handled(ResolutionOutcome::Deferred { search_url }),
        Err(e) => StageOutcome::Error(e),
    }
}

/// Step 1: a pending command consumes the turn as its missing value
///
/// A reply that is itself a bare command (a trigger with its own slot
/// missing) is left to the rule stage, which replaces the pending command.
/// Anything else, complete command phrasings included, is the answer.
pub struct PendingStage {
    resolver: ParameterResolver,
    tiers: Arc<TieredRules>,
}

impl PendingStage {
    pub fn new(resolver: ParameterResolver, tiers: Arc<TieredRules>) -> Self {
        Self { resolver, tiers }
    }
}

#[async_trait]
impl Stage for PendingStage {
    fn name(&self) -> &'static str {
        "pending"
    }

    async fn run(&self, ctx: &mut StageContext<'_>) -> StageOutcome {
        if !self.resolver.state().has_active(ctx.session) {
            return StageOutcome::Unhandled;
        }

        let locale = ctx.locale();
        if let Some(bare) = self
            .tiers
            .match_command(&ctx.text, locale)
            .filter(|command| !command.is_complete())
        {
            tracing::debug!(command = %bare.name, "Bare command replaces pending question");
            return StageOutcome::Unhandled;
        }

        match self.resolver.offer(ctx.session, &ctx.text, locale) {
            Ok(FillOutcome::Filled(command)) => {
                ctx.private_turn = true;
                let outcome = self.resolver.resolve(command, ctx.session).await;
                StageOutcome::Handled(outcome)
            }
            Ok(FillOutcome::Cancelled) => StageOutcome::Handled(ResolutionOutcome::Executed {
                response: cancel_acknowledgement(locale).to_string(),
            }),
            Ok(FillOutcome::Rejected { .. }) => StageOutcome::Unhandled,
            Err(e) => StageOutcome::Error(e),
        }
    }
}

/// Step 2: rule tiers in precedence order
pub struct RuleStage {
    tiers: Arc<TieredRules>,
    resolver: ParameterResolver,
}

impl RuleStage {
    pub fn new(tiers: Arc<TieredRules>, resolver: ParameterResolver) -> Self {
        Self { tiers, resolver }
    }
}

#[async_trait]
impl Stage for RuleStage {
    fn name(&self) -> &'static str {
        "rules"
    }

    async fn run(&self, ctx: &mut StageContext<'_>) -> StageOutcome {
        let Some(command) = self.tiers.match_command(&ctx.text, ctx.locale()) else {
            return StageOutcome::Unhandled;
        };

        // A fresh match supersedes whatever was still waiting.
        self.resolver.state().cancel(ctx.session);
        let outcome = self.resolver.resolve(command, ctx.session).await;
        StageOutcome::Handled(outcome)
    }
}

/// Step 3: questions beyond the knowledge cutoff go to web search
pub struct GuardStage {
    guard: FutureKnowledgeGuard,
    search_base_url: String,
}

impl GuardStage {
    pub fn new(guard: FutureKnowledgeGuard, search_base_url: impl Into<String>) -> Self {
        Self {
            guard,
            search_base_url: search_base_url.into(),
        }
    }
}

#[async_trait]
impl Stage for GuardStage {
    fn name(&self) -> &'static str {
        "cutoff_guard"
    }

    async fn run(&self, ctx: &mut StageContext<'_>) -> StageOutcome {
        if self.guard.is_beyond_cutoff(&ctx.text, ctx.locale()) {
            tracing::info!("Question beyond knowledge cutoff, deferring to search");
            return deferred(&self.search_base_url, ctx);
        }
        StageOutcome::Unhandled
    }
}

/// Step 4: the chat model, with its answer screened for uncertainty
pub struct AiStage {
    ai: AiFallbackClient,
    screen: UncertaintyScreen,
    resolver: ParameterResolver,
    search_base_url: String,
}

impl AiStage {
    pub fn new(
        ai: AiFallbackClient,
        screen: UncertaintyScreen,
        resolver: ParameterResolver,
        search_base_url: impl Into<String>,
    ) -> Self {
        Self {
            ai,
            screen,
            resolver,
            search_base_url: search_base_url.into(),
        }
    }
}

#[async_trait]
impl Stage for AiStage {
    fn name(&self) -> &'static str {
        "ai_fallback"
    }

    async fn run(&self, ctx: &mut StageContext<'_>) -> StageOutcome {
        let locale = ctx.locale();
        if !self.ai.is_configured() {
            tracing::info!("No AI credential, deferring to search");
            return deferred(&self.search_base_url, ctx);
        }

        let history = ctx.session.transcript.ai_context();
        let result = self
            .ai
            .ask(&history, &ctx.utterance.text, locale, ctx.cancel)
            .await;

        match result {
            AiResult::Answered { text } => {
                if let Some(phrase) = self.screen.find(&text, locale) {
                    tracing::info!(phrase, "AI answer discarded as uncertain");
                    return deferred(&self.search_base_url, ctx);
                }
                ctx.answered_by_ai = true;
                StageOutcome::Handled(ResolutionOutcome::Executed { response: text })
            }
            AiResult::Failed {
                reason: AiFailure::Cancelled,
            } => {
                self.resolver.state().cancel(ctx.session);
                StageOutcome::Unhandled
            }
            AiResult::Failed {
                reason: AiFailure::Timeout,
            } => {
                self.resolver.state().cancel(ctx.session);
                deferred(&self.search_base_url, ctx)
            }
            AiResult::Failed { .. } => deferred(&self.search_base_url, ctx),
        }
    }
}
