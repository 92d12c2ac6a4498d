//! Resolver stages
//!
//! The orchestrator runs an ordered list of stages. Each stage either
//! settles the utterance, passes it on, or fails; a failure never reaches
//! the caller.

use crate::command::session::Session;
use crate::core::error::LaiaError;
use crate::core::types::{LocaleTag, Utterance};
use crate::pipeline::ResolutionOutcome;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Result of one stage
#[derive(Debug)]
pub enum StageOutcome {
    /// Terminal: this outcome goes to the caller
    Handled(ResolutionOutcome),
    /// Try the next stage with the same utterance
    Unhandled,
    Error(LaiaError),
}

/// Per-call state shared by the stages
pub struct StageContext<'a> {
    pub utterance: &'a Utterance,
    /// Text used for matching; normalized for voice input
    pub text: String,
    pub session: &'a mut Session,
    pub cancel: &'a CancellationToken,
    /// The user turn answered a clarifying question
    pub private_turn: bool,
    /// The outcome text came from the chat model
    pub answered_by_ai: bool,
}

impl<'a> StageContext<'a> {
    pub fn new(
        utterance: &'a Utterance,
        text: String,
        session: &'a mut Session,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            utterance,
            text,
            session,
            cancel,
            private_turn: false,
            answered_by_ai: false,
        }
    }

    pub fn locale(&self) -> LocaleTag {
        self.utterance.locale
    }
}

#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, ctx: &mut StageContext<'_>) -> StageOutcome;
}
