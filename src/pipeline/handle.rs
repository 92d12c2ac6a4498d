//! Shared access to one session
//!
//! Calls on the same handle are serialized by the session mutex. Navigating
//! away cancels whatever call is in flight and drops the pending command.

use crate::command::session::Session;
use crate::core::types::{LocaleTag, SessionId, Utterance};
use crate::pipeline::orchestrator::{Orchestrator, ResolutionOutcome};
use std::sync::{Arc, Mutex, PoisonError};
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct SessionHandle {
    session: Arc<tokio::sync::Mutex<Session>>,
    cancel: Arc<Mutex<CancellationToken>>,
    id: SessionId,
    locale: LocaleTag,
}

impl SessionHandle {
    pub fn new(locale: LocaleTag) -> Self {
        Self::from_session(Session::new(locale))
    }

    pub fn from_session(session: Session) -> Self {
        let id = session.id;
        let locale = session.locale;
        Self {
            session: Arc::new(tokio::sync::Mutex::new(session)),
            cancel: Arc::new(Mutex::new(CancellationToken::new())),
            id,
            locale,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn locale(&self) -> LocaleTag {
        self.locale
    }

    pub fn typed(&self, text: impl Into<String>) -> Utterance {
        Utterance::typed(text, self.locale)
    }

    pub fn voice(&self, text: impl Into<String>) -> Utterance {
        Utterance::voice(text, self.locale)
    }

    fn current_token(&self) -> CancellationToken {
        self.cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Resolve after any earlier call on this session has finished
    pub async fn resolve(
        &self,
        orchestrator: &Orchestrator,
        utterance: &Utterance,
    ) -> ResolutionOutcome {
        let token = self.current_token();
        let mut session = self.session.lock().await;
        if token.is_cancelled() {
            return ResolutionOutcome::Unhandled;
        }
        orchestrator
            .resolve_with_cancel(utterance, &mut session, &token)
            .await
    }

    /// Abandon the in-flight call, if any, and clear the pending command
    pub async fn navigate_away(&self) {
        {
            let mut cancel = self.cancel.lock().unwrap_or_else(PoisonError::into_inner);
            cancel.cancel();
            *cancel = CancellationToken::new();
        }

        let mut session = self.session.lock().await;
        if session.pending.take().is_some() {
            tracing::info!(session = ?self.id, "Pending command dropped on navigation");
        }
    }

    /// Run `f` against the session once no call is in flight
    pub async fn with_session<R>(&self, f: impl FnOnce(&Session) -> R) -> R {
        let session = self.session.lock().await;
        f(&session)
    }
}
