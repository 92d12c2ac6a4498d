//! Resolution pipeline: ordered stages behind a single `resolve` call

pub mod handle;
pub mod orchestrator;
pub mod search;
pub mod stage;
pub mod stages;

pub use handle::SessionHandle;
pub use orchestrator::{Orchestrator, ResolutionOutcome, Speaker};
pub use stage::{Stage, StageContext, StageOutcome};
