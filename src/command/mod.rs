//! Command pipeline
//!
//! Rule match -> Command -> ParameterResolver -> (question | CommandExecutor)

pub mod executor;
pub mod model;
pub mod resolver;
pub mod session;
pub mod state;

pub use executor::{ActionSink, CommandExecutor, WeatherDay};
pub use model::{slot, ActionKind, Command, CustomAction, Tier};
pub use resolver::{FillOutcome, ParameterResolver};
pub use session::{ChatMessage, Role, Session, Transcript};
pub use state::{CommandStateManager, PendingCommand};
