mod artifacts;
mod coordinator;
pub mod state;


use common::id_type;

pub use artifacts::Artifacts;
pub use coordinator::{Coordinator, SessionContext, SessionSettings};
pub use state::{Effect, ImageRole, SessionEvent, SessionMachine, SessionState, Transition};

id_type!(SessionId);
