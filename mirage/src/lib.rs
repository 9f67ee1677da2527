pub mod command;
pub mod config;
pub mod console;
pub mod error;
pub mod fetch;
pub mod messages;
pub mod service;
pub mod session;
pub mod transport;

pub use config::Config;
pub use error::{FetchError, SessionError};
pub use service::{Dispatch, MirageService};
pub use transport::{IncomingMessage, Reply, Transport, UserId};
