//! Pure session transitions.
//!
//! [`SessionMachine::step`] maps the current state and one event to the next
//! state plus the effects the coordinator has to carry out. It performs no I/O.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use bytes::Bytes;

use crate::error::SessionError;
use crate::messages;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    WaitingFront,
    WaitingBack {
        front: PathBuf,
    },
    /// Both images stored, compositor running. Messages and the deadline are
    /// not observed in this state.
    Composing {
        front: PathBuf,
        back: PathBuf,
    },
    Finished,
    Cancelled,
    TimedOut,
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Finished
                | SessionState::Cancelled
                | SessionState::TimedOut
                | SessionState::Failed
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::WaitingFront => "waiting_front",
            SessionState::WaitingBack { .. } => "waiting_back",
            SessionState::Composing { .. } => "composing",
            SessionState::Finished => "finished",
            SessionState::Cancelled => "cancelled",
            SessionState::TimedOut => "timed_out",
            SessionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Which of the two inputs an image becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ImageRole {
    Front,
    Back,
}

#[derive(Debug)]
pub enum SessionEvent {
    /// The user sent the cancel keyword.
    Cancel,
    /// The user sent something other than exactly one image.
    NotAnImage,
    /// The user sent one image, not yet fetched.
    ImageReceived { url: String },
    /// The requested image was fetched, decoded and persisted at this path.
    ImageStored(PathBuf),
    /// The compositor produced this PNG.
    Composed(Bytes),
    Failed(SessionError),
    DeadlineElapsed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Reply(String),
    /// Start a fresh deadline of the session timeout.
    ArmDeadline,
    Fetch { url: String, role: ImageRole },
    Compose { front: PathBuf, back: PathBuf },
    SendImage(Bytes),
    /// Delete every artifact the session created.
    Cleanup,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: SessionState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn new(state: SessionState, effects: Vec<Effect>) -> Self {
        Self { state, effects }
    }

    fn stay(state: SessionState) -> Self {
        Self::new(state, Vec::new())
    }

    fn terminal(state: SessionState, reply: &str) -> Self {
        debug_assert!(state.is_terminal());
        Self::new(state, vec![Effect::Reply(reply.to_string()), Effect::Cleanup])
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SessionMachine {
    timeout: Duration,
}

impl SessionMachine {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Entry into `WaitingFront`.
    pub fn start(&self) -> Transition {
        Transition::new(
            SessionState::WaitingFront,
            vec![
                Effect::Reply(messages::front_prompt(self.timeout)),
                Effect::ArmDeadline,
            ],
        )
    }

    pub fn step(&self, state: SessionState, event: SessionEvent) -> Transition {
        if state.is_terminal() {
            return Transition::stay(state);
        }

        match (state, event) {
            (_, SessionEvent::Failed(err)) => {
                Transition::terminal(SessionState::Failed, err.user_message())
            }

            (SessionState::Composing { .. }, SessionEvent::Composed(png)) => Transition::new(
                SessionState::Finished,
                vec![
                    Effect::Reply(messages::FINISHED.to_string()),
                    Effect::SendImage(png),
                    Effect::Cleanup,
                ],
            ),
            // Nothing but the compositor result moves a composing session.
            (state @ SessionState::Composing { .. }, _) => Transition::stay(state),

            (_, SessionEvent::Cancel) => {
                Transition::terminal(SessionState::Cancelled, messages::CANCELLED)
            }
            (_, SessionEvent::DeadlineElapsed) => {
                Transition::terminal(SessionState::TimedOut, SessionError::Timeout.user_message())
            }
            (state, SessionEvent::NotAnImage) => Transition::new(
                state,
                vec![Effect::Reply(
                    SessionError::InvalidInput.user_message().to_string(),
                )],
            ),

            (SessionState::WaitingFront, SessionEvent::ImageReceived { url }) => Transition::new(
                SessionState::WaitingFront,
                vec![Effect::Fetch {
                    url,
                    role: ImageRole::Front,
                }],
            ),
            (SessionState::WaitingFront, SessionEvent::ImageStored(front)) => Transition::new(
                SessionState::WaitingBack { front },
                vec![
                    Effect::Reply(messages::FRONT_RECEIVED.to_string()),
                    Effect::ArmDeadline,
                ],
            ),

            (state @ SessionState::WaitingBack { .. }, SessionEvent::ImageReceived { url }) => {
                Transition::new(
                    state,
                    vec![Effect::Fetch {
                        url,
                        role: ImageRole::Back,
                    }],
                )
            }
            (SessionState::WaitingBack { front }, SessionEvent::ImageStored(back)) => {
                Transition::new(
                    SessionState::Composing {
                        front: front.clone(),
                        back: back.clone(),
                    },
                    vec![
                        Effect::Reply(messages::BACK_RECEIVED.to_string()),
                        Effect::Compose { front, back },
                    ],
                )
            }

            (_, SessionEvent::Composed(_)) => Transition::terminal(
                SessionState::Failed,
                SessionError::Unexpected("composite without a pending composition".into())
                    .user_message(),
            ),

            (state, event) => {
                tracing::error!(%state, ?event, "event does not apply to state");
                Transition::terminal(SessionState::Failed, messages::UNEXPECTED)
            }
        }
    }
}
