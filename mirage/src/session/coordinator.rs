use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use imaginarium::{Composite, Image, Mirage, MirageMode};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};

use super::artifacts::Artifacts;
use super::state::{Effect, ImageRole, SessionEvent, SessionMachine, SessionState};
use super::SessionId;
use crate::config::Config;
use crate::error::{SessionError, SessionResult};
use crate::fetch::ImageFetcher;
use crate::transport::{IncomingMessage, Reply, Transport, UserId};

/// Per-session knobs, fixed when the session starts.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub timeout: Duration,
    pub max_image_bytes: u64,
    pub temp_dir: PathBuf,
    pub mirage: Mirage,
}

impl SessionSettings {
    pub fn from_config(config: &Config, mode: MirageMode) -> Self {
        Self {
            timeout: config.timeout_duration(),
            max_image_bytes: config.max_image_bytes(),
            temp_dir: config.temp_dir.clone(),
            mirage: config.mirage(mode),
        }
    }
}

/// Collaborators shared by all sessions.
#[derive(Clone)]
pub struct SessionContext {
    pub fetcher: Arc<dyn ImageFetcher>,
    pub transport: Arc<dyn Transport>,
}

/// Runs one session: feeds events into the [`SessionMachine`] and carries out its effects.
pub struct Coordinator {
    id: SessionId,
    user: UserId,
    settings: SessionSettings,
    machine: SessionMachine,
    context: SessionContext,
    artifacts: Artifacts,
    deadline: Instant,
}

impl Coordinator {
    pub fn new(
        id: SessionId,
        user: UserId,
        settings: SessionSettings,
        context: SessionContext,
    ) -> Self {
        Self {
            id,
            user,
            machine: SessionMachine::new(settings.timeout),
            artifacts: Artifacts::new(settings.temp_dir.clone(), id),
            deadline: Instant::now() + settings.timeout,
            settings,
            context,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Drives the session to a terminal state and returns it.
    ///
    /// Messages are taken from `inbox` strictly in arrival order. A closed
    /// inbox fails the session.
    pub async fn run(self, inbox: UnboundedReceiver<IncomingMessage>) -> SessionState {
        let span = info_span!(
            "session",
            id = %self.id.short(),
            user = %self.user,
            mode = %self.settings.mirage.mode(),
        );
        self.run_inner(inbox).instrument(span).await
    }

    async fn run_inner(mut self, mut inbox: UnboundedReceiver<IncomingMessage>) -> SessionState {
        info!("session started");

        let start = self.machine.start();
        let mut state = start.state;
        let mut pending: VecDeque<Effect> = start.effects.into();

        loop {
            while let Some(effect) = pending.pop_front() {
                if let Some(event) = self.execute(effect).await {
                    let transition = self.machine.step(state, event);
                    state = transition.state;
                    pending.extend(transition.effects);
                }
            }

            if state.is_terminal() {
                break;
            }

            let event = tokio::select! {
                biased;
                message = inbox.recv() => match message {
                    Some(message) => classify(&message),
                    None => SessionEvent::Failed(SessionError::Unexpected(
                        "session inbox closed".to_string(),
                    )),
                },
                _ = tokio::time::sleep_until(self.deadline) => SessionEvent::DeadlineElapsed,
            };

            debug!(%state, ?event, "event");
            let transition = self.machine.step(state, event);
            state = transition.state;
            pending.extend(transition.effects);
        }

        info!(%state, "session ended");
        state
    }

    async fn execute(&mut self, effect: Effect) -> Option<SessionEvent> {
        match effect {
            Effect::Reply(text) => {
                self.send(Reply::Text(text)).await;
                None
            }
            Effect::ArmDeadline => {
                self.deadline = Instant::now() + self.settings.timeout;
                None
            }
            Effect::Fetch { url, role } => match self.store_image(&url, role).await {
                Ok(path) => Some(SessionEvent::ImageStored(path)),
                Err(err) => {
                    warn!(%role, url = %url, error = %err, "failed to receive image");
                    Some(SessionEvent::Failed(err))
                }
            },
            Effect::Compose { front, back } => match self.compose(front, back).await {
                Ok(png) => Some(SessionEvent::Composed(png)),
                Err(err) => {
                    error!(error = %err, "failed to composite");
                    Some(SessionEvent::Failed(err))
                }
            },
            Effect::SendImage(png) => {
                self.send(Reply::Image(png)).await;
                None
            }
            Effect::Cleanup => {
                self.artifacts.cleanup();
                None
            }
        }
    }

    async fn send(&self, reply: Reply) {
        if let Err(err) = self.context.transport.send(&self.user, reply).await {
            warn!(error = %err, "failed to send reply");
        }
    }

    /// Fetches, decodes and re-encodes an attachment as PNG in the temp directory.
    async fn store_image(&mut self, url: &str, role: ImageRole) -> SessionResult<PathBuf> {
        let bytes = self
            .context
            .fetcher
            .fetch(url, self.settings.max_image_bytes)
            .await?;

        let path = self.artifacts.image_path(role);
        let dir = self.artifacts.dir().to_path_buf();
        let target = path.clone();

        let desc = tokio::task::spawn_blocking(move || -> SessionResult<_> {
            let image = Image::decode(&bytes).map_err(SessionError::Decode)?;
            std::fs::create_dir_all(&dir)
                .map_err(|err| SessionError::Unexpected(format!("temp dir: {err}")))?;
            image
                .save_file(&target)
                .map_err(|err| SessionError::Unexpected(format!("save image: {err}")))?;
            Ok(*image.desc())
        })
        .await??;

        info!(%role, %desc, "image stored");
        Ok(path)
    }

    async fn compose(&mut self, front: PathBuf, back: PathBuf) -> SessionResult<Bytes> {
        let result_path = self.artifacts.result_path();
        let mirage = self.settings.mirage;

        let png = tokio::task::spawn_blocking(move || -> imaginarium::Result<Vec<u8>> {
            let front = Image::read_file(&front)?;
            let back = Image::read_file(&back)?;
            let composite = mirage.composite(&front, &back)?;
            let png = composite.encode_png()?;
            std::fs::write(&result_path, &png)?;
            Ok(png)
        })
        .await?
        .map_err(SessionError::Composition)?;

        info!(bytes = png.len(), "composite ready");
        Ok(Bytes::from(png))
    }
}

fn classify(message: &IncomingMessage) -> SessionEvent {
    if message.is_cancel() {
        SessionEvent::Cancel
    } else if let Some(attachment) = message.single_image() {
        SessionEvent::ImageReceived {
            url: attachment.url.clone(),
        }
    } else {
        SessionEvent::NotAnImage
    }
}
