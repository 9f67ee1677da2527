//! Routes incoming messages to per-user sessions.

use std::collections::HashMap;
use std::sync::Arc;

use imaginarium::MirageMode;
use parking_lot::Mutex;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::command::parse_command;
use crate::config::Config;
use crate::fetch::ImageFetcher;
use crate::session::{Coordinator, SessionContext, SessionId, SessionSettings, SessionState};
use crate::transport::{IncomingMessage, Transport, UserId};

/// What [`MirageService::dispatch`] did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Delivered to the sender's active session.
    Routed(SessionId),
    /// The message was a command and started a new session.
    Started(SessionId, MirageMode),
    /// No active session and not a command.
    Ignored,
}

#[derive(Debug)]
struct ActiveSession {
    id: SessionId,
    inbox: UnboundedSender<IncomingMessage>,
}

struct ServiceInner {
    config: Config,
    context: SessionContext,
    sessions: Mutex<HashMap<UserId, ActiveSession>>,
    tasks: Mutex<Vec<JoinHandle<SessionState>>>,
}

impl ServiceInner {
    fn finish(&self, user: &UserId, id: SessionId) {
        let mut sessions = self.sessions.lock();
        if sessions.get(user).is_some_and(|active| active.id == id) {
            sessions.remove(user);
        }
    }
}

/// Owns all live sessions. At most one session runs per user.
///
/// Sessions are spawned on the current tokio runtime.
#[derive(Clone)]
pub struct MirageService {
    inner: Arc<ServiceInner>,
}

impl MirageService {
    pub fn new(
        config: Config,
        fetcher: Arc<dyn ImageFetcher>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                config,
                context: SessionContext { fetcher, transport },
                sessions: Mutex::new(HashMap::new()),
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Hands the message to the sender's session, or starts one when the text is a command.
    ///
    /// While a session is active every message from that user goes to it,
    /// including command text.
    pub fn dispatch(&self, message: IncomingMessage) -> Dispatch {
        let message = match self.route(message) {
            Ok(id) => return Dispatch::Routed(id),
            Err(message) => message,
        };

        let Some(mode) = parse_command(&message.text) else {
            debug!(user = %message.user, "ignored message outside a session");
            return Dispatch::Ignored;
        };

        match self.start(message.user, mode) {
            Some(id) => Dispatch::Started(id, mode),
            None => Dispatch::Ignored,
        }
    }

    pub fn start_gray(&self, user: UserId) -> Option<SessionId> {
        self.start(user, MirageMode::Gray)
    }

    pub fn start_color(&self, user: UserId) -> Option<SessionId> {
        self.start(user, MirageMode::Color)
    }

    /// Starts a session for `user`. Returns `None` when one is already running.
    pub fn start(&self, user: UserId, mode: MirageMode) -> Option<SessionId> {
        let mut sessions = self.inner.sessions.lock();
        if let Some(active) = sessions.get(&user) {
            if !active.inbox.is_closed() {
                warn!(%user, session = %active.id.short(), "session already active");
                return None;
            }
        }

        let id = SessionId::unique();
        let settings = SessionSettings::from_config(&self.inner.config, mode);
        let coordinator = Coordinator::new(id, user.clone(), settings, self.inner.context.clone());
        let (inbox, rx) = unbounded_channel();

        let inner = Arc::clone(&self.inner);
        let task_user = user.clone();
        let task = tokio::spawn(async move {
            let state = coordinator.run(rx).await;
            inner.finish(&task_user, id);
            state
        });

        info!(%user, session = %id.short(), %mode, "session created");
        sessions.insert(user, ActiveSession { id, inbox });
        drop(sessions);

        let mut tasks = self.inner.tasks.lock();
        tasks.retain(|task| !task.is_finished());
        tasks.push(task);

        Some(id)
    }

    pub fn active_session(&self, user: &UserId) -> Option<SessionId> {
        self.inner
            .sessions
            .lock()
            .get(user)
            .filter(|active| !active.inbox.is_closed())
            .map(|active| active.id)
    }

    pub fn active_count(&self) -> usize {
        self.inner
            .sessions
            .lock()
            .values()
            .filter(|active| !active.inbox.is_closed())
            .count()
    }

    /// Waits until every session spawned so far has ended.
    pub async fn wait_idle(&self) {
        loop {
            let tasks = std::mem::take(&mut *self.inner.tasks.lock());
            if tasks.is_empty() {
                return;
            }
            for task in tasks {
                match task.await {
                    Ok(state) => debug!(%state, "session joined"),
                    Err(err) => error!(error = %err, "session task failed"),
                }
            }
        }
    }

    /// Delivers to the user's session. Gives the message back when there is none.
    fn route(&self, message: IncomingMessage) -> Result<SessionId, IncomingMessage> {
        let mut sessions = self.inner.sessions.lock();
        let Some(active) = sessions.get(&message.user) else {
            return Err(message);
        };

        let id = active.id;
        match active.inbox.send(message) {
            Ok(()) => Ok(id),
            Err(returned) => {
                // the session ended but has not deregistered yet
                let message = returned.0;
                sessions.remove(&message.user);
                Err(message)
            }
        }
    }
}
