mod actions;

use crate::error::SessionError;
use crate::protocol::ServerMessage;
use crate::session::Session;
use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// One session behind its own lock: writers are serialized, readers share
pub type SharedSession = Arc<RwLock<Session>>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<RwLock<HashMap<SessionId, SharedSession>>>,
    /// Snapshot notifications for every session
    pub broadcast: broadcast::Sender<ServerMessage>,
}

impl AppState {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(256);
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            broadcast: tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerMessage> {
        self.broadcast.subscribe()
    }

    /// Send a message to every subscriber
    pub fn broadcast_to_all(&self, msg: ServerMessage) {
        // No receivers connected is fine
        let _ = self.broadcast.send(msg);
    }

    /// Create and register a new session
    pub async fn create_session(&self, config: SessionConfig) -> Result<Session, SessionError> {
        let session = Session::new(config)?;
        let snapshot = session.snapshot();
        let id = session.id().clone();

        self.sessions
            .write()
            .await
            .insert(id.clone(), Arc::new(RwLock::new(session)));

        tracing::info!(
            "Created session {} with {} player(s), {} round(s)",
            id,
            snapshot.players().len(),
            snapshot.total_rounds()
        );
        self.broadcast_to_all(ServerMessage::state(&snapshot));
        Ok(snapshot)
    }

    /// Consistent snapshot of a session
    pub async fn get_session(&self, session_id: &str) -> Option<Session> {
        let handle = self.session_handle(session_id).await.ok()?;
        let session = handle.read().await;
        Some(session.snapshot())
    }

    pub async fn remove_session(&self, session_id: &str) -> Option<Session> {
        let handle = self.sessions.write().await.remove(session_id)?;
        let snapshot = handle.read().await.snapshot();

        tracing::info!("Removed session {}", session_id);
        self.broadcast_to_all(ServerMessage::SessionRemoved {
            session_id: session_id.to_string(),
        });
        Some(snapshot)
    }

    pub async fn session_ids(&self) -> Vec<SessionId> {
        self.sessions.read().await.keys().cloned().collect()
    }

    async fn session_handle(&self, session_id: &str) -> Result<SharedSession, SessionError> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| SessionError::SessionNotFound(session_id.to_string()))
    }

    /// Run one mutation under the session's write lock.
    ///
    /// On success the new snapshot is broadcast before the lock is released,
    /// so subscribers see a session's updates in the order they happened.
    async fn with_session<T, F>(&self, session_id: &str, f: F) -> Result<(T, Session), SessionError>
    where
        F: FnOnce(&mut Session) -> Result<T, SessionError>,
    {
        let handle = self.session_handle(session_id).await?;
        let mut session = handle.write().await;
        let was_ended = session.has_ended();

        let out = f(&mut *session)?;

        let snapshot = session.snapshot();
        self.broadcast_to_all(ServerMessage::state(&snapshot));
        if snapshot.has_ended() && !was_ended {
            self.broadcast_to_all(ServerMessage::SessionEnded {
                session_id: snapshot.id().clone(),
                standings: snapshot.leaderboard(),
            });
        }
        drop(session);

        Ok((out, snapshot))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::types::*;

    /// Host "alice" plus the given humans and bots, auto-advance on
    pub fn config(total_rounds: u32, humans: &[&str], bots: &[&str]) -> SessionConfig {
        let mut players = vec![PlayerSpec::human("alice")];
        players.extend(humans.iter().map(|id| PlayerSpec::human(*id)));
        players.extend(bots.iter().map(|id| PlayerSpec::bot(*id)));
        SessionConfig {
            total_rounds,
            mini_games: MiniGame::ALL.to_vec(),
            players,
            host_id: "alice".to_string(),
            auto_advance: true,
        }
    }
}
