use crate::error::SessionError;
use crate::session::Session;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Commands accepted from UI and bot-simulation collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateSession {
        config: SessionConfig,
    },
    SubmitAnswer {
        session_id: SessionId,
        player_id: PlayerId,
        content: String,
    },
    SubmitVote {
        session_id: SessionId,
        player_id: PlayerId,
        target_id: PlayerId,
    },
    SetReady {
        session_id: SessionId,
        player_id: PlayerId,
        ready: bool,
    },
    /// Advance if the completion predicate allows it
    RequestAdvance {
        session_id: SessionId,
    },
    // Host-only messages
    HostForceAdvance {
        session_id: SessionId,
        host_id: PlayerId,
    },
    HostTransitionPhase {
        session_id: SessionId,
        host_id: PlayerId,
        phase: Phase,
    },
    /// Sent by the scoring collaborator during REVEALING/RESULT
    AwardPoints {
        session_id: SessionId,
        player_id: PlayerId,
        amount: u32,
    },
    ScoreRoundVotes {
        session_id: SessionId,
        points_per_vote: u32,
    },
    GetState {
        session_id: SessionId,
    },
    GetLeaderboard {
        session_id: SessionId,
    },
}

/// Notifications for rendering and replication collaborators
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full snapshot, sent after every successful mutation
    SessionState {
        session: Session,
        valid_transitions: Vec<Phase>,
        /// Humans the current phase is waiting on
        waiting_on: Vec<PlayerId>,
        server_now: String,
    },
    Leaderboard {
        session_id: SessionId,
        standings: Vec<Standing>,
    },
    SessionEnded {
        session_id: SessionId,
        standings: Vec<Standing>,
    },
    SessionRemoved {
        session_id: SessionId,
    },
    Error {
        code: String,
        msg: String,
    },
}

impl ServerMessage {
    pub fn state(session: &Session) -> Self {
        ServerMessage::SessionState {
            session: session.snapshot(),
            valid_transitions: session.valid_transitions(),
            waiting_on: session.waiting_on(),
            server_now: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn leaderboard(session: &Session) -> Self {
        ServerMessage::Leaderboard {
            session_id: session.id().clone(),
            standings: session.leaderboard(),
        }
    }

    pub fn error(err: &SessionError) -> Self {
        ServerMessage::Error {
            code: err.code().to_string(),
            msg: err.to_string(),
        }
    }

    /// Session this message is about, if any
    pub fn session_id(&self) -> Option<&SessionId> {
        match self {
            ServerMessage::SessionState { session, .. } => Some(session.id()),
            ServerMessage::Leaderboard { session_id, .. }
            | ServerMessage::SessionEnded { session_id, .. }
            | ServerMessage::SessionRemoved { session_id } => Some(session_id),
            ServerMessage::Error { .. } => None,
        }
    }
}
