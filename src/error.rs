use crate::types::{CompletionState, Phase, PlayerId, SessionId};
use thiserror::Error;

/// Every way a session operation can be refused.
///
/// Operations validate before they mutate, so an error always means the
/// session was left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Advance requested while humans are still pending
    #[error("{phase} is locked: waiting on {waiting_on} player(s)")]
    PhaseLocked { phase: Phase, waiting_on: usize },
    /// Requested phase is not adjacent to the current one
    #[error("invalid phase transition from {from} to {to}")]
    InvalidTransition { from: Phase, to: Phase },
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),
    /// Completion mark does not belong to the active phase
    #[error("cannot mark {state:?} during {phase}")]
    InvalidStateForPhase { state: CompletionState, phase: Phase },
    #[error("player {0} is not the host")]
    NotAuthorized(PlayerId),
    #[error("session has ended")]
    SessionEnded,
    #[error("points cannot be awarded during {0}")]
    InvalidPhaseForScoring(Phase),
    #[error("invalid session config: {0}")]
    InvalidConfig(String),
    #[error("session {0} not found")]
    SessionNotFound(SessionId),
}

impl SessionError {
    /// Stable machine-readable code for client messages
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::PhaseLocked { .. } => "PHASE_LOCKED",
            SessionError::InvalidTransition { .. } => "INVALID_TRANSITION",
            SessionError::UnknownPlayer(_) => "UNKNOWN_PLAYER",
            SessionError::InvalidStateForPhase { .. } => "INVALID_STATE_FOR_PHASE",
            SessionError::NotAuthorized(_) => "NOT_AUTHORIZED",
            SessionError::SessionEnded => "SESSION_ENDED",
            SessionError::InvalidPhaseForScoring(_) => "INVALID_PHASE_FOR_SCORING",
            SessionError::InvalidConfig(_) => "INVALID_CONFIG",
            SessionError::SessionNotFound(_) => "SESSION_NOT_FOUND",
        }
    }
}
