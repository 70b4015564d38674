//! Phase timers.
//!
//! The engine has no clock. This watcher is the scheduler that pushes a
//! session along: when ANSWERING or VOTING outlives its deadline the host
//! forces it forward, and the other phases move on after a short pacing beat.
//! A phase change restarts the clock, which is all the cancellation needed.

use crate::error::SessionError;
use crate::state::AppState;
use crate::types::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct PhaseTimers {
    pub answering: Duration,
    pub voting: Duration,
    /// How long INTRO, REVEALING, RESULT and TRANSITION stay on screen
    pub pacing: Duration,
    /// Polling interval
    pub tick: Duration,
}

impl Default for PhaseTimers {
    fn default() -> Self {
        Self {
            answering: Duration::from_secs(20),
            voting: Duration::from_secs(15),
            pacing: Duration::from_millis(1500),
            tick: Duration::from_millis(250),
        }
    }
}

impl PhaseTimers {
    pub fn for_phase(&self, phase: Phase) -> Duration {
        match phase {
            Phase::Answering => self.answering,
            Phase::Voting => self.voting,
            _ => self.pacing,
        }
    }
}

/// Spawn a background task that advances a session when its phase deadline
/// expires. Stops once the session ends or is removed.
pub fn spawn_deadline_watcher(
    state: Arc<AppState>,
    session_id: SessionId,
    timers: PhaseTimers,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut current: Option<(u32, Phase)> = None;
        let mut since = Instant::now();

        loop {
            tokio::time::sleep(timers.tick).await;

            let session = match state.get_session(&session_id).await {
                Some(s) => s,
                None => break,
            };
            if session.has_ended() {
                break;
            }

            let key = (session.round_number(), session.phase());
            if current != Some(key) {
                current = Some(key);
                since = Instant::now();
                continue;
            }
            if since.elapsed() < timers.for_phase(key.1) {
                continue;
            }

            if key.1.is_gated() && !session.is_phase_complete() {
                tracing::info!(
                    "Deadline for {} elapsed in session {}, waiting on {:?}",
                    key.1,
                    session_id,
                    session.waiting_on()
                );
            }

            // Name the target explicitly: if the phase moved on since the
            // snapshot, the stale request is refused instead of skipping ahead.
            let host_id = session.host_id();
            let result = match session.next_step() {
                Some(Advance::Phase(target)) => {
                    state
                        .host_transition_phase(&session_id, host_id, target)
                        .await
                }
                Some(Advance::Ended) => state.host_force_advance(&session_id, host_id).await,
                None => break,
            };

            match result {
                Ok(_) => {}
                Err(SessionError::SessionEnded) | Err(SessionError::SessionNotFound(_)) => break,
                Err(SessionError::InvalidTransition { .. }) => {
                    tracing::debug!("Session {} moved on before its deadline fired", session_id);
                }
                Err(e) => tracing::warn!("Deadline advance failed for {}: {}", session_id, e),
            }
            since = Instant::now();
        }

        tracing::debug!("Deadline watcher for session {} stopped", session_id);
    })
}
