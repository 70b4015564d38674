//! Inbound operations. Each runs as one critical section on its session and
//! returns the resulting snapshot.

use super::AppState;
use crate::error::SessionError;
use crate::session::Session;
use crate::types::*;

impl AppState {
    /// Record an answer, advancing if that completed the phase
    pub async fn submit_answer(
        &self,
        session_id: &str,
        player_id: &str,
        content: String,
    ) -> Result<Session, SessionError> {
        let (_, snapshot) = self
            .with_session(session_id, |s| {
                s.submit_answer(player_id, content)?;
                Ok(s.settle())
            })
            .await?;
        Ok(snapshot)
    }

    /// Record a vote, advancing if that completed the phase
    pub async fn submit_vote(
        &self,
        session_id: &str,
        player_id: &str,
        target_id: &str,
    ) -> Result<Session, SessionError> {
        let (_, snapshot) = self
            .with_session(session_id, |s| {
                s.submit_vote(player_id, target_id)?;
                Ok(s.settle())
            })
            .await?;
        Ok(snapshot)
    }

    pub async fn set_ready(
        &self,
        session_id: &str,
        player_id: &str,
        ready: bool,
    ) -> Result<Session, SessionError> {
        let (_, snapshot) = self
            .with_session(session_id, |s| s.set_ready(player_id, ready))
            .await?;
        Ok(snapshot)
    }

    pub async fn request_advance(&self, session_id: &str) -> Result<Session, SessionError> {
        let (_, snapshot) = self.with_session(session_id, |s| s.advance()).await?;
        Ok(snapshot)
    }

    pub async fn host_force_advance(
        &self,
        session_id: &str,
        host_id: &str,
    ) -> Result<Session, SessionError> {
        let (_, snapshot) = self
            .with_session(session_id, |s| s.force_advance(host_id))
            .await?;
        Ok(snapshot)
    }

    pub async fn host_transition_phase(
        &self,
        session_id: &str,
        host_id: &str,
        phase: Phase,
    ) -> Result<Session, SessionError> {
        let (_, snapshot) = self
            .with_session(session_id, |s| s.transition_to(host_id, phase))
            .await?;
        Ok(snapshot)
    }

    pub async fn award_points(
        &self,
        session_id: &str,
        player_id: &str,
        amount: u32,
    ) -> Result<Session, SessionError> {
        let (_, snapshot) = self
            .with_session(session_id, |s| s.award_points(player_id, amount))
            .await?;
        Ok(snapshot)
    }

    /// Turn the current round's votes into points (once per round)
    pub async fn score_round_votes(
        &self,
        session_id: &str,
        points_per_vote: u32,
    ) -> Result<Session, SessionError> {
        let (_, snapshot) = self
            .with_session(session_id, |s| s.score_round_votes(points_per_vote))
            .await?;
        Ok(snapshot)
    }
}
