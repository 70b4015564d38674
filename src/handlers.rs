//! Message dispatch
//!
//! Single entry point for callers holding a [`ClientMessage`]. Each command is
//! routed to the matching [`AppState`] operation and the result is turned into
//! the reply to send back. Host checks happen inside the session, against the
//! `host_id` carried by the message.

use crate::error::SessionError;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::session::Session;
use crate::state::AppState;
use std::sync::Arc;

/// Reply for a mutation: the new snapshot, or the reason it was refused
fn reply(result: Result<Session, SessionError>, action: &str) -> ServerMessage {
    match result {
        Ok(session) => ServerMessage::state(&session),
        Err(e) => {
            tracing::warn!("Rejected {}: {}", action, e);
            ServerMessage::error(&e)
        }
    }
}

/// Handle a client message and return the reply
pub async fn handle_message(msg: ClientMessage, state: &Arc<AppState>) -> Option<ServerMessage> {
    let response = match msg {
        ClientMessage::CreateSession { config } => {
            reply(state.create_session(config).await, "create session")
        }

        ClientMessage::SubmitAnswer {
            session_id,
            player_id,
            content,
        } => reply(
            state.submit_answer(&session_id, &player_id, content).await,
            "answer",
        ),

        ClientMessage::SubmitVote {
            session_id,
            player_id,
            target_id,
        } => reply(
            state.submit_vote(&session_id, &player_id, &target_id).await,
            "vote",
        ),

        ClientMessage::SetReady {
            session_id,
            player_id,
            ready,
        } => reply(
            state.set_ready(&session_id, &player_id, ready).await,
            "ready toggle",
        ),

        ClientMessage::RequestAdvance { session_id } => {
            reply(state.request_advance(&session_id).await, "advance")
        }

        ClientMessage::HostForceAdvance {
            session_id,
            host_id,
        } => reply(
            state.host_force_advance(&session_id, &host_id).await,
            "force advance",
        ),

        ClientMessage::HostTransitionPhase {
            session_id,
            host_id,
            phase,
        } => {
            tracing::info!("Host {} transitioning to phase: {}", host_id, phase);
            reply(
                state
                    .host_transition_phase(&session_id, &host_id, phase)
                    .await,
                "phase transition",
            )
        }

        ClientMessage::AwardPoints {
            session_id,
            player_id,
            amount,
        } => reply(
            state.award_points(&session_id, &player_id, amount).await,
            "award points",
        ),

        ClientMessage::ScoreRoundVotes {
            session_id,
            points_per_vote,
        } => reply(
            state.score_round_votes(&session_id, points_per_vote).await,
            "round scoring",
        ),

        ClientMessage::GetState { session_id } => match state.get_session(&session_id).await {
            Some(session) => ServerMessage::state(&session),
            None => ServerMessage::error(&SessionError::SessionNotFound(session_id)),
        },

        ClientMessage::GetLeaderboard { session_id } => {
            match state.get_session(&session_id).await {
                Some(session) => ServerMessage::leaderboard(&session),
                None => ServerMessage::error(&SessionError::SessionNotFound(session_id)),
            }
        }
    };

    Some(response)
}
