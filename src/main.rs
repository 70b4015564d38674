use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kiparty::{
    bots, config::RunnerConfig, deadline, protocol::ServerMessage, state::AppState, types::Phase,
};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kiparty=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting kiparty match runner...");

    let config = RunnerConfig::from_env();
    let state = Arc::new(AppState::new());
    let mut rx = state.subscribe();

    let session = match state.create_session(config.session_config()).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("Failed to create session: {}", e);
            std::process::exit(1);
        }
    };
    let session_id = session.id().clone();

    // Bots play through the same entry points as humans
    bots::spawn_bot_driver(state.clone(), session_id.clone(), config.bot_config());

    // Deadlines stand in for the host, who never answers in this demo
    deadline::spawn_deadline_watcher(state.clone(), session_id.clone(), config.phase_timers());

    let mut scored_round = 0;
    loop {
        match rx.recv().await {
            Ok(ServerMessage::SessionState {
                session,
                waiting_on,
                ..
            }) if *session.id() == session_id => {
                tracing::info!(
                    "Round {}/{} [{:?}] {} (v{}), waiting on {:?}",
                    session.round_number(),
                    session.total_rounds(),
                    session.active_mini_game(),
                    session.phase(),
                    session.version(),
                    waiting_on
                );

                // Scoring collaborator: once per round, as soon as answers are revealed
                if session.phase() == Phase::Revealing && scored_round != session.round_number() {
                    scored_round = session.round_number();
                    if let Err(e) = state
                        .score_round_votes(&session_id, config.points_per_vote)
                        .await
                    {
                        tracing::warn!("Failed to score round {}: {}", scored_round, e);
                    }
                }
            }
            Ok(ServerMessage::SessionEnded {
                session_id: ended,
                standings,
            }) if ended == session_id => {
                tracing::info!("Match over");
                for standing in standings {
                    tracing::info!(
                        "#{} {} ({}) - {} pts",
                        standing.rank,
                        standing.display_name.as_deref().unwrap_or("?"),
                        standing.player_id,
                        standing.score
                    );
                }
                break;
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!("Runner lagged behind by {} message(s)", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}
