//! Simulated bot players.
//!
//! Bots act through the same serialized entry points as humans, just later:
//! each bot gets one delayed answer per ANSWERING phase and one delayed vote
//! per VOTING phase. The engine never waits for them, so a bot action that
//! arrives after the phase moved on is simply refused and dropped.

use crate::protocol::ServerMessage;
use crate::session::Session;
use crate::state::AppState;
use crate::types::*;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

const BOT_ANSWERS: &[&str] = &[
    "Ma grand-mère",
    "Le voisin du dessus",
    "Personne, évidemment",
    "Un pigeon très motivé",
    "Celui qui a mangé le dernier croissant",
    "Le prof de sport",
];

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(300),
            max_delay: Duration::from_millis(2500),
        }
    }
}

impl BotConfig {
    fn random_delay(&self, rng: &mut impl Rng) -> Duration {
        if self.max_delay <= self.min_delay {
            return self.min_delay;
        }
        rng.random_range(self.min_delay..=self.max_delay)
    }
}

/// What one bot will do once its delay runs out
#[derive(Debug, Clone, PartialEq)]
enum BotAction {
    Answer(String),
    Vote(PlayerId),
}

/// Spawn a background task that plays every bot of a session until it ends
pub fn spawn_bot_driver(
    state: Arc<AppState>,
    session_id: SessionId,
    config: BotConfig,
) -> JoinHandle<()> {
    // Subscribe before spawning so no snapshot slips past
    let mut rx = state.subscribe();

    tokio::spawn(async move {
        let mut scheduled: HashSet<(u32, Phase, PlayerId)> = HashSet::new();

        // Catch up with whatever happened before we subscribed
        if let Some(session) = state.get_session(&session_id).await {
            schedule_bot_actions(&state, &session, &config, &mut scheduled);
        }

        loop {
            match rx.recv().await {
                Ok(ServerMessage::SessionState { session, .. }) if *session.id() == session_id => {
                    if session.has_ended() {
                        break;
                    }
                    schedule_bot_actions(&state, &session, &config, &mut scheduled);
                }
                Ok(
                    ServerMessage::SessionEnded { session_id: id, .. }
                    | ServerMessage::SessionRemoved { session_id: id },
                ) if id == session_id => break,
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Bot driver for {} lagged by {} message(s)", session_id, skipped);
                    match state.get_session(&session_id).await {
                        Some(session) => {
                            schedule_bot_actions(&state, &session, &config, &mut scheduled)
                        }
                        None => break,
                    }
                }
                Err(RecvError::Closed) => break,
            }
        }

        tracing::debug!("Bot driver for session {} stopped", session_id);
    })
}

/// Schedule the pending bot actions for the session's current phase.
/// Each (round, phase, bot) is scheduled at most once.
fn schedule_bot_actions(
    state: &Arc<AppState>,
    session: &Session,
    config: &BotConfig,
    scheduled: &mut HashSet<(u32, Phase, PlayerId)>,
) {
    // Only the current round's keys can still match
    scheduled.retain(|(round, ..)| *round == session.round_number());

    let Some(target) = session.phase().completion_target() else {
        return;
    };

    let mut rng = rand::rng();
    for bot in session.players().iter().filter(|p| p.is_bot()) {
        if bot.completion_state == target {
            continue;
        }
        let key = (session.round_number(), session.phase(), bot.player_id.clone());
        if !scheduled.insert(key) {
            continue;
        }

        let Some(action) = pick_action(session, &bot.player_id, &mut rng) else {
            continue;
        };
        let delay = config.random_delay(&mut rng);

        let state = state.clone();
        let session_id = session.id().clone();
        let bot_id = bot.player_id.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let result = match &action {
                BotAction::Answer(content) => {
                    state
                        .submit_answer(&session_id, &bot_id, content.clone())
                        .await
                }
                BotAction::Vote(target_id) => {
                    state.submit_vote(&session_id, &bot_id, target_id).await
                }
            };
            match result {
                Ok(_) => tracing::debug!("Bot {} played {:?}", bot_id, action),
                Err(e) => tracing::debug!("Bot {} action dropped: {}", bot_id, e),
            }
        });
    }
}

fn pick_action(session: &Session, bot_id: &str, rng: &mut impl Rng) -> Option<BotAction> {
    match session.phase() {
        Phase::Answering => {
            let answer = BOT_ANSWERS.choose(rng)?;
            Some(BotAction::Answer(answer.to_string()))
        }
        Phase::Voting => {
            let others: Vec<&PlayerId> = session
                .players()
                .iter()
                .map(|p| &p.player_id)
                .filter(|id| id.as_str() != bot_id)
                .collect();
            let target = match others.choose(rng) {
                Some(id) => (*id).clone(),
                None => bot_id.to_string(),
            };
            Some(BotAction::Vote(target))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::fixtures::config;

    async fn wait_for<F>(state: &AppState, session_id: &str, mut done: F) -> Session
    where
        F: FnMut(&Session) -> bool,
    {
        for _ in 0..400 {
            let session = state.get_session(session_id).await.unwrap();
            if done(&session) {
                return session;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached in time");
    }

    fn fast() -> BotConfig {
        BotConfig {
            min_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        }
    }

    #[tokio::test]
    async fn test_bots_answer_and_vote() {
        let state = Arc::new(AppState::new());
        let session = state
            .create_session(config(1, &[], &["bot-1", "bot-2"]))
            .await
            .unwrap();
        let id = session.id().clone();
        let driver = spawn_bot_driver(state.clone(), id.clone(), fast());

        state.request_advance(&id).await.unwrap();
        let s = wait_for(&state, &id, |s| {
            s.answer_of("bot-1").is_some() && s.answer_of("bot-2").is_some()
        })
        .await;
        assert_eq!(s.phase(), Phase::Answering);
        assert!(BOT_ANSWERS.contains(&s.answer_of("bot-1").unwrap()));

        // The human completes the phase; bots were never required
        state
            .submit_answer(&id, "alice", "le chat".to_string())
            .await
            .unwrap();
        let s = wait_for(&state, &id, |s| {
            s.vote_of("bot-1").is_some() && s.vote_of("bot-2").is_some()
        })
        .await;
        assert_eq!(s.phase(), Phase::Voting);
        assert_ne!(s.vote_of("bot-1").unwrap(), "bot-1");

        while !state.get_session(&id).await.unwrap().has_ended() {
            state.host_force_advance(&id, "alice").await.unwrap();
        }
        tokio::time::timeout(Duration::from_secs(2), driver)
            .await
            .expect("driver should stop once the session ends")
            .unwrap();
    }

    #[tokio::test]
    async fn test_late_bot_action_is_dropped() {
        let state = Arc::new(AppState::new());
        let session = state
            .create_session(config(1, &[], &["bot-1"]))
            .await
            .unwrap();
        let id = session.id().clone();
        let slow = BotConfig {
            min_delay: Duration::from_millis(50),
            max_delay: Duration::from_millis(50),
        };
        let _driver = spawn_bot_driver(state.clone(), id.clone(), slow);

        state.request_advance(&id).await.unwrap();
        state
            .submit_answer(&id, "alice", "vite".to_string())
            .await
            .unwrap();
        // auto-advanced to VOTING before the bot woke up
        tokio::time::sleep(Duration::from_millis(80)).await;

        let s = state.get_session(&id).await.unwrap();
        assert_eq!(s.phase(), Phase::Voting);
        assert!(s.answer_of("bot-1").is_none());
    }

    #[tokio::test]
    async fn test_scheduled_keys_are_pruned_each_round() {
        let state = Arc::new(AppState::new());
        let session = state
            .create_session(config(2, &[], &["bot-1"]))
            .await
            .unwrap();
        let id = session.id().clone();

        let mut s = session;
        while !(s.round_number() == 2 && s.phase() == Phase::Answering) {
            s = state.host_force_advance(&id, "alice").await.unwrap();
        }

        let mut scheduled: HashSet<(u32, Phase, PlayerId)> = HashSet::new();
        scheduled.insert((1, Phase::Answering, "bot-1".to_string()));
        scheduled.insert((1, Phase::Voting, "bot-1".to_string()));

        schedule_bot_actions(&state, &s, &fast(), &mut scheduled);

        assert_eq!(scheduled.len(), 1);
        assert!(scheduled.contains(&(2, Phase::Answering, "bot-1".to_string())));
    }

    #[test]
    fn test_pick_vote_never_targets_self_when_others_exist() {
        let mut session = Session::new(config(1, &[], &["bot-1"])).unwrap();
        session.force_advance("alice").unwrap();
        session.force_advance("alice").unwrap();

        let mut rng = rand::rng();
        for _ in 0..20 {
            let action = pick_action(&session, "bot-1", &mut rng).unwrap();
            assert_eq!(action, BotAction::Vote("alice".to_string()));
        }
    }
}
