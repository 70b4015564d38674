//! The authoritative state machine for one match.
//!
//! A [`Session`] is a plain synchronous value: every operation validates its
//! input against the current phase and either applies the whole change or
//! returns a [`SessionError`] without touching anything. Serializing access
//! across tasks is the job of [`crate::state::AppState`].

mod phase;
mod player;
mod round;
mod score;
mod submission;
mod vote;

pub use phase::is_valid_phase_transition;
pub use round::mini_game_for_round;

use crate::error::SessionError;
use crate::types::*;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    id: SessionId,
    version: u64,
    phase: Phase,
    round_number: u32,
    total_rounds: u32,
    active_mini_game: MiniGame,
    mini_games: Vec<MiniGame>,
    players: Vec<SessionPlayer>,
    host_id: PlayerId,
    ended: bool,
    auto_advance: bool,
    /// Answers recorded this round, by author
    answers: HashMap<PlayerId, String>,
    /// Votes recorded this round, voter -> target
    votes: HashMap<PlayerId, PlayerId>,
    /// Round whose votes have already been turned into points
    scored_round: Option<u32>,
}

impl Session {
    /// Create a session with a fresh id
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        Self::with_id(new_id(), config)
    }

    pub fn with_id(id: SessionId, config: SessionConfig) -> Result<Self, SessionError> {
        validate_config(&config)?;

        // Round 1 follows the same rotation as every later round
        let active_mini_game = mini_game_for_round(&config.mini_games, 1);
        Ok(Self {
            id,
            version: 1,
            phase: Phase::Intro,
            round_number: 1,
            total_rounds: config.total_rounds,
            active_mini_game,
            mini_games: config.mini_games,
            players: config.players.into_iter().map(SessionPlayer::from).collect(),
            host_id: config.host_id,
            ended: false,
            auto_advance: config.auto_advance,
            answers: HashMap::new(),
            votes: HashMap::new(),
            scored_round: None,
        })
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Incremented on every successful mutation
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    pub fn active_mini_game(&self) -> MiniGame {
        self.active_mini_game
    }

    pub fn mini_games(&self) -> &[MiniGame] {
        &self.mini_games
    }

    pub fn players(&self) -> &[SessionPlayer] {
        &self.players
    }

    pub fn player(&self, player_id: &str) -> Option<&SessionPlayer> {
        self.players.iter().find(|p| p.player_id == player_id)
    }

    pub fn host_id(&self) -> &PlayerId {
        &self.host_id
    }

    pub fn is_host(&self, player_id: &str) -> bool {
        self.host_id == player_id
    }

    pub fn has_ended(&self) -> bool {
        self.ended
    }

    pub fn auto_advance(&self) -> bool {
        self.auto_advance
    }

    /// Full copy of the session for subscribers
    pub fn snapshot(&self) -> Session {
        self.clone()
    }

    fn player_index(&self, player_id: &str) -> Result<usize, SessionError> {
        self.players
            .iter()
            .position(|p| p.player_id == player_id)
            .ok_or_else(|| SessionError::UnknownPlayer(player_id.to_string()))
    }

    fn ensure_active(&self) -> Result<(), SessionError> {
        if self.ended {
            Err(SessionError::SessionEnded)
        } else {
            Ok(())
        }
    }

    fn bump_version(&mut self) {
        self.version += 1;
    }
}

fn validate_config(config: &SessionConfig) -> Result<(), SessionError> {
    if config.total_rounds == 0 {
        return Err(SessionError::InvalidConfig(
            "total_rounds must be greater than zero".to_string(),
        ));
    }
    if config.mini_games.is_empty() {
        return Err(SessionError::InvalidConfig(
            "at least one mini-game is required".to_string(),
        ));
    }
    if config.players.is_empty() {
        return Err(SessionError::InvalidConfig(
            "at least one player is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for player in &config.players {
        if !seen.insert(player.player_id.as_str()) {
            return Err(SessionError::InvalidConfig(format!(
                "duplicate player id {}",
                player.player_id
            )));
        }
    }

    if !seen.contains(config.host_id.as_str()) {
        return Err(SessionError::InvalidConfig(format!(
            "host {} is not one of the players",
            config.host_id
        )));
    }

    Ok(())
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_create_session() {
        let session = Session::new(config(3, humans(&["alice", "bob"]))).unwrap();

        assert_eq!(session.phase(), Phase::Intro);
        assert_eq!(session.round_number(), 1);
        assert_eq!(session.total_rounds(), 3);
        assert_eq!(session.active_mini_game(), MiniGame::KiKaDi);
        assert_eq!(session.host_id(), "alice");
        assert!(!session.has_ended());
        assert!(session
            .players()
            .iter()
            .all(|p| p.completion_state == CompletionState::Idle && p.score == 0));
    }

    #[test]
    fn test_create_session_rejects_bad_config() {
        let mut cfg = config(0, humans(&["alice"]));
        assert!(matches!(
            Session::new(cfg.clone()),
            Err(SessionError::InvalidConfig(_))
        ));

        cfg.total_rounds = 1;
        cfg.mini_games.clear();
        assert!(matches!(
            Session::new(cfg),
            Err(SessionError::InvalidConfig(_))
        ));

        let cfg = config(1, humans(&["alice", "alice"]));
        let err = Session::new(cfg).unwrap_err();
        assert!(err.to_string().contains("duplicate player id alice"));

        let mut cfg = config(1, humans(&["alice"]));
        cfg.host_id = "mallory".to_string();
        let err = Session::new(cfg).unwrap_err();
        assert!(err.to_string().contains("not one of the players"));

        let mut cfg = config(1, humans(&["alice"]));
        cfg.players.clear();
        assert!(Session::new(cfg).is_err());
    }

    #[test]
    fn test_snapshot_serializes_phase_and_players() {
        let session = Session::new(config(2, humans(&["alice"]))).unwrap();
        let json = serde_json::to_value(session.snapshot()).unwrap();

        assert_eq!(json["phase"], "INTRO");
        assert_eq!(json["round_number"], 1);
        assert_eq!(json["active_mini_game"], "KI_KA_DI");
        assert_eq!(json["players"][0]["completion_state"], "IDLE");
        assert_eq!(json["players"][0]["role"], "human");
    }
}
