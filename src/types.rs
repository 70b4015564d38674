use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque ID types for type safety
pub type SessionId = String;
pub type PlayerId = String;

/// Generate a fresh opaque identifier
pub fn new_id() -> String {
    ulid::Ulid::new().to_string()
}

/// Stage of a single round. Declared in canonical forward order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Intro,
    Answering,
    Voting,
    Revealing,
    #[serde(alias = "RESULTS")]
    Result,
    Transition,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Intro,
        Phase::Answering,
        Phase::Voting,
        Phase::Revealing,
        Phase::Result,
        Phase::Transition,
    ];

    /// The state every human must reach before this phase may advance on its own.
    /// `None` for phases that advance without waiting on players.
    pub fn completion_target(self) -> Option<CompletionState> {
        match self {
            Phase::Answering => Some(CompletionState::Answered),
            Phase::Voting => Some(CompletionState::Voted),
            _ => None,
        }
    }

    /// Whether leaving this phase is gated by the completion predicate
    pub fn is_gated(self) -> bool {
        self.completion_target().is_some()
    }

    /// Whether score mutation is allowed in this phase
    pub fn allows_scoring(self) -> bool {
        matches!(self, Phase::Revealing | Phase::Result)
    }

    /// Whether a player may be marked with `state` while in this phase
    pub fn accepts(self, state: CompletionState) -> bool {
        match state {
            CompletionState::Answered => self == Phase::Answering,
            CompletionState::Voted => self == Phase::Voting,
            CompletionState::Ready | CompletionState::Idle => !self.is_gated(),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Intro => "intro",
            Phase::Answering => "answering",
            Phase::Voting => "voting",
            Phase::Revealing => "revealing",
            Phase::Result => "result",
            Phase::Transition => "transition",
        };
        f.write_str(name)
    }
}

/// Game mode played during a round. All modes share the same phase order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MiniGame {
    KiKaDi,
    KiDiVrai,
    KiDeNous,
    KiDeja,
}

impl MiniGame {
    pub const ALL: [MiniGame; 4] = [
        MiniGame::KiKaDi,
        MiniGame::KiDiVrai,
        MiniGame::KiDeNous,
        MiniGame::KiDeja,
    ];
}

impl FromStr for MiniGame {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "kikadi" => Ok(MiniGame::KiKaDi),
            "kidivrai" => Ok(MiniGame::KiDiVrai),
            "kidenous" => Ok(MiniGame::KiDeNous),
            "kideja" => Ok(MiniGame::KiDeja),
            _ => Err(format!("unknown mini-game: {}", s.trim())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlayerRole {
    Human,
    Bot,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompletionState {
    #[default]
    Idle,
    Answered,
    Voted,
    Ready,
}

/// Player entry supplied when a session is created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSpec {
    pub player_id: PlayerId,
    pub role: PlayerRole,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl PlayerSpec {
    pub fn human(player_id: impl Into<PlayerId>) -> Self {
        Self {
            player_id: player_id.into(),
            role: PlayerRole::Human,
            display_name: None,
        }
    }

    pub fn bot(player_id: impl Into<PlayerId>) -> Self {
        Self {
            player_id: player_id.into(),
            role: PlayerRole::Bot,
            display_name: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SessionPlayer {
    pub player_id: PlayerId,
    pub role: PlayerRole,
    pub display_name: Option<String>,
    pub completion_state: CompletionState,
    pub score: u32,
}

impl SessionPlayer {
    pub fn is_bot(&self) -> bool {
        self.role == PlayerRole::Bot
    }
}

impl From<PlayerSpec> for SessionPlayer {
    fn from(spec: PlayerSpec) -> Self {
        Self {
            player_id: spec.player_id,
            role: spec.role,
            display_name: spec.display_name,
            completion_state: CompletionState::Idle,
            score: 0,
        }
    }
}

/// Everything fixed at session creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub total_rounds: u32,
    pub mini_games: Vec<MiniGame>,
    pub players: Vec<PlayerSpec>,
    pub host_id: PlayerId,
    /// Advance automatically once every human has answered/voted
    #[serde(default = "default_auto_advance")]
    pub auto_advance: bool,
}

fn default_auto_advance() -> bool {
    true
}

/// Outcome of a successful phase step
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "phase", rename_all = "snake_case")]
pub enum Advance {
    Phase(Phase),
    Ended,
}

/// One row of the leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Standing {
    pub player_id: PlayerId,
    pub role: PlayerRole,
    pub display_name: Option<String>,
    pub score: u32,
    /// 1-based; tied scores share a rank
    pub rank: u32,
}
