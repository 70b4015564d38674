//! Settings for the demo match runner, read from the environment.
//!
//! Invalid values are logged and replaced by their defaults; the runner never
//! refuses to start because of configuration.

use crate::bots::BotConfig;
use crate::deadline::PhaseTimers;
use crate::types::*;
use std::str::FromStr;
use std::time::Duration;

pub const HOST_ID: &str = "host";

#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    pub total_rounds: u32,
    pub mini_games: Vec<MiniGame>,
    pub bots: usize,
    pub answer_seconds: u64,
    pub vote_seconds: u64,
    pub pacing_ms: u64,
    pub bot_min_delay_ms: u64,
    pub bot_max_delay_ms: u64,
    pub points_per_vote: u32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            total_rounds: 3,
            mini_games: MiniGame::ALL.to_vec(),
            bots: 3,
            answer_seconds: 20,
            vote_seconds: 15,
            pacing_ms: 1500,
            bot_min_delay_ms: 300,
            bot_max_delay_ms: 2500,
            points_per_vote: 100,
        }
    }
}

/// Read and parse an env var, falling back to `default` when unset or invalid
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => match raw.trim().parse() {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Ignoring {}={:?}: {}", key, raw, e);
                default
            }
        },
        _ => default,
    }
}

fn parse_mini_games(raw: &str) -> Vec<MiniGame> {
    raw.split(',')
        .filter(|s| !s.trim().is_empty())
        .filter_map(|s| match s.parse() {
            Ok(game) => Some(game),
            Err(e) => {
                tracing::warn!("Skipping mini-game entry: {}", e);
                None
            }
        })
        .collect()
}

impl RunnerConfig {
    /// Load runner config from KIPARTY_* environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let mut total_rounds = env_or("KIPARTY_TOTAL_ROUNDS", defaults.total_rounds);
        if total_rounds == 0 {
            tracing::warn!("KIPARTY_TOTAL_ROUNDS must be at least 1, using default");
            total_rounds = defaults.total_rounds;
        }

        let mini_games = match std::env::var("KIPARTY_MINI_GAMES") {
            Ok(raw) => {
                let games = parse_mini_games(&raw);
                if games.is_empty() {
                    tracing::warn!("KIPARTY_MINI_GAMES has no valid entry, using all mini-games");
                    defaults.mini_games.clone()
                } else {
                    games
                }
            }
            Err(_) => defaults.mini_games.clone(),
        };

        let mut bot_min_delay_ms = env_or("KIPARTY_BOT_MIN_DELAY_MS", defaults.bot_min_delay_ms);
        let mut bot_max_delay_ms = env_or("KIPARTY_BOT_MAX_DELAY_MS", defaults.bot_max_delay_ms);
        if bot_min_delay_ms > bot_max_delay_ms {
            tracing::warn!(
                "Bot delay bounds reversed ({} > {}), swapping",
                bot_min_delay_ms,
                bot_max_delay_ms
            );
            std::mem::swap(&mut bot_min_delay_ms, &mut bot_max_delay_ms);
        }

        Self {
            total_rounds,
            mini_games,
            bots: env_or("KIPARTY_BOTS", defaults.bots),
            answer_seconds: env_or("KIPARTY_ANSWER_SECONDS", defaults.answer_seconds),
            vote_seconds: env_or("KIPARTY_VOTE_SECONDS", defaults.vote_seconds),
            pacing_ms: env_or("KIPARTY_PACING_MS", defaults.pacing_ms),
            bot_min_delay_ms,
            bot_max_delay_ms,
            points_per_vote: env_or("KIPARTY_POINTS_PER_VOTE", defaults.points_per_vote),
        }
    }

    /// A human host plus `bots` bots with generated names
    pub fn session_config(&self) -> SessionConfig {
        let mut players = vec![PlayerSpec {
            player_id: HOST_ID.to_string(),
            role: PlayerRole::Human,
            display_name: Some("Host".to_string()),
        }];

        for i in 0..self.bots {
            let name = petname::petname(2, "-").unwrap_or_else(|| format!("bot-{}", i + 1));
            players.push(PlayerSpec {
                player_id: format!("bot-{}", i + 1),
                role: PlayerRole::Bot,
                display_name: Some(name),
            });
        }

        SessionConfig {
            total_rounds: self.total_rounds,
            mini_games: self.mini_games.clone(),
            players,
            host_id: HOST_ID.to_string(),
            auto_advance: true,
        }
    }

    pub fn phase_timers(&self) -> PhaseTimers {
        PhaseTimers {
            answering: Duration::from_secs(self.answer_seconds),
            voting: Duration::from_secs(self.vote_seconds),
            pacing: Duration::from_millis(self.pacing_ms),
            ..PhaseTimers::default()
        }
    }

    pub fn bot_config(&self) -> BotConfig {
        BotConfig {
            min_delay: Duration::from_millis(self.bot_min_delay_ms),
            max_delay: Duration::from_millis(self.bot_max_delay_ms),
        }
    }
}
