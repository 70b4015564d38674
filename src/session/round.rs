use super::Session;
use crate::types::*;

/// Mini-game played in `round`: `mini_games[round mod len]`
pub fn mini_game_for_round(mini_games: &[MiniGame], round: u32) -> MiniGame {
    mini_games[round as usize % mini_games.len()]
}

impl Session {
    pub fn is_final_round(&self) -> bool {
        self.round_number >= self.total_rounds
    }

    pub fn rounds_remaining(&self) -> u32 {
        if self.ended {
            0
        } else {
            self.total_rounds - self.round_number + 1
        }
    }

    /// Leave `Result`: either start counting the next round or end the match
    pub(super) fn close_round(&mut self) -> Advance {
        if self.is_final_round() {
            self.ended = true;
            return Advance::Ended;
        }

        self.round_number += 1;
        self.active_mini_game = mini_game_for_round(&self.mini_games, self.round_number);
        self.phase = Phase::Transition;
        Advance::Phase(Phase::Transition)
    }

    /// Enter `Intro` for a fresh round
    pub(super) fn begin_round(&mut self) {
        self.reset_completion();
        self.phase = Phase::Intro;
        tracing::info!(
            "Session {} starting round {} with {:?}",
            self.id,
            self.round_number,
            self.active_mini_game
        );
    }
}
