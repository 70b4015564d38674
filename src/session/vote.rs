use super::Session;
use crate::error::SessionError;
use crate::types::*;
use std::collections::HashMap;

impl Session {
    /// Record a vote for `target_id` and mark the voter `Voted`
    pub fn submit_vote(&mut self, player_id: &str, target_id: &str) -> Result<(), SessionError> {
        self.ensure_active()?;
        self.player_index(target_id)?;
        self.mark_player_state(player_id, CompletionState::Voted)?;
        self.votes
            .insert(player_id.to_string(), target_id.to_string());
        Ok(())
    }

    pub fn vote_of(&self, player_id: &str) -> Option<&PlayerId> {
        self.votes.get(player_id)
    }

    /// Aggregate votes for the current round: target -> votes received
    pub fn vote_tally(&self) -> HashMap<PlayerId, u32> {
        let mut counts: HashMap<PlayerId, u32> = HashMap::new();
        for target in self.votes.values() {
            *counts.entry(target.clone()).or_insert(0) += 1;
        }
        counts
    }
}
