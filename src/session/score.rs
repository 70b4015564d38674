use super::Session;
use crate::error::SessionError;
use crate::types::*;

impl Session {
    /// Add points to a player. Only allowed while revealing or showing results,
    /// and scores only ever grow. Returns the player's new total.
    pub fn award_points(&mut self, player_id: &str, amount: u32) -> Result<u32, SessionError> {
        self.ensure_active()?;
        if !self.phase.allows_scoring() {
            return Err(SessionError::InvalidPhaseForScoring(self.phase));
        }
        let idx = self.player_index(player_id)?;

        let player = &mut self.players[idx];
        player.score = player.score.saturating_add(amount);
        let total = player.score;
        self.bump_version();

        tracing::debug!("Awarded {} point(s) to {} (total {})", amount, player_id, total);
        Ok(total)
    }

    /// Turn this round's votes into points, once per round.
    /// Returns (player, points) for each award made; empty if already scored.
    pub fn score_round_votes(
        &mut self,
        points_per_vote: u32,
    ) -> Result<Vec<(PlayerId, u32)>, SessionError> {
        self.ensure_active()?;
        if !self.phase.allows_scoring() {
            return Err(SessionError::InvalidPhaseForScoring(self.phase));
        }
        if self.scored_round == Some(self.round_number) {
            return Ok(Vec::new());
        }

        // Seat order keeps the awards deterministic
        let tally = self.vote_tally();
        let awards: Vec<(PlayerId, u32)> = self
            .players
            .iter()
            .filter_map(|p| {
                tally
                    .get(&p.player_id)
                    .map(|votes| (p.player_id.clone(), votes.saturating_mul(points_per_vote)))
            })
            .collect();

        for (player_id, points) in &awards {
            self.award_points(player_id, *points)?;
        }
        self.scored_round = Some(self.round_number);
        self.bump_version();

        tracing::info!(
            "Scored round {} of session {}: {} award(s)",
            self.round_number,
            self.id,
            awards.len()
        );
        Ok(awards)
    }

    /// Players by score, highest first. Ties keep seat order and share a rank.
    pub fn leaderboard(&self) -> Vec<Standing> {
        let mut sorted: Vec<&SessionPlayer> = self.players.iter().collect();
        sorted.sort_by(|a, b| b.score.cmp(&a.score));

        let mut standings: Vec<Standing> = Vec::with_capacity(sorted.len());
        for (i, player) in sorted.into_iter().enumerate() {
            let rank = match standings.last() {
                Some(prev) if prev.score == player.score => prev.rank,
                _ => i as u32 + 1,
            };
            standings.push(Standing {
                player_id: player.player_id.clone(),
                role: player.role,
                display_name: player.display_name.clone(),
                score: player.score,
                rank,
            });
        }
        standings
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;

    #[test]
    fn test_award_points_in_scoring_phases() {
        let mut session = session_in(Phase::Revealing, humans(&["alice", "bob"]));
        assert_eq!(session.award_points("alice", 100).unwrap(), 100);

        session.advance().unwrap();
        assert_eq!(session.phase(), Phase::Result);
        assert_eq!(session.award_points("alice", 50).unwrap(), 150);
        assert_eq!(session.player("alice").unwrap().score, 150);
    }

    #[test]
    fn test_award_points_rejected_outside_scoring_phases() {
        for phase in [Phase::Intro, Phase::Answering, Phase::Voting, Phase::Transition] {
            let mut session = session_in(phase, humans(&["alice"]));
            let err = session.award_points("alice", 10).unwrap_err();
            assert_eq!(err, SessionError::InvalidPhaseForScoring(phase));
            assert_eq!(session.player("alice").unwrap().score, 0);
        }
    }

    #[test]
    fn test_award_points_unknown_player() {
        let mut session = session_in(Phase::Result, humans(&["alice"]));
        assert_eq!(
            session.award_points("ghost", 10),
            Err(SessionError::UnknownPlayer("ghost".to_string()))
        );
    }

    #[test]
    fn test_score_round_votes_is_idempotent() {
        let mut session = session_in(Phase::Voting, humans(&["alice", "bob", "carol"]));
        session.submit_vote("alice", "carol").unwrap();
        session.submit_vote("bob", "carol").unwrap();
        session.submit_vote("carol", "bob").unwrap();
        session.advance().unwrap();

        let awards = session.score_round_votes(100).unwrap();
        assert_eq!(
            awards,
            vec![("bob".to_string(), 100), ("carol".to_string(), 200)]
        );

        session.advance().unwrap();
        assert!(session.score_round_votes(100).unwrap().is_empty());
        assert_eq!(session.player("carol").unwrap().score, 200);
    }

    #[test]
    fn test_leaderboard_ranks_ties() {
        let mut session = session_in(Phase::Result, humans(&["alice", "bob", "carol"]));
        session.award_points("bob", 300).unwrap();
        session.award_points("carol", 300).unwrap();
        session.award_points("alice", 100).unwrap();

        let board = session.leaderboard();
        let order: Vec<_> = board
            .iter()
            .map(|s| (s.player_id.as_str(), s.rank))
            .collect();
        assert_eq!(order, vec![("bob", 1), ("carol", 1), ("alice", 3)]);
    }
}
