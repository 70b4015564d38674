use super::Session;
use crate::error::SessionError;
use crate::types::*;

impl Session {
    /// Set a player's completion flag for the active phase.
    ///
    /// Bots may be marked too so their simulated actions are kept, but the
    /// completion predicate never waits for them.
    pub fn mark_player_state(
        &mut self,
        player_id: &str,
        new_state: CompletionState,
    ) -> Result<(), SessionError> {
        self.ensure_active()?;
        let idx = self.player_index(player_id)?;
        if !self.phase.accepts(new_state) {
            return Err(SessionError::InvalidStateForPhase {
                state: new_state,
                phase: self.phase,
            });
        }

        let player = &mut self.players[idx];
        tracing::debug!(
            "Player {} ({:?}) marked {:?} during {}",
            player.player_id,
            player.role,
            new_state,
            self.phase
        );
        player.completion_state = new_state;
        self.bump_version();
        Ok(())
    }

    /// Toggle readiness between phases
    pub fn set_ready(&mut self, player_id: &str, ready: bool) -> Result<(), SessionError> {
        let state = if ready {
            CompletionState::Ready
        } else {
            CompletionState::Idle
        };
        self.mark_player_state(player_id, state)
    }

    /// True when every human reached the target state of the current phase.
    /// Phases without a target are always complete.
    pub fn is_phase_complete(&self) -> bool {
        match self.phase.completion_target() {
            Some(target) => self
                .players
                .iter()
                .all(|p| p.is_bot() || p.completion_state == target),
            None => true,
        }
    }

    /// Humans the current phase is still waiting on, in seat order
    pub fn waiting_on(&self) -> Vec<PlayerId> {
        let Some(target) = self.phase.completion_target() else {
            return Vec::new();
        };

        self.players
            .iter()
            .filter(|p| !p.is_bot() && p.completion_state != target)
            .map(|p| p.player_id.clone())
            .collect()
    }

    /// Put everyone back to `Idle` and forget this round's answers and votes
    pub(super) fn reset_completion(&mut self) {
        for player in &mut self.players {
            player.completion_state = CompletionState::Idle;
        }
        self.answers.clear();
        self.votes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;

    #[test]
    fn test_mark_unknown_player() {
        let mut session = session_in(Phase::Answering, humans(&["alice"]));

        let err = session
            .mark_player_state("ghost", CompletionState::Answered)
            .unwrap_err();
        assert_eq!(err, SessionError::UnknownPlayer("ghost".to_string()));
    }

    #[test]
    fn test_mark_wrong_state_for_phase() {
        let mut session = session_in(Phase::Answering, humans(&["alice"]));
        let version = session.version();

        let err = session
            .mark_player_state("alice", CompletionState::Voted)
            .unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidStateForPhase {
                state: CompletionState::Voted,
                phase: Phase::Answering
            }
        );
        assert_eq!(
            session.player("alice").unwrap().completion_state,
            CompletionState::Idle
        );
        assert_eq!(session.version(), version);
    }

    #[test]
    fn test_ready_only_between_gated_phases() {
        let mut session = session_in(Phase::Intro, humans(&["alice"]));
        session.set_ready("alice", true).unwrap();
        assert_eq!(
            session.player("alice").unwrap().completion_state,
            CompletionState::Ready
        );
        session.set_ready("alice", false).unwrap();
        assert_eq!(
            session.player("alice").unwrap().completion_state,
            CompletionState::Idle
        );

        let mut session = session_in(Phase::Voting, humans(&["alice"]));
        assert!(matches!(
            session.set_ready("alice", true),
            Err(SessionError::InvalidStateForPhase { .. })
        ));
    }

    #[test]
    fn test_complete_when_all_humans_answered() {
        let mut session = session_in(Phase::Answering, humans(&["alice", "bob"]));
        assert!(!session.is_phase_complete());
        assert_eq!(session.waiting_on(), vec!["alice", "bob"]);

        session
            .mark_player_state("bob", CompletionState::Answered)
            .unwrap();
        assert!(!session.is_phase_complete());
        assert_eq!(session.waiting_on(), vec!["alice"]);

        session
            .mark_player_state("alice", CompletionState::Answered)
            .unwrap();
        assert!(session.is_phase_complete());
        assert!(session.waiting_on().is_empty());
    }

    #[test]
    fn test_bots_never_block_completion() {
        let players = vec![
            PlayerSpec::human("alice"),
            PlayerSpec::bot("bot-1"),
            PlayerSpec::bot("bot-2"),
        ];
        let mut session = session_in(Phase::Answering, players);

        session
            .mark_player_state("alice", CompletionState::Answered)
            .unwrap();
        assert!(session.is_phase_complete());
        assert!(session
            .players()
            .iter()
            .filter(|p| p.is_bot())
            .all(|p| p.completion_state == CompletionState::Idle));
    }

    #[test]
    fn test_all_bot_session_is_always_complete() {
        let players = vec![PlayerSpec::bot("bot-1"), PlayerSpec::bot("bot-2")];
        let session = session_in(Phase::Voting, players);
        assert!(session.is_phase_complete());
    }

    #[test]
    fn test_bot_marks_are_recorded() {
        let players = vec![PlayerSpec::human("alice"), PlayerSpec::bot("bot-1")];
        let mut session = session_in(Phase::Answering, players);

        session
            .mark_player_state("bot-1", CompletionState::Answered)
            .unwrap();
        assert_eq!(
            session.player("bot-1").unwrap().completion_state,
            CompletionState::Answered
        );
        assert!(!session.is_phase_complete());
    }

    #[test]
    fn test_ungated_phases_are_complete() {
        for phase in [Phase::Intro, Phase::Revealing, Phase::Result] {
            let session = session_in(phase, humans(&["alice", "bob"]));
            assert!(session.is_phase_complete(), "{phase} should be complete");
        }
    }
}
