use super::Session;
use crate::error::SessionError;
use crate::types::*;

/// Check if a phase transition is on the declared adjacency.
///
/// `Result -> Transition` is only taken while rounds remain; the other branch
/// of that fork ends the session and is not a phase.
pub fn is_valid_phase_transition(from: Phase, to: Phase) -> bool {
    use Phase::*;

    matches!(
        (from, to),
        (Intro, Answering)
            | (Answering, Voting)
            | (Voting, Revealing)
            | (Revealing, Result)
            | (Result, Transition)
            | (Transition, Intro)
    )
}

impl Session {
    /// The single legal next step, or `None` once the session has ended
    pub fn next_step(&self) -> Option<Advance> {
        if self.ended {
            return None;
        }

        let next = match self.phase {
            Phase::Result if self.is_final_round() => Advance::Ended,
            phase => {
                let to = Phase::ALL
                    .into_iter()
                    .find(|to| is_valid_phase_transition(phase, *to))?;
                Advance::Phase(to)
            }
        };
        Some(next)
    }

    /// Phases reachable from here right now (used by hosts to render controls)
    pub fn valid_transitions(&self) -> Vec<Phase> {
        match self.next_step() {
            Some(Advance::Phase(phase)) => vec![phase],
            _ => Vec::new(),
        }
    }

    /// Whether `advance()` would currently move the session into `target`
    pub fn can_advance(&self, target: Phase) -> bool {
        if self.next_step() != Some(Advance::Phase(target)) {
            return false;
        }
        !self.phase.is_gated() || self.is_phase_complete()
    }

    /// Move to the next phase once the completion predicate allows it
    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        self.ensure_active()?;
        self.ensure_unlocked()?;
        Ok(self.step())
    }

    /// Conditional advance after a completion mark: only for sessions created
    /// with `auto_advance`, and only once a gated phase is complete.
    pub fn settle(&mut self) -> Option<Advance> {
        if !self.auto_advance || self.ended || !self.phase.is_gated() {
            return None;
        }
        if !self.is_phase_complete() {
            return None;
        }
        self.advance().ok()
    }

    /// Host override: skips waiting on players but never skips a phase
    pub fn force_advance(&mut self, requested_by: &str) -> Result<Advance, SessionError> {
        self.ensure_host(requested_by)?;
        self.ensure_active()?;

        if self.phase.is_gated() && !self.is_phase_complete() {
            tracing::info!(
                "Host {} forcing {} forward with {} player(s) pending",
                requested_by,
                self.phase,
                self.waiting_on().len()
            );
        }
        Ok(self.step())
    }

    /// Host-driven move to an explicit phase. Bypasses the completion predicate
    /// like `force_advance`, but the target must be adjacent.
    pub fn transition_to(
        &mut self,
        requested_by: &str,
        target: Phase,
    ) -> Result<Advance, SessionError> {
        self.ensure_host(requested_by)?;
        self.ensure_active()?;

        if self.next_step() != Some(Advance::Phase(target)) {
            return Err(SessionError::InvalidTransition {
                from: self.phase,
                to: target,
            });
        }
        Ok(self.step())
    }

    fn ensure_host(&self, requested_by: &str) -> Result<(), SessionError> {
        if self.is_host(requested_by) {
            Ok(())
        } else {
            Err(SessionError::NotAuthorized(requested_by.to_string()))
        }
    }

    fn ensure_unlocked(&self) -> Result<(), SessionError> {
        if self.phase.is_gated() && !self.is_phase_complete() {
            return Err(SessionError::PhaseLocked {
                phase: self.phase,
                waiting_on: self.waiting_on().len(),
            });
        }
        Ok(())
    }

    /// Apply the next step. Callers have already checked it is allowed.
    fn step(&mut self) -> Advance {
        let from = self.phase;
        let advance = match from {
            Phase::Result => self.close_round(),
            Phase::Transition => {
                self.begin_round();
                Advance::Phase(Phase::Intro)
            }
            _ => {
                let to = match self.next_step() {
                    Some(Advance::Phase(to)) => to,
                    _ => from,
                };
                self.phase = to;
                Advance::Phase(to)
            }
        };
        self.bump_version();

        match advance {
            Advance::Phase(to) => tracing::info!(
                "Session {} round {}/{}: {} -> {}",
                self.id,
                self.round_number,
                self.total_rounds,
                from,
                to
            ),
            Advance::Ended => tracing::info!(
                "Session {} ended after {} round(s)",
                self.id,
                self.total_rounds
            ),
        }
        advance
    }
}
