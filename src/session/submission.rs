use super::Session;
use crate::error::SessionError;
use crate::types::*;
use std::collections::HashMap;

impl Session {
    /// Record an answer and mark the author `Answered`.
    /// Answering again in the same phase replaces the earlier answer.
    pub fn submit_answer(&mut self, player_id: &str, content: String) -> Result<(), SessionError> {
        self.mark_player_state(player_id, CompletionState::Answered)?;
        self.answers.insert(player_id.to_string(), content);
        Ok(())
    }

    /// Answers recorded this round, by author
    pub fn answers(&self) -> &HashMap<PlayerId, String> {
        &self.answers
    }

    pub fn answer_of(&self, player_id: &str) -> Option<&str> {
        self.answers.get(player_id).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;

    #[test]
    fn test_submit_answer_records_content() {
        let mut session = session_in(Phase::Answering, humans(&["alice", "bob"]));

        session.submit_answer("alice", "a llama".to_string()).unwrap();
        assert_eq!(session.answer_of("alice"), Some("a llama"));
        assert_eq!(
            session.player("alice").unwrap().completion_state,
            CompletionState::Answered
        );

        session.submit_answer("alice", "two llamas".to_string()).unwrap();
        assert_eq!(session.answer_of("alice"), Some("two llamas"));
        assert_eq!(session.answers().len(), 1);
    }

    #[test]
    fn test_submit_answer_outside_answering_records_nothing() {
        let mut session = session_in(Phase::Intro, humans(&["alice"]));

        let err = session
            .submit_answer("alice", "too early".to_string())
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidStateForPhase { .. }));
        assert!(session.answers().is_empty());
    }
}
