//! Legal states of a running game, the action vocabulary, and the table of
//! actions enabled in each state.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::EngineError;

/// Phase a game is in. Games only ever move forward through these phases;
/// [`GameState::End`] is terminal and absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameState {
    /// Players can join; nothing has started yet.
    Lobby,
    /// Fixed-length countdown before the next question opens.
    QuestionCountdown,
    /// The current question is answerable.
    QuestionOpen,
    /// The current question stopped accepting answers; scores are settled.
    QuestionClose,
    /// The correct answers for the closed question are displayed.
    AnswerShow,
    /// The final scoreboard is displayed.
    FinalResults,
    /// The game is over and only listed as inactive.
    End,
}

/// Admin- or timer-issued command requesting a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameAction {
    /// Start the countdown towards the next question.
    NextQuestion,
    /// Cut the countdown short and open the question immediately.
    SkipCountdown,
    /// Close the open question (when needed) and reveal the answers.
    GoToAnswer,
    /// Jump to the final scoreboard.
    GoToFinalResults,
    /// Terminate the game.
    End,
}

impl GameAction {
    /// Parse a wire action token. Unknown tokens are an [`EngineError::InvalidAction`],
    /// distinct from a recognised action arriving in the wrong state.
    pub fn parse(token: &str) -> Result<Self, EngineError> {
        match token {
            "NEXT_QUESTION" => Ok(Self::NextQuestion),
            "SKIP_COUNTDOWN" => Ok(Self::SkipCountdown),
            "GO_TO_ANSWER" => Ok(Self::GoToAnswer),
            "GO_TO_FINAL_RESULTS" => Ok(Self::GoToFinalResults),
            "END" => Ok(Self::End),
            _ => Err(EngineError::InvalidAction),
        }
    }
}

impl GameState {
    /// Actions permitted while a game is in this state.
    pub fn enabled_actions(self) -> &'static [GameAction] {
        use GameAction::*;

        match self {
            GameState::Lobby => &[End, NextQuestion],
            GameState::QuestionCountdown => &[End, SkipCountdown],
            GameState::QuestionOpen => &[End, GoToAnswer],
            GameState::QuestionClose => &[End, GoToFinalResults, GoToAnswer, NextQuestion],
            GameState::AnswerShow => &[End, GoToFinalResults, NextQuestion],
            GameState::FinalResults => &[End],
            GameState::End => &[],
        }
    }

    /// Whether `action` may be applied while in this state.
    pub fn permits(self, action: GameAction) -> bool {
        self.enabled_actions().contains(&action)
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameState::Lobby => "LOBBY",
            GameState::QuestionCountdown => "QUESTION_COUNTDOWN",
            GameState::QuestionOpen => "QUESTION_OPEN",
            GameState::QuestionClose => "QUESTION_CLOSE",
            GameState::AnswerShow => "ANSWER_SHOW",
            GameState::FinalResults => "FINAL_RESULTS",
            GameState::End => "END",
        };
        f.write_str(name)
    }
}

/// Validate that `action` is enabled in `state`, without mutating anything.
pub fn check_action(state: GameState, action: GameAction) -> Result<(), EngineError> {
    if !state.permits(action) {
        return Err(EngineError::IncompatibleState(format!(
            "action {action:?} cannot be applied in state {state}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_is_enabled_everywhere_except_end() {
        for state in [
            GameState::Lobby,
            GameState::QuestionCountdown,
            GameState::QuestionOpen,
            GameState::QuestionClose,
            GameState::AnswerShow,
            GameState::FinalResults,
        ] {
            assert!(state.permits(GameAction::End), "{state} should permit END");
        }
        assert!(GameState::End.enabled_actions().is_empty());
    }

    #[test]
    fn lobby_permits_only_end_and_next_question() {
        assert!(GameState::Lobby.permits(GameAction::NextQuestion));
        assert!(!GameState::Lobby.permits(GameAction::SkipCountdown));
        assert!(!GameState::Lobby.permits(GameAction::GoToAnswer));
        assert!(!GameState::Lobby.permits(GameAction::GoToFinalResults));
    }

    #[test]
    fn question_close_permits_every_forward_action() {
        let state = GameState::QuestionClose;
        assert!(state.permits(GameAction::GoToAnswer));
        assert!(state.permits(GameAction::GoToFinalResults));
        assert!(state.permits(GameAction::NextQuestion));
        assert!(!state.permits(GameAction::SkipCountdown));
    }

    #[test]
    fn check_action_rejects_disabled_action_with_incompatible_state() {
        let err = check_action(GameState::FinalResults, GameAction::NextQuestion).unwrap_err();
        assert!(matches!(err, EngineError::IncompatibleState(_)));
    }

    #[test]
    fn parse_accepts_known_tokens_and_rejects_garbage() {
        assert_eq!(
            GameAction::parse("NEXT_QUESTION").unwrap(),
            GameAction::NextQuestion
        );
        assert_eq!(GameAction::parse("END").unwrap(), GameAction::End);
        assert!(matches!(
            GameAction::parse("DO_A_BARREL_ROLL"),
            Err(EngineError::InvalidAction)
        ));
        // Tokens are case-sensitive.
        assert!(matches!(
            GameAction::parse("next_question"),
            Err(EngineError::InvalidAction)
        ));
    }
}
