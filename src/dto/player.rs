//! Player-facing payloads. Question views deliberately omit correctness
//! flags; players only learn outcomes through the results endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::game::{AnswerOption, Game, GameId, PlayerId, Question};
use crate::state::state_machine::GameState;

/// Body for a guest player joining a game lobby.
#[derive(Debug, Deserialize, ToSchema)]
pub struct JoinRequest {
    /// Id of the game to join.
    pub game_id: GameId,
    /// Requested display name; an empty string requests a generated one.
    #[serde(default)]
    pub name: String,
}

/// Response carrying the id assigned to the joining player.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerIdResponse {
    /// Player id, unique within the game.
    pub player_id: PlayerId,
}

/// Coarse game status as visible to one player.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerStatusResponse {
    /// Current phase of the owning game.
    pub state: GameState,
    /// Total number of questions in the game.
    pub num_questions: usize,
    /// 1-based position of the active question (0 outside questions).
    pub at_question: usize,
}

/// Body for submitting the selected answer option ids.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitAnswersRequest {
    /// Selected option ids; must be non-empty and duplicate-free.
    pub answer_ids: Vec<u64>,
}

/// Player view of the question currently open or under review.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionViewResponse {
    /// Question id.
    pub question_id: u64,
    /// Question text.
    pub question: String,
    /// Seconds the question stays open.
    pub time_limit: u64,
    /// Points at stake.
    pub points: u32,
    /// Options without correctness flags.
    pub answer_options: Vec<AnswerOptionView>,
}

/// Player view of one answer option.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnswerOptionView {
    /// Option id.
    pub answer_id: u64,
    /// Display text.
    pub answer: String,
    /// Display colour.
    pub colour: String,
}

impl From<&AnswerOption> for AnswerOptionView {
    fn from(option: &AnswerOption) -> Self {
        Self {
            answer_id: option.answer_id,
            answer: option.answer.clone(),
            colour: option.colour.clone(),
        }
    }
}

impl From<&Question> for QuestionViewResponse {
    fn from(question: &Question) -> Self {
        Self {
            question_id: question.question_id,
            question: question.question.clone(),
            time_limit: question.time_limit,
            points: question.points,
            answer_options: question.answer_options.iter().map(Into::into).collect(),
        }
    }
}

impl From<&Game> for PlayerStatusResponse {
    fn from(game: &Game) -> Self {
        Self {
            state: game.state,
            num_questions: game.num_questions(),
            at_question: game.at_question,
        }
    }
}
