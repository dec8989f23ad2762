//! Admin-facing payloads: starting a game from a quiz snapshot, driving the
//! state machine, and reading status/results.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::state::game::{AnswerOption, Game, GameId, Question, QuizSnapshot};
use crate::state::state_machine::GameState;

/// Body for starting a game: the auto-start threshold plus the validated
/// quiz snapshot the game will be frozen over. Quiz-level validation (name
/// rules, description length, question CRUD) happens upstream; the ranges
/// here only reject structurally unusable snapshots.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct StartGameRequest {
    /// Player count that triggers the automatic countdown; 0 disables it.
    pub auto_start_num: u32,
    /// Quiz contents to freeze for this game.
    #[validate(nested)]
    pub quiz: QuizInput,
}

/// Incoming quiz snapshot for a game start.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct QuizInput {
    /// Quiz name.
    #[validate(length(min = 1))]
    pub name: String,
    /// Quiz description.
    #[serde(default)]
    pub description: String,
    /// Ordered questions; emptiness is the engine's `QUIZ_IS_EMPTY` error,
    /// not a validation failure.
    #[validate(nested)]
    pub questions: Vec<QuestionInput>,
}

/// Incoming question definition.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct QuestionInput {
    /// Question text.
    #[validate(length(min = 1))]
    pub question: String,
    /// Seconds the question stays open.
    #[validate(range(min = 1, max = 180))]
    pub time_limit: u64,
    /// Points for the fastest correct answerer.
    #[validate(range(min = 1, max = 10))]
    pub points: u32,
    /// Ordered answer options.
    #[validate(nested)]
    pub answer_options: Vec<AnswerOptionInput>,
}

/// Incoming answer option definition.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AnswerOptionInput {
    /// Display text.
    #[validate(length(min = 1, max = 30))]
    pub answer: String,
    /// Whether this option belongs to the correct answer set.
    pub correct: bool,
}

/// Body for applying a state-machine action. The token is kept as a raw
/// string so unknown tokens surface as `INVALID_ACTION` rather than a
/// deserialization failure.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ActionRequest {
    /// Action token, e.g. `NEXT_QUESTION` or `END`.
    pub action: String,
}

/// Response carrying the id of a freshly started game.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameIdResponse {
    /// Id of the started game.
    pub game_id: GameId,
}

/// Active/inactive game id listing for one quiz.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameListResponse {
    /// Ids of games not yet in END state, ascending.
    pub active_games: Vec<GameId>,
    /// Ids of ended games, ascending.
    pub inactive_games: Vec<GameId>,
}

/// Full status of one game as seen by its admin.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameStatusResponse {
    /// Current phase.
    pub state: GameState,
    /// 1-based position of the active question (0 outside questions).
    pub at_question: usize,
    /// Player display names in join order.
    pub players: Vec<String>,
    /// The quiz snapshot the game was started from.
    pub metadata: QuizMetadata,
}

/// Admin view of the frozen quiz snapshot, correctness flags included.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuizMetadata {
    /// Id of the owning quiz.
    pub quiz_id: u64,
    /// Quiz name at start time.
    pub name: String,
    /// Quiz description at start time.
    pub description: String,
    /// Number of questions.
    pub num_questions: usize,
    /// Question details.
    pub questions: Vec<QuestionDetail>,
}

/// Admin view of one question.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionDetail {
    /// Question id.
    pub question_id: u64,
    /// Question text.
    pub question: String,
    /// Seconds the question stays open.
    pub time_limit: u64,
    /// Points for the fastest correct answerer.
    pub points: u32,
    /// Options with correctness flags.
    pub answer_options: Vec<AnswerOptionDetail>,
}

/// Admin view of one answer option.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnswerOptionDetail {
    /// Option id.
    pub answer_id: u64,
    /// Display text.
    pub answer: String,
    /// Display colour.
    pub colour: String,
    /// Whether this option is part of the correct answer set.
    pub correct: bool,
}

impl From<&AnswerOption> for AnswerOptionDetail {
    fn from(option: &AnswerOption) -> Self {
        Self {
            answer_id: option.answer_id,
            answer: option.answer.clone(),
            colour: option.colour.clone(),
            correct: option.correct,
        }
    }
}

impl From<&Question> for QuestionDetail {
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

impl From<&QuizSnapshot> for QuizMetadata {
    fn from(quiz: &QuizSnapshot) -> Self {
        Self {
            quiz_id: quiz.quiz_id,
            name: quiz.name.clone(),
            description: quiz.description.clone(),
            num_questions: quiz.questions.len(),
            questions: quiz.questions.iter().map(Into::into).collect(),
        }
    }
}

impl From<&Game> for GameStatusResponse {
    fn from(game: &Game) -> Self {
        Self {
            state: game.state,
            at_question: game.at_question,
            players: game.players.iter().map(|p| p.name.clone()).collect(),
            metadata: (&game.quiz).into(),
        }
    }
}
