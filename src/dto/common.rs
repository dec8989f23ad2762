//! Result projections returned both to admins and to players.

use serde::Serialize;
use utoipa::ToSchema;

use crate::state::game::{Game, QuestionResult, RankingEntry};

/// Empty JSON object returned by endpoints with no payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct EmptyResponse {}

/// One row of the ranking table.
#[derive(Debug, Serialize, ToSchema)]
pub struct RankingEntryDto {
    /// Player display name.
    pub name: String,
    /// Cumulative score.
    pub score: u32,
}

/// Settled outcome of one question.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionResultDto {
    /// Id of the question.
    pub question_id: u64,
    /// Names of correct answerers, first-correct-first.
    pub players_correct: Vec<String>,
    /// Mean answer latency in whole seconds (0 when nobody answered).
    pub average_answer_time: u64,
    /// Integer percentage of players that answered correctly.
    pub percent_correct: u32,
}

/// Full game results: ranking plus every settled question result.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameResultsResponse {
    /// Ranking table, descending by score.
    pub users_ranked_by_score: Vec<RankingEntryDto>,
    /// Results for every opened question, in question order.
    pub question_results: Vec<QuestionResultDto>,
}

impl From<&RankingEntry> for RankingEntryDto {
    fn from(entry: &RankingEntry) -> Self {
        Self {
            name: entry.name.clone(),
            score: entry.score,
        }
    }
}

impl From<&QuestionResult> for QuestionResultDto {
    fn from(result: &QuestionResult) -> Self {
        Self {
            question_id: result.question_id,
            players_correct: result.players_correct.clone(),
            average_answer_time: result.average_answer_time,
            percent_correct: result.percent_correct,
        }
    }
}

impl From<&Game> for GameResultsResponse {
    fn from(game: &Game) -> Self {
        Self {
            users_ranked_by_score: game.ranking.iter().map(Into::into).collect(),
            question_results: game.question_results.iter().map(Into::into).collect(),
        }
    }
}
