//! Domain types for a running game: the immutable quiz snapshot taken at
//! start time, the mutable game record, and the container persisted as a
//! whole by the snapshot store.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::state::state_machine::GameState;

/// Identifier of a game, unique per process lifetime.
pub type GameId = u64;
/// Identifier of a player, unique within the owning game.
pub type PlayerId = u64;

/// Per-game player id counters start at `game_id * PLAYER_ID_STRIDE` so ids
/// from different games never collide in practice while staying stable,
/// distinct integers in join order.
const PLAYER_ID_STRIDE: u64 = 100;

/// One selectable answer of a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerOption {
    /// Stable id assigned when the snapshot is built.
    pub answer_id: u64,
    /// Display text.
    pub answer: String,
    /// Display colour drawn from the configured palette.
    pub colour: String,
    /// Whether this option is part of the correct answer set. Never exposed
    /// to players.
    pub correct: bool,
}

/// One timed multiple-choice question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Stable id assigned when the snapshot is built.
    pub question_id: u64,
    /// Question text.
    pub question: String,
    /// Seconds the question stays open before auto-closing.
    pub time_limit: u64,
    /// Points awarded to the fastest correct answerer.
    pub points: u32,
    /// Ordered answer options.
    pub answer_options: Vec<AnswerOption>,
}

impl Question {
    /// Ids of the options flagged correct, sorted ascending.
    pub fn correct_answer_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self
            .answer_options
            .iter()
            .filter(|option| option.correct)
            .map(|option| option.answer_id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

/// Immutable copy of the quiz captured when the game starts. Later edits to
/// the quiz never affect games already launched from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSnapshot {
    /// Id of the owning quiz.
    pub quiz_id: u64,
    /// Quiz name at start time.
    pub name: String,
    /// Quiz description at start time.
    pub description: String,
    /// Ordered questions.
    pub questions: Vec<Question>,
}

/// A guest player inside one game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Id unique within the game, assigned at join time.
    pub player_id: PlayerId,
    /// Display name, unique within the game (case-sensitive).
    pub name: String,
    /// Cumulative score; never decreases.
    pub score: u32,
}

/// Aggregated outcome of a single question, created when the question opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionResult {
    /// Id of the question this result belongs to.
    pub question_id: u64,
    /// Names of players whose latest submission was fully correct, in
    /// first-correct-first order.
    pub players_correct: Vec<String>,
    /// Arithmetic mean of submitted answer latencies, rounded to whole
    /// seconds; 0 when nobody answered.
    pub average_answer_time: u64,
    /// Integer percentage of players that answered correctly.
    pub percent_correct: u32,
}

impl QuestionResult {
    /// Empty result recorded the moment a question opens.
    pub fn empty(question_id: u64) -> Self {
        Self {
            question_id,
            players_correct: Vec::new(),
            average_answer_time: 0,
            percent_correct: 0,
        }
    }
}

/// One row of the ranking table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    /// Player display name.
    pub name: String,
    /// Cumulative score mirrored from the player record.
    pub score: u32,
}

/// Mutable state of one live run-through of a quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    /// Process-unique id, assigned as `max existing + 1`.
    pub game_id: GameId,
    /// Quiz contents frozen at start time.
    pub quiz: QuizSnapshot,
    /// Current phase.
    pub state: GameState,
    /// Player count that triggers the automatic countdown; 0 disables it.
    pub auto_start_num: u32,
    /// 1-based index of the question currently (or most recently) active;
    /// 0 before the first question and after a results/end reset.
    pub at_question: usize,
    /// Unix seconds at which the current question opened.
    pub question_open_time: Option<i64>,
    /// Latest answer latency in seconds per player, for the open question
    /// only. Resubmissions overwrite; insertion order is preserved.
    pub answer_times: IndexMap<PlayerId, u64>,
    /// Players in join order.
    pub players: Vec<Player>,
    /// One result per opened question, in opening order.
    pub question_results: Vec<QuestionResult>,
    /// Ranking table, re-sorted (stable, descending) at every question close.
    pub ranking: Vec<RankingEntry>,
    next_player_id: PlayerId,
}

impl Game {
    /// Create a game in the lobby over a frozen quiz snapshot.
    pub fn new(game_id: GameId, quiz: QuizSnapshot, auto_start_num: u32) -> Self {
        Self {
            game_id,
            quiz,
            state: GameState::Lobby,
            auto_start_num,
            at_question: 0,
            question_open_time: None,
            answer_times: IndexMap::new(),
            players: Vec::new(),
            question_results: Vec::new(),
            ranking: Vec::new(),
            next_player_id: game_id * PLAYER_ID_STRIDE,
        }
    }

    /// Number of questions in the frozen snapshot.
    pub fn num_questions(&self) -> usize {
        self.quiz.questions.len()
    }

    /// A game counts as active for listing purposes until it reaches END.
    pub fn is_active(&self) -> bool {
        self.state != GameState::End
    }

    /// Take the next player id from the per-game counter.
    pub fn allocate_player_id(&mut self) -> PlayerId {
        let id = self.next_player_id;
        self.next_player_id += 1;
        id
    }

    /// Look up a player of this game by id.
    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.player_id == player_id)
    }

    /// Whether a display name is already taken in this game (exact match).
    pub fn has_player_name(&self, name: &str) -> bool {
        self.players.iter().any(|p| p.name == name)
    }
}

/// Authoritative collection of every game; the unit of persistence. Every
/// mutation is followed by a durable write of the whole snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GamesSnapshot {
    /// All games ever started since the last reset, ended ones included.
    pub games: Vec<Game>,
}

impl GamesSnapshot {
    /// Next free game id: one past the current maximum, starting at 1.
    pub fn next_game_id(&self) -> GameId {
        self.games
            .iter()
            .map(|game| game.game_id)
            .max()
            .map_or(1, |max| max + 1)
    }

    /// Borrow a game by id.
    pub fn game(&self, game_id: GameId) -> Result<&Game, EngineError> {
        self.games
            .iter()
            .find(|game| game.game_id == game_id)
            .ok_or(EngineError::InvalidGameId)
    }

    /// Mutably borrow a game by id.
    pub fn game_mut(&mut self, game_id: GameId) -> Result<&mut Game, EngineError> {
        self.games
            .iter_mut()
            .find(|game| game.game_id == game_id)
            .ok_or(EngineError::InvalidGameId)
    }

    /// Find the game owning a player id by scanning all games.
    pub fn game_by_player(&self, player_id: PlayerId) -> Result<&Game, EngineError> {
        self.games
            .iter()
            .find(|game| game.player(player_id).is_some())
            .ok_or(EngineError::InvalidPlayerId)
    }

    /// Mutable variant of [`Self::game_by_player`].
    pub fn game_by_player_mut(&mut self, player_id: PlayerId) -> Result<&mut Game, EngineError> {
        self.games
            .iter_mut()
            .find(|game| game.player(player_id).is_some())
            .ok_or(EngineError::InvalidPlayerId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with_one_question() -> QuizSnapshot {
        QuizSnapshot {
            quiz_id: 7,
            name: "Capitals".into(),
            description: String::new(),
            questions: vec![Question {
                question_id: 1,
                question: "Capital of France?".into(),
                time_limit: 10,
                points: 5,
                answer_options: vec![
                    AnswerOption {
                        answer_id: 2,
                        answer: "Paris".into(),
                        colour: "red".into(),
                        correct: true,
                    },
                    AnswerOption {
                        answer_id: 1,
                        answer: "Lyon".into(),
                        colour: "blue".into(),
                        correct: false,
                    },
                ],
            }],
        }
    }

    #[test]
    fn game_ids_are_max_plus_one() {
        let mut snapshot = GamesSnapshot::default();
        assert_eq!(snapshot.next_game_id(), 1);

        snapshot
            .games
            .push(Game::new(4, snapshot_with_one_question(), 0));
        assert_eq!(snapshot.next_game_id(), 5);
    }

    #[test]
    fn player_ids_are_monotonic_within_the_game() {
        let mut game = Game::new(3, snapshot_with_one_question(), 0);
        assert_eq!(game.allocate_player_id(), 300);
        assert_eq!(game.allocate_player_id(), 301);
        assert_eq!(game.allocate_player_id(), 302);
    }

    #[test]
    fn correct_answer_ids_are_sorted() {
        let quiz = snapshot_with_one_question();
        assert_eq!(quiz.questions[0].correct_answer_ids(), vec![2]);
    }

    #[test]
    fn unknown_lookups_map_to_typed_errors() {
        let snapshot = GamesSnapshot::default();
        assert!(matches!(snapshot.game(9), Err(EngineError::InvalidGameId)));
        assert!(matches!(
            snapshot.game_by_player(900),
            Err(EngineError::InvalidPlayerId)
        ));
    }
}
