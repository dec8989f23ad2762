//! Business logic powering the admin REST routes. These helpers coordinate
//! snapshot persistence, state-machine transitions, and timer scheduling
//! while honouring the single-mutation-at-a-time requirement.

use tracing::info;

use crate::{
    config::AppConfig,
    dto::{
        admin::{
            GameIdResponse, GameListResponse, GameStatusResponse, QuizInput, StartGameRequest,
        },
        common::GameResultsResponse,
    },
    error::EngineError,
    state::{
        SharedState,
        game::{AnswerOption, Game, GameId, GamesSnapshot, Question, QuizSnapshot},
        state_machine::{GameAction, GameState},
        transitions,
    },
};

/// Upper bound on the auto-start threshold.
const MAX_AUTO_START: u32 = 50;
/// Maximum number of non-ended games allowed per quiz.
const MAX_ACTIVE_GAMES: usize = 10;

/// Start a new game over a frozen copy of the given quiz.
pub async fn start_game(
    state: &SharedState,
    quiz_id: u64,
    request: StartGameRequest,
) -> Result<GameIdResponse, EngineError> {
    if request.auto_start_num > MAX_AUTO_START {
        return Err(EngineError::InvalidAutoStart);
    }

    let _gate = state.gate().lock().await;
    let mut games = state.store().load().await?;

    let active = games
        .games
        .iter()
        .filter(|game| game.quiz.quiz_id == quiz_id && game.is_active())
        .count();
    if active >= MAX_ACTIVE_GAMES {
        return Err(EngineError::TooManyActiveGames);
    }
    if request.quiz.questions.is_empty() {
        return Err(EngineError::EmptyQuiz);
    }

    let game_id = games.next_game_id();
    let snapshot = build_quiz_snapshot(state.config(), quiz_id, request.quiz);
    games
        .games
        .push(Game::new(game_id, snapshot, request.auto_start_num));
    state.store().persist(games).await?;

    info!(game_id, quiz_id, "game started");
    Ok(GameIdResponse { game_id })
}

/// Apply a state-machine action to a game of this quiz.
pub async fn apply_action(
    state: &SharedState,
    quiz_id: u64,
    game_id: GameId,
    action_token: &str,
) -> Result<(), EngineError> {
    let _gate = state.gate().lock().await;
    let mut games = state.store().load().await?;

    let game = games.game(game_id)?;
    if game.quiz.quiz_id != quiz_id {
        return Err(EngineError::InvalidGameId);
    }
    let action = GameAction::parse(action_token)?;

    transitions::apply_action(state, &mut games, game_id, action).await
}

/// Current status of a game: state, position, players, frozen quiz metadata.
pub async fn game_status(
    state: &SharedState,
    quiz_id: u64,
    game_id: GameId,
) -> Result<GameStatusResponse, EngineError> {
    let games = state.store().load().await?;
    let game = games.game(game_id)?;
    if game.quiz.quiz_id != quiz_id {
        return Err(EngineError::InvalidGameId);
    }
    Ok(game.into())
}

/// Final results of a game; only readable once the scoreboard is up.
pub async fn game_results(
    state: &SharedState,
    quiz_id: u64,
    game_id: GameId,
) -> Result<GameResultsResponse, EngineError> {
    let games = state.store().load().await?;
    let game = games.game(game_id)?;
    if game.quiz.quiz_id != quiz_id {
        return Err(EngineError::InvalidGameId);
    }
    if game.state != GameState::FinalResults {
        return Err(EngineError::IncompatibleState(
            "game is not in FINAL_RESULTS state".into(),
        ));
    }
    Ok(game.into())
}

/// Ascending id lists of the quiz's active and ended games.
pub async fn list_games(state: &SharedState, quiz_id: u64) -> Result<GameListResponse, EngineError> {
    let games = state.store().load().await?;

    let mut active_games: Vec<GameId> = games
        .games
        .iter()
        .filter(|game| game.quiz.quiz_id == quiz_id && game.is_active())
        .map(|game| game.game_id)
        .collect();
    active_games.sort_unstable();

    let mut inactive_games: Vec<GameId> = games
        .games
        .iter()
        .filter(|game| game.quiz.quiz_id == quiz_id && !game.is_active())
        .map(|game| game.game_id)
        .collect();
    inactive_games.sort_unstable();

    Ok(GameListResponse {
        active_games,
        inactive_games,
    })
}

/// Global reset: synchronously cancel every outstanding timer, then discard
/// all games.
pub async fn reset(state: &SharedState) -> Result<(), EngineError> {
    let _gate = state.gate().lock().await;
    state.timers().cancel_all();
    state.store().persist(GamesSnapshot::default()).await?;
    info!("reset: all games discarded and timers cancelled");
    Ok(())
}

/// Freeze the incoming quiz into the per-game snapshot, assigning stable ids
/// in creation order and palette colours to the answer options.
fn build_quiz_snapshot(config: &AppConfig, quiz_id: u64, quiz: QuizInput) -> QuizSnapshot {
    let mut next_answer_id: u64 = 0;
    let questions = quiz
        .questions
        .into_iter()
        .enumerate()
        .map(|(index, question)| {
            let answer_options = question
                .answer_options
                .into_iter()
                .map(|option| {
                    next_answer_id += 1;
                    AnswerOption {
                        answer_id: next_answer_id,
                        answer: option.answer,
                        colour: config.random_colour(),
                        correct: option.correct,
                    }
                })
                .collect();
            Question {
                question_id: index as u64 + 1,
                question: question.question,
                time_limit: question.time_limit,
                points: question.points,
                answer_options,
            }
        })
        .collect();

    QuizSnapshot {
        quiz_id,
        name: quiz.name,
        description: quiz.description,
        questions,
    }
}
