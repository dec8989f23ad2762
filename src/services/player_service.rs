//! Business logic powering the guest player routes: joining a lobby,
//! reading the current question, submitting answers, and reading results.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use tracing::info;

use crate::{
    dto::{
        common::{GameResultsResponse, QuestionResultDto},
        player::{JoinRequest, PlayerIdResponse, PlayerStatusResponse, QuestionViewResponse},
    },
    error::EngineError,
    state::{
        SharedState,
        game::{Game, Player, PlayerId, RankingEntry},
        state_machine::GameState,
        transitions,
    },
};

/// Letters in a generated display name.
const GENERATED_NAME_LETTERS: usize = 5;
/// Digits appended to a generated display name.
const GENERATED_NAME_DIGITS: usize = 3;

/// Join a lobby as a guest player. An empty name requests a generated one.
/// Reaching the auto-start threshold launches the countdown immediately.
pub async fn join(state: &SharedState, request: JoinRequest) -> Result<PlayerIdResponse, EngineError> {
    let JoinRequest { game_id, name } = request;

    let _gate = state.gate().lock().await;
    let mut games = state.store().load().await?;

    let (player_id, auto_start) = {
        let game = games.game_mut(game_id)?;
        if game.state != GameState::Lobby {
            return Err(EngineError::IncompatibleState(
                "game is not in LOBBY state".into(),
            ));
        }
        if !is_valid_player_name(&name) {
            return Err(EngineError::InvalidPlayerName(
                "name contains characters other than alphanumerics and spaces".into(),
            ));
        }
        if !name.is_empty() && game.has_player_name(&name) {
            return Err(EngineError::InvalidPlayerName(
                "name is already taken in this game".into(),
            ));
        }

        let name = if name.is_empty() {
            generate_player_name(game)
        } else {
            name
        };
        let player_id = game.allocate_player_id();
        game.players.push(Player {
            player_id,
            name: name.clone(),
            score: 0,
        });
        game.ranking.push(RankingEntry { name, score: 0 });

        let auto_start = game.auto_start_num != 0
            && game.players.len() as u32 >= game.auto_start_num
            && !state.timers().is_pending(game_id);
        (player_id, auto_start)
    };

    if auto_start {
        // The countdown transition persists the snapshot itself.
        transitions::question_countdown(state, &mut games, game_id).await?;
    } else {
        state.store().persist(games).await?;
    }

    info!(game_id, player_id, "player joined");
    Ok(PlayerIdResponse { player_id })
}

/// Coarse status of the game the player belongs to.
pub async fn player_status(
    state: &SharedState,
    player_id: PlayerId,
) -> Result<PlayerStatusResponse, EngineError> {
    let games = state.store().load().await?;
    let game = games.game_by_player(player_id)?;
    Ok(game.into())
}

/// The question currently in play, without correctness flags.
pub async fn question_info(
    state: &SharedState,
    player_id: PlayerId,
    position: usize,
) -> Result<QuestionViewResponse, EngineError> {
    let games = state.store().load().await?;
    let game = games.game_by_player(player_id)?;

    ensure_question_visible(game)?;
    check_current_position(game, position)?;
    let question = game
        .quiz
        .questions
        .get(position - 1)
        .ok_or_else(|| EngineError::InvalidPosition("no such question exists".into()))?;
    Ok(question.into())
}

/// Record (or replace) a player's answer selection for the open question.
pub async fn submit_answers(
    state: &SharedState,
    player_id: PlayerId,
    position: usize,
    answer_ids: Vec<u64>,
) -> Result<(), EngineError> {
    let _gate = state.gate().lock().await;
    let mut games = state.store().load().await?;

    let game = games.game_by_player_mut(player_id)?;
    check_current_position(game, position)?;
    if game.state != GameState::QuestionOpen {
        return Err(EngineError::IncompatibleState(
            "answers can only be submitted while the question is open".into(),
        ));
    }

    let question = game
        .quiz
        .questions
        .get(position - 1)
        .ok_or_else(|| EngineError::InvalidPosition("no such question exists".into()))?;

    let known: HashSet<u64> = question
        .answer_options
        .iter()
        .map(|option| option.answer_id)
        .collect();
    if answer_ids.iter().any(|id| !known.contains(id)) {
        return Err(EngineError::InvalidAnswerIds(
            "answer ids are not valid for this question".into(),
        ));
    }
    let distinct: HashSet<u64> = answer_ids.iter().copied().collect();
    if distinct.len() != answer_ids.len() {
        return Err(EngineError::InvalidAnswerIds(
            "duplicate answer ids were submitted".into(),
        ));
    }
    if answer_ids.is_empty() {
        return Err(EngineError::InvalidAnswerIds(
            "at least one answer id must be submitted".into(),
        ));
    }

    let correct_ids = question.correct_answer_ids();
    let question_id = question.question_id;

    let mut submitted = answer_ids;
    submitted.sort_unstable();
    let fully_correct = submitted == correct_ids;

    let name = game
        .player(player_id)
        .map(|player| player.name.clone())
        .ok_or(EngineError::InvalidPlayerId)?;
    let opened = game.question_open_time.ok_or_else(|| {
        EngineError::IncompatibleState("no open timestamp recorded for this question".into())
    })?;

    let result = game
        .question_results
        .iter_mut()
        .find(|result| result.question_id == question_id)
        .ok_or_else(|| {
            EngineError::IncompatibleState("no result is accumulating for this question".into())
        })?;

    // The latest submission wins: a now-wrong resubmission revokes the
    // earlier correct entry, a now-correct one appends at the back.
    let existing = result.players_correct.iter().position(|n| n == &name);
    match (fully_correct, existing) {
        (true, None) => result.players_correct.push(name),
        (false, Some(index)) => {
            result.players_correct.remove(index);
        }
        _ => {}
    }

    let latency = (transitions::now_secs() - opened).max(0) as u64;
    game.answer_times.insert(player_id, latency);

    state.store().persist(games).await?;
    Ok(())
}

/// Result of one already-opened question, readable while answers are shown.
pub async fn question_results(
    state: &SharedState,
    player_id: PlayerId,
    position: usize,
) -> Result<QuestionResultDto, EngineError> {
    let games = state.store().load().await?;
    let game = games.game_by_player(player_id)?;

    if game.state != GameState::AnswerShow {
        return Err(EngineError::IncompatibleState(
            "game is not in ANSWER_SHOW state".into(),
        ));
    }
    // Any question that has already been opened may be reviewed, not just
    // the most recent one.
    if position == 0 || position > game.at_question {
        return Err(EngineError::InvalidPosition(
            "question has not been opened in this game".into(),
        ));
    }
    let result = game
        .question_results
        .get(position - 1)
        .ok_or_else(|| EngineError::InvalidPosition("no result recorded for this question".into()))?;
    Ok(result.into())
}

/// Final ranking and per-question results, readable on the scoreboard.
pub async fn final_results(
    state: &SharedState,
    player_id: PlayerId,
) -> Result<GameResultsResponse, EngineError> {
    let games = state.store().load().await?;
    let game = games.game_by_player(player_id)?;
    if game.state != GameState::FinalResults {
        return Err(EngineError::IncompatibleState(
            "game is not in FINAL_RESULTS state".into(),
        ));
    }
    Ok(game.into())
}

/// Names may contain only ASCII alphanumerics and spaces; empty is allowed
/// and triggers name generation.
fn is_valid_player_name(name: &str) -> bool {
    name.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ')
}

/// Generate a display name of 5 distinct lowercase letters followed by 3
/// distinct digits, retrying until it is unique within the game.
fn generate_player_name(game: &Game) -> String {
    let mut rng = rand::rng();
    loop {
        let mut letters: Vec<char> = ('a'..='z').collect();
        letters.shuffle(&mut rng);
        let mut digits: Vec<char> = ('0'..='9').collect();
        digits.shuffle(&mut rng);

        let candidate: String = letters
            .iter()
            .take(GENERATED_NAME_LETTERS)
            .chain(digits.iter().take(GENERATED_NAME_DIGITS))
            .collect();
        if !game.has_player_name(&candidate) {
            return candidate;
        }
    }
}

/// The position must name an existing question and match the one in flight.
fn check_current_position(game: &Game, position: usize) -> Result<(), EngineError> {
    if position == 0 || position > game.num_questions() {
        return Err(EngineError::InvalidPosition(
            "no such question exists for this game".into(),
        ));
    }
    if position != game.at_question {
        return Err(EngineError::InvalidPosition(
            "game is not currently on this question".into(),
        ));
    }
    Ok(())
}

/// Question reads are meaningless before the first question opens and after
/// the game leaves the question loop.
fn ensure_question_visible(game: &Game) -> Result<(), EngineError> {
    match game.state {
        GameState::Lobby | GameState::QuestionCountdown | GameState::FinalResults
        | GameState::End => Err(EngineError::IncompatibleState(format!(
            "no question is visible in state {}",
            game.state
        ))),
        _ => Ok(()),
    }
}
