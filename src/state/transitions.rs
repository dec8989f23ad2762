//! Transition engine: validates actions against the current state, applies
//! the per-transition side effects (timer scheduling, scoring, ranking),
//! and persists the snapshot before returning.
//!
//! Deferred transitions never act on captured state. A timer task only
//! carries the game id and the state it was armed for; when it fires it
//! reloads the authoritative snapshot and re-validates that precondition,
//! so a manual action that won the race turns the expiry into a no-op.

use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::state::SharedState;
use crate::state::game::{GameId, GamesSnapshot, PlayerId, QuestionResult};
use crate::state::state_machine::{self, GameAction, GameState};

/// Current wall-clock time in whole unix seconds.
pub(crate) fn now_secs() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// Validate and perform a requested action. All failures are detected before
/// any mutation; success implies the new state has been persisted.
pub async fn apply_action(
    state: &SharedState,
    games: &mut GamesSnapshot,
    game_id: GameId,
    action: GameAction,
) -> Result<(), EngineError> {
    let (current_state, at_question, num_questions) = {
        let game = games.game(game_id)?;
        (game.state, game.at_question, game.num_questions())
    };
    state_machine::check_action(current_state, action)?;

    match action {
        GameAction::NextQuestion => {
            if at_question >= num_questions {
                return Err(EngineError::IncompatibleState(
                    "no questions remain after the current one".into(),
                ));
            }
            question_countdown(state, games, game_id).await
        }
        GameAction::SkipCountdown => question_open(state, games, game_id).await,
        GameAction::GoToAnswer => {
            if current_state == GameState::QuestionOpen {
                question_close(state, games, game_id).await?;
            }
            answer_show(state, games, game_id).await
        }
        GameAction::GoToFinalResults => final_results(state, games, game_id).await,
        GameAction::End => end_game(state, games, game_id).await,
    }
}

/// Enter the pre-question countdown and arm the automatic open.
pub(crate) async fn question_countdown(
    state: &SharedState,
    games: &mut GamesSnapshot,
    game_id: GameId,
) -> Result<(), EngineError> {
    state.timers().cancel(game_id);
    let game = games.game_mut(game_id)?;
    game.state = GameState::QuestionCountdown;
    state.store().persist(games.clone()).await?;

    schedule_expiry(
        state,
        game_id,
        GameState::QuestionCountdown,
        state.config().countdown(),
    );
    Ok(())
}

/// Open the next question: stamp the open time, advance `at_question`, reset
/// the latency map, record an empty result, and arm the automatic close.
pub(crate) async fn question_open(
    state: &SharedState,
    games: &mut GamesSnapshot,
    game_id: GameId,
) -> Result<(), EngineError> {
    state.timers().cancel(game_id);
    let game = games.game_mut(game_id)?;

    let Some(question) = game.quiz.questions.get(game.at_question) else {
        return Err(EngineError::IncompatibleState(
            "no question left to open".into(),
        ));
    };
    let question_id = question.question_id;
    let time_limit = question.time_limit;

    game.state = GameState::QuestionOpen;
    game.question_open_time = Some(now_secs());
    game.at_question += 1;
    game.answer_times.clear();
    game.question_results.push(QuestionResult::empty(question_id));
    state.store().persist(games.clone()).await?;

    schedule_expiry(
        state,
        game_id,
        GameState::QuestionOpen,
        Duration::from_secs(time_limit),
    );
    Ok(())
}

/// Close the current question and settle its result: average latency,
/// decaying per-rank awards, percent correct, and the ranking re-sort.
pub(crate) async fn question_close(
    state: &SharedState,
    games: &mut GamesSnapshot,
    game_id: GameId,
) -> Result<(), EngineError> {
    state.timers().cancel(game_id);
    let game = games.game_mut(game_id)?;

    let index = game.at_question.checked_sub(1).ok_or_else(|| {
        EngineError::IncompatibleState("no question is in flight for this game".into())
    })?;
    let points = game
        .quiz
        .questions
        .get(index)
        .map(|question| question.points)
        .ok_or_else(|| {
            EngineError::IncompatibleState("no question is in flight for this game".into())
        })?;

    game.state = GameState::QuestionClose;

    let average = average_latency(&game.answer_times);
    let correct = game
        .question_results
        .get(index)
        .map(|result| result.players_correct.clone())
        .unwrap_or_default();

    // First correct answerer earns full points, the second half, and so on.
    // Each share is rounded independently; totals are allowed to drift from
    // the question's point value.
    for (position, name) in correct.iter().enumerate() {
        let award = award_for_rank(points, position + 1);
        if let Some(player) = game.players.iter_mut().find(|p| &p.name == name) {
            player.score += award;
        }
        if let Some(entry) = game.ranking.iter_mut().find(|e| &e.name == name) {
            entry.score += award;
        }
    }

    let percent = percent_correct(correct.len(), game.players.len());
    if let Some(result) = game.question_results.get_mut(index) {
        result.average_answer_time = average;
        result.percent_correct = percent;
    }

    // Vec::sort_by is stable, so ties keep their prior relative order.
    game.ranking.sort_by(|a, b| b.score.cmp(&a.score));

    state.store().persist(games.clone()).await?;
    Ok(())
}

/// Reveal the answers for the closed question.
pub(crate) async fn answer_show(
    state: &SharedState,
    games: &mut GamesSnapshot,
    game_id: GameId,
) -> Result<(), EngineError> {
    state.timers().cancel(game_id);
    let game = games.game_mut(game_id)?;
    game.state = GameState::AnswerShow;
    state.store().persist(games.clone()).await?;
    Ok(())
}

/// Jump to the final scoreboard.
pub(crate) async fn final_results(
    state: &SharedState,
    games: &mut GamesSnapshot,
    game_id: GameId,
) -> Result<(), EngineError> {
    state.timers().cancel(game_id);
    let game = games.game_mut(game_id)?;
    game.state = GameState::FinalResults;
    game.at_question = 0;
    state.store().persist(games.clone()).await?;
    Ok(())
}

/// Terminate the game. END is absorbing; the game stays around but is only
/// listed as inactive.
pub(crate) async fn end_game(
    state: &SharedState,
    games: &mut GamesSnapshot,
    game_id: GameId,
) -> Result<(), EngineError> {
    state.timers().cancel(game_id);
    let game = games.game_mut(game_id)?;
    game.state = GameState::End;
    game.at_question = 0;
    state.store().persist(games.clone()).await?;
    Ok(())
}

/// Arm the single deferred transition for a game.
fn schedule_expiry(state: &SharedState, game_id: GameId, expected: GameState, delay: Duration) {
    let task_state = Arc::clone(state);
    state.timers().schedule(game_id, delay, async move {
        expire(task_state, game_id, expected).await;
    });
}

/// Deferred half of an automatic transition: reload, re-validate, act.
async fn expire(state: SharedState, game_id: GameId, expected: GameState) {
    let _gate = state.gate().lock().await;
    state.timers().clear(game_id);

    let mut games = match state.store().load().await {
        Ok(games) => games,
        Err(err) => {
            warn!(game_id, error = %err, "timer expiry could not load the snapshot");
            return;
        }
    };

    {
        let Ok(game) = games.game(game_id) else {
            debug!(game_id, "timer fired for a game that no longer exists");
            return;
        };
        if game.state != expected {
            // A manual action advanced the game first; this is the normal
            // race outcome, not an error.
            debug!(game_id, %expected, actual = %game.state, "timer fired after the state moved on");
            return;
        }
    }

    let outcome = match expected {
        GameState::QuestionCountdown => question_open(&state, &mut games, game_id).await,
        GameState::QuestionOpen => question_close(&state, &mut games, game_id).await,
        other => {
            debug!(game_id, state = %other, "no automatic transition armed for this state");
            Ok(())
        }
    };
    if let Err(err) = outcome {
        // Fatal to this deferred task only, never to the process.
        warn!(game_id, error = %err, "deferred transition failed");
    }
}

/// Integer round of the arithmetic mean of the submitted latencies; 0 when
/// nobody answered.
fn average_latency(times: &IndexMap<PlayerId, u64>) -> u64 {
    if times.is_empty() {
        return 0;
    }
    let total: u64 = times.values().sum();
    ((total as f64) / (times.len() as f64)).round() as u64
}

/// Decaying reward: `round(points * 1/rank)` with `rank` 1-based.
fn award_for_rank(points: u32, rank: usize) -> u32 {
    (f64::from(points) * (1.0 / rank as f64)).round() as u32
}

/// Integer percentage of players that answered correctly; 0 without players.
fn percent_correct(correct: usize, players: usize) -> u32 {
    if players == 0 {
        return 0;
    }
    ((correct as f64) / (players as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn awards_decay_by_submission_rank() {
        // points=5: first 5, second round(2.5)=3, third round(5/3)=2.
        assert_eq!(award_for_rank(5, 1), 5);
        assert_eq!(award_for_rank(5, 2), 3);
        assert_eq!(award_for_rank(5, 3), 2);
        assert_eq!(award_for_rank(10, 4), 3);
    }

    #[test]
    fn average_latency_rounds_the_mean() {
        let mut times = IndexMap::new();
        assert_eq!(average_latency(&times), 0);

        times.insert(100, 3);
        times.insert(101, 4);
        // mean 3.5 rounds up.
        assert_eq!(average_latency(&times), 4);

        times.insert(102, 2);
        assert_eq!(average_latency(&times), 3);
    }

    #[test]
    fn percent_correct_handles_the_empty_game() {
        assert_eq!(percent_correct(0, 0), 0);
        assert_eq!(percent_correct(0, 4), 0);
        assert_eq!(percent_correct(1, 3), 33);
        assert_eq!(percent_correct(2, 3), 67);
        assert_eq!(percent_correct(3, 3), 100);
    }
}
