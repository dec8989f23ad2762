//! End-to-end exercises of the game lifecycle engine through the service
//! layer, backed by the in-memory snapshot store. Timer-driven transitions
//! run under tokio's paused clock so countdowns elapse instantly.

use std::sync::Arc;
use std::time::Duration;

use hotseat_back::{
    config::AppConfig,
    dao::snapshot_store::memory::MemoryStore,
    dto::{
        admin::{AnswerOptionInput, QuestionInput, QuizInput, StartGameRequest},
        player::JoinRequest,
    },
    error::EngineError,
    services::{admin_service, player_service},
    state::{AppState, SharedState, state_machine::GameState},
};

const QUIZ_ID: u64 = 1;

fn test_state() -> SharedState {
    AppState::new(AppConfig::default(), Arc::new(MemoryStore::new()))
}

fn question(text: &str, time_limit: u64, points: u32) -> QuestionInput {
    QuestionInput {
        question: text.into(),
        time_limit,
        points,
        answer_options: vec![
            AnswerOptionInput {
                answer: "right".into(),
                correct: true,
            },
            AnswerOptionInput {
                answer: "wrong".into(),
                correct: false,
            },
        ],
    }
}

fn start_request(auto_start_num: u32, questions: Vec<QuestionInput>) -> StartGameRequest {
    StartGameRequest {
        auto_start_num,
        quiz: QuizInput {
            name: "General knowledge".into(),
            description: String::new(),
            questions,
        },
    }
}

async fn start_game(state: &SharedState, auto_start_num: u32, questions: Vec<QuestionInput>) -> u64 {
    admin_service::start_game(state, QUIZ_ID, start_request(auto_start_num, questions))
        .await
        .unwrap()
        .game_id
}

async fn join(state: &SharedState, game_id: u64, name: &str) -> u64 {
    player_service::join(
        state,
        JoinRequest {
            game_id,
            name: name.into(),
        },
    )
    .await
    .unwrap()
    .player_id
}

async fn act(state: &SharedState, game_id: u64, action: &str) -> Result<(), EngineError> {
    admin_service::apply_action(state, QUIZ_ID, game_id, action).await
}

async fn current_state(state: &SharedState, game_id: u64) -> GameState {
    admin_service::game_status(state, QUIZ_ID, game_id)
        .await
        .unwrap()
        .state
}

/// Ids of the correct options of the game's `position`-th question.
async fn correct_ids(state: &SharedState, game_id: u64, position: usize) -> Vec<u64> {
    let status = admin_service::game_status(state, QUIZ_ID, game_id)
        .await
        .unwrap();
    status.metadata.questions[position - 1]
        .answer_options
        .iter()
        .filter(|option| option.correct)
        .map(|option| option.answer_id)
        .collect()
}

async fn wrong_id(state: &SharedState, game_id: u64, position: usize) -> u64 {
    let status = admin_service::game_status(state, QUIZ_ID, game_id)
        .await
        .unwrap();
    status.metadata.questions[position - 1]
        .answer_options
        .iter()
        .find(|option| !option.correct)
        .map(|option| option.answer_id)
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn countdown_expires_into_the_open_question() {
    let state = test_state();
    let game_id = start_game(&state, 0, vec![question("q1", 10, 5)]).await;
    assert_eq!(current_state(&state, game_id).await, GameState::Lobby);

    act(&state, game_id, "NEXT_QUESTION").await.unwrap();
    assert_eq!(
        current_state(&state, game_id).await,
        GameState::QuestionCountdown
    );

    // Default countdown is 3 seconds.
    tokio::time::sleep(Duration::from_secs(4)).await;
    let status = admin_service::game_status(&state, QUIZ_ID, game_id)
        .await
        .unwrap();
    assert_eq!(status.state, GameState::QuestionOpen);
    assert_eq!(status.at_question, 1);
}

#[tokio::test(start_paused = true)]
async fn skip_countdown_opens_the_question_immediately() {
    let state = test_state();
    let game_id = start_game(&state, 0, vec![question("q1", 10, 5)]).await;

    act(&state, game_id, "NEXT_QUESTION").await.unwrap();
    act(&state, game_id, "SKIP_COUNTDOWN").await.unwrap();
    assert_eq!(current_state(&state, game_id).await, GameState::QuestionOpen);
}

#[tokio::test(start_paused = true)]
async fn open_question_auto_closes_at_its_time_limit() {
    let state = test_state();
    let game_id = start_game(&state, 0, vec![question("q1", 7, 5)]).await;

    act(&state, game_id, "NEXT_QUESTION").await.unwrap();
    act(&state, game_id, "SKIP_COUNTDOWN").await.unwrap();

    tokio::time::sleep(Duration::from_secs(6)).await;
    assert_eq!(current_state(&state, game_id).await, GameState::QuestionOpen);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(
        current_state(&state, game_id).await,
        GameState::QuestionClose
    );
}

#[tokio::test(start_paused = true)]
async fn reaching_the_auto_start_threshold_launches_the_countdown() {
    let state = test_state();
    let game_id = start_game(&state, 2, vec![question("q1", 10, 5)]).await;

    join(&state, game_id, "alice").await;
    assert_eq!(current_state(&state, game_id).await, GameState::Lobby);

    join(&state, game_id, "bob").await;
    assert_eq!(
        current_state(&state, game_id).await,
        GameState::QuestionCountdown
    );

    // Late joiners are locked out once the countdown is running.
    let err = player_service::join(
        &state,
        JoinRequest {
            game_id,
            name: "carol".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::IncompatibleState(_)));

    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(current_state(&state, game_id).await, GameState::QuestionOpen);
}

#[tokio::test(start_paused = true)]
async fn auto_start_defers_to_a_pending_timer() {
    let state = test_state();
    let game_id = start_game(&state, 1, vec![question("q1", 10, 5)]).await;

    // With a timer already armed for the game, reaching the threshold must
    // not launch a second countdown.
    state
        .timers()
        .schedule(game_id, Duration::from_secs(3600), async {});
    join(&state, game_id, "alice").await;
    assert_eq!(current_state(&state, game_id).await, GameState::Lobby);

    state.timers().cancel(game_id);
    join(&state, game_id, "bob").await;
    assert_eq!(
        current_state(&state, game_id).await,
        GameState::QuestionCountdown
    );
}

#[tokio::test]
async fn join_validates_names() {
    let state = test_state();
    let game_id = start_game(&state, 0, vec![question("q1", 10, 5)]).await;

    join(&state, game_id, "Hayden Smith 2").await;

    let err = player_service::join(
        &state,
        JoinRequest {
            game_id,
            name: "no-dashes!".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::InvalidPlayerName(_)));

    let err = player_service::join(
        &state,
        JoinRequest {
            game_id,
            name: "Hayden Smith 2".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::InvalidPlayerName(_)));
}

#[tokio::test]
async fn empty_name_gets_a_generated_one() {
    let state = test_state();
    let game_id = start_game(&state, 0, vec![question("q1", 10, 5)]).await;

    join(&state, game_id, "").await;

    let players = admin_service::game_status(&state, QUIZ_ID, game_id)
        .await
        .unwrap()
        .players;
    assert_eq!(players.len(), 1);
    let name = &players[0];
    assert_eq!(name.len(), 8);
    assert!(name[..5].chars().all(|c| c.is_ascii_lowercase()));
    assert!(name[5..].chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
async fn player_ids_derive_from_the_game_id() {
    let state = test_state();
    let game_id = start_game(&state, 0, vec![question("q1", 10, 5)]).await;
    assert_eq!(game_id, 1);

    assert_eq!(join(&state, game_id, "alice").await, 100);
    assert_eq!(join(&state, game_id, "bob").await, 101);

    let second = start_game(&state, 0, vec![question("q1", 10, 5)]).await;
    assert_eq!(second, 2);
    assert_eq!(join(&state, second, "carol").await, 200);
}

#[tokio::test(start_paused = true)]
async fn scoring_decays_by_submission_order() {
    let state = test_state();
    let game_id = start_game(&state, 0, vec![question("q1", 30, 5)]).await;

    let alice = join(&state, game_id, "alice").await;
    let bob = join(&state, game_id, "bob").await;
    let carol = join(&state, game_id, "carol").await;

    act(&state, game_id, "NEXT_QUESTION").await.unwrap();
    act(&state, game_id, "SKIP_COUNTDOWN").await.unwrap();

    let right = correct_ids(&state, game_id, 1).await;
    for player in [alice, bob, carol] {
        player_service::submit_answers(&state, player, 1, right.clone())
            .await
            .unwrap();
    }

    act(&state, game_id, "GO_TO_ANSWER").await.unwrap();
    assert_eq!(current_state(&state, game_id).await, GameState::AnswerShow);

    // 5 points decay as 5, round(2.5) = 3, round(5/3) = 2.
    act(&state, game_id, "GO_TO_FINAL_RESULTS").await.unwrap();
    let results = player_service::final_results(&state, alice).await.unwrap();
    let ranking = &results.users_ranked_by_score;
    assert_eq!(ranking.len(), 3);
    assert_eq!((ranking[0].name.as_str(), ranking[0].score), ("alice", 5));
    assert_eq!((ranking[1].name.as_str(), ranking[1].score), ("bob", 3));
    assert_eq!((ranking[2].name.as_str(), ranking[2].score), ("carol", 2));

    let question_result = &results.question_results[0];
    assert_eq!(
        question_result.players_correct,
        vec!["alice", "bob", "carol"]
    );
    assert_eq!(question_result.percent_correct, 100);
}

#[tokio::test(start_paused = true)]
async fn tied_scores_keep_their_prior_ranking_order() {
    let state = test_state();
    let game_id = start_game(
        &state,
        0,
        vec![question("q1", 30, 5), question("q2", 30, 5)],
    )
    .await;

    let alice = join(&state, game_id, "alice").await;
    let bob = join(&state, game_id, "bob").await;
    let carol = join(&state, game_id, "carol").await;

    // q1: only bob answers, taking the full 5 points.
    act(&state, game_id, "NEXT_QUESTION").await.unwrap();
    act(&state, game_id, "SKIP_COUNTDOWN").await.unwrap();
    let right = correct_ids(&state, game_id, 1).await;
    player_service::submit_answers(&state, bob, 1, right)
        .await
        .unwrap();
    act(&state, game_id, "GO_TO_ANSWER").await.unwrap();

    // q2: alice answers first (5 points, tying bob), carol second (3).
    act(&state, game_id, "NEXT_QUESTION").await.unwrap();
    act(&state, game_id, "SKIP_COUNTDOWN").await.unwrap();
    let right = correct_ids(&state, game_id, 2).await;
    player_service::submit_answers(&state, alice, 2, right.clone())
        .await
        .unwrap();
    player_service::submit_answers(&state, carol, 2, right)
        .await
        .unwrap();
    act(&state, game_id, "GO_TO_ANSWER").await.unwrap();

    act(&state, game_id, "GO_TO_FINAL_RESULTS").await.unwrap();
    let results = player_service::final_results(&state, alice).await.unwrap();
    let ranking = &results.users_ranked_by_score;

    // Bob led 5/0/0 going into the q2 close; alice's tie at 5 must not
    // overtake him, and carol stays behind both.
    assert_eq!((ranking[0].name.as_str(), ranking[0].score), ("bob", 5));
    assert_eq!((ranking[1].name.as_str(), ranking[1].score), ("alice", 5));
    assert_eq!((ranking[2].name.as_str(), ranking[2].score), ("carol", 3));
}

#[tokio::test(start_paused = true)]
async fn latest_submission_wins() {
    let state = test_state();
    let game_id = start_game(&state, 0, vec![question("q1", 30, 5)]).await;

    let alice = join(&state, game_id, "alice").await;
    let bob = join(&state, game_id, "bob").await;

    act(&state, game_id, "NEXT_QUESTION").await.unwrap();
    act(&state, game_id, "SKIP_COUNTDOWN").await.unwrap();

    let right = correct_ids(&state, game_id, 1).await;
    let wrong = vec![wrong_id(&state, game_id, 1).await];

    // Alice answers correctly, then changes her mind to a wrong answer.
    player_service::submit_answers(&state, alice, 1, right.clone())
        .await
        .unwrap();
    player_service::submit_answers(&state, alice, 1, wrong.clone())
        .await
        .unwrap();

    // Bob does the opposite.
    player_service::submit_answers(&state, bob, 1, wrong)
        .await
        .unwrap();
    player_service::submit_answers(&state, bob, 1, right)
        .await
        .unwrap();

    act(&state, game_id, "GO_TO_ANSWER").await.unwrap();
    let result = player_service::question_results(&state, alice, 1)
        .await
        .unwrap();
    assert_eq!(result.players_correct, vec!["bob"]);
    assert_eq!(result.percent_correct, 50);
}

#[tokio::test(start_paused = true)]
async fn submissions_reject_bad_answer_id_sets() {
    let state = test_state();
    let game_id = start_game(&state, 0, vec![question("q1", 30, 5)]).await;
    let alice = join(&state, game_id, "alice").await;

    act(&state, game_id, "NEXT_QUESTION").await.unwrap();
    act(&state, game_id, "SKIP_COUNTDOWN").await.unwrap();

    let right = correct_ids(&state, game_id, 1).await;

    let err = player_service::submit_answers(&state, alice, 1, vec![9999])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAnswerIds(_)));

    let duplicated = vec![right[0], right[0]];
    let err = player_service::submit_answers(&state, alice, 1, duplicated)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAnswerIds(_)));

    let err = player_service::submit_answers(&state, alice, 1, Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAnswerIds(_)));

    // The wrong position is reported before any answer-id inspection.
    let err = player_service::submit_answers(&state, alice, 2, vec![9999])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidPosition(_)));
}

#[tokio::test(start_paused = true)]
async fn answer_show_allows_reviewing_every_opened_question() {
    let state = test_state();
    let game_id = start_game(
        &state,
        0,
        vec![question("q1", 30, 5), question("q2", 30, 5)],
    )
    .await;
    let alice = join(&state, game_id, "alice").await;

    act(&state, game_id, "NEXT_QUESTION").await.unwrap();
    act(&state, game_id, "SKIP_COUNTDOWN").await.unwrap();
    act(&state, game_id, "GO_TO_ANSWER").await.unwrap();
    act(&state, game_id, "NEXT_QUESTION").await.unwrap();
    act(&state, game_id, "SKIP_COUNTDOWN").await.unwrap();
    act(&state, game_id, "GO_TO_ANSWER").await.unwrap();

    assert!(player_service::question_results(&state, alice, 1).await.is_ok());
    assert!(player_service::question_results(&state, alice, 2).await.is_ok());

    let err = player_service::question_results(&state, alice, 3)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidPosition(_)));

    // Final results are not readable before the scoreboard is up.
    let err = player_service::final_results(&state, alice).await.unwrap_err();
    assert!(matches!(err, EngineError::IncompatibleState(_)));
    let err = admin_service::game_results(&state, QUIZ_ID, game_id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::IncompatibleState(_)));
}

#[tokio::test]
async fn next_question_fails_once_questions_are_exhausted() {
    let state = test_state();
    let game_id = start_game(&state, 0, vec![question("q1", 30, 5)]).await;

    act(&state, game_id, "NEXT_QUESTION").await.unwrap();
    act(&state, game_id, "SKIP_COUNTDOWN").await.unwrap();
    act(&state, game_id, "GO_TO_ANSWER").await.unwrap();

    let err = act(&state, game_id, "NEXT_QUESTION").await.unwrap_err();
    assert!(matches!(err, EngineError::IncompatibleState(_)));
}

#[tokio::test]
async fn end_is_terminal_and_lists_the_game_as_inactive() {
    let state = test_state();
    let game_id = start_game(&state, 0, vec![question("q1", 30, 5)]).await;

    act(&state, game_id, "END").await.unwrap();
    assert_eq!(current_state(&state, game_id).await, GameState::End);

    let err = act(&state, game_id, "END").await.unwrap_err();
    assert!(matches!(err, EngineError::IncompatibleState(_)));

    let listing = admin_service::list_games(&state, QUIZ_ID).await.unwrap();
    assert!(listing.active_games.is_empty());
    assert_eq!(listing.inactive_games, vec![game_id]);
}

#[tokio::test]
async fn unknown_action_tokens_are_invalid_action() {
    let state = test_state();
    let game_id = start_game(&state, 0, vec![question("q1", 30, 5)]).await;

    let err = act(&state, game_id, "DO_SOMETHING").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAction));
    assert_eq!(current_state(&state, game_id).await, GameState::Lobby);

    // Recognised but disabled tokens are a different failure.
    let err = act(&state, game_id, "SKIP_COUNTDOWN").await.unwrap_err();
    assert!(matches!(err, EngineError::IncompatibleState(_)));

    // Rejected actions leave the game untouched.
    assert_eq!(current_state(&state, game_id).await, GameState::Lobby);
}

#[tokio::test]
async fn start_game_enforces_its_preconditions() {
    let state = test_state();

    let err = admin_service::start_game(&state, QUIZ_ID, start_request(51, vec![question("q", 30, 5)]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAutoStart));

    let err = admin_service::start_game(&state, QUIZ_ID, start_request(0, Vec::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::EmptyQuiz));

    for _ in 0..10 {
        start_game(&state, 0, vec![question("q", 30, 5)]).await;
    }
    let err = admin_service::start_game(&state, QUIZ_ID, start_request(0, vec![question("q", 30, 5)]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::TooManyActiveGames));

    // Ended games stop counting towards the limit.
    act(&state, 1, "END").await.unwrap();
    start_game(&state, 0, vec![question("q", 30, 5)]).await;
}

#[tokio::test]
async fn games_of_another_quiz_are_invisible() {
    let state = test_state();
    let game_id = start_game(&state, 0, vec![question("q1", 30, 5)]).await;

    let err = admin_service::game_status(&state, QUIZ_ID + 1, game_id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidGameId));

    let err = admin_service::apply_action(&state, QUIZ_ID + 1, game_id, "END")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidGameId));
}

#[tokio::test(start_paused = true)]
async fn clear_discards_games_and_cancels_pending_timers() {
    let state = test_state();
    let game_id = start_game(&state, 0, vec![question("q1", 30, 5)]).await;
    act(&state, game_id, "NEXT_QUESTION").await.unwrap();

    admin_service::reset(&state).await.unwrap();

    let err = admin_service::game_status(&state, QUIZ_ID, game_id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidGameId));

    // The cancelled countdown never resurrects the game.
    tokio::time::sleep(Duration::from_secs(10)).await;
    let listing = admin_service::list_games(&state, QUIZ_ID).await.unwrap();
    assert!(listing.active_games.is_empty());
    assert!(listing.inactive_games.is_empty());
}

#[tokio::test(start_paused = true)]
async fn manual_close_beats_the_pending_time_limit_timer() {
    let state = test_state();
    let game_id = start_game(&state, 0, vec![question("q1", 10, 5)]).await;

    act(&state, game_id, "NEXT_QUESTION").await.unwrap();
    act(&state, game_id, "SKIP_COUNTDOWN").await.unwrap();
    act(&state, game_id, "GO_TO_ANSWER").await.unwrap();
    assert_eq!(current_state(&state, game_id).await, GameState::AnswerShow);

    // The stale close timer finds the state moved on and does nothing.
    tokio::time::sleep(Duration::from_secs(15)).await;
    assert_eq!(current_state(&state, game_id).await, GameState::AnswerShow);
}

#[tokio::test(start_paused = true)]
async fn player_views_track_the_game_phase() {
    let state = test_state();
    let game_id = start_game(&state, 0, vec![question("q1", 30, 5)]).await;
    let alice = join(&state, game_id, "alice").await;

    let status = player_service::player_status(&state, alice).await.unwrap();
    assert_eq!(status.state, GameState::Lobby);
    assert_eq!(status.num_questions, 1);
    assert_eq!(status.at_question, 0);

    // No question is visible before one opens.
    let err = player_service::question_info(&state, alice, 1).await.unwrap_err();
    assert!(matches!(err, EngineError::IncompatibleState(_)));

    act(&state, game_id, "NEXT_QUESTION").await.unwrap();
    act(&state, game_id, "SKIP_COUNTDOWN").await.unwrap();

    let view = player_service::question_info(&state, alice, 1).await.unwrap();
    assert_eq!(view.question, "q1");
    assert_eq!(view.answer_options.len(), 2);

    let err = player_service::player_status(&state, 9999).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidPlayerId));
}
