//! Admin endpoints for starting games, driving the state machine, and reading
//! status and results. The global reset lives here too.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use axum_valid::Valid;

use crate::{
    dto::{
        admin::{
            ActionRequest, GameIdResponse, GameListResponse, GameStatusResponse, StartGameRequest,
        },
        common::{EmptyResponse, GameResultsResponse},
    },
    error::AppError,
    services::admin_service,
    state::{SharedState, game::GameId},
};

/// Admin-only endpoints for running games of a quiz.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/v1/admin/quiz/{quizid}/game/start", post(start_game))
        .route(
            "/v1/admin/quiz/{quizid}/game/{gameid}",
            get(game_status).put(game_action),
        )
        .route(
            "/v1/admin/quiz/{quizid}/game/{gameid}/results",
            get(game_results),
        )
        .route("/v1/admin/quiz/{quizid}/games", get(list_games))
        .route("/v1/clear", delete(clear))
}

/// Start a new game of this quiz from a frozen snapshot of its contents.
#[utoipa::path(
    post,
    path = "/v1/admin/quiz/{quizid}/game/start",
    tag = "admin",
    params(("quizid" = u64, Path, description = "Identifier of the owning quiz")),
    request_body = StartGameRequest,
    responses((status = 200, description = "Game started", body = GameIdResponse))
)]
pub async fn start_game(
    State(state): State<SharedState>,
    Path(quiz_id): Path<u64>,
    Valid(Json(payload)): Valid<Json<StartGameRequest>>,
) -> Result<Json<GameIdResponse>, AppError> {
    Ok(Json(
        admin_service::start_game(&state, quiz_id, payload).await?,
    ))
}

/// Apply a state-machine action to a running game.
#[utoipa::path(
    put,
    path = "/v1/admin/quiz/{quizid}/game/{gameid}",
    tag = "admin",
    params(
        ("quizid" = u64, Path, description = "Identifier of the owning quiz"),
        ("gameid" = u64, Path, description = "Identifier of the game")
    ),
    request_body = ActionRequest,
    responses((status = 200, description = "Action applied", body = EmptyResponse))
)]
pub async fn game_action(
    State(state): State<SharedState>,
    Path((quiz_id, game_id)): Path<(u64, GameId)>,
    Json(payload): Json<ActionRequest>,
) -> Result<Json<EmptyResponse>, AppError> {
    admin_service::apply_action(&state, quiz_id, game_id, &payload.action).await?;
    Ok(Json(EmptyResponse {}))
}

/// Read the full status of a game.
#[utoipa::path(
    get,
    path = "/v1/admin/quiz/{quizid}/game/{gameid}",
    tag = "admin",
    params(
        ("quizid" = u64, Path, description = "Identifier of the owning quiz"),
        ("gameid" = u64, Path, description = "Identifier of the game")
    ),
    responses((status = 200, description = "Game status", body = GameStatusResponse))
)]
pub async fn game_status(
    State(state): State<SharedState>,
    Path((quiz_id, game_id)): Path<(u64, GameId)>,
) -> Result<Json<GameStatusResponse>, AppError> {
    Ok(Json(
        admin_service::game_status(&state, quiz_id, game_id).await?,
    ))
}

/// Read the final results of a game showing its scoreboard.
#[utoipa::path(
    get,
    path = "/v1/admin/quiz/{quizid}/game/{gameid}/results",
    tag = "admin",
    params(
        ("quizid" = u64, Path, description = "Identifier of the owning quiz"),
        ("gameid" = u64, Path, description = "Identifier of the game")
    ),
    responses((status = 200, description = "Final results", body = GameResultsResponse))
)]
pub async fn game_results(
    State(state): State<SharedState>,
    Path((quiz_id, game_id)): Path<(u64, GameId)>,
) -> Result<Json<GameResultsResponse>, AppError> {
    Ok(Json(
        admin_service::game_results(&state, quiz_id, game_id).await?,
    ))
}

/// List the active and ended games of a quiz.
#[utoipa::path(
    get,
    path = "/v1/admin/quiz/{quizid}/games",
    tag = "admin",
    params(("quizid" = u64, Path, description = "Identifier of the owning quiz")),
    responses((status = 200, description = "Game id listing", body = GameListResponse))
)]
pub async fn list_games(
    State(state): State<SharedState>,
    Path(quiz_id): Path<u64>,
) -> Result<Json<GameListResponse>, AppError> {
    Ok(Json(admin_service::list_games(&state, quiz_id).await?))
}

/// Discard every game and cancel all pending timers.
#[utoipa::path(
    delete,
    path = "/v1/clear",
    tag = "admin",
    responses((status = 200, description = "All games discarded", body = EmptyResponse))
)]
pub async fn clear(State(state): State<SharedState>) -> Result<Json<EmptyResponse>, AppError> {
    admin_service::reset(&state).await?;
    Ok(Json(EmptyResponse {}))
}
