//! Guest player endpoints: joining a lobby, reading the active question,
//! submitting answers, and reading results.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};

use crate::{
    dto::{
        common::{EmptyResponse, GameResultsResponse, QuestionResultDto},
        player::{
            JoinRequest, PlayerIdResponse, PlayerStatusResponse, QuestionViewResponse,
            SubmitAnswersRequest,
        },
    },
    error::AppError,
    services::player_service,
    state::{SharedState, game::PlayerId},
};

/// Player endpoints; no authentication, a player id is the only credential.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/v1/player/join", post(join))
        .route("/v1/player/{playerid}", get(status))
        .route(
            "/v1/player/{playerid}/question/{questionposition}",
            get(question_info),
        )
        .route(
            "/v1/player/{playerid}/question/{questionposition}/answer",
            put(submit_answers),
        )
        .route(
            "/v1/player/{playerid}/question/{questionposition}/results",
            get(question_results),
        )
        .route("/v1/player/{playerid}/results", get(final_results))
}

/// Join a game lobby as a guest player.
#[utoipa::path(
    post,
    path = "/v1/player/join",
    tag = "player",
    request_body = JoinRequest,
    responses((status = 200, description = "Joined; id assigned", body = PlayerIdResponse))
)]
pub async fn join(
    State(state): State<SharedState>,
    Json(payload): Json<JoinRequest>,
) -> Result<Json<PlayerIdResponse>, AppError> {
    Ok(Json(player_service::join(&state, payload).await?))
}

/// Read the coarse status of the game this player belongs to.
#[utoipa::path(
    get,
    path = "/v1/player/{playerid}",
    tag = "player",
    params(("playerid" = u64, Path, description = "Identifier of the player")),
    responses((status = 200, description = "Player-visible game status", body = PlayerStatusResponse))
)]
pub async fn status(
    State(state): State<SharedState>,
    Path(player_id): Path<PlayerId>,
) -> Result<Json<PlayerStatusResponse>, AppError> {
    Ok(Json(player_service::player_status(&state, player_id).await?))
}

/// Read the question currently in play, without correctness flags.
#[utoipa::path(
    get,
    path = "/v1/player/{playerid}/question/{questionposition}",
    tag = "player",
    params(
        ("playerid" = u64, Path, description = "Identifier of the player"),
        ("questionposition" = usize, Path, description = "1-based question position")
    ),
    responses((status = 200, description = "Current question", body = QuestionViewResponse))
)]
pub async fn question_info(
    State(state): State<SharedState>,
    Path((player_id, position)): Path<(PlayerId, usize)>,
) -> Result<Json<QuestionViewResponse>, AppError> {
    Ok(Json(
        player_service::question_info(&state, player_id, position).await?,
    ))
}

/// Submit (or replace) the selected answer ids for the open question.
#[utoipa::path(
    put,
    path = "/v1/player/{playerid}/question/{questionposition}/answer",
    tag = "player",
    params(
        ("playerid" = u64, Path, description = "Identifier of the player"),
        ("questionposition" = usize, Path, description = "1-based question position")
    ),
    request_body = SubmitAnswersRequest,
    responses((status = 200, description = "Answer recorded", body = EmptyResponse))
)]
pub async fn submit_answers(
    State(state): State<SharedState>,
    Path((player_id, position)): Path<(PlayerId, usize)>,
    Json(payload): Json<SubmitAnswersRequest>,
) -> Result<Json<EmptyResponse>, AppError> {
    player_service::submit_answers(&state, player_id, position, payload.answer_ids).await?;
    Ok(Json(EmptyResponse {}))
}

/// Read the settled result of an already-opened question.
#[utoipa::path(
    get,
    path = "/v1/player/{playerid}/question/{questionposition}/results",
    tag = "player",
    params(
        ("playerid" = u64, Path, description = "Identifier of the player"),
        ("questionposition" = usize, Path, description = "1-based question position")
    ),
    responses((status = 200, description = "Question result", body = QuestionResultDto))
)]
pub async fn question_results(
    State(state): State<SharedState>,
    Path((player_id, position)): Path<(PlayerId, usize)>,
) -> Result<Json<QuestionResultDto>, AppError> {
    Ok(Json(
        player_service::question_results(&state, player_id, position).await?,
    ))
}

/// Read the final ranking and per-question results.
#[utoipa::path(
    get,
    path = "/v1/player/{playerid}/results",
    tag = "player",
    params(("playerid" = u64, Path, description = "Identifier of the player")),
    responses((status = 200, description = "Final results", body = GameResultsResponse))
)]
pub async fn final_results(
    State(state): State<SharedState>,
    Path(player_id): Path<PlayerId>,
) -> Result<Json<GameResultsResponse>, AppError> {
    Ok(Json(player_service::final_results(&state, player_id).await?))
}
