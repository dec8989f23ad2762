use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Hotseat Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::admin::start_game,
        crate::routes::admin::game_action,
        crate::routes::admin::game_status,
        crate::routes::admin::game_results,
        crate::routes::admin::list_games,
        crate::routes::admin::clear,
        crate::routes::player::join,
        crate::routes::player::status,
        crate::routes::player::question_info,
        crate::routes::player::submit_answers,
        crate::routes::player::question_results,
        crate::routes::player::final_results,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::admin::StartGameRequest,
            crate::dto::admin::ActionRequest,
            crate::dto::admin::GameIdResponse,
            crate::dto::admin::GameListResponse,
            crate::dto::admin::GameStatusResponse,
            crate::dto::common::EmptyResponse,
            crate::dto::common::GameResultsResponse,
            crate::dto::player::JoinRequest,
            crate::dto::player::PlayerIdResponse,
            crate::dto::player::PlayerStatusResponse,
            crate::dto::player::SubmitAnswersRequest,
            crate::dto::player::QuestionViewResponse,
            crate::state::state_machine::GameState,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "admin", description = "Game lifecycle control for quiz owners"),
        (name = "player", description = "Guest player operations"),
    )
)]
pub struct ApiDoc;
