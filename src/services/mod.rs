//! Service layer sitting between the HTTP routes and the engine.

/// Admin-facing operations: game start, actions, status, results, reset.
pub mod admin_service;
/// OpenAPI document aggregation.
pub mod documentation;
/// Health probe logic.
pub mod health_service;
/// Player-facing operations: join, answer, results.
pub mod player_service;
