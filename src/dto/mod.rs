//! Wire payloads: request bodies, response projections, and their
//! conversions from the domain types.

/// Admin-facing request and response payloads.
pub mod admin;
/// Result projections shared by the admin and player surfaces.
pub mod common;
/// Health probe payload.
pub mod health;
/// Player-facing request and response payloads.
pub mod player;
