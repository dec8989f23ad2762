//! Liveness probe over the snapshot store.

use tracing::warn;

use crate::dto::health::HealthResponse;
use crate::state::SharedState;

/// Report `ok` when the snapshot store is reachable, `degraded` otherwise.
pub async fn check(state: &SharedState) -> HealthResponse {
    match state.store().health_check().await {
        Ok(()) => HealthResponse::ok(),
        Err(err) => {
            warn!(error = %err, "snapshot store health check failed");
            HealthResponse::degraded()
        }
    }
}
