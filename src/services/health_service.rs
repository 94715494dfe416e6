use tracing::warn;

use crate::{
    dto::health::{HealthResponse, HealthStatus},
    state::SharedState,
};

/// Report provider availability along with catalog and session counts.
pub fn health_status(state: &SharedState) -> HealthResponse {
    let status = if state.is_degraded() {
        warn!("provider unavailable (degraded mode)");
        HealthStatus::Degraded
    } else {
        HealthStatus::Ok
    };

    HealthResponse {
        status,
        provider_configured: !state.is_degraded(),
        games: state.catalog().len(),
        tutor_sessions: state.tutor_sessions().len(),
    }
}
