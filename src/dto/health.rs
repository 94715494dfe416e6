use serde::Serialize;
use utoipa::ToSchema;

/// Overall availability reported by `/healthcheck`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Catalog, favorites and AI features are all served.
    Ok,
    /// No provider key: browsing and favorites work, AI features fail.
    Degraded,
}

/// Body of the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when no provider is configured.
    pub status: HealthStatus,
    /// Whether a provider client was built at startup.
    pub provider_configured: bool,
    /// Games in the loaded catalog.
    pub games: usize,
    /// Tutor sessions currently held in memory.
    pub tutor_sessions: usize,
}
