use axum::Router;

use crate::state::SharedState;

/// Proxy and recommendation endpoints.
pub mod api;
/// Swagger UI.
pub mod docs;
/// Favorite games.
pub mod favorites;
/// Catalog endpoints.
pub mod games;
/// Health check.
pub mod health;
/// Tutor session endpoints.
pub mod tutor;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(api::router(state.config().max_audio_bytes()))
        .merge(games::router())
        .merge(favorites::router())
        .merge(tutor::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
