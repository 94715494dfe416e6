use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};

use crate::{
    dto::favorites::{FavoritesResponse, ToggleFavoriteResponse},
    error::AppError,
    services::favorites_service,
    state::SharedState,
};

/// Favorites routes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/favorites", get(list_favorites))
        .route("/favorites/{id}", put(add_favorite).delete(remove_favorite))
        .route("/favorites/{id}/toggle", post(toggle_favorite))
}

/// List favorites ordered by id.
#[utoipa::path(
    get,
    path = "/favorites",
    tag = "favorites",
    responses((status = 200, description = "Current favorites", body = FavoritesResponse))
)]
pub async fn list_favorites(State(state): State<SharedState>) -> Json<FavoritesResponse> {
    Json(FavoritesResponse {
        favorites: favorites_service::list(&state).await,
    })
}

/// Mark a catalog game as favorite.
#[utoipa::path(
    put,
    path = "/favorites/{id}",
    tag = "favorites",
    params(("id" = String, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Favorite added", body = FavoritesResponse),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn add_favorite(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<FavoritesResponse>, AppError> {
    let favorites = favorites_service::add(&state, &id).await?;
    Ok(Json(FavoritesResponse { favorites }))
}

/// Remove a favorite; removing a non-favorite is a no-op.
#[utoipa::path(
    delete,
    path = "/favorites/{id}",
    tag = "favorites",
    params(("id" = String, Path, description = "Game identifier")),
    responses((status = 200, description = "Favorite removed", body = FavoritesResponse))
)]
pub async fn remove_favorite(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Json<FavoritesResponse> {
    Json(FavoritesResponse {
        favorites: favorites_service::remove(&state, &id).await,
    })
}

/// Flip one game in or out of the favorites.
#[utoipa::path(
    post,
    path = "/favorites/{id}/toggle",
    tag = "favorites",
    params(("id" = String, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Favorite toggled", body = ToggleFavoriteResponse),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn toggle_favorite(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ToggleFavoriteResponse>, AppError> {
    let (favorite, favorites) = favorites_service::toggle(&state, &id).await?;
    Ok(Json(ToggleFavoriteResponse {
        game_id: id,
        favorite,
        favorites,
    }))
}
