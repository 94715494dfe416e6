use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dao::models::GameRecord,
    dto::catalog::{GameQuery, RecommendRequest, RecommendationResponse},
    error::AppError,
    services::{
        catalog_service::{self, GameFilter},
        recommendation_service::{self, NO_MATCH_MESSAGE, Recommendation},
    },
    state::SharedState,
};

/// Catalog browsing and recommendation routes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", get(list_games))
        .route("/games/sponsored", get(sponsored_games))
        .route("/games/recommend", post(recommend_game))
        .route("/games/{key}", get(get_game))
}

/// List catalog games matching every provided criterion, in catalog order.
#[utoipa::path(
    get,
    path = "/games",
    tag = "games",
    params(GameQuery),
    responses(
        (status = 200, description = "Matching games", body = [GameRecord]),
        (status = 400, description = "Unknown category or difficulty")
    )
)]
pub async fn list_games(
    State(state): State<SharedState>,
    Query(query): Query<GameQuery>,
) -> Json<Vec<GameRecord>> {
    let filter = GameFilter::from(query);
    Json(catalog_service::search(&state, &filter))
}

/// Sponsored games, highest priority first.
#[utoipa::path(
    get,
    path = "/games/sponsored",
    tag = "games",
    responses((status = 200, description = "Sponsored games", body = [GameRecord]))
)]
pub async fn sponsored_games(State(state): State<SharedState>) -> Json<Vec<GameRecord>> {
    Json(catalog_service::sponsored(&state))
}

/// Fetch one game by id or slug.
#[utoipa::path(
    get,
    path = "/games/{key}",
    tag = "games",
    params(("key" = String, Path, description = "Game id or URL slug")),
    responses(
        (status = 200, description = "Game found", body = GameRecord),
        (status = 404, description = "No such game")
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(key): Path<String>,
) -> Result<Json<GameRecord>, AppError> {
    catalog_service::get_game(&state, &key)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("game `{key}`")))
}

/// Ask the model to pick a catalog game for a free-text request.
#[utoipa::path(
    post,
    path = "/games/recommend",
    tag = "games",
    request_body = RecommendRequest,
    responses(
        (status = 200, description = "Match or no-match outcome", body = RecommendationResponse),
        (status = 400, description = "Empty query"),
        (status = 500, description = "Provider failure"),
        (status = 503, description = "No provider configured")
    )
)]
pub async fn recommend_game(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<RecommendRequest>>,
) -> Result<Json<RecommendationResponse>, AppError> {
    let response = match recommendation_service::recommend(&state, &payload.query).await? {
        Recommendation::Match(game) => RecommendationResponse::Match {
            game_id: game.id.clone(),
            path: catalog_service::game_path(&game),
            game,
        },
        Recommendation::NoMatch => RecommendationResponse::NoMatch {
            message: NO_MATCH_MESSAGE.to_string(),
        },
    };
    Ok(Json(response))
}
