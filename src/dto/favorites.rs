use serde::Serialize;
use utoipa::ToSchema;

use crate::dao::models::GameRecord;

/// Current favorites, ordered by game identifier.
#[derive(Debug, Serialize, ToSchema)]
pub struct FavoritesResponse {
    /// Favorite games ordered by id.
    pub favorites: Vec<GameRecord>,
}

/// Result of toggling one game.
#[derive(Debug, Serialize, ToSchema)]
pub struct ToggleFavoriteResponse {
    /// Game to add or remove.
    pub game_id: String,
    /// Whether the game is a favorite after the toggle.
    pub favorite: bool,
    /// Favorites after the toggle.
    pub favorites: Vec<GameRecord>,
}
