//! Favorites: restored once at startup, persisted after every mutation.

use tracing::{info, warn};

use crate::{
    dao::{
        local_store::LocalStore,
        models::GameRecord,
        storage::{StorageError, StorageResult},
    },
    error::ServiceError,
    state::{SharedState, favorites::FavoriteSet},
};

/// Key under which the favorites list is persisted.
pub const FAVORITES_KEY: &str = "game-tutor-favorites";

async fn read_favorites(store: &dyn LocalStore) -> StorageResult<FavoriteSet> {
    let Some(raw) = store.read(FAVORITES_KEY).await? else {
        return Ok(FavoriteSet::new());
    };
    let records: Vec<GameRecord> =
        serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
            key: FAVORITES_KEY.to_string(),
            source,
        })?;
    Ok(FavoriteSet::from_records(records))
}

/// Load persisted favorites into the shared state; unreadable data starts empty.
pub async fn restore(state: &SharedState) {
    let favorites = match read_favorites(state.local_store().as_ref()).await {
        Ok(favorites) => {
            info!(count = favorites.len(), "restored favorites");
            favorites
        }
        Err(err) => {
            warn!(error = %err, "failed to restore favorites; starting empty");
            FavoriteSet::new()
        }
    };
    *state.favorites().write().await = favorites;
}

async fn persist(state: &SharedState, favorites: &FavoriteSet) {
    let serialized = match serde_json::to_string(&favorites.to_records()) {
        Ok(serialized) => serialized,
        Err(err) => {
            warn!(error = %err, "failed to serialize favorites");
            return;
        }
    };
    if let Err(err) = state.local_store().write(FAVORITES_KEY, serialized).await {
        warn!(error = %err, "failed to persist favorites");
    }
}

fn catalog_game(state: &SharedState, id: &str) -> Result<GameRecord, ServiceError> {
    state
        .catalog()
        .get(id)
        .cloned()
        .ok_or_else(|| ServiceError::NotFound(format!("game `{id}`")))
}

/// Favorites ordered by game id.
pub async fn list(state: &SharedState) -> Vec<GameRecord> {
    state.favorites().read().await.to_records()
}

/// Add a catalog game; adding an existing favorite changes nothing.
pub async fn add(state: &SharedState, id: &str) -> Result<Vec<GameRecord>, ServiceError> {
    let game = catalog_game(state, id)?;
    let mut favorites = state.favorites().write().await;
    if favorites.add(&game) {
        persist(state, &favorites).await;
    }
    Ok(favorites.to_records())
}

/// Remove by identifier, whether or not the game is still in the catalog.
pub async fn remove(state: &SharedState, id: &str) -> Vec<GameRecord> {
    let mut favorites = state.favorites().write().await;
    if favorites.remove(id) {
        persist(state, &favorites).await;
    }
    favorites.to_records()
}

/// Flip membership; returns whether the game is now a favorite.
pub async fn toggle(
    state: &SharedState,
    id: &str,
) -> Result<(bool, Vec<GameRecord>), ServiceError> {
    let game = catalog_game(state, id)?;
    let mut favorites = state.favorites().write().await;
    let now_favorite = favorites.toggle(&game);
    persist(state, &favorites).await;
    Ok((now_favorite, favorites.to_records()))
}
