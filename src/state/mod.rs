/// Favorite set held in memory.
pub mod favorites;
/// Tutor session state machine.
pub mod tutor;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::{catalog::Catalog, local_store::LocalStore, provider::LanguageModel},
    services::tutor_controller::TutorController,
    state::favorites::FavoriteSet,
};

/// Handle passed to every handler and service.
pub type SharedState = Arc<AppState>;

/// Central application state: configuration, catalog, favorites and tutor sessions.
pub struct AppState {
    config: AppConfig,
    catalog: Catalog,
    local_store: Arc<dyn LocalStore>,
    favorites: RwLock<FavoriteSet>,
    model: Option<Arc<dyn LanguageModel>>,
    tutor_sessions: DashMap<Uuid, Arc<TutorController>>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// Without a `model` the application runs in degraded mode: browsing and
    /// favorites work, provider-backed calls fail.
    pub fn new(
        config: AppConfig,
        catalog: Catalog,
        local_store: Arc<dyn LocalStore>,
        model: Option<Arc<dyn LanguageModel>>,
    ) -> SharedState {
        Arc::new(Self {
            config,
            catalog,
            local_store,
            favorites: RwLock::new(FavoriteSet::new()),
            model,
            tutor_sessions: DashMap::new(),
        })
    }

    /// Loaded configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Immutable game catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Store backing the favorites.
    pub fn local_store(&self) -> Arc<dyn LocalStore> {
        Arc::clone(&self.local_store)
    }

    /// In-memory favorites.
    pub fn favorites(&self) -> &RwLock<FavoriteSet> {
        &self.favorites
    }

    /// Provider handle, if one is configured.
    pub fn model(&self) -> Option<Arc<dyn LanguageModel>> {
        self.model.clone()
    }

    /// True when no provider is configured.
    pub fn is_degraded(&self) -> bool {
        self.model.is_none()
    }

    /// Open tutor sessions by session id.
    pub fn tutor_sessions(&self) -> &DashMap<Uuid, Arc<TutorController>> {
        &self.tutor_sessions
    }
}
