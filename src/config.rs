//! Application-level configuration loading: provider models, catalog and storage locations.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::dao::provider::gemini::DEFAULT_BASE_URL;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "GAME_TUTOR_BACK_CONFIG_PATH";
const DEFAULT_CHAT_MODEL: &str = "gemma-3n-e4b-it";
const DEFAULT_TRANSCRIPTION_MODEL: &str = "gemini-2.0-flash-lite";
const DEFAULT_FAVORITES_DIR: &str = "data/local";
/// Upper bound for uploaded recordings (25 MiB).
const DEFAULT_MAX_AUDIO_BYTES: usize = 25 * 1024 * 1024;
const DEFAULT_MAX_TUTOR_SESSIONS: usize = 256;
const DEFAULT_TUTOR_SESSION_IDLE_SECS: u64 = 30 * 60;

/// How much catalog data goes into the recommendation prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogDetail {
    /// One line per game: id, name, category, players, difficulty, tags, description.
    #[default]
    Summary,
    /// Every record as JSON.
    Full,
}

/// Hosted provider endpoint and the model used for each proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    /// Root URL of the provider REST API.
    pub base_url: String,
    /// Model behind the completion proxy and tutor sessions.
    pub chat_model: String,
    /// Model used to transcribe uploaded audio.
    pub transcription_model: String,
    /// Model asked for game recommendations.
    pub recommendation_model: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            transcription_model: DEFAULT_TRANSCRIPTION_MODEL.to_string(),
            recommendation_model: DEFAULT_CHAT_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    provider: ProviderSettings,
    recommendation_catalog: CatalogDetail,
    catalog_path: Option<PathBuf>,
    favorites_dir: PathBuf,
    max_audio_bytes: usize,
    max_tutor_sessions: usize,
    tutor_session_idle_timeout: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        chat_model = %app_config.provider.chat_model,
                        "loaded application config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON document; omitted keys keep their defaults.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Provider endpoint and model names.
    pub fn provider(&self) -> &ProviderSettings {
        &self.provider
    }

    /// Catalog detail included in recommendation prompts.
    pub fn recommendation_catalog(&self) -> CatalogDetail {
        self.recommendation_catalog
    }

    /// Catalog override file; `None` means the embedded catalog.
    pub fn catalog_path(&self) -> Option<&PathBuf> {
        self.catalog_path.as_ref()
    }

    /// Directory backing the local key/value store.
    pub fn favorites_dir(&self) -> &PathBuf {
        &self.favorites_dir
    }

    /// Largest accepted transcription upload, in bytes.
    pub fn max_audio_bytes(&self) -> usize {
        self.max_audio_bytes
    }

    /// Number of tutor sessions kept before the least recently active one is evicted.
    pub fn max_tutor_sessions(&self) -> usize {
        self.max_tutor_sessions
    }

    /// Inactivity after which a tutor session is closed.
    pub fn tutor_session_idle_timeout(&self) -> Duration {
        self.tutor_session_idle_timeout
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ProviderSettings::default(),
            recommendation_catalog: CatalogDetail::default(),
            catalog_path: None,
            favorites_dir: PathBuf::from(DEFAULT_FAVORITES_DIR),
            max_audio_bytes: DEFAULT_MAX_AUDIO_BYTES,
            max_tutor_sessions: DEFAULT_MAX_TUTOR_SESSIONS,
            tutor_session_idle_timeout: Duration::from_secs(DEFAULT_TUTOR_SESSION_IDLE_SECS),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    provider: RawProvider,
    recommendation_catalog: Option<CatalogDetail>,
    catalog_path: Option<PathBuf>,
    favorites_dir: Option<PathBuf>,
    max_audio_bytes: Option<usize>,
    max_tutor_sessions: Option<usize>,
    tutor_session_idle_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the `provider` section.
struct RawProvider {
    base_url: Option<String>,
    chat_model: Option<String>,
    transcription_model: Option<String>,
    recommendation_model: Option<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        let provider = {
            let raw = value.provider;
            let chat_model = raw.chat_model.unwrap_or(defaults.provider.chat_model);
            ProviderSettings {
                base_url: raw.base_url.unwrap_or(defaults.provider.base_url),
                recommendation_model: raw
                    .recommendation_model
                    .unwrap_or_else(|| chat_model.clone()),
                transcription_model: raw
                    .transcription_model
                    .unwrap_or(defaults.provider.transcription_model),
                chat_model,
            }
        };

        Self {
            provider,
            recommendation_catalog: value
                .recommendation_catalog
                .unwrap_or(defaults.recommendation_catalog),
            catalog_path: value.catalog_path,
            favorites_dir: value.favorites_dir.unwrap_or(defaults.favorites_dir),
            max_audio_bytes: value.max_audio_bytes.unwrap_or(defaults.max_audio_bytes),
            max_tutor_sessions: value
                .max_tutor_sessions
                .filter(|max| *max > 0)
                .unwrap_or(defaults.max_tutor_sessions),
            tutor_session_idle_timeout: value
                .tutor_session_idle_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.tutor_session_idle_timeout),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
