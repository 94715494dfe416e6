//! Game Tutor Back binary entrypoint wiring the catalog, favorites, proxies and tutor sessions.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use game_tutor_back::{
    config::AppConfig,
    dao::{
        catalog::Catalog,
        local_store::FileLocalStore,
        provider::{GeminiClient, GeminiConfig, LanguageModel},
    },
    routes,
    services::{favorites_service, tutor_service},
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let catalog = Catalog::load(config.catalog_path().map(|path| path.as_path()))
        .await
        .context("loading game catalog")?;
    info!(games = catalog.len(), "catalog ready");

    let local_store = Arc::new(FileLocalStore::new(config.favorites_dir().clone()));
    let model = connect_provider(&config)?;

    let app_state = AppState::new(config, catalog, local_store, model);
    favorites_service::restore(&app_state).await;
    tokio::spawn(tutor_service::run_session_sweeper(app_state.clone()));

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Build the provider client; a missing API key leaves the server in degraded mode.
fn connect_provider(config: &AppConfig) -> anyhow::Result<Option<Arc<dyn LanguageModel>>> {
    match GeminiConfig::from_env(config.provider().base_url.clone()) {
        Ok(gemini) => {
            let client = GeminiClient::new(gemini).context("building provider client")?;
            info!(
                chat_model = %config.provider().chat_model,
                transcription_model = %config.provider().transcription_model,
                "provider configured"
            );
            Ok(Some(Arc::new(client)))
        }
        Err(err) => {
            warn!(error = %err, "provider not configured; running in degraded mode");
            Ok(None)
        }
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
