//! Library crate for game-tutor-back, exposing modules for binaries and integration tests.

/// Runtime configuration loading.
pub mod config;
/// Data access: catalog, storage and remote clients.
pub mod dao;
/// Request and response payloads.
pub mod dto;
/// HTTP error mapping.
pub mod error;
/// Axum routers.
pub mod routes;
/// Business logic behind the routes.
pub mod services;
/// Shared application state.
pub mod state;
#[cfg(test)]
mod test_support;
