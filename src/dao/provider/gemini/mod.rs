mod client;
mod config;
mod error;
mod models;

pub use self::{
    client::GeminiClient,
    config::{DEFAULT_BASE_URL, GeminiConfig},
    error::{ProviderError, ProviderResult},
};
