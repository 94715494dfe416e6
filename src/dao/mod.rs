/// Game catalog loading and lookup.
pub mod catalog;
/// Persistent key/value storage for client-side state.
pub mod local_store;
/// Catalog model definitions.
pub mod models;
/// Hosted generative-AI provider access.
pub mod provider;
/// Clients for the completion and transcription proxies.
pub mod proxy;
/// Storage error types shared by the local stores.
pub mod storage;
