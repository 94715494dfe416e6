/// Microphone capture and transcription hand-off.
pub mod audio_bridge;
/// Catalog filtering and lookup.
pub mod catalog_service;
/// Stateless chat completion proxy.
pub mod chat_proxy;
/// OpenAPI document.
pub mod documentation;
/// Favorites toggling and persistence.
pub mod favorites_service;
/// Health summary.
pub mod health_service;
/// Free-text game recommendations.
pub mod recommendation_service;
/// Text-to-speech playback.
pub mod speech_bridge;
/// Audio transcription proxy.
pub mod transcription_proxy;
/// Async driver for one tutor session.
pub mod tutor_controller;
/// Controls of the per-game tutor panel.
pub mod tutor_panel;
/// System instruction built from a game record.
pub mod tutor_prompt;
/// Registry of server-hosted tutor sessions.
pub mod tutor_service;
