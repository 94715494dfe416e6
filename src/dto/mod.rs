use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Catalog search and recommendation payloads.
pub mod catalog;
/// Chat and transcription proxy payloads.
pub mod chat;
/// Favorite games.
pub mod favorites;
/// Health check.
pub mod health;
/// Tutor session payloads.
pub mod tutor;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
