//! DTOs of the server-hosted tutor sessions.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::format_system_time,
    state::tutor::{Role, TutorPhase, TutorSnapshot, Turn},
};

/// Body of `POST /tutor/sessions`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct OpenSessionRequest {
    /// Game id or slug.
    #[validate(length(min = 1))]
    pub game: String,
}

/// Body of `POST /tutor/sessions/{id}/messages`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SendMessageRequest {
    /// Message text.
    #[validate(length(min = 1, max = 4000))]
    pub content: String,
}

/// One transcript turn.
#[derive(Debug, Serialize, ToSchema)]
pub struct TurnDto {
    /// Time-ordered turn id.
    pub id: Uuid,
    /// Author of the turn.
    pub role: Role,
    /// Markdown text.
    pub content: String,
    /// RFC 3339 timestamp.
    pub created_at: String,
}

impl From<Turn> for TurnDto {
    fn from(turn: Turn) -> Self {
        Self {
            id: turn.id,
            role: turn.role,
            content: turn.content,
            created_at: format_system_time(turn.created_at),
        }
    }
}

/// Public view of one tutor session.
#[derive(Debug, Serialize, ToSchema)]
pub struct TutorSessionResponse {
    /// Handle for follow-up requests.
    pub session_id: Uuid,
    /// Game being taught; absent once closed.
    pub game_id: Option<String>,
    /// Lifecycle phase.
    pub phase: TutorPhase,
    /// True while a completion round trip is in flight.
    pub busy: bool,
    /// Transcript, oldest first.
    pub turns: Vec<TurnDto>,
}

impl TutorSessionResponse {
    /// Response for `session_id` in the state of `snapshot`.
    pub fn new(session_id: Uuid, snapshot: TutorSnapshot) -> Self {
        Self {
            session_id,
            game_id: snapshot.game_id,
            phase: snapshot.phase,
            busy: snapshot.busy,
            turns: snapshot.transcript.into_iter().map(TurnDto::from).collect(),
        }
    }
}
