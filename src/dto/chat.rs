//! Wire shapes of the completion and transcription proxies.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;

use crate::state::tutor::{CompletionRequest, Role};

/// One turn forwarded to the completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    /// `user`, or `assistant` (`model` is accepted).
    pub role: Role,
    /// Message text.
    pub content: String,
}

/// Body of `POST /api/chat`.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// Out-of-band instruction anchoring the conversation.
    #[serde(default)]
    pub instruction: Option<String>,
    /// Conversation, oldest first; required.
    #[serde(default)]
    pub messages: Option<Vec<ChatMessage>>,
}

impl From<CompletionRequest> for ChatRequest {
    fn from(request: CompletionRequest) -> Self {
        let messages = request
            .turns
            .into_iter()
            .map(|turn| ChatMessage {
                role: turn.role,
                content: turn.content,
            })
            .collect();
        Self {
            instruction: request.instruction,
            messages: Some(messages),
        }
    }
}

/// Successful reply of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    /// Model reply.
    pub content: String,
}

/// Successful reply of `POST /api/transcribe`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TranscriptionResponse {
    /// Trimmed transcript text.
    pub transcription: String,
}

/// Multipart body of `POST /api/transcribe` (documentation only).
#[derive(Debug, ToSchema)]
pub struct TranscriptionUpload {
    /// Recorded audio file.
    #[schema(value_type = String, format = Binary)]
    pub audio: Vec<u8>,
}
