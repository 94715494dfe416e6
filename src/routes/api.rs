//! Completion and transcription proxy endpoints.

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State, multipart::MultipartRejection,
        rejection::JsonRejection,
    },
    routing::post,
};
use tracing::warn;

use crate::{
    dto::chat::{ChatRequest, ChatResponse, TranscriptionResponse, TranscriptionUpload},
    error::AppError,
    services::{
        chat_proxy::{self, NO_MESSAGES},
        transcription_proxy::{self, AudioUpload, NO_AUDIO},
    },
    state::SharedState,
};

const AUDIO_FIELD: &str = "audio";

/// Proxy routes; `max_audio_bytes` bounds transcription uploads.
pub fn router(max_audio_bytes: usize) -> Router<SharedState> {
    Router::new()
        .route("/api/chat", post(chat))
        .route(
            "/api/transcribe",
            post(transcribe).layer(DefaultBodyLimit::max(max_audio_bytes)),
        )
}

/// Forward a conversation to the hosted chat model.
#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "proxy",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Model reply", body = ChatResponse),
        (status = 400, description = "No messages provided"),
        (status = 500, description = "Failed to process chat request")
    )
)]
pub async fn chat(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection, "malformed chat request");
        AppError::BadRequest(NO_MESSAGES.into())
    })?;
    let response = chat_proxy::complete_chat(&state, request).await?;
    Ok(Json(response))
}

/// Transcribe the multipart `audio` field.
#[utoipa::path(
    post,
    path = "/api/transcribe",
    tag = "proxy",
    request_body(content = TranscriptionUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Transcript", body = TranscriptionResponse),
        (status = 400, description = "No audio file provided"),
        (status = 500, description = "Failed to transcribe audio")
    )
)]
pub async fn transcribe(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TranscriptionResponse>, AppError> {
    let mut multipart = multipart.map_err(|rejection| {
        warn!(error = %rejection, "transcription request is not multipart");
        AppError::BadRequest(NO_AUDIO.into())
    })?;
    let upload = read_audio_field(&mut multipart).await?;
    let response = transcription_proxy::transcribe(&state, upload).await?;
    Ok(Json(response))
}

async fn read_audio_field(multipart: &mut Multipart) -> Result<Option<AudioUpload>, AppError> {
    let malformed = |err: axum::extract::multipart::MultipartError| {
        warn!(error = %err, "malformed multipart body");
        AppError::BadRequest(NO_AUDIO.into())
    };

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }
        let mime_type = field.content_type().map(str::to_owned);
        let file_name = field.file_name().map(str::to_owned);
        let bytes = field.bytes().await.map_err(malformed)?;
        return Ok(Some(AudioUpload {
            bytes: bytes.to_vec(),
            mime_type,
            file_name,
        }));
    }
    Ok(None)
}
