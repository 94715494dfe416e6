//! Stateless transcription proxy: upload, transcribe, delete.

use tracing::{debug, error, warn};

use crate::{
    dao::provider::{Content, ContentRole, FileUpload, GenerateRequest, Part},
    dto::chat::TranscriptionResponse,
    error::ServiceError,
    state::SharedState,
};

/// 400 message when the `audio` field is missing or empty.
pub const NO_AUDIO: &str = "No audio file provided";
/// 500 message for any provider failure.
pub const TRANSCRIBE_FAILED: &str = "Failed to transcribe audio";
/// MIME type assumed when the upload carries none.
pub const DEFAULT_AUDIO_MIME: &str = "audio/wav";
/// Provider display name when the upload has no file name.
pub const DEFAULT_DISPLAY_NAME: &str = "audio_recording";
const TRANSCRIPTION_PROMPT: &str = "Transcribe this audio recording. Return only the spoken \
    words as plain text, without timestamps, speaker labels or commentary.";

/// Audio received from the multipart `audio` field.
#[derive(Debug, Clone, Default)]
pub struct AudioUpload {
    /// Audio bytes.
    pub bytes: Vec<u8>,
    /// Part content type, if sent.
    pub mime_type: Option<String>,
    /// Part file name, if sent.
    pub file_name: Option<String>,
}

/// Transcribe `upload`; the provider file is deleted whatever the outcome.
pub async fn transcribe(
    state: &SharedState,
    upload: Option<AudioUpload>,
) -> Result<TranscriptionResponse, ServiceError> {
    let upload = upload
        .filter(|upload| !upload.bytes.is_empty())
        .ok_or_else(|| ServiceError::InvalidInput(NO_AUDIO.into()))?;

    let Some(model) = state.model() else {
        error!("transcription request received without a configured provider");
        return Err(ServiceError::Upstream(TRANSCRIBE_FAILED.into()));
    };

    let mime_type = upload
        .mime_type
        .filter(|mime| !mime.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_AUDIO_MIME.to_string());
    let display_name = upload
        .file_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string());
    debug!(bytes = upload.bytes.len(), %mime_type, "uploading audio for transcription");

    let uploaded = model
        .upload_file(FileUpload {
            bytes: upload.bytes,
            mime_type,
            display_name,
        })
        .await
        .map_err(|err| {
            error!(error = %err, "audio upload failed");
            ServiceError::Upstream(TRANSCRIBE_FAILED.into())
        })?;

    let result = model
        .generate(GenerateRequest {
            model: state.config().provider().transcription_model.clone(),
            system_instruction: None,
            contents: vec![Content {
                role: ContentRole::User,
                parts: vec![
                    Part::File {
                        mime_type: uploaded.mime_type.clone(),
                        uri: uploaded.uri.clone(),
                    },
                    Part::Text(TRANSCRIPTION_PROMPT.into()),
                ],
            }],
        })
        .await;

    if let Err(err) = model.delete_file(uploaded.name.clone()).await {
        warn!(error = %err, file = %uploaded.name, "failed to delete uploaded audio");
    }

    match result {
        Ok(text) => Ok(TranscriptionResponse {
            transcription: text.trim().to_string(),
        }),
        Err(err) => {
            error!(error = %err, "transcription request failed");
            Err(ServiceError::Upstream(TRANSCRIBE_FAILED.into()))
        }
    }
}
