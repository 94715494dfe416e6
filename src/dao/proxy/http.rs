use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Response, multipart};
use serde::Deserialize;

use crate::{
    dao::proxy::{AudioClip, CompletionClient, TranscriptionClient},
    dto::chat::{ChatRequest, ChatResponse, TranscriptionResponse},
    state::tutor::CompletionRequest,
};

use super::error::{ProxyClientError, ProxyClientResult};

const CHAT_ENDPOINT: &str = "/api/chat";
const TRANSCRIBE_ENDPOINT: &str = "/api/transcribe";
const AUDIO_FIELD: &str = "audio";

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    error: String,
}

fn build_client() -> ProxyClientResult<Client> {
    Client::builder()
        .build()
        .map_err(|source| ProxyClientError::ClientBuilder { source })
}

/// Talks to `POST /api/chat` on a running backend.
#[derive(Clone)]
pub struct HttpCompletionClient {
    client: Client,
    base_url: Arc<str>,
}

impl HttpCompletionClient {
    /// Client for the backend at `base_url`.
    pub fn new(base_url: &str) -> ProxyClientResult<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: Arc::from(base_url.trim_end_matches('/')),
        })
    }

    async fn complete_inner(self, request: CompletionRequest) -> ProxyClientResult<String> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, CHAT_ENDPOINT))
            .json(&ChatRequest::from(request))
            .send()
            .await
            .map_err(|source| ProxyClientError::RequestSend {
                endpoint: CHAT_ENDPOINT,
                source,
            })?;
        let response = ensure_success(response, CHAT_ENDPOINT).await?;

        let payload = response.json::<ChatResponse>().await.map_err(|source| {
            ProxyClientError::DecodeResponse {
                endpoint: CHAT_ENDPOINT,
                source,
            }
        })?;
        Ok(payload.content)
    }
}

impl CompletionClient for HttpCompletionClient {
    fn complete(&self, request: CompletionRequest) -> BoxFuture<'static, ProxyClientResult<String>> {
        Box::pin(self.clone().complete_inner(request))
    }
}

/// Uploads recordings to `POST /api/transcribe` on a running backend.
#[derive(Clone)]
pub struct HttpTranscriptionClient {
    client: Client,
    base_url: Arc<str>,
}

impl HttpTranscriptionClient {
    /// Client for the backend at `base_url`.
    pub fn new(base_url: &str) -> ProxyClientResult<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: Arc::from(base_url.trim_end_matches('/')),
        })
    }

    async fn transcribe_inner(self, clip: AudioClip) -> ProxyClientResult<String> {
        let part = multipart::Part::bytes(clip.bytes)
            .file_name(clip.file_name)
            .mime_str(&clip.mime_type)
            .map_err(|source| ProxyClientError::InvalidMime {
                mime_type: clip.mime_type.clone(),
                source,
            })?;
        let form = multipart::Form::new().part(AUDIO_FIELD, part);

        let response = self
            .client
            .post(format!("{}{}", self.base_url, TRANSCRIBE_ENDPOINT))
            .multipart(form)
            .send()
            .await
            .map_err(|source| ProxyClientError::RequestSend {
                endpoint: TRANSCRIBE_ENDPOINT,
                source,
            })?;
        let response = ensure_success(response, TRANSCRIBE_ENDPOINT).await?;

        let payload = response
            .json::<TranscriptionResponse>()
            .await
            .map_err(|source| ProxyClientError::DecodeResponse {
                endpoint: TRANSCRIBE_ENDPOINT,
                source,
            })?;
        Ok(payload.transcription)
    }
}

impl TranscriptionClient for HttpTranscriptionClient {
    fn transcribe(&self, clip: AudioClip) -> BoxFuture<'static, ProxyClientResult<String>> {
        Box::pin(self.clone().transcribe_inner(clip))
    }
}

async fn ensure_success(
    response: Response,
    endpoint: &'static str,
) -> ProxyClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorPayload>(&body)
        .map(|payload| payload.error)
        .unwrap_or(body);

    Err(ProxyClientError::RequestStatus {
        endpoint,
        status,
        message,
    })
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::state::tutor::Turn;

    #[tokio::test]
    async fn completion_forwards_instruction_and_turns() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_json(json!({
                "instruction": "Teach UNO.",
                "messages": [
                    { "role": "user", "content": "Welcome me." },
                    { "role": "assistant", "content": "Hi!" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "content": "Sure." })))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpCompletionClient::new(&format!("{}/", server.uri())).unwrap();
        let reply = client
            .complete(CompletionRequest {
                instruction: Some("Teach UNO.".into()),
                turns: vec![Turn::user("Welcome me."), Turn::assistant("Hi!")],
            })
            .await
            .unwrap();

        assert_eq!(reply, "Sure.");
    }

    #[tokio::test]
    async fn completion_failure_carries_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({ "error": "Failed to process chat request" })),
            )
            .mount(&server)
            .await;

        let client = HttpCompletionClient::new(&server.uri()).unwrap();
        let err = client
            .complete(CompletionRequest {
                instruction: None,
                turns: vec![Turn::user("hi")],
            })
            .await
            .unwrap_err();

        match err {
            ProxyClientError::RequestStatus {
                status, message, ..
            } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(message, "Failed to process chat request");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn transcription_uploads_audio_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/transcribe"))
            .and(body_string_contains("name=\"audio\""))
            .and(body_string_contains("filename=\"recording.webm\""))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "transcription": "draw two" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpTranscriptionClient::new(&server.uri()).unwrap();
        let text = client
            .transcribe(AudioClip {
                bytes: b"RIFF".to_vec(),
                mime_type: "audio/webm".into(),
                file_name: "recording.webm".into(),
            })
            .await
            .unwrap();

        assert_eq!(text, "draw two");
    }
}
