use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Response};
use tracing::debug;

use crate::dao::provider::{FileUpload, GenerateRequest, LanguageModel, UploadedFile};

use super::{
    config::GeminiConfig,
    error::{ProviderError, ProviderResult},
    models::{
        ErrorResponse, GenerateContentBody, GenerateContentResponse, StartUploadBody,
        StartUploadFile, UploadResponse,
    },
};

const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

/// Thin REST client for the Gemini generate-content and files endpoints.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: Arc<str>,
    api_key: Arc<str>,
}

impl GeminiClient {
    /// Build a client for `config`.
    pub fn new(config: GeminiConfig) -> ProviderResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| ProviderError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::from(config.base_url.trim_end_matches('/')),
            api_key: Arc::from(config.api_key),
        })
    }

    async fn generate_inner(self, request: GenerateRequest) -> ProviderResult<String> {
        const OPERATION: &str = "generateContent";
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, request.model
        );
        let body = GenerateContentBody::from(request);

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, self.api_key.as_ref())
            .json(&body)
            .send()
            .await
            .map_err(|source| ProviderError::RequestSend {
                operation: OPERATION,
                source,
            })?;
        let response = ensure_success(response, OPERATION).await?;

        let payload = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|source| ProviderError::DecodeResponse {
                operation: OPERATION,
                source,
            })?;
        Ok(payload.text())
    }

    async fn upload_inner(self, upload: FileUpload) -> ProviderResult<UploadedFile> {
        const OPERATION: &str = "files.upload";
        let start_url = format!("{}/upload/v1beta/files", self.base_url);

        let start = self
            .client
            .post(start_url)
            .header(API_KEY_HEADER, self.api_key.as_ref())
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header(
                "X-Goog-Upload-Header-Content-Length",
                upload.bytes.len().to_string(),
            )
            .header("X-Goog-Upload-Header-Content-Type", upload.mime_type.as_str())
            .json(&StartUploadBody {
                file: StartUploadFile {
                    display_name: upload.display_name.clone(),
                },
            })
            .send()
            .await
            .map_err(|source| ProviderError::RequestSend {
                operation: OPERATION,
                source,
            })?;
        let start = ensure_success(start, OPERATION).await?;

        let session_url = start
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .ok_or(ProviderError::MissingUploadUrl)?;
        debug!(display_name = %upload.display_name, "provider upload session opened");

        let finalize = self
            .client
            .post(session_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(upload.bytes)
            .send()
            .await
            .map_err(|source| ProviderError::RequestSend {
                operation: OPERATION,
                source,
            })?;
        let finalize = ensure_success(finalize, OPERATION).await?;

        let payload =
            finalize
                .json::<UploadResponse>()
                .await
                .map_err(|source| ProviderError::DecodeResponse {
                    operation: OPERATION,
                    source,
                })?;
        Ok(payload.file.into_uploaded(&upload.mime_type))
    }

    async fn delete_inner(self, name: String) -> ProviderResult<()> {
        const OPERATION: &str = "files.delete";
        let url = format!("{}/v1beta/{}", self.base_url, name);
        let response = self
            .client
            .delete(url)
            .header(API_KEY_HEADER, self.api_key.as_ref())
            .send()
            .await
            .map_err(|source| ProviderError::RequestSend {
                operation: OPERATION,
                source,
            })?;
        ensure_success(response, OPERATION).await?;
        Ok(())
    }
}

impl LanguageModel for GeminiClient {
    fn generate(&self, request: GenerateRequest) -> BoxFuture<'static, ProviderResult<String>> {
        Box::pin(self.clone().generate_inner(request))
    }

    fn upload_file(&self, upload: FileUpload) -> BoxFuture<'static, ProviderResult<UploadedFile>> {
        Box::pin(self.clone().upload_inner(upload))
    }

    fn delete_file(&self, name: String) -> BoxFuture<'static, ProviderResult<()>> {
        Box::pin(self.clone().delete_inner(name))
    }
}

/// Turn a non-success status into [`ProviderError::RequestStatus`], keeping the provider message.
async fn ensure_success(response: Response, operation: &'static str) -> ProviderResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .ok()
        .and_then(|payload| payload.error)
        .map(|detail| detail.message)
        .unwrap_or(body);

    Err(ProviderError::RequestStatus {
        operation,
        status,
        message,
    })
}
