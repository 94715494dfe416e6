//! Hosted generative-AI provider access.

/// Gemini REST client.
pub mod gemini;

use futures::future::BoxFuture;

pub use self::gemini::{GeminiClient, GeminiConfig, ProviderError, ProviderResult};

/// Author of a content block sent to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRole {
    /// End user, or this backend speaking for them.
    User,
    /// The language model.
    Model,
}

/// One piece of a content block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    /// Plain text.
    Text(String),
    /// Reference to a previously uploaded file resource.
    File {
        /// MIME type of the file.
        mime_type: String,
        /// URI returned by the upload.
        uri: String,
    },
}

/// Ordered parts authored by one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    /// Who produced the parts.
    pub role: ContentRole,
    /// Ordered payload.
    pub parts: Vec<Part>,
}

impl Content {
    /// Single text part.
    pub fn text(role: ContentRole, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part::Text(text.into())],
        }
    }
}

/// Single completion call against a named model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    /// Model name, e.g. `gemini-2.0-flash-lite`.
    pub model: String,
    /// Steers the whole conversation; never part of `contents`.
    pub system_instruction: Option<String>,
    /// Conversation, oldest first.
    pub contents: Vec<Content>,
}

/// Raw bytes to register as a provider file resource.
#[derive(Debug, Clone)]
pub struct FileUpload {
    /// Raw file contents.
    pub bytes: Vec<u8>,
    /// MIME type of the file.
    pub mime_type: String,
    /// Name shown in the provider console.
    pub display_name: String,
}

/// Handle of an uploaded file resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Resource name used for deletion (`files/abc123`).
    pub name: String,
    /// URI referenced from [`Part::File`].
    pub uri: String,
    /// MIME type of the file.
    pub mime_type: String,
}

/// Operations the proxies need from the hosted provider. Each call is issued exactly once.
pub trait LanguageModel: Send + Sync {
    /// Run a completion and return the concatenated text of the first candidate.
    fn generate(&self, request: GenerateRequest) -> BoxFuture<'static, ProviderResult<String>>;
    /// Register raw bytes as a file resource.
    fn upload_file(&self, upload: FileUpload) -> BoxFuture<'static, ProviderResult<UploadedFile>>;
    /// Delete a file resource by name.
    fn delete_file(&self, name: String) -> BoxFuture<'static, ProviderResult<()>>;
}
