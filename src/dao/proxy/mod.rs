//! Clients for the backend's own completion and transcription proxies.
//!
//! The tutor controller and the audio bridge only talk to these traits, so a
//! host shell can point them at a remote deployment (`Http*` clients) or at the
//! in-process services.

mod error;
mod http;

use futures::future::BoxFuture;

use crate::state::tutor::CompletionRequest;

pub use self::{
    error::{ProxyClientError, ProxyClientResult},
    http::{HttpCompletionClient, HttpTranscriptionClient},
};

/// Recorded audio ready to be sent for transcription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    /// Encoded audio.
    pub bytes: Vec<u8>,
    /// Recorder MIME type, codecs included.
    pub mime_type: String,
    /// Multipart file name.
    pub file_name: String,
}

/// Completion endpoint used by the tutor conversation.
pub trait CompletionClient: Send + Sync {
    /// Send the instruction and transcript, returning the assistant reply.
    fn complete(&self, request: CompletionRequest) -> BoxFuture<'static, ProxyClientResult<String>>;
}

/// Transcription endpoint used by the audio bridge.
pub trait TranscriptionClient: Send + Sync {
    /// Upload `clip` and return its transcript.
    fn transcribe(&self, clip: AudioClip) -> BoxFuture<'static, ProxyClientResult<String>>;
}
