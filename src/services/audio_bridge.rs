//! Microphone capture feeding the transcription proxy.
//!
//! The host shell supplies the device through [`AudioInput`]; the bridge owns
//! the capture lifecycle and turns device failures into user-facing messages.

use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use thiserror::Error;
use tokio::{sync::Mutex, time::Instant};
use tracing::{debug, warn};

use crate::dao::proxy::{AudioClip, TranscriptionClient};

/// How long a capture error stays visible.
pub const ERROR_DISPLAY_DURATION: Duration = Duration::from_secs(5);

/// Runtime capabilities reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureEnvironment {
    /// A capture device API exists at all.
    pub api_available: bool,
    /// The page runs in a secure context (HTTPS or localhost).
    pub secure_context: bool,
}

/// Failures reported by the host device layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// The user or policy refused access.
    #[error("permission to use the microphone was denied")]
    NotAllowed,
    /// No input device is present.
    #[error("no capture device was found")]
    NotFound,
    /// The host has no capture support.
    #[error("audio capture is not supported")]
    NotSupported,
    /// Usually held by another application.
    #[error("the capture device could not be read")]
    NotReadable,
    /// Blocked by the security context.
    #[error("capture was blocked for security reasons")]
    Security,
    /// The request was aborted.
    #[error("capture was aborted")]
    Aborted,
    /// Anything else the host reports.
    #[error("device error: {0}")]
    Other(String),
}

/// An acquired microphone buffering audio.
pub trait CaptureStream: Send {
    /// Container and codec of the buffered audio, e.g. `audio/webm;codecs=opus`.
    fn mime_type(&self) -> String;
    /// Stop buffering, release the device and hand back the recording.
    fn stop(self: Box<Self>) -> BoxFuture<'static, Result<Vec<u8>, DeviceError>>;
}

/// Host microphone access.
pub trait AudioInput: Send + Sync {
    /// Capabilities of the current host.
    fn environment(&self) -> CaptureEnvironment;
    /// Ask for the microphone; resolves once the user granted or refused it.
    fn open(&self) -> BoxFuture<'static, Result<Box<dyn CaptureStream>, DeviceError>>;
}

/// Capture failures; `Display` is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// Access to the microphone was refused.
    #[error("Microphone access was denied. Please allow microphone access and try again.")]
    PermissionDenied,
    /// No microphone found.
    #[error("No microphone found. Please connect a microphone and try again.")]
    NoDevice,
    /// Recording is not supported here.
    #[error("Audio recording is not supported in this browser.")]
    Unsupported,
    /// Recording needs a secure origin.
    #[error("Audio recording requires a secure connection (HTTPS).")]
    InsecureContext,
    /// The microphone is in use.
    #[error("Microphone is already in use by another application.")]
    DeviceBusy,
    /// A capture or device request is already running.
    #[error("A recording is already in progress.")]
    AlreadyActive,
    /// Stop requested with no capture running.
    #[error("No active recording found")]
    NotCapturing,
    /// Cancelled while the device was opening; not displayed.
    #[error("Recording was cancelled.")]
    Cancelled,
    /// The clip could not be transcribed.
    #[error("Failed to transcribe audio. Please try again.")]
    Transcription,
    /// Any other device failure.
    #[error("Failed to access the microphone. Please try again.")]
    Failed,
}

impl From<DeviceError> for CaptureError {
    fn from(err: DeviceError) -> Self {
        match err {
            DeviceError::NotAllowed => CaptureError::PermissionDenied,
            DeviceError::NotFound => CaptureError::NoDevice,
            DeviceError::NotSupported => CaptureError::Unsupported,
            DeviceError::Security => CaptureError::InsecureContext,
            DeviceError::NotReadable => CaptureError::DeviceBusy,
            DeviceError::Aborted | DeviceError::Other(_) => CaptureError::Failed,
        }
    }
}

/// Where the bridge is in the capture cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CapturePhase {
    /// No device held.
    #[default]
    Idle,
    /// Waiting for the host to grant and open the device.
    Requesting,
    /// Buffering audio.
    Capturing,
    /// Recording handed to the transcription proxy.
    Transcribing,
}

/// Result of the combined record control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Capture began.
    Started,
    /// Capture ended with this transcript.
    Transcribed(String),
}

#[derive(Default)]
struct Recorder {
    phase: CapturePhase,
    stream: Option<Box<dyn CaptureStream>>,
    error: Option<(CaptureError, Instant)>,
    /// Bumped per device request so a cancelled request cannot commit.
    request: u64,
}

impl Recorder {
    fn report(&mut self, err: CaptureError) -> CaptureError {
        self.error = Some((err.clone(), Instant::now()));
        err
    }
}

/// One capture at a time, from microphone to transcript.
pub struct AudioBridge {
    input: Arc<dyn AudioInput>,
    transcriber: Arc<dyn TranscriptionClient>,
    recorder: Mutex<Recorder>,
}

impl AudioBridge {
    /// Bridge between `input` and `transcriber`, starting idle.
    pub fn new(input: Arc<dyn AudioInput>, transcriber: Arc<dyn TranscriptionClient>) -> Self {
        Self {
            input,
            transcriber,
            recorder: Mutex::new(Recorder::default()),
        }
    }

    /// Current capture phase.
    pub async fn phase(&self) -> CapturePhase {
        self.recorder.lock().await.phase
    }

    /// Error to display, cleared once it has been visible for [`ERROR_DISPLAY_DURATION`].
    pub async fn current_error(&self) -> Option<CaptureError> {
        let mut recorder = self.recorder.lock().await;
        match &recorder.error {
            Some((_, since)) if since.elapsed() >= ERROR_DISPLAY_DURATION => {
                recorder.error = None;
                None
            }
            Some((err, _)) => Some(err.clone()),
            None => None,
        }
    }

    /// Acquire the microphone and start buffering.
    ///
    /// The recorder is not locked while the host opens the device, so
    /// [`AudioBridge::phase`] and [`AudioBridge::cancel`] stay responsive during
    /// a permission prompt.
    pub async fn begin_capture(&self) -> Result<(), CaptureError> {
        let request = {
            let mut recorder = self.recorder.lock().await;
            if recorder.phase != CapturePhase::Idle {
                return Err(recorder.report(CaptureError::AlreadyActive));
            }

            let environment = self.input.environment();
            if !environment.api_available {
                return Err(recorder.report(CaptureError::Unsupported));
            }
            if !environment.secure_context {
                return Err(recorder.report(CaptureError::InsecureContext));
            }

            recorder.phase = CapturePhase::Requesting;
            recorder.request += 1;
            recorder.request
        };

        let opened = self.input.open().await;

        let mut recorder = self.recorder.lock().await;
        let still_wanted =
            recorder.phase == CapturePhase::Requesting && recorder.request == request;
        match opened {
            Ok(stream) if still_wanted => {
                debug!(mime_type = %stream.mime_type(), "audio capture started");
                recorder.stream = Some(stream);
                recorder.phase = CapturePhase::Capturing;
                recorder.error = None;
                Ok(())
            }
            Ok(stream) => {
                drop(recorder);
                debug!("capture cancelled while the device was opening");
                if let Err(err) = stream.stop().await {
                    debug!(error = %err, "failed to release capture device");
                }
                Err(CaptureError::Cancelled)
            }
            Err(err) if still_wanted => {
                warn!(error = %err, "failed to open capture device");
                recorder.phase = CapturePhase::Idle;
                Err(recorder.report(err.into()))
            }
            Err(err) => {
                debug!(error = %err, "device request failed after cancellation");
                Err(CaptureError::Cancelled)
            }
        }
    }

    /// Stop buffering, upload the recording and return its transcript.
    pub async fn end_capture(&self) -> Result<String, CaptureError> {
        let stream = {
            let mut recorder = self.recorder.lock().await;
            if recorder.phase != CapturePhase::Capturing {
                return Err(recorder.report(CaptureError::NotCapturing));
            }
            let Some(stream) = recorder.stream.take() else {
                recorder.phase = CapturePhase::Idle;
                return Err(recorder.report(CaptureError::NotCapturing));
            };
            recorder.phase = CapturePhase::Transcribing;
            stream
        };

        let mime_type = stream.mime_type();
        let outcome = match stream.stop().await {
            Ok(bytes) => {
                let clip = AudioClip {
                    bytes,
                    file_name: recording_file_name(&mime_type),
                    mime_type,
                };
                self.transcriber.transcribe(clip).await.map_err(|err| {
                    warn!(error = %err, "transcription failed");
                    CaptureError::Transcription
                })
            }
            Err(err) => {
                warn!(error = %err, "failed to stop capture device");
                Err(CaptureError::Failed)
            }
        };

        let mut recorder = self.recorder.lock().await;
        recorder.phase = CapturePhase::Idle;
        match outcome {
            Ok(text) => Ok(text.trim().to_string()),
            Err(err) => Err(recorder.report(err)),
        }
    }

    /// Start capturing when idle, or finish and transcribe when capturing.
    pub async fn toggle(&self) -> Result<ToggleOutcome, CaptureError> {
        match self.phase().await {
            CapturePhase::Idle => self.begin_capture().await.map(|()| ToggleOutcome::Started),
            CapturePhase::Capturing => self.end_capture().await.map(ToggleOutcome::Transcribed),
            CapturePhase::Requesting | CapturePhase::Transcribing => {
                Err(self.recorder.lock().await.report(CaptureError::AlreadyActive))
            }
        }
    }

    /// Release the microphone and drop the recording without transcribing.
    pub async fn cancel(&self) {
        let stream = {
            let mut recorder = self.recorder.lock().await;
            if matches!(
                recorder.phase,
                CapturePhase::Requesting | CapturePhase::Capturing
            ) {
                recorder.phase = CapturePhase::Idle;
            }
            recorder.stream.take()
        };
        if let Some(stream) = stream {
            if let Err(err) = stream.stop().await {
                debug!(error = %err, "failed to release capture device");
            }
        }
    }
}

fn recording_file_name(mime_type: &str) -> String {
    let subtype = mime_type
        .split(';')
        .next()
        .and_then(|essence| essence.split('/').nth(1))
        .map(str::trim)
        .filter(|subtype| !subtype.is_empty());
    match subtype {
        Some(subtype) => format!("recording.{subtype}"),
        None => "recording".to_string(),
    }
}
