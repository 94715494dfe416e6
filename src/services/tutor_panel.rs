//! Tutor panel composing the conversation, the recorder and speech playback.

use thiserror::Error;
use tracing::debug;

use crate::{
    dao::models::GameRecord,
    services::{
        audio_bridge::{AudioBridge, CaptureError, CapturePhase, ToggleOutcome},
        tutor_controller::TutorController,
    },
    state::tutor::{Turn, TutorError, TutorPhase, TutorSnapshot},
};

/// Which panel controls are usable right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelControls {
    /// Text input accepts typing.
    pub input_enabled: bool,
    /// Send control is clickable.
    pub send_enabled: bool,
    /// Record toggle is clickable.
    pub record_enabled: bool,
    /// The record control currently acts as "stop".
    pub recording: bool,
}

/// Why a panel action was refused.
#[derive(Debug, Error)]
pub enum PanelError {
    /// The conversation refused the action.
    #[error(transparent)]
    Tutor(#[from] TutorError),
    /// Recording failed.
    #[error(transparent)]
    Capture(#[from] CaptureError),
    /// The control is disabled in the current state.
    #[error("control is disabled")]
    Disabled,
}

/// Conversation plus recorder behind one game panel.
pub struct TutorPanel {
    controller: TutorController,
    recorder: AudioBridge,
}

impl TutorPanel {
    /// Panel over an existing controller and recorder.
    pub fn new(controller: TutorController, recorder: AudioBridge) -> Self {
        Self {
            controller,
            recorder,
        }
    }

    /// Conversation behind the panel.
    pub fn controller(&self) -> &TutorController {
        &self.controller
    }

    /// Voice recorder behind the panel.
    pub fn recorder(&self) -> &AudioBridge {
        &self.recorder
    }

    /// Open for `game` and wait for the welcome.
    pub async fn open(&self, game: &GameRecord) -> Result<TutorSnapshot, PanelError> {
        Ok(self.controller.open(game).await?)
    }

    /// Text input, send and record disable each other while work is in flight.
    pub async fn controls(&self) -> PanelControls {
        let ready = {
            let snapshot = self.controller.snapshot().await;
            snapshot.phase == TutorPhase::Active && !snapshot.busy
        };
        let capture = self.recorder.phase().await;

        PanelControls {
            input_enabled: ready && capture == CapturePhase::Idle,
            send_enabled: ready && capture == CapturePhase::Idle,
            record_enabled: ready && matches!(capture, CapturePhase::Idle | CapturePhase::Capturing),
            recording: capture == CapturePhase::Capturing,
        }
    }

    /// Send typed text when the send control is enabled.
    pub async fn submit_text(&self, text: &str) -> Result<Option<Turn>, PanelError> {
        if !self.controls().await.send_enabled {
            return Err(PanelError::Disabled);
        }
        Ok(self.controller.send_message(text).await?)
    }

    /// Start recording, or stop it and send the transcript as a user turn.
    pub async fn toggle_recording(&self) -> Result<Option<Turn>, PanelError> {
        if !self.controls().await.record_enabled {
            return Err(PanelError::Disabled);
        }

        match self.recorder.toggle().await? {
            ToggleOutcome::Started => Ok(None),
            ToggleOutcome::Transcribed(text) if text.is_empty() => {
                debug!("empty transcript; nothing to send");
                Ok(None)
            }
            ToggleOutcome::Transcribed(text) => Ok(self.controller.send_message(&text).await?),
        }
    }

    /// Drop any recording, then close the conversation.
    pub async fn close(&self) {
        self.recorder.cancel().await;
        self.controller.close().await;
    }
}
