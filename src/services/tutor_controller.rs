//! Async driver of one tutor conversation.

use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use tokio::{sync::Mutex, time::Instant};
use tracing::{debug, info, warn};

use crate::{
    dao::{models::GameRecord, proxy::CompletionClient},
    services::{speech_bridge::SpeechBridge, tutor_prompt},
    state::tutor::{RoundTrip, Turn, TutorError, TutorPhase, TutorSession, TutorSnapshot},
};

/// Runs [`TutorSession`] round trips against a completion client.
///
/// The session lock is only held to start and resolve tickets, never while the
/// completion request is in flight. Round trips resolve on their own task, so a
/// caller that stops waiting never leaves the session busy.
pub struct TutorController {
    session: Arc<Mutex<TutorSession>>,
    completions: Arc<dyn CompletionClient>,
    speech: SpeechBridge,
    last_active: StdMutex<Instant>,
}

impl TutorController {
    /// Closed controller sending its round trips to `completions`.
    pub fn new(completions: Arc<dyn CompletionClient>) -> Self {
        Self {
            session: Arc::new(Mutex::new(TutorSession::new())),
            completions,
            speech: SpeechBridge::unsupported(),
            last_active: StdMutex::new(Instant::now()),
        }
    }

    /// Replace the speech bridge used for reading replies aloud.
    pub fn with_speech(mut self, speech: SpeechBridge) -> Self {
        self.speech = speech;
        self
    }

    /// Speech bridge attached to this conversation.
    pub fn speech(&self) -> &SpeechBridge {
        &self.speech
    }

    /// Copy of the current conversation state.
    pub async fn snapshot(&self) -> TutorSnapshot {
        self.session.lock().await.snapshot()
    }

    /// Current lifecycle phase.
    pub async fn phase(&self) -> TutorPhase {
        self.session.lock().await.phase()
    }

    /// Whether a round trip is in flight.
    pub async fn is_busy(&self) -> bool {
        self.session.lock().await.is_busy()
    }

    /// Record client activity for idle expiry.
    pub fn touch(&self) {
        *self
            .last_active
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    /// Last time [`TutorController::touch`] was called (or creation time).
    pub fn last_active(&self) -> Instant {
        *self
            .last_active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Open the panel for `game` and wait for the welcome turn.
    pub async fn open(&self, game: &GameRecord) -> Result<TutorSnapshot, TutorError> {
        self.session
            .lock()
            .await
            .open(tutor_prompt::tutor_context(game))?;
        info!(game_id = %game.id, "tutor panel opened");

        self.initialize().await?;
        Ok(self.snapshot().await)
    }

    /// Request the welcome turn; repeated calls for the same open are no-ops.
    pub async fn initialize(&self) -> Result<Option<Turn>, TutorError> {
        let trip = self.session.lock().await.begin_initialization()?;
        match trip {
            Some(trip) => Ok(self.run(trip).await),
            None => Ok(None),
        }
    }

    /// Append a user turn and wait for the reply (or the apology).
    pub async fn send_message(&self, text: &str) -> Result<Option<Turn>, TutorError> {
        let trip = self.session.lock().await.begin_reply(text)?;
        Ok(self.run(trip).await)
    }

    /// Clear the conversation and request a fresh welcome.
    pub async fn reset(&self) -> Result<Option<Turn>, TutorError> {
        self.session.lock().await.reset()?;
        self.speech.stop();
        self.initialize().await
    }

    /// Close the panel, dropping the transcript and stopping playback.
    pub async fn close(&self) {
        self.session.lock().await.close();
        self.speech.stop();
        debug!("tutor panel closed");
    }

    /// Read an assistant turn aloud, or stop it if it is already playing.
    pub fn toggle_speech(&self, turn: &Turn) -> bool {
        self.speech.toggle(turn.id, &turn.content)
    }

    async fn run(&self, trip: RoundTrip) -> Option<Turn> {
        let RoundTrip { id, kind, request } = trip;
        let pending = self.completions.complete(request);
        let session = Arc::clone(&self.session);

        let resolution = tokio::spawn(async move {
            let outcome = pending.await;

            let mut session = session.lock().await;
            let resolved = match outcome {
                Ok(reply) => session.complete(id, reply),
                Err(err) => {
                    warn!(error = %err, ?kind, "tutor round trip failed");
                    session.fail(id)
                }
            };

            match resolved {
                Ok(turn) => Some(turn),
                Err(err) => {
                    debug!(error = %err, "discarding stale tutor response");
                    None
                }
            }
        });

        match resolution.await {
            Ok(turn) => turn,
            Err(err) => {
                warn!(error = %err, ?kind, "tutor round trip task ended abnormally");
                None
            }
        }
    }
}
