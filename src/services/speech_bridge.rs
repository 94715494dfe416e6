//! Reading assistant turns aloud through a host speech synthesizer.

use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

use futures::future::BoxFuture;
use regex::Regex;
use thiserror::Error;
use tokio::runtime::Handle;
use tracing::debug;

use crate::state::tutor::TurnId;

static LINK: LazyLock<Regex> = LazyLock::new(|| compile(r"\[([^\]]+)\]\([^)]*\)"));
static HEADING: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^[ \t]*#{1,6}[ \t]+"));
static BULLET: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^[ \t]*[-*][ \t]+"));
static BOLD: LazyLock<Regex> = LazyLock::new(|| compile(r"\*\*([^*]+)\*\*"));
static ITALIC: LazyLock<Regex> = LazyLock::new(|| compile(r"\*([^*\n]+)\*"));
static CODE: LazyLock<Regex> = LazyLock::new(|| compile(r"`([^`]+)`"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| compile(r"\s+"));

fn compile(pattern: &str) -> Regex {
    // Patterns are literals checked by the tests below.
    Regex::new(pattern).unwrap_or_else(|err| panic!("invalid speech pattern {pattern}: {err}"))
}

/// Strip lightweight Markdown so the synthesizer reads plain prose.
pub fn clean_text_for_speech(text: &str) -> String {
    let text = LINK.replace_all(text, "$1");
    let text = HEADING.replace_all(&text, "");
    let text = BULLET.replace_all(&text, "");
    let text = BOLD.replace_all(&text, "$1");
    let text = ITALIC.replace_all(&text, "$1");
    let text = CODE.replace_all(&text, "$1");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Why an utterance ended early.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeechError {
    /// Cancelled, or replaced by a newer utterance.
    #[error("speech playback was interrupted")]
    Interrupted,
    /// The engine reported an error.
    #[error("speech synthesis failed: {0}")]
    Failed(String),
}

/// Host text-to-speech engine.
pub trait SpeechSynthesizer: Send + Sync {
    /// Start speaking; the future resolves when the utterance ends.
    fn speak(&self, text: String) -> BoxFuture<'static, Result<(), SpeechError>>;
    /// Stop the current utterance, if any.
    fn cancel(&self);
}

#[derive(Debug, Default)]
struct Playback {
    generation: u64,
    speaking: Option<TurnId>,
}

/// Single-utterance playback tracking which turn is being read.
#[derive(Clone, Default)]
pub struct SpeechBridge {
    speaker: Option<Speaker>,
    playback: Arc<Mutex<Playback>>,
}

/// Synthesizer plus the runtime its completion watchers are spawned on.
#[derive(Clone)]
struct Speaker {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    runtime: Handle,
}

impl SpeechBridge {
    /// Bridge speaking through `synthesizer`; playback endings are tracked on `runtime`.
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, runtime: Handle) -> Self {
        Self {
            speaker: Some(Speaker {
                synthesizer,
                runtime,
            }),
            playback: Arc::default(),
        }
    }

    /// Bridge for hosts without speech synthesis.
    pub fn unsupported() -> Self {
        Self::default()
    }

    /// Whether a synthesizer is attached.
    pub fn is_supported(&self) -> bool {
        self.speaker.is_some()
    }

    /// Turn currently being read aloud.
    pub fn speaking_turn(&self) -> Option<TurnId> {
        self.playback().speaking
    }

    /// Read `text` for `turn`, cancelling whatever was playing.
    ///
    /// Returns `false` when nothing was started.
    pub fn speak(&self, turn: TurnId, text: &str) -> bool {
        let Some(Speaker {
            synthesizer,
            runtime,
        }) = &self.speaker
        else {
            return false;
        };
        let text = clean_text_for_speech(text);
        if text.is_empty() {
            return false;
        }

        synthesizer.cancel();
        let generation = {
            let mut playback = self.playback();
            playback.generation += 1;
            playback.speaking = Some(turn);
            playback.generation
        };

        let utterance = synthesizer.speak(text);
        let playback = Arc::clone(&self.playback);
        runtime.spawn(async move {
            if let Err(err) = utterance.await {
                debug!(error = %err, %turn, "speech playback ended early");
            }
            let mut playback = playback.lock().unwrap_or_else(PoisonError::into_inner);
            if playback.generation == generation {
                playback.speaking = None;
            }
        });
        true
    }

    /// Per-turn play/stop control.
    pub fn toggle(&self, turn: TurnId, text: &str) -> bool {
        if self.speaking_turn() == Some(turn) {
            self.stop();
            false
        } else {
            self.speak(turn, text)
        }
    }

    /// Cancel playback, whichever turn is speaking.
    pub fn stop(&self) {
        if let Some(speaker) = &self.speaker {
            speaker.synthesizer.cancel();
        }
        let mut playback = self.playback();
        playback.generation += 1;
        playback.speaking = None;
    }

    fn playback(&self) -> MutexGuard<'_, Playback> {
        self.playback.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
