//! Fakes shared by unit tests.

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use futures::future::BoxFuture;
use reqwest::StatusCode;
use tokio::sync::{Notify, Semaphore, oneshot};

use crate::{
    config::AppConfig,
    dao::{
        catalog::Catalog,
        local_store::{LocalStore, MemoryLocalStore},
        provider::{
            FileUpload, GenerateRequest, LanguageModel, ProviderError, ProviderResult,
            UploadedFile,
        },
        proxy::{
            AudioClip, CompletionClient, ProxyClientError, ProxyClientResult, TranscriptionClient,
        },
    },
    services::{
        audio_bridge::{AudioInput, CaptureEnvironment, CaptureStream, DeviceError},
        speech_bridge::{SpeechError, SpeechSynthesizer},
    },
    state::{AppState, SharedState, tutor::CompletionRequest},
};

pub fn state_with_model(model: Arc<FakeLanguageModel>) -> SharedState {
    AppState::new(
        AppConfig::default(),
        Catalog::embedded().unwrap(),
        Arc::new(MemoryLocalStore::new()),
        Some(model),
    )
}

pub fn state_with_config(config: AppConfig, model: Arc<FakeLanguageModel>) -> SharedState {
    AppState::new(
        config,
        Catalog::embedded().unwrap(),
        Arc::new(MemoryLocalStore::new()),
        Some(model),
    )
}

pub fn state_with_store(store: Arc<dyn LocalStore>) -> SharedState {
    AppState::new(
        AppConfig::default(),
        Catalog::embedded().unwrap(),
        store,
        Some(Arc::new(FakeLanguageModel::replying(["unused"]))),
    )
}

pub fn degraded_state() -> SharedState {
    AppState::new(
        AppConfig::default(),
        Catalog::embedded().unwrap(),
        Arc::new(MemoryLocalStore::new()),
        None,
    )
}

/// Let spawned tasks run to their next await point.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

/// Counts calls and lets tests wait until a number of them happened.
#[derive(Default)]
struct CallCounter {
    calls: AtomicUsize,
    called: Notify,
}

impl CallCounter {
    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.called.notify_waiters();
    }

    fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn wait_for(&self, calls: usize) {
        loop {
            let notified = self.called.notified();
            if self.count() >= calls {
                return;
            }
            notified.await;
        }
    }
}

fn fake_failure(operation: &'static str) -> ProviderError {
    ProviderError::RequestStatus {
        operation,
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: "fake failure".into(),
    }
}

/// Provider double: canned replies, recorded requests, uploads and deletions.
#[derive(Default)]
pub struct FakeLanguageModel {
    replies: Mutex<VecDeque<String>>,
    fail_generate: bool,
    fail_delete: bool,
    requests: Mutex<Vec<GenerateRequest>>,
    uploads: Mutex<Vec<FileUpload>>,
    deleted: Mutex<Vec<String>>,
}

impl FakeLanguageModel {
    /// Replies in order; the last reply repeats once the others are used.
    pub fn replying<const N: usize>(replies: [&str; N]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|reply| reply.to_string()).collect()),
            ..Self::default()
        }
    }

    /// Every generate call fails; uploads and deletes succeed.
    pub fn failing() -> Self {
        Self {
            fail_generate: true,
            ..Self::default()
        }
    }

    pub fn with_failing_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<FileUpload> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

impl LanguageModel for FakeLanguageModel {
    fn generate(&self, request: GenerateRequest) -> BoxFuture<'static, ProviderResult<String>> {
        self.requests.lock().unwrap().push(request);
        let outcome = if self.fail_generate {
            Err(fake_failure("generateContent"))
        } else {
            let mut replies = self.replies.lock().unwrap();
            let reply = if replies.len() > 1 {
                replies.pop_front()
            } else {
                replies.front().cloned()
            };
            Ok(reply.unwrap_or_default())
        };
        Box::pin(async move { outcome })
    }

    fn upload_file(&self, upload: FileUpload) -> BoxFuture<'static, ProviderResult<UploadedFile>> {
        let mut uploads = self.uploads.lock().unwrap();
        let name = format!("files/fake-{}", uploads.len());
        let uploaded = UploadedFile {
            uri: format!("https://files.example/{name}"),
            name,
            mime_type: upload.mime_type.clone(),
        };
        uploads.push(upload);
        Box::pin(async move { Ok(uploaded) })
    }

    fn delete_file(&self, name: String) -> BoxFuture<'static, ProviderResult<()>> {
        self.deleted.lock().unwrap().push(name);
        let outcome = if self.fail_delete {
            Err(fake_failure("files.delete"))
        } else {
            Ok(())
        };
        Box::pin(async move { outcome })
    }
}

#[derive(Default)]
struct CompletionsInner {
    script: Mutex<VecDeque<Result<String, String>>>,
    gate: Option<Semaphore>,
    requests: Mutex<Vec<CompletionRequest>>,
    counter: CallCounter,
}

/// Completion client double; optionally gated so tests control when replies land.
#[derive(Clone, Default)]
pub struct FakeCompletions {
    inner: Arc<CompletionsInner>,
}

impl FakeCompletions {
    pub fn scripted<const N: usize>(script: [Result<String, String>; N]) -> Self {
        Self {
            inner: Arc::new(CompletionsInner {
                script: Mutex::new(script.into_iter().collect()),
                ..CompletionsInner::default()
            }),
        }
    }

    /// Each call waits for a [`FakeCompletions::release`] before replying.
    pub fn gated<const N: usize>(replies: [&str; N]) -> Self {
        Self {
            inner: Arc::new(CompletionsInner {
                script: Mutex::new(replies.iter().map(|reply| Ok(reply.to_string())).collect()),
                gate: Some(Semaphore::new(0)),
                ..CompletionsInner::default()
            }),
        }
    }

    pub fn release(&self, calls: usize) {
        if let Some(gate) = &self.inner.gate {
            gate.add_permits(calls);
        }
    }

    pub fn call_count(&self) -> usize {
        self.inner.counter.count()
    }

    pub async fn wait_for_calls(&self, calls: usize) {
        self.inner.counter.wait_for(calls).await;
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.inner.requests.lock().unwrap().clone()
    }
}

impl CompletionClient for FakeCompletions {
    fn complete(&self, request: CompletionRequest) -> BoxFuture<'static, ProxyClientResult<String>> {
        self.inner.requests.lock().unwrap().push(request);
        self.inner.counter.record();
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            if let Some(gate) = &inner.gate {
                gate.acquire().await.unwrap().forget();
            }
            let next = inner.script.lock().unwrap().pop_front();
            next.unwrap_or_else(|| Err("script exhausted".into()))
                .map_err(ProxyClientError::Service)
        })
    }
}

struct TranscriberInner {
    outcome: Result<String, String>,
    gate: Option<Semaphore>,
    clips: Mutex<Vec<AudioClip>>,
    counter: CallCounter,
}

/// Transcription client double.
pub struct FakeTranscriber {
    inner: Arc<TranscriberInner>,
}

impl FakeTranscriber {
    fn build(outcome: Result<String, String>, gate: Option<Semaphore>) -> Self {
        Self {
            inner: Arc::new(TranscriberInner {
                outcome,
                gate,
                clips: Mutex::default(),
                counter: CallCounter::default(),
            }),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::build(Ok(text.to_string()), None)
    }

    pub fn failing() -> Self {
        Self::build(Err("upstream down".into()), None)
    }

    pub fn gated(outcome: Result<String, String>) -> Self {
        Self::build(outcome, Some(Semaphore::new(0)))
    }

    pub fn release(&self) {
        if let Some(gate) = &self.inner.gate {
            gate.add_permits(1);
        }
    }

    pub async fn wait_for_calls(&self, calls: usize) {
        self.inner.counter.wait_for(calls).await;
    }

    pub fn clips(&self) -> Vec<AudioClip> {
        self.inner.clips.lock().unwrap().clone()
    }
}

impl TranscriptionClient for FakeTranscriber {
    fn transcribe(&self, clip: AudioClip) -> BoxFuture<'static, ProxyClientResult<String>> {
        self.inner.clips.lock().unwrap().push(clip);
        self.inner.counter.record();
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            if let Some(gate) = &inner.gate {
                gate.acquire().await.unwrap().forget();
            }
            inner.outcome.clone().map_err(ProxyClientError::Service)
        })
    }
}

struct FakeStream {
    stops: Arc<AtomicUsize>,
}

impl CaptureStream for FakeStream {
    fn mime_type(&self) -> String {
        "audio/webm;codecs=opus".into()
    }

    fn stop(self: Box<Self>) -> BoxFuture<'static, Result<Vec<u8>, DeviceError>> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Ok(vec![0x1a, 0x45, 0xdf, 0xa3]) })
    }
}

/// Microphone double; optionally gated so tests control when the device opens.
#[derive(Clone)]
pub struct FakeAudioInput {
    environment: CaptureEnvironment,
    open_error: Option<DeviceError>,
    gate: Option<Arc<Semaphore>>,
    opens: Arc<CallCounter>,
    stops: Arc<AtomicUsize>,
}

impl FakeAudioInput {
    pub fn working() -> Self {
        Self::with_environment(true, true)
    }

    pub fn with_environment(api_available: bool, secure_context: bool) -> Self {
        Self {
            environment: CaptureEnvironment {
                api_available,
                secure_context,
            },
            open_error: None,
            gate: None,
            opens: Arc::default(),
            stops: Arc::default(),
        }
    }

    pub fn failing(error: DeviceError) -> Self {
        Self {
            open_error: Some(error),
            ..Self::working()
        }
    }

    /// Each open waits for a [`FakeAudioInput::release_open`].
    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::working()
        }
    }

    pub fn release_open(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub async fn wait_for_opens(&self, opens: usize) {
        self.opens.wait_for(opens).await;
    }

    /// Shared count of streams stopped so far.
    pub fn stop_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.stops)
    }
}

impl AudioInput for FakeAudioInput {
    fn environment(&self) -> CaptureEnvironment {
        self.environment
    }

    fn open(&self) -> BoxFuture<'static, Result<Box<dyn CaptureStream>, DeviceError>> {
        self.opens.record();
        let outcome = match &self.open_error {
            Some(err) => Err(err.clone()),
            None => Ok(Box::new(FakeStream {
                stops: Arc::clone(&self.stops),
            }) as Box<dyn CaptureStream>),
        };
        let gate = self.gate.clone();
        Box::pin(async move {
            if let Some(gate) = gate {
                gate.acquire().await.unwrap().forget();
            }
            outcome
        })
    }
}

/// Speech double whose utterances end when finished or cancelled.
#[derive(Default)]
pub struct FakeSynthesizer {
    spoken: Mutex<Vec<String>>,
    playing: Mutex<Vec<oneshot::Sender<()>>>,
    cancels: AtomicUsize,
}

impl FakeSynthesizer {
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }

    pub fn finish_all(&self) {
        for done in self.playing.lock().unwrap().drain(..) {
            let _ = done.send(());
        }
    }
}

impl SpeechSynthesizer for FakeSynthesizer {
    fn speak(&self, text: String) -> BoxFuture<'static, Result<(), SpeechError>> {
        self.spoken.lock().unwrap().push(text);
        let (done, finished) = oneshot::channel();
        self.playing.lock().unwrap().push(done);
        Box::pin(async move { finished.await.map_err(|_| SpeechError::Interrupted) })
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        self.playing.lock().unwrap().clear();
    }
}
