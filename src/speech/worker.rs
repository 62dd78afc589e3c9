//! Dedicated OS thread that owns the speech service.
//!
//! Playback through [`SpeechService::speak`] blocks for the length of the
//! utterance, which would freeze the egui event loop.  [`SpeechWorker`]
//! creates the service on its own `speech-worker` thread, accepts
//! [`SpeechRequest`]s over a `tokio::sync::mpsc` channel and reports a
//! [`SpeechOutcome`] for each one on a second channel that the UI drains
//! every frame.
//!
//! The service is built inside the thread so platform engines never cross
//! threads.  Dropping the worker closes the request channel; the thread
//! finishes any utterance in progress, releases the engine and is joined.
//!
//! Each outcome carries the instant playback ended, so the read cooldown is
//! measured from the end of playback rather than from the frame that
//! noticed it.  If the thread dies mid-utterance, the request still comes
//! back as a [`SpeechError::WorkerGone`] outcome.

use std::collections::VecDeque;
use std::thread::JoinHandle;
use std::time::Instant;

use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, oneshot};

use super::engine::{SpeechError, SpeechRequest, SpeechService, Voice};

/// Completion report for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechOutcome {
    pub request: SpeechRequest,
    pub result: Result<(), SpeechError>,
    /// When playback ended (or the worker was found dead).
    pub completed_at: Instant,
}

// ---------------------------------------------------------------------------
// SpeechDispatch trait
// ---------------------------------------------------------------------------

/// Non-blocking side of speech playback, as seen by the controller.
pub trait SpeechDispatch {
    /// Voices enumerated at startup.
    fn voices(&self) -> &[Voice];

    /// Queue `request` for playback.  Returns immediately.
    fn submit(&mut self, request: SpeechRequest) -> Result<(), SpeechError>;

    /// Next finished request, if any.  Never blocks.
    fn try_complete(&mut self) -> Option<SpeechOutcome>;
}

// ---------------------------------------------------------------------------
// SpeechWorker
// ---------------------------------------------------------------------------

/// Handle to the running speech thread.
pub struct SpeechWorker {
    request_tx: Option<mpsc::Sender<SpeechRequest>>,
    outcome_rx: mpsc::Receiver<SpeechOutcome>,
    /// Submitted requests without an outcome yet, oldest first.
    in_flight: VecDeque<SpeechRequest>,
    voices: Vec<Voice>,
    thread: Option<JoinHandle<()>>,
}

impl SpeechWorker {
    /// Spawn the worker thread and build the service with `make_service`.
    ///
    /// Blocks until the service has been created and its voices enumerated.
    ///
    /// # Errors
    ///
    /// - [`SpeechError::EngineInit`] if the OS refuses to create the thread.
    /// - [`SpeechError::WorkerGone`] if the thread exits before reporting
    ///   its voices (e.g. `make_service` panicked).
    pub fn start<F>(make_service: F) -> Result<Self, SpeechError>
    where
        F: FnOnce() -> Box<dyn SpeechService> + Send + 'static,
    {
        let (request_tx, mut request_rx) = mpsc::channel::<SpeechRequest>(4);
        let (outcome_tx, outcome_rx) = mpsc::channel::<SpeechOutcome>(4);
        let (voices_tx, voices_rx) = oneshot::channel::<Vec<Voice>>();

        let thread = std::thread::Builder::new()
            .name("speech-worker".into())
            .spawn(move || {
                let mut service = make_service();
                let _ = voices_tx.send(service.voices());

                while let Some(request) = request_rx.blocking_recv() {
                    log::debug!("speech-worker: speaking {:?}", request.text);
                    let result = service.speak(&request);
                    let completed_at = Instant::now();
                    if let Err(e) = &result {
                        log::warn!("speech-worker: playback failed: {e}");
                    }
                    let outcome = SpeechOutcome {
                        request,
                        result,
                        completed_at,
                    };
                    if outcome_tx.blocking_send(outcome).is_err()
                    {
                        break;
                    }
                }

                log::info!("speech-worker: shutting down");
            })
            .map_err(|e| SpeechError::EngineInit(format!("failed to spawn speech worker: {e}")))?;

        let voices = voices_rx
            .blocking_recv()
            .map_err(|_| SpeechError::WorkerGone)?;
        log::info!("Speech worker started ({} voices)", voices.len());

        Ok(Self {
            request_tx: Some(request_tx),
            outcome_rx,
            in_flight: VecDeque::new(),
            voices,
            thread: Some(thread),
        })
    }

    /// Block until the next outcome arrives.  `None` once the worker is gone.
    #[cfg(test)]
    pub(crate) fn wait_outcome(&mut self) -> Option<SpeechOutcome> {
        let outcome = self.outcome_rx.blocking_recv()?;
        self.in_flight.pop_front();
        Some(outcome)
    }
}

impl SpeechDispatch for SpeechWorker {
    fn voices(&self) -> &[Voice] {
        &self.voices
    }

    fn submit(&mut self, request: SpeechRequest) -> Result<(), SpeechError> {
        let tx = self.request_tx.as_ref().ok_or(SpeechError::WorkerGone)?;
        tx.try_send(request.clone()).map_err(|e| match e {
            mpsc::error::TrySendError::Closed(_) => SpeechError::WorkerGone,
            mpsc::error::TrySendError::Full(_) => {
                SpeechError::Synthesis("speech queue is full".into())
            }
        })?;
        self.in_flight.push_back(request);
        Ok(())
    }

    fn try_complete(&mut self) -> Option<SpeechOutcome> {
        match self.outcome_rx.try_recv() {
            Ok(outcome) => {
                self.in_flight.pop_front();
                Some(outcome)
            }
            Err(TryRecvError::Empty) => None,
            // Buffered outcomes drain first, so anything left in flight
            // was lost with the thread.
            Err(TryRecvError::Disconnected) => {
                let request = self.in_flight.pop_front()?;
                log::error!("speech-worker: thread exited while reading {:?}", request.text);
                Some(SpeechOutcome {
                    request,
                    result: Err(SpeechError::WorkerGone),
                    completed_at: Instant::now(),
                })
            }
        }
    }
}

impl Drop for SpeechWorker {
    /// Close the request channel and wait for the thread to release the
    /// engine.
    fn drop(&mut self) {
        self.request_tx.take();
        // Unblock a worker waiting to deliver its last outcome.
        self.outcome_rx.close();
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                log::error!("speech-worker: thread panicked");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// InlineDispatch (test only)
// ---------------------------------------------------------------------------

/// Runs the service synchronously on the calling thread.
///
/// Outcomes are queued and handed out by `try_complete`, so tests drive the
/// controller deterministically without a worker thread.
#[cfg(test)]
pub(crate) struct InlineDispatch {
    service: Box<dyn SpeechService>,
    voices: Vec<Voice>,
    done: std::collections::VecDeque<SpeechOutcome>,
}

#[cfg(test)]
impl InlineDispatch {
    pub(crate) fn new(service: Box<dyn SpeechService>) -> Self {
        let voices = service.voices();
        Self {
            service,
            voices,
            done: Default::default(),
        }
    }
}

#[cfg(test)]
impl SpeechDispatch for InlineDispatch {
    fn voices(&self) -> &[Voice] {
        &self.voices
    }

    fn submit(&mut self, request: SpeechRequest) -> Result<(), SpeechError> {
        let result = self.service.speak(&request);
        self.done.push_back(SpeechOutcome {
            request,
            result,
            completed_at: Instant::now(),
        });
        Ok(())
    }

    fn try_complete(&mut self) -> Option<SpeechOutcome> {
        self.done.pop_front()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
