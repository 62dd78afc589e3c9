//! Text-to-speech: the blocking service, its worker thread and rate mapping.
//!
//! # Architecture
//!
//! ```text
//! SelectionController ──submit(SpeechRequest)──▶ SpeechWorker (tokio mpsc)
//!                                                    │
//!                                          "speech-worker" thread
//!                                                    │
//!                                          SpeechService::speak  (blocking)
//!                                                    │
//! SelectionController ◀──try_complete()── SpeechOutcome (tokio mpsc)
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use word_picker::speech::{
//!     SpeechDispatch, SpeechRequest, SpeechService, SpeechWorker, TtsSpeech, UnavailableSpeech,
//! };
//!
//! let mut worker = SpeechWorker::start(|| match TtsSpeech::new() {
//!     Ok(tts) => Box::new(tts) as Box<dyn SpeechService>,
//!     Err(e) => Box::new(UnavailableSpeech::new(e.to_string())),
//! })
//! .expect("speech worker");
//!
//! worker
//!     .submit(SpeechRequest { text: "hello".into(), voice_id: None, rate_wpm: 150 })
//!     .unwrap();
//! ```

pub mod engine;
pub mod rate;
pub mod worker;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use engine::{SpeechError, SpeechRequest, SpeechService, TtsSpeech, UnavailableSpeech, Voice};
pub use rate::{
    clamp_wpm, wpm_to_backend_rate, DEFAULT_RATE_WPM, MAX_RATE_WPM, MIN_RATE_WPM, NORMAL_RATE_WPM,
};
pub use worker::{SpeechDispatch, SpeechOutcome, SpeechWorker};

#[cfg(test)]
pub use engine::MockSpeech;
#[cfg(test)]
pub(crate) use worker::InlineDispatch;
