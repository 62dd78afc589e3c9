//! Speech service trait and implementations.
//!
//! # Overview
//!
//! [`SpeechService`] is the blocking text-to-speech interface: one call to
//! [`speak`](SpeechService::speak) synthesises and plays the request and
//! returns once playback has finished.
//!
//! [`TtsSpeech`] is the production implementation over the `tts` crate
//! (SAPI / WinRT, AVFoundation, Speech Dispatcher).  [`UnavailableSpeech`]
//! stands in when no engine could be created so the application still
//! launches.  [`MockSpeech`] (under `#[cfg(test)]`) records requests.

use std::sync::mpsc as std_mpsc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tts::{Tts, UtteranceId};

use super::rate::wpm_to_backend_rate;

// ---------------------------------------------------------------------------
// SpeechError
// ---------------------------------------------------------------------------

/// Errors from the speech subsystem.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpeechError {
    /// The platform TTS engine could not be created.
    #[error("Speech engine unavailable: {0}")]
    EngineInit(String),

    /// Synthesis or playback failed part-way.
    #[error("Speech playback failed: {0}")]
    Synthesis(String),

    /// The requested voice id is not offered by the engine.
    #[error("Voice not found: {0}")]
    VoiceNotFound(String),

    /// The speech worker thread is no longer running.
    #[error("Speech worker is not running")]
    WorkerGone,
}

// ---------------------------------------------------------------------------
// Voice / SpeechRequest
// ---------------------------------------------------------------------------

/// A synthesis voice offered by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    /// Backend identifier passed back when speaking.
    pub id: String,
    /// Human-readable name for the voice picker.
    pub name: String,
}

/// One read-aloud request.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub text: String,
    /// `None` keeps the engine's current voice.
    pub voice_id: Option<String>,
    pub rate_wpm: u32,
}

// ---------------------------------------------------------------------------
// SpeechService trait
// ---------------------------------------------------------------------------

/// Blocking text-to-speech interface.
///
/// Implementations are created and used on a single thread (the speech
/// worker), so no `Send` bound is required.
pub trait SpeechService {
    /// Voices the engine can speak with.  Queried once at startup.
    fn voices(&self) -> Vec<Voice>;

    /// Speak `request` and return after playback has completed.
    fn speak(&mut self, request: &SpeechRequest) -> Result<(), SpeechError>;
}

// Compile-time assertion: Box<dyn SpeechService> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn SpeechService>) {}
};

// ---------------------------------------------------------------------------
// TtsSpeech
// ---------------------------------------------------------------------------

/// Timing used while waiting for an utterance to end.
#[derive(Debug, Clone, Copy)]
struct WaitLimits {
    /// How long to wait for `is_speaking` to flip on after `speak` returns.
    start_grace: Duration,
    /// Upper bound on a single utterance before playback is stopped.
    max_utterance: Duration,
    /// Poll interval for backends without utterance callbacks.
    poll: Duration,
}

const WAIT_LIMITS: WaitLimits = WaitLimits {
    start_grace: Duration::from_millis(500),
    max_utterance: Duration::from_secs(30),
    poll: Duration::from_millis(20),
};

/// The engine calls needed to wait out, or cut off, an utterance.
trait Playback {
    fn is_speaking(&self) -> Result<bool, SpeechError>;
    fn stop(&mut self) -> Result<(), SpeechError>;
}

impl Playback for Tts {
    fn is_speaking(&self) -> Result<bool, SpeechError> {
        Tts::is_speaking(self).map_err(|e| SpeechError::Synthesis(e.to_string()))
    }

    fn stop(&mut self) -> Result<(), SpeechError> {
        Tts::stop(self)
            .map(|_| ())
            .map_err(|e| SpeechError::Synthesis(e.to_string()))
    }
}

/// Silence an utterance that overran its limit so it cannot overlap the next
/// read, and report it as failed.
fn abandon<P: Playback + ?Sized>(playback: &mut P) -> SpeechError {
    log::warn!("Utterance overran its time limit; stopping it");
    if let Err(e) = playback.stop() {
        log::warn!("Could not stop playback: {e}");
    }
    SpeechError::Synthesis("utterance did not finish".into())
}

/// Poll `playback` until it goes quiet, stopping it after `max_utterance`.
fn wait_while_speaking<P: Playback + ?Sized>(
    playback: &mut P,
    limits: WaitLimits,
) -> Result<(), SpeechError> {
    let started = Instant::now();

    // Some backends report `false` until audio actually starts.
    while !playback.is_speaking()? {
        if started.elapsed() >= limits.start_grace {
            return Ok(());
        }
        std::thread::sleep(limits.poll);
    }
    while playback.is_speaking()? {
        if started.elapsed() >= limits.max_utterance {
            return Err(abandon(playback));
        }
        std::thread::sleep(limits.poll);
    }
    Ok(())
}

/// Production speech service backed by the platform TTS engine.
pub struct TtsSpeech {
    tts: Tts,
    voices: Vec<tts::Voice>,
    /// Receives `on_utterance_end` ids when the backend supports callbacks.
    ended_rx: Option<std_mpsc::Receiver<UtteranceId>>,
    can_poll: bool,
    can_set_rate: bool,
}

impl std::fmt::Debug for TtsSpeech {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtsSpeech")
            .field("voices", &self.voices.len())
            .field("callbacks", &self.ended_rx.is_some())
            .finish_non_exhaustive()
    }
}

impl TtsSpeech {
    /// Initialise the platform engine and enumerate its voices.
    ///
    /// # Errors
    ///
    /// - [`SpeechError::EngineInit`] when no TTS backend is available.
    pub fn new() -> Result<Self, SpeechError> {
        let mut tts = Tts::default().map_err(|e| SpeechError::EngineInit(e.to_string()))?;
        let features = tts.supported_features();

        let voices = if features.voice {
            tts.voices().unwrap_or_else(|e| {
                log::warn!("Could not enumerate TTS voices: {e}");
                Vec::new()
            })
        } else {
            Vec::new()
        };

        let ended_rx = if features.utterance_callbacks {
            let (tx, rx) = std_mpsc::channel();
            match tts.on_utterance_end(Some(Box::new(move |id| {
                let _ = tx.send(id);
            }))) {
                Ok(()) => Some(rx),
                Err(e) => {
                    log::warn!("TTS utterance callbacks unavailable: {e}");
                    None
                }
            }
        } else {
            None
        };

        log::info!(
            "TTS engine ready ({} voices, rate range {}..{}, normal {})",
            voices.len(),
            tts.min_rate(),
            tts.max_rate(),
            tts.normal_rate()
        );

        Ok(Self {
            tts,
            voices,
            ended_rx,
            can_poll: features.is_speaking,
            can_set_rate: features.rate,
        })
    }

    fn apply_voice(&mut self, voice_id: &str) -> Result<(), SpeechError> {
        let voice = self
            .voices
            .iter()
            .find(|v| v.id() == voice_id)
            .ok_or_else(|| SpeechError::VoiceNotFound(voice_id.to_string()))?;
        self.tts
            .set_voice(voice)
            .map_err(|e| SpeechError::Synthesis(e.to_string()))
    }

    fn apply_rate(&mut self, wpm: u32) -> Result<(), SpeechError> {
        if !self.can_set_rate {
            return Ok(());
        }
        let rate = wpm_to_backend_rate(
            wpm,
            self.tts.min_rate(),
            self.tts.normal_rate(),
            self.tts.max_rate(),
        );
        self.tts
            .set_rate(rate)
            .map(|_| ())
            .map_err(|e| SpeechError::Synthesis(e.to_string()))
    }

    /// Block until the utterance `id` has finished playing.
    fn wait_for_end(&mut self, id: Option<UtteranceId>) -> Result<(), SpeechError> {
        if let (Some(rx), Some(id)) = (&self.ended_rx, id) {
            let deadline = Instant::now() + WAIT_LIMITS.max_utterance;
            loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                match rx.recv_timeout(remaining) {
                    Ok(ended) if ended == id => return Ok(()),
                    Ok(_) => continue,
                    Err(_) => return Err(abandon(&mut self.tts)),
                }
            }
        }

        if !self.can_poll {
            return Ok(());
        }
        wait_while_speaking(&mut self.tts, WAIT_LIMITS)
    }
}

impl SpeechService for TtsSpeech {
    fn voices(&self) -> Vec<Voice> {
        self.voices
            .iter()
            .map(|v| Voice {
                id: v.id(),
                name: v.name(),
            })
            .collect()
    }

    fn speak(&mut self, request: &SpeechRequest) -> Result<(), SpeechError> {
        if let Some(voice_id) = request.voice_id.as_deref() {
            self.apply_voice(voice_id)?;
        }
        self.apply_rate(request.rate_wpm)?;

        // Drop stale end notifications from earlier utterances.
        if let Some(rx) = &self.ended_rx {
            while rx.try_recv().is_ok() {}
        }

        let id = self
            .tts
            .speak(request.text.as_str(), false)
            .map_err(|e| SpeechError::Synthesis(e.to_string()))?;
        self.wait_for_end(id)
    }
}

// ---------------------------------------------------------------------------
// UnavailableSpeech
// ---------------------------------------------------------------------------

/// Fallback used when the platform engine failed to initialise.
///
/// Offers no voices and fails every request with the init failure reason.
#[derive(Debug, Clone)]
pub struct UnavailableSpeech {
    reason: String,
}

impl UnavailableSpeech {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl SpeechService for UnavailableSpeech {
    fn voices(&self) -> Vec<Voice> {
        Vec::new()
    }

    fn speak(&mut self, _request: &SpeechRequest) -> Result<(), SpeechError> {
        Err(SpeechError::EngineInit(self.reason.clone()))
    }
}

// ---------------------------------------------------------------------------
// MockSpeech (test only)
// ---------------------------------------------------------------------------

/// Test double that records every request and returns a fixed result.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct MockSpeech {
    voices: Vec<Voice>,
    result: Result<(), SpeechError>,
    spoken: std::sync::Arc<std::sync::Mutex<Vec<SpeechRequest>>>,
}

#[cfg(test)]
impl MockSpeech {
    /// A mock that succeeds, offering `voices`.
    pub fn ok(voices: Vec<Voice>) -> Self {
        Self {
            voices,
            result: Ok(()),
            spoken: Default::default(),
        }
    }

    /// A mock that fails every request with `err`.
    pub fn err(err: SpeechError) -> Self {
        Self {
            voices: Vec::new(),
            result: Err(err),
            spoken: Default::default(),
        }
    }

    /// Shared handle to the requests seen so far.
    pub fn spoken(&self) -> std::sync::Arc<std::sync::Mutex<Vec<SpeechRequest>>> {
        std::sync::Arc::clone(&self.spoken)
    }
}

#[cfg(test)]
impl SpeechService for MockSpeech {
    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn speak(&mut self, request: &SpeechRequest) -> Result<(), SpeechError> {
        self.spoken.lock().unwrap().push(request.clone());
        self.result.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn request(text: &str) -> SpeechRequest {
        SpeechRequest {
            text: text.into(),
            voice_id: None,
            rate_wpm: 100,
        }
    }

    #[test]
    fn mock_records_requests() {
        let mut speech = MockSpeech::ok(Vec::new());
        let spoken = speech.spoken();
        speech.speak(&request("cat")).unwrap();
        speech.speak(&request("dog")).unwrap();

        let spoken = spoken.lock().unwrap();
        assert_eq!(spoken.len(), 2);
        assert_eq!(spoken[1].text, "dog");
    }

    #[test]
    fn mock_err_returns_configured_error() {
        let mut speech = MockSpeech::err(SpeechError::Synthesis("boom".into()));
        let err = speech.speak(&request("cat")).unwrap_err();
        assert!(matches!(err, SpeechError::Synthesis(_)));
    }

    #[test]
    fn unavailable_speech_reports_reason() {
        let mut speech = UnavailableSpeech::new("no backend");
        assert!(speech.voices().is_empty());
        let err = speech.speak(&request("cat")).unwrap_err();
        assert_eq!(err, SpeechError::EngineInit("no backend".into()));
        assert!(err.to_string().contains("no backend"));
    }

    /// Backend that reports speaking for a fixed number of polls.
    struct ScriptedPlayback {
        polls_left: Cell<u32>,
        endless: bool,
        stops: u32,
    }

    impl ScriptedPlayback {
        fn speaking_for(polls: u32) -> Self {
            Self {
                polls_left: Cell::new(polls),
                endless: false,
                stops: 0,
            }
        }

        fn endless() -> Self {
            Self {
                polls_left: Cell::new(0),
                endless: true,
                stops: 0,
            }
        }
    }

    impl Playback for ScriptedPlayback {
        fn is_speaking(&self) -> Result<bool, SpeechError> {
            if self.endless {
                return Ok(true);
            }
            let left = self.polls_left.get();
            self.polls_left.set(left.saturating_sub(1));
            Ok(left > 0)
        }

        fn stop(&mut self) -> Result<(), SpeechError> {
            self.stops += 1;
            self.endless = false;
            self.polls_left.set(0);
            Ok(())
        }
    }

    const FAST: WaitLimits = WaitLimits {
        start_grace: Duration::from_millis(20),
        max_utterance: Duration::from_millis(50),
        poll: Duration::from_millis(1),
    };

    #[test]
    fn finished_utterance_is_not_stopped() {
        let mut playback = ScriptedPlayback::speaking_for(3);
        assert_eq!(wait_while_speaking(&mut playback, FAST), Ok(()));
        assert_eq!(playback.stops, 0);
    }

    #[test]
    fn silent_backend_returns_after_start_grace() {
        let mut playback = ScriptedPlayback::speaking_for(0);
        assert_eq!(wait_while_speaking(&mut playback, FAST), Ok(()));
        assert_eq!(playback.stops, 0);
    }

    #[test]
    fn overrunning_utterance_is_stopped_and_reported() {
        let mut playback = ScriptedPlayback::endless();
        let err = wait_while_speaking(&mut playback, FAST).unwrap_err();
        assert!(matches!(err, SpeechError::Synthesis(_)));
        assert_eq!(playback.stops, 1);
        assert_eq!(playback.is_speaking(), Ok(false));
    }

    #[test]
    fn box_dyn_speech_service_compiles() {
        let mut speech: Box<dyn SpeechService> = Box::new(MockSpeech::ok(Vec::new()));
        assert!(speech.speak(&request("fish")).is_ok());
    }
}
