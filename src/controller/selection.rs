//! The selection controller: load, pick, reselect and read.
//!
//! [`SelectionController`] owns the [`WordSource`], the [`RecencyLog`], the
//! current word, the read phase and the injected [`SpeechDispatch`].  The UI
//! calls one method per user action and reads [`UiState`] to decide which
//! controls are enabled.
//!
//! Time is passed in explicitly (`now: Instant`) so the 500 ms read cooldown
//! can be driven by a simulated clock in tests.

use std::collections::VecDeque;
use std::path::Path;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::speech::{clamp_wpm, SpeechDispatch, SpeechError, SpeechRequest, Voice, DEFAULT_RATE_WPM};
use crate::words::{IndexError, RecencyLog, TabularData, WordSource, WordSourceError};

use super::state::{ReadPhase, SelectionState, UiState, READ_COOLDOWN};

// ---------------------------------------------------------------------------
// ControllerError
// ---------------------------------------------------------------------------

/// Errors returned by controller actions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Source(#[from] WordSourceError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Speech(#[from] SpeechError),

    /// Select was invoked with no sheet loaded.
    #[error("Load a word sheet before selecting a word")]
    SelectUnavailable,

    /// Read was invoked with no current word or while playback is in flight.
    #[error("Nothing to read right now")]
    ReadUnavailable,
}

// ---------------------------------------------------------------------------
// Notice
// ---------------------------------------------------------------------------

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message the UI shows in a modal window.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: &'static str,
    pub message: String,
}

impl Notice {
    fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: "Success",
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: "Error",
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// SelectionController
// ---------------------------------------------------------------------------

/// Coordinates word source, recency log and speech playback.
pub struct SelectionController {
    source: WordSource,
    log: RecencyLog,
    current_word: Option<String>,
    read_phase: ReadPhase,

    voice_id: Option<String>,
    rate_wpm: u32,
    worksheet: Option<String>,

    speech: Box<dyn SpeechDispatch>,
    rng: StdRng,
    notices: VecDeque<Notice>,
}

impl SelectionController {
    /// Create a controller with an OS-seeded random generator.
    pub fn new(speech: Box<dyn SpeechDispatch>) -> Self {
        Self::with_rng(speech, StdRng::from_os_rng())
    }

    /// Create a controller with an explicit generator (seeded in tests).
    pub fn with_rng(speech: Box<dyn SpeechDispatch>, rng: StdRng) -> Self {
        Self {
            source: WordSource::new(),
            log: RecencyLog::new(),
            current_word: None,
            read_phase: ReadPhase::Ready,
            voice_id: None,
            rate_wpm: DEFAULT_RATE_WPM,
            worksheet: None,
            speech,
            rng,
            notices: VecDeque::new(),
        }
    }

    // ── Loading ──────────────────────────────────────────────────────────

    /// Load a workbook from `path`, replacing the current sheet.
    ///
    /// On failure nothing changes and an error notice is raised.  The
    /// recency log and the current word survive a reload.
    pub fn load(&mut self, path: &Path) -> Result<(), ControllerError> {
        let result = self.source.load(path, self.worksheet.as_deref());
        self.report_load(result, &path.display().to_string())
    }

    /// Load an in-memory grid, replacing the current sheet.
    pub fn load_grid(&mut self, grid: TabularData) -> Result<(), ControllerError> {
        let result = self.source.load_grid(grid);
        self.report_load(result, "in-memory grid")
    }

    fn report_load(
        &mut self,
        result: Result<(), WordSourceError>,
        what: &str,
    ) -> Result<(), ControllerError> {
        match result {
            Ok(()) => {
                if let Some(data) = self.source.data() {
                    log::info!(
                        "Loaded {what}: {} rows, {} words",
                        data.row_count(),
                        data.cell_count()
                    );
                }
                self.notices.push_back(Notice::info("Excel sheet loaded successfully!"));
                Ok(())
            }
            Err(e) => {
                log::warn!("Loading {what} failed: {e}");
                self.notices.push_back(Notice::error(e.to_string()));
                Err(e.into())
            }
        }
    }

    // ── Selection ────────────────────────────────────────────────────────

    /// Draw a random word, make it current and append it to the log.
    pub fn select_word(&mut self) -> Result<&str, ControllerError> {
        if !self.ui_state().select_enabled {
            return Err(ControllerError::SelectUnavailable);
        }
        let word = self.source.pick_random(&mut self.rng)?.to_string();
        log::debug!("Selected {word:?}");
        self.log.append(word.as_str());
        Ok(self.current_word.insert(word).as_str())
    }

    /// Make the logged word at `index` current.  The log is not reordered.
    pub fn reselect_from_log(&mut self, index: usize) -> Result<&str, ControllerError> {
        let word = self.log.select(index)?.to_string();
        log::debug!("Reselected {word:?} from log index {index}");
        Ok(self.current_word.insert(word).as_str())
    }

    // ── Read aloud ───────────────────────────────────────────────────────

    /// Hand the current word to the speech worker.
    ///
    /// The read control is disabled before the request is submitted.  If the
    /// worker cannot accept the request the control is released again.
    pub fn read_word(&mut self) -> Result<(), ControllerError> {
        if !self.ui_state().read_enabled {
            return Err(ControllerError::ReadUnavailable);
        }
        let text = self
            .current_word
            .clone()
            .ok_or(ControllerError::ReadUnavailable)?;

        self.read_phase = ReadPhase::Speaking;
        let request = SpeechRequest {
            text,
            voice_id: self.voice_id.clone(),
            rate_wpm: self.rate_wpm,
        };
        log::info!("Reading {:?} at {} wpm", request.text, request.rate_wpm);

        if let Err(e) = self.speech.submit(request) {
            log::warn!("Could not start playback: {e}");
            self.read_phase = ReadPhase::Ready;
            self.notices.push_back(Notice::error(e.to_string()));
            return Err(e.into());
        }
        Ok(())
    }

    /// Playback ended at `ended`; start the re-enable cooldown from there.
    ///
    /// Runs for failed playback too, so the read control never stays
    /// disabled.  Ignored unless a read is in flight.
    pub fn finish_read(&mut self, result: Result<(), SpeechError>, ended: Instant) {
        if self.read_phase != ReadPhase::Speaking {
            log::debug!("Ignoring playback completion in phase {:?}", self.read_phase);
            return;
        }
        if let Err(e) = result {
            self.notices.push_back(Notice::error(e.to_string()));
        }
        self.read_phase = ReadPhase::Cooldown {
            until: ended + READ_COOLDOWN,
        };
    }

    /// Drain finished playback from the speech worker.
    ///
    /// The cooldown counts from each outcome's completion time, however
    /// late this is called.
    pub fn poll_speech(&mut self) {
        while let Some(outcome) = self.speech.try_complete() {
            self.finish_read(outcome.result, outcome.completed_at);
        }
    }

    /// Re-enable the read control once the cooldown deadline has passed.
    ///
    /// Returns `true` on the call that re-enables it.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.read_phase {
            ReadPhase::Cooldown { until } if now >= until => {
                self.read_phase = ReadPhase::Ready;
                true
            }
            _ => false,
        }
    }

    /// When the next [`tick`](Self::tick) will change something.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.read_phase.deadline()
    }

    // ── Voice / rate / sheet options ─────────────────────────────────────

    pub fn voices(&self) -> &[Voice] {
        self.speech.voices()
    }

    pub fn voice_id(&self) -> Option<&str> {
        self.voice_id.as_deref()
    }

    /// Use the voice with `id` for subsequent reads (`None` = engine default).
    pub fn set_voice(&mut self, id: Option<&str>) -> Result<(), ControllerError> {
        match id {
            None => self.voice_id = None,
            Some(id) => {
                if !self.speech.voices().iter().any(|v| v.id == id) {
                    return Err(SpeechError::VoiceNotFound(id.to_string()).into());
                }
                self.voice_id = Some(id.to_string());
            }
        }
        Ok(())
    }

    /// Select a voice by id or (case-insensitive) display name.
    ///
    /// Returns `false` and keeps the current voice when nothing matches.
    pub fn prefer_voice(&mut self, id_or_name: &str) -> bool {
        let found = self
            .speech
            .voices()
            .iter()
            .find(|v| v.id == id_or_name || v.name.eq_ignore_ascii_case(id_or_name))
            .map(|v| v.id.clone());
        match found {
            Some(id) => {
                self.voice_id = Some(id);
                true
            }
            None => false,
        }
    }

    pub fn rate_wpm(&self) -> u32 {
        self.rate_wpm
    }

    /// Set the speech rate, clamped to the selectable range.
    pub fn set_rate_wpm(&mut self, wpm: u32) {
        self.rate_wpm = clamp_wpm(wpm);
    }

    /// Worksheet read by subsequent loads (`None` = first sheet).
    pub fn set_worksheet(&mut self, name: Option<String>) {
        self.worksheet = name;
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn current_word(&self) -> Option<&str> {
        self.current_word.as_deref()
    }

    pub fn log(&self) -> &RecencyLog {
        &self.log
    }

    pub fn source(&self) -> &WordSource {
        &self.source
    }

    pub fn read_phase(&self) -> ReadPhase {
        self.read_phase
    }

    pub fn state(&self) -> SelectionState {
        SelectionState::derive(
            self.source.is_loaded(),
            self.current_word.is_some(),
            self.read_phase,
        )
    }

    pub fn ui_state(&self) -> UiState {
        UiState::derive(
            self.source.is_loaded(),
            self.current_word.is_some(),
            self.read_phase,
        )
    }

    /// Take the oldest pending notice, if any.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notices.pop_front()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
