//! Selection state machine and the derived UI state.
//!
//! [`ReadPhase`] is the only piece of state stored for the read control.
//! [`SelectionState`] and [`UiState`] are computed from
//! (sheet loaded?, current word set?, read phase) and never stored.
//!
//! ```text
//! Unloaded ──load ok──▶ Loaded ──select──▶ WordSelected ──read──▶ Speaking
//!                                              ▲                    │
//!                                              └─ 500 ms after ─────┘
//!                                                 playback ends
//! any state ──load ok──▶ Loaded / WordSelected (log and word kept)
//! ```

use std::time::{Duration, Instant};

/// Delay between playback completion and the read control re-enabling.
pub const READ_COOLDOWN: Duration = Duration::from_millis(500);

// ---------------------------------------------------------------------------
// ReadPhase
// ---------------------------------------------------------------------------

/// Lifecycle of the read-aloud control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadPhase {
    /// No playback in flight; read may be invoked.
    #[default]
    Ready,
    /// A request has been handed to the speech worker.
    Speaking,
    /// Playback finished; read re-enables at `until`.
    Cooldown { until: Instant },
}

impl ReadPhase {
    /// `true` from the moment read is invoked until the cooldown elapses.
    pub fn is_busy(&self) -> bool {
        !matches!(self, ReadPhase::Ready)
    }

    /// Pending re-enable deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        match self {
            ReadPhase::Cooldown { until } => Some(*until),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// SelectionState
// ---------------------------------------------------------------------------

/// Controller state as seen by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    /// No sheet loaded yet.
    Unloaded,
    /// Sheet loaded, nothing picked.
    Loaded,
    /// A current word is displayed and may be read.
    WordSelected,
    /// Playback in flight or cooling down.
    Speaking,
}

impl SelectionState {
    pub fn derive(loaded: bool, has_word: bool, phase: ReadPhase) -> Self {
        match (loaded, has_word, phase.is_busy()) {
            (_, true, true) => SelectionState::Speaking,
            (_, true, false) => SelectionState::WordSelected,
            (true, false, _) => SelectionState::Loaded,
            (false, false, _) => SelectionState::Unloaded,
        }
    }

    /// Short status-bar label.
    pub fn label(&self) -> &'static str {
        match self {
            SelectionState::Unloaded => "No sheet loaded",
            SelectionState::Loaded => "Ready",
            SelectionState::WordSelected => "Word selected",
            SelectionState::Speaking => "Speaking",
        }
    }
}

// ---------------------------------------------------------------------------
// UiState
// ---------------------------------------------------------------------------

/// Which actions the UI may offer right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiState {
    pub select_enabled: bool,
    pub read_enabled: bool,
}

impl UiState {
    pub fn derive(loaded: bool, has_word: bool, phase: ReadPhase) -> Self {
        Self {
            select_enabled: loaded,
            read_enabled: has_word && !phase.is_busy(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
