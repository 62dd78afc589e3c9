//! Selection controller: the state machine behind the three buttons.
//!
//! # Overview
//!
//! ```text
//! Load Excel Sheet ──▶ SelectionController::load
//! Select Random Word ─▶ SelectionController::select_word
//! Read Word ─────────▶ SelectionController::read_word ──▶ SpeechDispatch
//! double-click log ──▶ SelectionController::reselect_from_log
//! every frame ───────▶ poll_speech() + tick(now)
//! ```
//!
//! Button enablement is derived from the controller via
//! [`SelectionController::ui_state`]; nothing in the UI stores it.

pub mod selection;
pub mod state;

pub use selection::{ControllerError, Notice, NoticeLevel, SelectionController};
pub use state::{ReadPhase, SelectionState, UiState, READ_COOLDOWN};
