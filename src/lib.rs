//! Word Picker: pick a random word from a spreadsheet and read it aloud.
//!
//! | Module | Role |
//! |--------|------|
//! | [`words`] | spreadsheet grid, random draws, recency log |
//! | [`speech`] | TTS service, worker thread, rate mapping |
//! | [`controller`] | selection state machine and UI gating |
//! | [`config`] | `settings.toml` and platform paths |
//! | [`app`] | egui front end |

pub mod app;
pub mod config;
pub mod controller;
pub mod speech;
pub mod words;
