//! Application entry point for the Random Word Selector.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default when absent).
//! 3. Start the speech worker; it builds the platform TTS engine on its own
//!    thread and reports the available voices.
//! 4. Build the [`SelectionController`] and apply the configured voice,
//!    rate and worksheet.
//! 5. Run [`eframe::run_native`], which blocks the main thread until the
//!    window is closed.  Dropping the app shuts the speech worker down.

use word_picker::{
    app::{WordPickerApp, APP_TITLE},
    config::AppConfig,
    controller::SelectionController,
    speech::{SpeechService, SpeechWorker, TtsSpeech, UnavailableSpeech},
};

use eframe::egui;

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let (width, height) = config.ui.window_size;
    let vp = egui::ViewportBuilder::default()
        .with_title(APP_TITLE)
        .with_inner_size([width, height])
        .with_min_inner_size([320.0, 360.0]);

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

/// Build the platform speech service, falling back to one that reports the
/// failure on every read so the window still opens.
fn make_speech_service() -> Box<dyn SpeechService> {
    match TtsSpeech::new() {
        Ok(tts) => Box::new(tts),
        Err(e) => {
            log::warn!("{e}. Read Word will report an error.");
            Box::new(UnavailableSpeech::new(e.to_string()))
        }
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> eframe::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Word Picker starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e:#}); using defaults");
        AppConfig::default()
    });

    // 3. Speech worker
    let worker = match SpeechWorker::start(make_speech_service) {
        Ok(worker) => worker,
        Err(e) => {
            log::error!("Could not start speech worker: {e}");
            std::process::exit(1);
        }
    };

    // 4. Controller
    let mut controller = SelectionController::new(Box::new(worker));
    controller.set_rate_wpm(config.speech.rate_wpm);
    controller.set_worksheet(config.sheet.worksheet.clone());
    if let Some(voice) = config.speech.voice.as_deref() {
        if !controller.prefer_voice(voice) {
            log::warn!("Configured voice {voice:?} not found; using system default");
        }
    }

    // 5. Run the window (blocks until closed)
    let app = WordPickerApp::new(controller, config.clone());
    let options = native_options(&config);

    eframe::run_native(APP_TITLE, options, Box::new(move |_cc| Ok(Box::new(app))))
}
