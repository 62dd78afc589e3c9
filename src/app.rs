//! Word Picker window, an egui/eframe application.
//!
//! # Architecture
//!
//! [`WordPickerApp`] is the top-level [`eframe::App`].  It owns the
//! [`SelectionController`] and turns widget events into controller calls:
//!
//! | Widget | Controller call |
//! |--------|-----------------|
//! | "Load Excel Sheet" | [`SelectionController::load`] |
//! | "Select Random Word" | [`SelectionController::select_word`] |
//! | "Read Word" | [`SelectionController::read_word`] |
//! | double-click in "Last 10 Words" | [`SelectionController::reselect_from_log`] |
//! | voice combo box | [`SelectionController::set_voice`] |
//! | rate slider | [`SelectionController::set_rate_wpm`] |
//!
//! Every frame starts with [`WordPickerApp::advance`], which drains finished
//! playback, runs the read cooldown and picks up notices to show in a modal.

use std::path::Path;
use std::time::{Duration, Instant};

use eframe::egui;

use crate::config::AppConfig;
use crate::controller::{Notice, NoticeLevel, SelectionController};
use crate::speech::{MAX_RATE_WPM, MIN_RATE_WPM};

/// Window title.
pub const APP_TITLE: &str = "Random Word Selector";

/// Repaint interval while waiting for the speech worker to finish.
const SPEAKING_POLL: Duration = Duration::from_millis(50);

// ---------------------------------------------------------------------------
// WordPickerApp
// ---------------------------------------------------------------------------

/// The word picker window.
pub struct WordPickerApp {
    controller: SelectionController,
    config: AppConfig,
    /// Log row highlighted by a single click.
    highlighted: Option<usize>,
    /// Notice currently shown in the modal.
    notice: Option<Notice>,
}

impl WordPickerApp {
    pub fn new(controller: SelectionController, config: AppConfig) -> Self {
        Self {
            controller,
            config,
            highlighted: None,
            notice: None,
        }
    }

    pub fn controller(&self) -> &SelectionController {
        &self.controller
    }

    // ── Per-frame bookkeeping ────────────────────────────────────────────

    /// Advance timers and collect notices.
    ///
    /// Returns how long until the next frame is needed, or `None` when the
    /// UI can sleep until the next input event.
    pub fn advance(&mut self, now: Instant) -> Option<Duration> {
        self.controller.poll_speech();
        if self.controller.tick(now) {
            log::debug!("Read control re-enabled");
        }
        if self.notice.is_none() {
            self.notice = self.controller.take_notice();
        }

        if let Some(deadline) = self.controller.next_deadline() {
            Some(deadline.saturating_duration_since(now))
        } else if self.controller.read_phase().is_busy() {
            Some(SPEAKING_POLL)
        } else {
            None
        }
    }

    // ── Actions ──────────────────────────────────────────────────────────

    /// Ask for a workbook with the native file picker and load it.
    fn pick_sheet(&mut self) {
        let mut dialog = rfd::FileDialog::new()
            .add_filter("Excel files", &["xlsx"])
            .set_title("Load Excel Sheet");
        if let Some(dir) = self.config.sheet_dir() {
            dialog = dialog.set_directory(dir);
        }

        match dialog.pick_file() {
            Some(path) => self.load_sheet(&path),
            None => log::debug!("Sheet selection cancelled"),
        }
    }

    /// Load `path`.  Success and failure both surface as a notice.
    pub fn load_sheet(&mut self, path: &Path) {
        if self.controller.load(path).is_ok() {
            self.highlighted = None;
        }
    }

    fn select_word(&mut self) {
        if let Err(e) = self.controller.select_word() {
            log::warn!("Select failed: {e}");
        }
    }

    fn read_word(&mut self) {
        if let Err(e) = self.controller.read_word() {
            log::warn!("Read failed: {e}");
        }
    }

    /// Double-click on the log row at `index`.
    pub fn reactivate(&mut self, index: usize) {
        match self.controller.reselect_from_log(index) {
            Ok(_) => self.highlighted = Some(index),
            Err(e) => log::warn!("Reselect failed: {e}"),
        }
    }

    // ── Panels ───────────────────────────────────────────────────────────

    fn draw_buttons(&mut self, ui: &mut egui::Ui) {
        let ui_state = self.controller.ui_state();

        ui.vertical_centered(|ui| {
            ui.add_space(6.0);
            if ui.button("Load Excel Sheet").clicked() {
                self.pick_sheet();
            }
            ui.add_space(6.0);
            if ui
                .add_enabled(ui_state.select_enabled, egui::Button::new("Select Random Word"))
                .clicked()
            {
                self.select_word();
            }
            ui.add_space(6.0);
            if ui
                .add_enabled(ui_state.read_enabled, egui::Button::new("Read Word"))
                .clicked()
            {
                self.read_word();
            }
        });
    }

    fn draw_current_word(&self, ui: &mut egui::Ui) {
        let word = self.controller.current_word().unwrap_or_default();
        ui.add_space(12.0);
        ui.vertical_centered(|ui| {
            ui.label(egui::RichText::new(word).size(self.config.ui.word_font_size));
        });
        ui.add_space(12.0);
    }

    fn draw_log(&mut self, ui: &mut egui::Ui) {
        ui.label(egui::RichText::new("Last 10 Words:").size(12.0));

        let words: Vec<String> = self
            .controller
            .log()
            .snapshot()
            .into_iter()
            .map(str::to_string)
            .collect();
        let font_size = self.config.ui.log_font_size;
        let mut reactivated = None;

        egui::Frame::group(ui.style()).show(ui, |ui| {
            egui::ScrollArea::vertical()
                .max_height(160.0)
                .auto_shrink([false, true])
                .show(ui, |ui| {
                    for (i, word) in words.iter().enumerate() {
                        let text = egui::RichText::new(word).size(font_size);
                        let resp = ui.selectable_label(self.highlighted == Some(i), text);
                        if resp.clicked() {
                            self.highlighted = Some(i);
                        }
                        if resp.double_clicked() {
                            reactivated = Some(i);
                        }
                    }
                });
        });

        if let Some(i) = reactivated {
            self.reactivate(i);
        }
    }

    fn draw_speech_settings(&mut self, ui: &mut egui::Ui) {
        ui.add_space(6.0);

        let current = self.controller.voice_id().map(str::to_string);
        let mut chosen = current.clone();
        let selected_text = current
            .as_deref()
            .and_then(|id| self.controller.voices().iter().find(|v| v.id == id))
            .map(|v| v.name.clone())
            .unwrap_or_else(|| "System default".into());

        ui.horizontal(|ui| {
            ui.label("Voice:");
            egui::ComboBox::from_id_salt("voice")
                .selected_text(selected_text)
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut chosen, None, "System default");
                    for voice in self.controller.voices() {
                        ui.selectable_value(&mut chosen, Some(voice.id.clone()), voice.name.as_str());
                    }
                });
        });
        if chosen != current {
            if let Err(e) = self.controller.set_voice(chosen.as_deref()) {
                log::warn!("Voice change failed: {e}");
            }
        }

        let mut rate = self.controller.rate_wpm();
        ui.horizontal(|ui| {
            ui.label("Speech rate:");
            ui.add(egui::Slider::new(&mut rate, MIN_RATE_WPM..=MAX_RATE_WPM).suffix(" wpm"));
        });
        if rate != self.controller.rate_wpm() {
            self.controller.set_rate_wpm(rate);
        }
    }

    fn draw_status(&self, ui: &mut egui::Ui) {
        let mut status = self.controller.state().label().to_string();
        if let Some(data) = self.controller.source().data() {
            let name = self
                .controller
                .source()
                .origin()
                .and_then(Path::file_name)
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "sheet".into());
            status = format!(
                "{status} · {name}: {} rows, {} words",
                data.row_count(),
                data.cell_count()
            );
        }
        ui.label(
            egui::RichText::new(status)
                .color(egui::Color32::from_rgb(140, 140, 140))
                .size(10.0),
        );
    }

    /// Modal message box for the pending notice.
    fn draw_notice(&mut self, ctx: &egui::Context) {
        let Some(notice) = self.notice.as_ref() else {
            return;
        };
        let color = match notice.level {
            NoticeLevel::Info => egui::Color32::from_rgb(80, 200, 120),
            NoticeLevel::Error => egui::Color32::from_rgb(255, 136, 68),
        };

        let mut dismissed = false;
        let modal = egui::Modal::new(egui::Id::new("notice")).show(ctx, |ui| {
            ui.set_width(260.0);
            ui.heading(egui::RichText::new(notice.title).color(color));
            ui.add_space(4.0);
            ui.label(notice.message.as_str());
            ui.add_space(8.0);
            ui.vertical_centered(|ui| {
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        });

        if dismissed || modal.should_close() {
            self.notice = None;
        }
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for WordPickerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(wait) = self.advance(Instant::now()) {
            ctx.request_repaint_after(wait);
        }

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            self.draw_status(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_buttons(ui);
            self.draw_current_word(ui);
            self.draw_log(ui);
            ui.separator();
            self.draw_speech_settings(ui);
        });

        self.draw_notice(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        log::info!("Word Picker closing");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
