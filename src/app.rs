//! SpeakEasy window: egui/eframe application.
//!
//! # Architecture
//!
//! [`SpeakEasyApp`] is the top-level [`eframe::App`].  It owns the
//! [`PracticeController`], the device adapters, and three channel endpoints:
//!
//! * `command_tx` sends [`SessionCommand`]s to the [`SessionWorker`].
//! * `update_rx` receives [`SessionUpdate`]s from the worker.
//! * `speech_rx` receives [`SpeechEvent`]s from the speech engine.
//!
//! Every frame drains the channels into the controller, then draws it.
//!
//! # Layout
//!
//! | Area | Contents |
//! |------|----------|
//! | Top bar | title, session state |
//! | Input | practice text, Process / Generate, topic and count |
//! | Practice | sentence with per-word highlights, navigation, Listen / Record / Analyze, voice |
//! | Feedback | accuracy, feedback text, correct words and words to practise |
//! | Bottom bar | transient notices |
//!
//! [`SessionWorker`]: crate::session::SessionWorker

use std::time::{Duration, Instant};

use eframe::egui;
use tokio::sync::mpsc;

use crate::audio::Microphone;
use crate::config::AppConfig;
use crate::error::PracticeError;
use crate::scoring::ScoringResult;
use crate::session::{
    HighlightKind, Notice, PracticeController, PracticeState, SessionCommand, SessionUpdate,
};
use crate::speech::{pick_default_voice, SpeechEngine, SpeechEvent, Voice};

/// How long a notice stays on screen.
const NOTICE_TTL: Duration = Duration::from_secs(4);

const GREEN: egui::Color32 = egui::Color32::from_rgb(80, 200, 120);
const RED: egui::Color32 = egui::Color32::from_rgb(235, 90, 90);
const BLUE: egui::Color32 = egui::Color32::from_rgb(68, 136, 255);
const DIM: egui::Color32 = egui::Color32::from_rgb(140, 140, 140);

// ---------------------------------------------------------------------------
// SpeakEasyApp
// ---------------------------------------------------------------------------

pub struct SpeakEasyApp {
    controller: PracticeController,

    // ── Adapters ─────────────────────────────────────────────────────────
    speech: Box<dyn SpeechEngine>,
    microphone: Box<dyn Microphone>,
    voices: Vec<Voice>,

    // ── Channels ─────────────────────────────────────────────────────────
    command_tx: mpsc::Sender<SessionCommand>,
    update_rx: mpsc::Receiver<SessionUpdate>,
    speech_rx: mpsc::UnboundedReceiver<SpeechEvent>,

    // ── UI state ─────────────────────────────────────────────────────────
    input_text: String,
    topic: String,
    sentence_count: u8,
    notices: Vec<(Notice, Instant)>,
    voice_changed: bool,

    config: AppConfig,
}

impl SpeakEasyApp {
    /// Create the app and select the default voice.
    pub fn new(
        config: AppConfig,
        speech: Box<dyn SpeechEngine>,
        speech_rx: mpsc::UnboundedReceiver<SpeechEvent>,
        microphone: Box<dyn Microphone>,
        command_tx: mpsc::Sender<SessionCommand>,
        update_rx: mpsc::Receiver<SessionUpdate>,
    ) -> Self {
        let voices = speech.voices();
        let mut controller = PracticeController::new();
        let default_voice = pick_default_voice(
            &voices,
            &config.speech.locale,
            config.speech.voice.as_deref(),
        );
        if let Some(voice) = default_voice {
            log::info!("speech: default voice {}", voice.label());
            controller.set_voice(Some(voice.id.clone()));
        }

        Self {
            controller,
            speech,
            microphone,
            voices,
            command_tx,
            update_rx,
            speech_rx,
            input_text: String::new(),
            topic: config.practice.default_topic.clone(),
            sentence_count: config.practice.sentence_count,
            notices: Vec::new(),
            voice_changed: false,
            config,
        }
    }

    // ── Channel polling ──────────────────────────────────────────────────

    /// Drain worker updates and speech events into the controller.
    fn poll_channels(&mut self) {
        while let Ok(update) = self.update_rx.try_recv() {
            match update {
                SessionUpdate::Generated { ticket, outcome } => {
                    if let Some(text) = self.controller.complete_generation(ticket, outcome) {
                        self.input_text = text;
                    }
                }
                SessionUpdate::Scored { ticket, outcome } => {
                    self.controller.complete_scoring(ticket, outcome);
                }
            }
        }

        while let Ok(event) = self.speech_rx.try_recv() {
            self.controller.on_speech_event(event);
        }

        self.controller.poll_recording();

        let now = Instant::now();
        for notice in self.controller.drain_notices() {
            if notice.is_error {
                log::warn!("{}: {}", notice.title, notice.message);
            }
            self.notices.push((notice, now));
        }
        self.notices.retain(|(_, shown)| shown.elapsed() < NOTICE_TTL);
    }

    // ── Actions ──────────────────────────────────────────────────────────
    //
    // Controller failures are queued as notices, so results are dropped here.

    fn process_text(&mut self) {
        let text = self.input_text.clone();
        let _ = self.controller.load_text(&text);
    }

    fn generate(&mut self) {
        let Ok((ticket, request)) = self
            .controller
            .begin_generation(&self.topic, self.sentence_count)
        else {
            return;
        };
        if let Err(e) = self
            .command_tx
            .try_send(SessionCommand::Generate { ticket, request })
        {
            log::error!("session worker unavailable: {e}");
            self.controller.complete_generation(
                ticket,
                Err(PracticeError::GenerationUnavailable("the worker is not running".into())),
            );
        }
    }

    fn analyze(&mut self) {
        let Ok((ticket, request)) = self.controller.begin_scoring() else {
            return;
        };
        if let Err(e) = self
            .command_tx
            .try_send(SessionCommand::Score { ticket, request })
        {
            log::error!("session worker unavailable: {e}");
            self.controller.complete_scoring(
                ticket,
                Err(PracticeError::ScoringUnavailable("the worker is not running".into())),
            );
        }
    }

    fn toggle_listening(&mut self) {
        if self.controller.is_listening() {
            self.controller.stop_listening();
        } else {
            let _ = self.controller.start_listening(self.speech.as_ref());
        }
    }

    fn toggle_recording(&mut self) {
        if self.controller.state() == PracticeState::Recording {
            let _ = self.controller.stop_recording();
        } else {
            let _ = self.controller.start_recording(self.microphone.as_ref());
        }
    }

    // ── Panels ───────────────────────────────────────────────────────────

    fn draw_top_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("SpeakEasy");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let state = self.controller.state();
                ui.label(egui::RichText::new(state.label()).color(state_color(state)));
                if self.controller.is_generating() {
                    ui.spinner();
                }
            });
        });
    }

    fn draw_input(&mut self, ui: &mut egui::Ui) {
        ui.label("Practice text");
        ui.add(
            egui::TextEdit::multiline(&mut self.input_text)
                .hint_text("Paste or type text, or generate sentences below.")
                .desired_rows(4)
                .desired_width(f32::INFINITY),
        );

        let state = self.controller.state();
        let can_load = !self.controller.is_generating() && !state.is_busy();

        ui.horizontal(|ui| {
            if ui
                .add_enabled(can_load, egui::Button::new("Process Text"))
                .clicked()
            {
                self.process_text();
            }

            ui.separator();
            ui.label("Topic");
            ui.add(egui::TextEdit::singleline(&mut self.topic).desired_width(180.0));
            ui.add(egui::DragValue::new(&mut self.sentence_count).range(1..=10));
            let generate_label = if self.controller.is_generating() {
                "Generating..."
            } else {
                "Generate"
            };
            if ui
                .add_enabled(can_load, egui::Button::new(generate_label))
                .clicked()
            {
                self.generate();
            }
        });
    }

    fn draw_practice(&mut self, ui: &mut egui::Ui) {
        let total = self.controller.sentences().len();
        if total == 0 {
            ui.label(egui::RichText::new("No sentences yet.").color(DIM));
            return;
        }

        // Navigation
        ui.horizontal(|ui| {
            if ui
                .add_enabled(self.controller.can_go_prev(), egui::Button::new("< Prev"))
                .clicked()
            {
                let _ = self.controller.prev();
            }
            ui.label(format!(
                "Sentence {} of {}",
                self.controller.index() + 1,
                total
            ));
            if ui
                .add_enabled(self.controller.can_go_next(), egui::Button::new("Next >"))
                .clicked()
            {
                let _ = self.controller.next();
            }
        });

        ui.add_space(6.0);
        self.draw_sentence(ui);
        ui.add_space(6.0);

        // Controls
        let state = self.controller.state();
        ui.horizontal(|ui| {
            let listen_label = if self.controller.is_listening() {
                "Stop"
            } else {
                "Listen"
            };
            if ui.button(listen_label).clicked() {
                self.toggle_listening();
            }

            let record_label = match self.controller.recording_secs() {
                Some(secs) => format!("Stop Recording ({secs:.1}s)"),
                None => "Record".to_string(),
            };
            let record_button = if state == PracticeState::Recording {
                egui::Button::new(egui::RichText::new(record_label).color(RED))
            } else {
                egui::Button::new(record_label)
            };
            if ui
                .add_enabled(state != PracticeState::Scoring, record_button)
                .clicked()
            {
                self.toggle_recording();
            }

            let can_analyze = self.controller.artifact().is_some()
                && !matches!(state, PracticeState::Recording | PracticeState::Scoring);
            if ui
                .add_enabled(can_analyze, egui::Button::new("Analyze"))
                .clicked()
            {
                self.analyze();
            }
            if state == PracticeState::Scoring {
                ui.spinner();
            }
        });

        self.draw_voice_picker(ui);
    }

    /// The current sentence as clickable, coloured words.
    fn draw_sentence(&mut self, ui: &mut egui::Ui) {
        let size = self.config.ui.text_size;
        let words = self.controller.highlighted_words();
        let mut clicked = None;

        ui.horizontal_wrapped(|ui| {
            for (i, word) in words.iter().enumerate() {
                let mut text = egui::RichText::new(&word.text).size(size);
                text = match word.kind {
                    HighlightKind::Plain => text,
                    HighlightKind::Current => text.background_color(BLUE).color(egui::Color32::WHITE),
                    HighlightKind::Correct => text.color(GREEN),
                    HighlightKind::Incorrect => text.color(RED).underline(),
                };
                let response = ui
                    .add(egui::Label::new(text).sense(egui::Sense::click()))
                    .on_hover_text("Listen to this word");
                if response.clicked() {
                    clicked = Some(i);
                }
            }
        });

        if let Some(i) = clicked {
            let _ = self.controller.listen_word(self.speech.as_ref(), i);
        }
    }

    fn draw_voice_picker(&mut self, ui: &mut egui::Ui) {
        if self.voices.is_empty() {
            return;
        }
        let mut selected = self.controller.voice().map(str::to_string);
        let selected_label = selected
            .as_deref()
            .and_then(|id| self.voices.iter().find(|v| v.id == id))
            .map(Voice::label)
            .unwrap_or_else(|| "Default".into());

        egui::ComboBox::from_label("Voice")
            .selected_text(selected_label)
            .show_ui(ui, |ui| {
                for voice in &self.voices {
                    ui.selectable_value(&mut selected, Some(voice.id.clone()), voice.label());
                }
            });

        if selected.as_deref() != self.controller.voice() {
            log::info!("speech: voice set to {selected:?}");
            self.config.speech.voice = selected.clone();
            self.controller.set_voice(selected);
            self.voice_changed = true;
        }
    }

    fn draw_feedback(&self, ui: &mut egui::Ui) {
        let Some(result) = self.controller.result() else {
            return;
        };

        ui.separator();
        ui.horizontal(|ui| {
            ui.label("Accuracy");
            let colour = if result.accuracy_percentage >= 80 {
                GREEN
            } else if result.accuracy_percentage >= 50 {
                egui::Color32::from_rgb(255, 170, 60)
            } else {
                RED
            };
            ui.label(
                egui::RichText::new(format!("{}%", result.accuracy_percentage))
                    .size(20.0)
                    .strong()
                    .color(colour),
            );
        });
        ui.add(
            egui::ProgressBar::new(f32::from(result.accuracy_percentage) / 100.0)
                .desired_width(240.0),
        );
        ui.add_space(4.0);
        ui.label(&result.feedback);

        ui.add_space(4.0);
        for (line, colour) in word_summary(result) {
            ui.label(egui::RichText::new(line).color(colour));
        }
    }

    fn draw_notices(&self, ui: &mut egui::Ui) {
        for (notice, _) in &self.notices {
            let colour = if notice.is_error { RED } else { DIM };
            ui.label(
                egui::RichText::new(format!("{}: {}", notice.title, notice.message)).color(colour),
            );
        }
    }
}

/// The correct and incorrect word lists, skipping empty ones.
fn word_summary(result: &ScoringResult) -> Vec<(String, egui::Color32)> {
    let mut lines = Vec::new();
    if !result.correct_words.is_empty() {
        lines.push((format!("Correct words: {}", result.correct_words.join(", ")), GREEN));
    }
    if !result.incorrect_words.is_empty() {
        lines.push((
            format!("Words to practise: {}", result.incorrect_words.join(", ")),
            RED,
        ));
    }
    lines
}

/// Accent colour for the status label.
fn state_color(state: PracticeState) -> egui::Color32 {
    match state {
        PracticeState::Idle | PracticeState::Browsing => DIM,
        PracticeState::Listening | PracticeState::Scoring => BLUE,
        PracticeState::Recording => RED,
        PracticeState::Scored => GREEN,
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for SpeakEasyApp {
    /// Called every frame by eframe.  Polls channels, then renders.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_channels();

        // --- Keep polling while something runs in the background ----------
        let state = self.controller.state();
        if state == PracticeState::Recording || state == PracticeState::Listening {
            ctx.request_repaint_after(Duration::from_millis(33));
        } else if state == PracticeState::Scoring
            || self.controller.is_generating()
            || !self.notices.is_empty()
        {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| self.draw_top_bar(ui));

        if !self.notices.is_empty() {
            egui::TopBottomPanel::bottom("notices").show(ctx, |ui| self.draw_notices(ui));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.draw_input(ui);
                ui.separator();
                self.draw_practice(ui);
                self.draw_feedback(ui);
            });
        });
    }

    /// Persist the chosen voice (best-effort).
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.controller.stop_listening();
        if self.voice_changed {
            if let Err(e) = self.config.save() {
                log::warn!("Failed to save settings: {e}");
            }
        }
        log::info!("SpeakEasy closing");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(correct: &[&str], incorrect: &[&str]) -> ScoringResult {
        let sentence = [correct, incorrect].concat().join(" ");
        ScoringResult::new(
            &sentence,
            "Keep going.",
            correct.iter().map(|w| w.to_string()).collect(),
            incorrect.iter().map(|w| w.to_string()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn summary_lists_correct_and_incorrect_words() {
        let lines = word_summary(&scored(&["The", "cat"], &["sat."]));
        assert_eq!(
            lines,
            vec![
                ("Correct words: The, cat".to_string(), GREEN),
                ("Words to practise: sat.".to_string(), RED),
            ]
        );
    }

    #[test]
    fn summary_skips_empty_lists() {
        let lines = word_summary(&scored(&["Perfect."], &[]));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].0.starts_with("Correct words"));
    }
}
