//! Application entry point for SpeakEasy.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Build the LLM scorer and generator from config.
//! 5. Create session channels (`command`, `update`) and spawn the
//!    [`SessionWorker`] on the runtime.
//! 6. Build the speech engine and microphone adapters.
//! 7. Run [`eframe::run_native`], which blocks the main thread until the
//!    window is closed.

use std::sync::Arc;

use speakeasy::{
    app::SpeakEasyApp,
    audio::CpalMicrophone,
    config::AppConfig,
    llm::{ApiGenerator, ApiScorer, PronunciationScorer, SentenceGenerator},
    session::{SessionCommand, SessionUpdate, SessionWorker},
    speech::{EspeakEngine, SpeechEvent},
};
use tokio::sync::mpsc;

use eframe::egui;

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let (width, height) = config.ui.window_size;
    let vp = egui::ViewportBuilder::default()
        .with_title("SpeakEasy")
        .with_inner_size([width, height])
        .with_min_inner_size([420.0, 320.0]);

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> eframe::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("SpeakEasy starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime (LLM requests and speech subprocesses)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    // 4. LLM collaborators
    if config.llm.resolved_api_key().is_none() {
        log::warn!("No LLM API key configured; generation and analysis will fail");
    }
    let scorer: Arc<dyn PronunciationScorer> = Arc::new(ApiScorer::from_config(&config.llm));
    let generator: Arc<dyn SentenceGenerator> = Arc::new(ApiGenerator::from_config(&config.llm));

    // 5. Session worker
    let (command_tx, command_rx) = mpsc::channel::<SessionCommand>(16);
    let (update_tx, update_rx) = mpsc::channel::<SessionUpdate>(16);
    rt.spawn(SessionWorker::new(scorer, generator).run(command_rx, update_tx));

    // 6. Device adapters
    let (speech_tx, speech_rx) = mpsc::unbounded_channel::<SpeechEvent>();
    let speech = EspeakEngine::new(config.speech.clone(), rt.handle().clone(), speech_tx);
    let microphone = CpalMicrophone::new(config.audio.clone());

    // 7. Build the egui app and run it (blocks until the window is closed)
    let app = SpeakEasyApp::new(
        config.clone(),
        Box::new(speech),
        speech_rx,
        Box::new(microphone),
        command_tx,
        update_rx,
    );
    let options = native_options(&config);

    eframe::run_native(
        "SpeakEasy",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
}
