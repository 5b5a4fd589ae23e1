//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//! Missing keys fall back to their defaults, so a hand-written
//! `settings.toml` only needs the values it changes.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

/// Environment variable consulted when `llm.api_key` is not set.
pub const API_KEY_ENV: &str = "SPEAKEASY_API_KEY";

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Settings for the LLM endpoint used for scoring and sentence generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API (without `/v1/...`).
    pub base_url: String,
    /// API key; `None` falls back to `SPEAKEASY_API_KEY`, then to no auth.
    pub api_key: Option<String>,
    /// Audio-capable model used for pronunciation scoring.
    pub scoring_model: String,
    /// Text model used for sentence generation.
    pub generation_model: String,
    /// Sampling temperature (0.0 – 1.0).
    pub temperature: f32,
    /// Maximum seconds to wait for a response before timing out.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            api_key: None,
            scoring_model: "gpt-4o-audio-preview".into(),
            generation_model: "gpt-4o-mini".into(),
            temperature: 0.3,
            timeout_secs: 60,
        }
    }
}

impl LlmConfig {
    /// The API key to send, if any: the configured key, else the
    /// environment variable.  Empty strings count as unset.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// PracticeConfig
// ---------------------------------------------------------------------------

/// Defaults for generated practice material.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PracticeConfig {
    /// Topic sent to the sentence generator.
    pub default_topic: String,
    /// Number of sentences to generate (clamped to 1–10).
    pub sentence_count: u8,
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            default_topic: "common daily phrases".into(),
            sentence_count: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Settings for the text-to-speech synthesizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Synthesizer executable.
    pub program: String,
    /// Language prefix used to list voices and pick the default one.
    pub locale: String,
    /// Preferred voice id; `None` picks the first voice for `locale`.
    pub voice: Option<String>,
    /// Speaking rate.
    pub words_per_minute: u32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            program: "espeak-ng".into(),
            locale: "en".into(),
            voice: None,
            words_per_minute: 150,
        }
    }
}

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Settings for microphone capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Sample rate of the encoded recording in Hz.
    pub target_sample_rate: u32,
    /// Recording stops accumulating after this many seconds.
    pub max_recording_secs: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: 16_000,
            max_recording_secs: 60.0,
        }
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// Window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Initial inner window size in points.
    pub window_size: (f32, f32),
    /// Font size of the practice sentence.
    pub text_size: f32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_size: (720.0, 560.0),
            text_size: 22.0,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use speakeasy::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// # let _ = config;
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub practice: PracticeConfig,
    pub speech: SpeechConfig,
    pub audio: AudioConfig,
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config.practice.sentence_count, 5);
        assert_eq!(config.speech.program, "espeak-ng");
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.llm.base_url, "https://api.openai.com");
        assert!(cfg.llm.api_key.is_none());
        assert_eq!(cfg.llm.timeout_secs, 60);
        assert_eq!(cfg.practice.default_topic, "common daily phrases");
        assert_eq!(cfg.speech.locale, "en");
        assert_eq!(cfg.audio.target_sample_rate, 16_000);
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("settings.toml");

        let mut cfg = AppConfig::default();
        cfg.llm.base_url = "http://localhost:8080".into();
        cfg.llm.api_key = Some("sk-test".into());
        cfg.llm.scoring_model = "audio-model".into();
        cfg.practice.sentence_count = 8;
        cfg.speech.voice = Some("en-gb".into());
        cfg.speech.words_per_minute = 120;
        cfg.ui.window_size = (800.0, 600.0);

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.llm.base_url, "http://localhost:8080");
        assert_eq!(loaded.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(loaded.llm.scoring_model, "audio-model");
        assert_eq!(loaded.practice.sentence_count, 8);
        assert_eq!(loaded.speech.voice.as_deref(), Some("en-gb"));
        assert_eq!(loaded.speech.words_per_minute, 120);
        assert_eq!(loaded.ui.window_size, (800.0, 600.0));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[practice]\ndefault_topic = \"travel\"\n").unwrap();

        let cfg = AppConfig::load_from(&path).expect("load");
        assert_eq!(cfg.practice.default_topic, "travel");
        assert_eq!(cfg.practice.sentence_count, 5);
        assert_eq!(cfg.llm.generation_model, "gpt-4o-mini");
    }

    #[test]
    fn configured_key_wins_over_environment() {
        let cfg = LlmConfig {
            api_key: Some("sk-config".into()),
            ..LlmConfig::default()
        };
        assert_eq!(cfg.resolved_api_key().as_deref(), Some("sk-config"));
    }
}
