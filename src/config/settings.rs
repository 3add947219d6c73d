//! Application settings structs, defaults, TOML persistence and the
//! environment-variable overlay.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across
//! threads.  API credentials are overlaid from environment variables at
//! process start; an absent credential is a valid state — the matching
//! provider adapter simply reports not-ready.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Narration and voice-synthesis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Local playback speech rate (0.0 – 1.0; 1.0 = normal speed).
    pub rate: f32,
    /// ElevenLabs voice identifier used for remote narration.
    pub voice_id: String,
    /// ElevenLabs stability setting (0.0 – 1.0).
    pub stability: f32,
    /// ElevenLabs similarity-boost setting (0.0 – 1.0).
    pub similarity_boost: f32,
    /// Whether remote TTS is attempted at all; `false` forces local playback.
    pub use_eleven_labs: bool,
    /// Maximum seconds to wait for any provider HTTP response.
    pub request_timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            rate: 0.8,
            voice_id: "BrbEfHMQu0fyclQR7lfh".into(),
            stability: 0.5,
            similarity_boost: 0.8,
            use_eleven_labs: true,
            request_timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Per-provider API credentials.
///
/// An empty string means the credential is absent.  Absence is not an
/// error — the adapter built from it reports `is_ready() == false` and the
/// fallback policy skips it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    /// ElevenLabs API key (`ELEVENLABS_API_KEY`).
    pub eleven_labs_api_key: String,
    /// OpenAI API key (`OPENAI_API_KEY`).
    pub openai_api_key: String,
    /// Google Cloud API key (`GOOGLE_CLOUD_API_KEY`).
    pub google_cloud_api_key: String,
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml` and
/// overlaid with environment variables at startup.
///
/// # Loading
///
/// ```rust,no_run
/// use chinese_practice::config::AppConfig;
///
/// let mut config = AppConfig::load().unwrap();
/// config.apply_env();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Narration / voice settings.
    pub speech: SpeechConfig,
    /// Provider API credentials.
    pub credentials: Credentials,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// so callers never need to special-case a missing file.
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

    /// Overlay settings from process environment variables.
    ///
    /// Recognised variables: `ELEVENLABS_API_KEY`, `OPENAI_API_KEY`,
    /// `GOOGLE_CLOUD_API_KEY`, `ELEVENLABS_VOICE_ID`, `SPEECH_RATE`,
    /// `ELEVENLABS_STABILITY`, `ELEVENLABS_SIMILARITY_BOOST`,
    /// `USE_ELEVENLABS`.  Unset or unparsable values leave the existing
    /// setting untouched.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Overlay settings from an arbitrary lookup function (testable core of
    /// [`apply_env`](Self::apply_env)).
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("ELEVENLABS_API_KEY") {
            self.credentials.eleven_labs_api_key = v;
        }
        if let Some(v) = lookup("OPENAI_API_KEY") {
            self.credentials.openai_api_key = v;
        }
        if let Some(v) = lookup("GOOGLE_CLOUD_API_KEY") {
            self.credentials.google_cloud_api_key = v;
        }
        if let Some(v) = lookup("ELEVENLABS_VOICE_ID") {
            self.speech.voice_id = v;
        }
        if let Some(rate) = lookup("SPEECH_RATE").and_then(|v| v.parse().ok()) {
            self.speech.rate = rate;
        }
        if let Some(stability) = lookup("ELEVENLABS_STABILITY").and_then(|v| v.parse().ok()) {
            self.speech.stability = stability;
        }
        if let Some(boost) =
            lookup("ELEVENLABS_SIMILARITY_BOOST").and_then(|v| v.parse().ok())
        {
            self.speech.similarity_boost = boost;
        }
        if let Some(v) = lookup("USE_ELEVENLABS") {
            self.speech.use_eleven_labs = v.eq_ignore_ascii_case("true");
        }
    }

    /// Log which credentials are configured without exposing key material.
    pub fn log_status(&self) {
        let status = |key: &str| if key.is_empty() { "not configured" } else { "configured" };
        log::info!(
            "ElevenLabs API key: {}",
            status(&self.credentials.eleven_labs_api_key)
        );
        log::info!(
            "OpenAI API key: {}",
            status(&self.credentials.openai_api_key)
        );
        log::info!(
            "Google Cloud API key: {}",
            status(&self.credentials.google_cloud_api_key)
        );
        log::info!("Voice ID: {}", self.speech.voice_id);
        log::info!("Speech rate: {}", self.speech.rate);
        log::info!("Use ElevenLabs: {}", self.speech.use_eleven_labs);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
