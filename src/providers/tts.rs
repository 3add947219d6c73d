//! Remote text-to-speech adapter: the [`TtsProvider`] trait and the
//! ElevenLabs implementation.
//!
//! The adapter only synthesises — playable bytes come back to the caller,
//! and the audio sink (an external capability) is responsible for decoding
//! and playback.

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::providers::error::ProviderError;

// ---------------------------------------------------------------------------
// VoiceParams
// ---------------------------------------------------------------------------

/// Tunable synthesis parameters, both in `[0, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct VoiceParams {
    pub stability: f32,
    pub similarity_boost: f32,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.8,
        }
    }
}

// ---------------------------------------------------------------------------
// TtsProvider trait
// ---------------------------------------------------------------------------

/// Async adapter contract for a network TTS provider.
#[async_trait]
pub trait TtsProvider: Send + Sync {
    /// Short provider name used in errors and notices.
    fn name(&self) -> &'static str;

    /// `true` iff the credential is present.
    fn is_ready(&self) -> bool;

    /// Synthesise `text` into playable audio bytes.  Exactly one request,
    /// no retry.
    async fn synthesize(&self, text: &str, params: VoiceParams) -> Result<Vec<u8>, ProviderError>;

    /// Best-effort startup diagnostic: one real request, `false` on any
    /// failure.
    async fn test_connection(&self) -> bool;
}

// ---------------------------------------------------------------------------
// ElevenLabsTts
// ---------------------------------------------------------------------------

/// Calls the ElevenLabs `text-to-speech/{voice_id}` endpoint with the
/// `eleven_multilingual_v2` model and returns the MPEG audio bytes.
pub struct ElevenLabsTts {
    client: reqwest::Client,
    api_key: String,
    voice_id: String,
    base_url: String,
}

impl ElevenLabsTts {
    const PROVIDER: &'static str = "ElevenLabs";

    /// Build the adapter from application config (API key + voice id +
    /// request timeout).
    pub fn from_config(config: &AppConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(
                config.speech.request_timeout_secs,
            ))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_key: config.credentials.eleven_labs_api_key.clone(),
            voice_id: config.speech.voice_id.clone(),
            base_url: "https://api.elevenlabs.io/v1".into(),
        }
    }

    /// Override the endpoint base URL (useful for tests against a local
    /// stub server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl TtsProvider for ElevenLabsTts {
    fn name(&self) -> &'static str {
        Self::PROVIDER
    }

    fn is_ready(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn synthesize(&self, text: &str, params: VoiceParams) -> Result<Vec<u8>, ProviderError> {
        if !self.is_ready() {
            return Err(ProviderError::NotConfigured {
                provider: Self::PROVIDER,
            });
        }

        let url = format!("{}/text-to-speech/{}", self.base_url, self.voice_id);
        let body = serde_json::json!({
            "text": text,
            "model_id": "eleven_multilingual_v2",
            "voice_settings": {
                "stability": params.stability,
                "similarity_boost": params.similarity_boost,
                "style": 0.0,
                "use_speaker_boost": true
            }
        });

        let response = self
            .client
            .post(&url)
            .header("Accept", "audio/mpeg")
            .header("xi-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(Self::PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                provider: Self::PROVIDER,
                status: status.as_u16(),
                message,
            });
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| ProviderError::from_reqwest(Self::PROVIDER, e))?;
        log::debug!("ElevenLabs returned {} bytes of audio", audio.len());
        Ok(audio.to_vec())
    }

    async fn test_connection(&self) -> bool {
        match self.synthesize("Hello", VoiceParams::default()).await {
            Ok(_) => {
                log::info!("ElevenLabs connection test passed");
                true
            }
            Err(e) => {
                log::warn!("ElevenLabs connection test failed: {e}");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// MockTts  (test-only)
// ---------------------------------------------------------------------------

/// Test double returning a pre-configured synthesis result.
#[cfg(test)]
pub struct MockTts {
    ready: bool,
    response: Result<Vec<u8>, ProviderError>,
    pub requests: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockTts {
    pub fn ok(audio: Vec<u8>) -> Self {
        Self {
            ready: true,
            response: Ok(audio),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            ready: true,
            response: Err(ProviderError::Http {
                provider: "ElevenLabs",
                status: 500,
                message: "server error".into(),
            }),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn not_ready() -> Self {
        Self {
            ready: false,
            response: Err(ProviderError::NotConfigured {
                provider: "ElevenLabs",
            }),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl TtsProvider for MockTts {
    fn name(&self) -> &'static str {
        "ElevenLabs"
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    async fn synthesize(&self, text: &str, _params: VoiceParams) -> Result<Vec<u8>, ProviderError> {
        self.requests.lock().unwrap().push(text.to_string());
        self.response.clone()
    }

    async fn test_connection(&self) -> bool {
        self.response.is_ok()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
