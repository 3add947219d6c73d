//! Primary translation adapter: the [`Translator`] trait and the Google
//! Cloud Translation implementation.

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::providers::error::ProviderError;

/// Placeholder value shipped in `.env` templates; a key equal to this is
/// treated as absent.
pub const GOOGLE_KEY_SENTINEL: &str = "YOUR_GOOGLE_CLOUD_API_KEY";

// ---------------------------------------------------------------------------
// Translator trait
// ---------------------------------------------------------------------------

/// Async adapter contract for a network translation provider.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Short provider name used in errors and notices.
    fn name(&self) -> &'static str;

    /// `true` iff the credential is present and not the placeholder sentinel.
    fn is_ready(&self) -> bool;

    /// Translate Chinese `text` to English.  Exactly one request, no retry.
    async fn translate_to_english(&self, text: &str) -> Result<String, ProviderError>;

    /// Best-effort startup diagnostic: one real request, `false` on any
    /// failure.
    async fn test_connection(&self) -> bool;
}

// ---------------------------------------------------------------------------
// GoogleTranslator
// ---------------------------------------------------------------------------

/// Calls the Google Cloud Translation v2 REST endpoint (`zh` → `en`, plain
/// text format).
pub struct GoogleTranslator {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GoogleTranslator {
    const PROVIDER: &'static str = "Google Translation";

    /// Build the adapter from application config.
    pub fn from_config(config: &AppConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(
                config.speech.request_timeout_secs,
            ))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_key: config.credentials.google_cloud_api_key.clone(),
            base_url: "https://translation.googleapis.com/language/translate/v2".into(),
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
impl Translator for GoogleTranslator {
    fn name(&self) -> &'static str {
        Self::PROVIDER
    }

    fn is_ready(&self) -> bool {
        !self.api_key.is_empty() && self.api_key != GOOGLE_KEY_SENTINEL
    }

    async fn translate_to_english(&self, text: &str) -> Result<String, ProviderError> {
        if !self.is_ready() {
            return Err(ProviderError::NotConfigured {
                provider: Self::PROVIDER,
            });
        }

        let url = format!("{}?key={}", self.base_url, self.api_key);
        let body = serde_json::json!({
            "q": text,
            "source": "zh",
            "target": "en",
            "format": "text"
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(Self::PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
                .unwrap_or_else(|| "Unknown error".into());
            return Err(ProviderError::Http {
                provider: Self::PROVIDER,
                status: status.as_u16(),
                message,
            });
        }

        let json: serde_json::Value = response.json().await.map_err(|e| ProviderError::Parse {
            provider: Self::PROVIDER,
            reason: e.to_string(),
        })?;

        json["data"]["translations"][0]["translatedText"]
            .as_str()
            .map(str::to_string)
            .ok_or(ProviderError::Parse {
                provider: Self::PROVIDER,
                reason: "no translation returned".into(),
            })
    }

    async fn test_connection(&self) -> bool {
        match self.translate_to_english("你好").await {
            Ok(translation) => {
                log::info!("Google Translation connection test passed: {translation}");
                true
            }
            Err(e) => {
                log::warn!("Google Translation connection test failed: {e}");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// MockTranslator  (test-only)
// ---------------------------------------------------------------------------

/// Test double returning a pre-configured translation result.
#[cfg(test)]
pub struct MockTranslator {
    ready: bool,
    response: Result<String, ProviderError>,
    pub requests: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockTranslator {
    pub fn ok(translation: impl Into<String>) -> Self {
        Self {
            ready: true,
            response: Ok(translation.into()),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            ready: true,
            response: Err(ProviderError::Http {
                provider: "Google Translation",
                status: 403,
                message: "quota exceeded".into(),
            }),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn not_ready() -> Self {
        Self {
            ready: false,
            response: Err(ProviderError::NotConfigured {
                provider: "Google Translation",
            }),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl Translator for MockTranslator {
    fn name(&self) -> &'static str {
        "Google Translation"
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    async fn translate_to_english(&self, text: &str) -> Result<String, ProviderError> {
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
