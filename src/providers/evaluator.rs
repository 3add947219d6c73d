//! Answer-evaluation adapter: the [`Evaluator`] trait, the [`Evaluation`]
//! result it produces, and the OpenAI chat-completions implementation.
//!
//! The OpenAI adapter also exposes a translation capability, used by the
//! fallback policy as the second tier of the translation chain.

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::providers::error::ProviderError;
use crate::providers::parse::parse_evaluation;
use crate::providers::prompt;

/// Placeholder value shipped in `.env` templates; a key equal to this is
/// treated as absent.
pub const OPENAI_KEY_SENTINEL: &str = "sk-proj-your-openai-api-key-here";

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Overall quality bucket for an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationCategory {
    /// Correct grammar, appropriate vocabulary, complete answer.
    Good,
    /// Mostly correct but has some issues.
    Partial,
    /// Significant grammar/vocabulary issues or incomplete answer.
    Poor,
}

impl EvaluationCategory {
    /// Wire-format name (`"good"` / `"partial"` / `"poor"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationCategory::Good => "good",
            EvaluationCategory::Partial => "partial",
            EvaluationCategory::Poor => "poor",
        }
    }

    /// Parse a wire-format name; anything unrecognised is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "good" => Some(EvaluationCategory::Good),
            "partial" => Some(EvaluationCategory::Partial),
            "poor" => Some(EvaluationCategory::Poor),
            _ => None,
        }
    }
}

/// One evaluation of a spoken answer.  Produced exactly once per answer by
/// either a provider adapter or the local heuristic; immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub category: EvaluationCategory,
    /// Feedback in English.
    pub feedback: String,
    /// A good example answer in Chinese.
    pub example: String,
    /// Overall score, 1–10.
    pub score: u8,
    /// Grammar score, 1–10.
    pub grammar_score: u8,
    /// Pronunciation tips, possibly empty.
    pub pronunciation_tips: String,
}

// ---------------------------------------------------------------------------
// Evaluator trait
// ---------------------------------------------------------------------------

/// Async adapter contract for the evaluation provider.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn Evaluator>`.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Short provider name used in errors and notices.
    fn name(&self) -> &'static str;

    /// `true` iff the credential is present and not the placeholder sentinel.
    fn is_ready(&self) -> bool;

    /// Evaluate `answer` against `question`.  Exactly one request, no retry.
    async fn evaluate(&self, question: &str, answer: &str) -> Result<Evaluation, ProviderError>;

    /// Translate Chinese `text` to English (fallback translation capability).
    async fn translate_to_english(&self, text: &str) -> Result<String, ProviderError>;

    /// Best-effort startup diagnostic: one real request, `false` on any
    /// failure.  Never returns an error.
    async fn test_connection(&self) -> bool;
}

// ---------------------------------------------------------------------------
// OpenAiEvaluator
// ---------------------------------------------------------------------------

/// Calls the OpenAI `/v1/chat/completions` endpoint with `gpt-4`.
pub struct OpenAiEvaluator {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiEvaluator {
    const PROVIDER: &'static str = "OpenAI";

    /// Build an evaluator from application config.  The HTTP client carries
    /// the per-request timeout from `speech.request_timeout_secs`.
    pub fn from_config(config: &AppConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(
                config.speech.request_timeout_secs,
            ))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_key: config.credentials.openai_api_key.clone(),
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4".into(),
        }
    }

    /// Override the endpoint base URL (useful for tests against a local
    /// stub server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Issue one chat-completions request and return the message content.
    async fn chat(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, ProviderError> {
        if !self.is_ready() {
            return Err(ProviderError::NotConfigured {
                provider: Self::PROVIDER,
            });
        }

        let url = format!("{}/chat/completions", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user",   "content": user   }
            ],
            "temperature": temperature,
            "max_tokens": max_tokens
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
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

        json["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or(ProviderError::Parse {
                provider: Self::PROVIDER,
                reason: "response contained no message content".into(),
            })
    }
}

#[async_trait]
impl Evaluator for OpenAiEvaluator {
    fn name(&self) -> &'static str {
        Self::PROVIDER
    }

    fn is_ready(&self) -> bool {
        !self.api_key.is_empty() && self.api_key != OPENAI_KEY_SENTINEL
    }

    async fn evaluate(&self, question: &str, answer: &str) -> Result<Evaluation, ProviderError> {
        let user = prompt::evaluation_prompt(question, answer);
        let content = self
            .chat(prompt::EVALUATION_SYSTEM, &user, 0.7, 500)
            .await?;
        // Malformed content degrades to defaults inside the parser; it is
        // never an error at this level.
        Ok(parse_evaluation(&content))
    }

    async fn translate_to_english(&self, text: &str) -> Result<String, ProviderError> {
        let user = prompt::translation_prompt(text);
        self.chat(prompt::TRANSLATION_SYSTEM, &user, 0.3, 100).await
    }

    async fn test_connection(&self) -> bool {
        match self.evaluate("你叫什么名字？", "我叫小明。").await {
            Ok(_) => {
                log::info!("OpenAI connection test passed");
                true
            }
            Err(e) => {
                log::warn!("OpenAI connection test failed: {e}");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// MockEvaluator  (test-only)
// ---------------------------------------------------------------------------

/// Test double returning pre-configured evaluation/translation results.
#[cfg(test)]
pub struct MockEvaluator {
    ready: bool,
    evaluation: Result<Evaluation, ProviderError>,
    translation: Result<String, ProviderError>,
    pub calls: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockEvaluator {
    pub fn ok(evaluation: Evaluation) -> Self {
        Self {
            ready: true,
            evaluation: Ok(evaluation),
            translation: Ok("What is your name?".into()),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            ready: true,
            evaluation: Err(ProviderError::Timeout { provider: "OpenAI" }),
            translation: Err(ProviderError::Timeout { provider: "OpenAI" }),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn not_ready() -> Self {
        Self {
            ready: false,
            evaluation: Err(ProviderError::NotConfigured { provider: "OpenAI" }),
            translation: Err(ProviderError::NotConfigured { provider: "OpenAI" }),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn with_translation(mut self, translation: impl Into<String>) -> Self {
        self.translation = Ok(translation.into());
        self
    }
}

#[cfg(test)]
#[async_trait]
impl Evaluator for MockEvaluator {
    fn name(&self) -> &'static str {
        "OpenAI"
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    async fn evaluate(&self, question: &str, _answer: &str) -> Result<Evaluation, ProviderError> {
        self.calls.lock().unwrap().push(format!("evaluate:{question}"));
        self.evaluation.clone()
    }

    async fn translate_to_english(&self, text: &str) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(format!("translate:{text}"));
        self.translation.clone()
    }

    async fn test_connection(&self) -> bool {
        self.evaluation.is_ok()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
