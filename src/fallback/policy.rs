//! Fallback policy — ordered provider attempts with local degradation.
//!
//! For each operation kind (narrate, evaluate, translate) the policy tries
//! the configured adapters in priority order and finishes with a
//! deterministic local fallback.  Each user action gets at most one remote
//! attempt per adapter; adapter errors never propagate past this boundary —
//! they become transient notices on the returned [`Outcome`].

use std::sync::Arc;

use crate::config::{AppConfig, SpeechConfig};
use crate::fallback::{heuristic, phrasebook};
use crate::providers::{
    ElevenLabsTts, Evaluation, Evaluator, GoogleTranslator, OpenAiEvaluator, Translator,
    TtsProvider, VoiceParams,
};
use crate::speech::{AudioSink, SpeechPlayback};

/// Notice shown when remote narration fails and local playback takes over.
pub const TTS_FAILED_NOTICE: &str = "ElevenLabs TTS failed, using local playback instead.";

/// Notice shown when local playback itself is unavailable.
pub const PLAYBACK_UNAVAILABLE_NOTICE: &str = "Speech synthesis is not available.";

/// Notice shown when remote evaluation fails and the heuristic takes over.
pub const EVALUATION_FAILED_NOTICE: &str = "AI evaluation failed, using fallback evaluation.";

/// Notice shown when a remote translation attempt fails.
pub const TRANSLATION_FAILED_NOTICE: &str = "Translation failed, using fallback translation.";

/// Locale passed to the local playback device.
const NARRATION_LANG: &str = "zh-CN";

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Which tier produced an outcome's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A remote provider, identified by its adapter name.
    Remote(&'static str),
    /// The local heuristic / phrasebook / playback device.
    Local,
}

/// Result of one fallback-mediated operation.  Always carries a value —
/// exhausting every remote tier degrades to the local fallback rather than
/// failing — plus any transient notices collected along the way.
#[derive(Debug)]
pub struct Outcome<T> {
    pub value: T,
    pub source: Source,
    pub notices: Vec<String>,
}

impl<T> Outcome<T> {
    fn remote(name: &'static str, value: T, notices: Vec<String>) -> Self {
        Self {
            value,
            source: Source::Remote(name),
            notices,
        }
    }

    fn local(value: T, notices: Vec<String>) -> Self {
        Self {
            value,
            source: Source::Local,
            notices,
        }
    }
}

// ---------------------------------------------------------------------------
// ProviderRegistry
// ---------------------------------------------------------------------------

/// Explicit registry of the adapters available to a session, built once at
/// startup.  Adapters are always constructed; readiness (credential
/// presence) is checked per operation.
pub struct ProviderRegistry {
    pub tts: Arc<dyn TtsProvider>,
    pub evaluator: Arc<dyn Evaluator>,
    pub translator: Arc<dyn Translator>,
}

impl ProviderRegistry {
    /// Build the production adapters from application config.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            tts: Arc::new(ElevenLabsTts::from_config(config)),
            evaluator: Arc::new(OpenAiEvaluator::from_config(config)),
            translator: Arc::new(GoogleTranslator::from_config(config)),
        }
    }
}

// ---------------------------------------------------------------------------
// FallbackPolicy
// ---------------------------------------------------------------------------

/// Selects and invokes adapters in priority order for each provider
/// touchpoint of the session.
pub struct FallbackPolicy {
    registry: ProviderRegistry,
    playback: Arc<dyn SpeechPlayback>,
    sink: Arc<dyn AudioSink>,
    speech: SpeechConfig,
}

impl FallbackPolicy {
    pub fn new(
        registry: ProviderRegistry,
        playback: Arc<dyn SpeechPlayback>,
        sink: Arc<dyn AudioSink>,
        speech: SpeechConfig,
    ) -> Self {
        Self {
            registry,
            playback,
            sink,
            speech,
        }
    }

    // -----------------------------------------------------------------------
    // Narration
    // -----------------------------------------------------------------------

    /// Narrate `text`: remote TTS (when ready and enabled) → local playback.
    ///
    /// A remote failure at request *or* playback time falls through to the
    /// local device with a non-fatal notice.
    pub async fn narrate(&self, text: &str) -> Outcome<()> {
        let mut notices = Vec::new();

        if self.speech.use_eleven_labs && self.registry.tts.is_ready() {
            let params = VoiceParams {
                stability: self.speech.stability,
                similarity_boost: self.speech.similarity_boost,
            };
            match self.registry.tts.synthesize(text, params).await {
                Ok(audio) => match self.sink.play(&audio).await {
                    Ok(()) => {
                        return Outcome::remote(self.registry.tts.name(), (), notices);
                    }
                    Err(e) => {
                        log::warn!("remote narration playback failed: {e}");
                        notices.push(TTS_FAILED_NOTICE.into());
                    }
                },
                Err(e) => {
                    log::warn!("remote narration failed: {e}");
                    notices.push(TTS_FAILED_NOTICE.into());
                }
            }
        }

        if let Err(e) = self
            .playback
            .speak(text, NARRATION_LANG, self.speech.rate)
            .await
        {
            log::warn!("local playback failed: {e}");
            notices.push(PLAYBACK_UNAVAILABLE_NOTICE.into());
        }
        Outcome::local((), notices)
    }

    // -----------------------------------------------------------------------
    // Evaluation
    // -----------------------------------------------------------------------

    /// Evaluate an answer: evaluation provider (if ready) → local heuristic.
    ///
    /// When no provider is ready the heuristic runs directly, with no
    /// network call and no notice.
    pub async fn evaluate(&self, question: &str, answer: &str) -> Outcome<Evaluation> {
        if self.registry.evaluator.is_ready() {
            match self.registry.evaluator.evaluate(question, answer).await {
                Ok(evaluation) => {
                    return Outcome::remote(self.registry.evaluator.name(), evaluation, Vec::new());
                }
                Err(e) => {
                    log::warn!("remote evaluation failed: {e}");
                    return Outcome::local(
                        heuristic::evaluate(question, answer),
                        vec![EVALUATION_FAILED_NOTICE.into()],
                    );
                }
            }
        }

        log::debug!("evaluation provider not ready, using local heuristic");
        Outcome::local(heuristic::evaluate(question, answer), Vec::new())
    }

    // -----------------------------------------------------------------------
    // Translation
    // -----------------------------------------------------------------------

    /// Translate `text`: primary translator (if ready) → evaluation
    /// provider's translation capability (if ready) → local phrasebook.
    pub async fn translate(&self, text: &str) -> Outcome<String> {
        let mut notices = Vec::new();

        if self.registry.translator.is_ready() {
            match self.registry.translator.translate_to_english(text).await {
                Ok(translation) => {
                    return Outcome::remote(self.registry.translator.name(), translation, notices);
                }
                Err(e) => {
                    log::warn!("primary translation failed: {e}");
                    notices.push(TRANSLATION_FAILED_NOTICE.into());
                }
            }
        }

        if self.registry.evaluator.is_ready() {
            match self.registry.evaluator.translate_to_english(text).await {
                Ok(translation) => {
                    return Outcome::remote(self.registry.evaluator.name(), translation, notices);
                }
                Err(e) => {
                    log::warn!("fallback translation failed: {e}");
                    if !notices.iter().any(|n| n == TRANSLATION_FAILED_NOTICE) {
                        notices.push(TRANSLATION_FAILED_NOTICE.into());
                    }
                }
            }
        }

        Outcome::local(phrasebook::translate(text).to_string(), notices)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
