//! Provider adapters for Chinese Question Practice.
//!
//! One adapter per external service, each normalising its provider's wire
//! format into a common result contract:
//! * [`TtsProvider`] / [`ElevenLabsTts`] — remote narration synthesis.
//! * [`Evaluator`] / [`OpenAiEvaluator`] — LLM answer evaluation (plus a
//!   translation capability used as a fallback tier).
//! * [`Translator`] / [`GoogleTranslator`] — primary translation.
//! * [`parse_evaluation`] — defensive parsing of the evaluation response.
//! * [`ProviderError`] — shared adapter error taxonomy.
//!
//! Adapters never retry and never validate reachability at construction;
//! `is_ready()` only checks that the credential is present and not a known
//! placeholder sentinel.

pub mod error;
pub mod evaluator;
pub mod parse;
pub mod prompt;
pub mod translator;
pub mod tts;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use error::ProviderError;
pub use evaluator::{
    Evaluation, EvaluationCategory, Evaluator, OpenAiEvaluator, OPENAI_KEY_SENTINEL,
};
pub use parse::parse_evaluation;
pub use translator::{GoogleTranslator, Translator, GOOGLE_KEY_SENTINEL};
pub use tts::{ElevenLabsTts, TtsProvider, VoiceParams};
