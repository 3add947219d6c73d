//! Fallback decision logic for Chinese Question Practice.
//!
//! * [`FallbackPolicy`] — ordered provider attempts per operation kind.
//! * [`heuristic`] — deterministic local answer evaluation.
//! * [`phrasebook`] — static local translation table.

pub mod heuristic;
pub mod phrasebook;
pub mod policy;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use policy::{
    FallbackPolicy, Outcome, ProviderRegistry, Source, EVALUATION_FAILED_NOTICE,
    PLAYBACK_UNAVAILABLE_NOTICE, TRANSLATION_FAILED_NOTICE, TTS_FAILED_NOTICE,
};
