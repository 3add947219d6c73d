//! Chinese Question Practice — interactive spoken-answer drilling.
//!
//! The crate sequences a practice session over a shuffled list of Chinese
//! question prompts: each prompt is narrated, a spoken answer is captured,
//! and the answer is evaluated by an LLM provider.  Every external provider
//! (ElevenLabs TTS, OpenAI evaluation/translation, Google Cloud Translation)
//! sits behind an adapter trait, and a fallback policy degrades to local
//! heuristics whenever a provider is unconfigured or fails mid-flight — the
//! session never blocks on a provider error.
//!
//! # Architecture
//!
//! ```text
//! SessionEvent (mpsc)
//!        │
//!        ▼
//! SessionController::run()  ← async tokio task
//!        │
//!        ├─ Start    → parse prompts, shuffle, narrate first prompt
//!        ├─ Listen   → SpeechCapture::listen → FallbackPolicy::evaluate
//!        ├─ Continue → advance index (or Complete → auto-reset to Setup)
//!        └─ every provider touchpoint goes through FallbackPolicy
//!
//! SharedState (Arc<Mutex<SessionState>>) ←── rendered via PracticeView
//! ```

pub mod config;
pub mod fallback;
pub mod providers;
pub mod session;
pub mod speech;
pub mod view;
