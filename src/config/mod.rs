//! Configuration module for Chinese Question Practice.
//!
//! Provides `AppConfig` (top-level settings), `AppPaths` for cross-platform
//! data directories, TOML persistence via `AppConfig::load` /
//! `AppConfig::save`, and the environment-variable overlay for API
//! credentials (`AppConfig::apply_env`).

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, Credentials, SpeechConfig};
