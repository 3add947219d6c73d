//! Session state machine and shared session state.
//!
//! [`SessionPhase`] drives the controller's state machine; [`SessionState`]
//! is the single source of truth the presentation boundary renders from.
//! [`SharedState`] (`Arc<Mutex<SessionState>>`) is cheap to clone and safe
//! to share; the controller is the only writer.

use std::sync::{Arc, Mutex};

use crate::providers::Evaluation;

// ---------------------------------------------------------------------------
// SessionPhase
// ---------------------------------------------------------------------------

/// Phases of one practice session.
///
/// ```text
/// Setup ──start (≥1 prompt, shuffled once)──▶ Presenting
/// Presenting ──begin listening──▶ Listening
///            (replay / translate stay in Presenting)
/// Listening ──transcript──▶ Processing
///           ──capture error──▶ Presenting  (with a notice)
/// Processing ──evaluation (remote or heuristic)──▶ Reviewing
/// Reviewing ──retry──▶ Listening   (same prompt, answer cleared)
///           ──continue──▶ Presenting (next prompt) | Complete (last prompt)
/// Complete ──fixed delay──▶ Setup
/// ```
///
/// Phases are mutually exclusive, so "listening" and "processing" can never
/// both hold for a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Accepting raw prompt input; no session is running.
    #[default]
    Setup,

    /// Showing the current prompt; narration may be playing.
    Presenting,

    /// The capture device is listening for a spoken answer.
    Listening,

    /// A transcript is being evaluated.
    Processing,

    /// An evaluation is displayed; retry and continue are available.
    Reviewing,

    /// All prompts done; auto-resets to `Setup` after a fixed delay.
    Complete,
}

impl SessionPhase {
    /// `true` while a capture or evaluation is in flight.  The presentation
    /// boundary disables the answer controls while busy.
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionPhase::Listening | SessionPhase::Processing)
    }

    /// Short human-readable label for status display.
    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::Setup => "Setup",
            SessionPhase::Presenting => "Presenting",
            SessionPhase::Listening => "Listening",
            SessionPhase::Processing => "Processing",
            SessionPhase::Reviewing => "Reviewing",
            SessionPhase::Complete => "Complete",
        }
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Everything the presentation boundary needs to render one frame of the
/// session.  Owned exclusively by the session controller.
#[derive(Debug, Default)]
pub struct SessionState {
    /// Shuffled prompt list; empty only in `Setup`.
    pub prompts: Vec<String>,

    /// Index of the current prompt, in `[0, prompts.len())` while a session
    /// is running.
    pub current: usize,

    /// Current phase of the state machine.
    pub phase: SessionPhase,

    /// The most recent captured answer, cleared on advance and retry.
    pub transcript: Option<String>,

    /// Evaluation of the current answer, cleared on advance and retry.
    pub evaluation: Option<Evaluation>,

    /// English translation of the current prompt, if requested.
    pub translation: Option<String>,

    /// Most recent transient notice; the controller clears it after a
    /// fixed dismissal delay.
    pub notice: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The prompt currently being practiced, when a session is running.
    pub fn current_prompt(&self) -> Option<&str> {
        self.prompts.get(self.current).map(String::as_str)
    }

    /// `(current number, total)` for progress display — 1-based.
    pub fn progress(&self) -> (usize, usize) {
        (self.current + 1, self.prompts.len())
    }
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`SessionState`].  Lock for short critical
/// sections only; never hold the lock across an `.await` point.
pub type SharedState = Arc<Mutex<SessionState>>;

/// Construct a new [`SharedState`] in the `Setup` phase.
pub fn new_shared_state() -> SharedState {
    Arc::new(Mutex::new(SessionState::new()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
