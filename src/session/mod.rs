//! Practice session: prompt set, state machine, and the controller that
//! drives one session at a time.

pub mod controller;
pub mod prompts;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use controller::{
    SessionController, SessionEvent, COMPLETE_RESET_DELAY, COMPLETION_NOTICE,
};
pub use prompts::{NoPrompts, PromptSet};
pub use state::{new_shared_state, SessionPhase, SessionState, SharedState};
