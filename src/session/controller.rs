//! Session controller — drives the present → listen → evaluate → advance
//! cycle.
//!
//! [`SessionController`] owns the [`SharedState`] and responds to
//! [`SessionEvent`]s received over a `tokio::sync::mpsc` channel.  Every
//! provider touchpoint goes through the [`FallbackPolicy`], so no provider
//! failure can stall the session; the only hard stop is starting with zero
//! prompts.
//!
//! # Cycle
//!
//! ```text
//! SessionEvent::Start { raw }
//!   └─▶ parse prompts → shuffle once → Presenting → narrate
//!
//! SessionEvent::BeginListening
//!   └─▶ Listening → capture.listen()
//!         ├─ Ok(transcript)  → Processing → policy.evaluate → Reviewing
//!         └─ Err(code)       → notice(per-code message) → Presenting
//!
//! SessionEvent::Retry     → clear answer, listen again (same index)
//! SessionEvent::Continue  → next prompt | Complete → (3 s) → Setup
//! ```
//!
//! Concurrency is strictly sequential: the loop awaits at most one capture
//! or provider operation at a time, so narration for prompt N+1 can never
//! start before prompt N's review completed.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::fallback::FallbackPolicy;
use crate::session::prompts::PromptSet;
use crate::session::state::{SessionPhase, SessionState, SharedState};
use crate::speech::SpeechCapture;
use crate::view::{PracticeView, NOTICE_DISMISS};

/// Notice shown when the last prompt's review is continued past.
pub const COMPLETION_NOTICE: &str =
    "Congratulations! You have completed all practice questions.";

/// Delay between showing the completion notice and resetting to `Setup`.
pub const COMPLETE_RESET_DELAY: Duration = Duration::from_secs(3);

// ---------------------------------------------------------------------------
// SessionEvent
// ---------------------------------------------------------------------------

/// User-originated events the controller responds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Start a session from raw multi-line prompt input.
    Start { raw: String },
    /// Replay narration of the current prompt.
    Replay,
    /// Translate the current prompt.
    Translate,
    /// Begin a listening attempt for the current prompt.
    BeginListening,
    /// Ask the capture device to finalise the current attempt.
    StopListening,
    /// Discard the current answer and listen again (same prompt).
    Retry,
    /// Advance to the next prompt, or complete the session.
    Continue,
    /// Abandon the session and return to `Setup`.
    Reset,
}

// ---------------------------------------------------------------------------
// SessionController
// ---------------------------------------------------------------------------

/// Drives one practice session at a time.
///
/// Create with [`SessionController::new`], then call [`run`](Self::run)
/// inside a tokio task.
pub struct SessionController {
    state: SharedState,
    policy: FallbackPolicy,
    capture: Arc<dyn SpeechCapture>,
    view: Arc<dyn PracticeView>,
}

impl SessionController {
    /// Create a new controller.
    ///
    /// # Arguments
    ///
    /// * `state`   — shared session state (also read by the frontend).
    /// * `policy`  — fallback policy wrapping the provider registry.
    /// * `capture` — speech-capture device.
    /// * `view`    — presentation boundary.
    pub fn new(
        state: SharedState,
        policy: FallbackPolicy,
        capture: Arc<dyn SpeechCapture>,
        view: Arc<dyn PracticeView>,
    ) -> Self {
        Self {
            state,
            policy,
            capture,
            view,
        }
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run the controller until `event_rx` is closed.
    pub async fn run(self, mut event_rx: mpsc::Receiver<SessionEvent>) {
        while let Some(event) = event_rx.recv().await {
            log::debug!("session: handling {event:?}");
            match event {
                SessionEvent::Start { raw } => self.handle_start(&raw).await,
                SessionEvent::Replay => self.handle_replay().await,
                SessionEvent::Translate => self.handle_translate().await,
                SessionEvent::BeginListening => self.handle_listen().await,
                SessionEvent::StopListening => self.capture.stop(),
                SessionEvent::Retry => self.handle_retry().await,
                SessionEvent::Continue => self.handle_continue().await,
                SessionEvent::Reset => self.handle_reset(),
            }
        }
        log::info!("session: event channel closed, controller shutting down");
    }

    // -----------------------------------------------------------------------
    // Event handlers
    // -----------------------------------------------------------------------

    /// Parse and shuffle the prompt list, then present the first prompt.
    async fn handle_start(&self, raw: &str) {
        let mut prompts = match PromptSet::parse(raw) {
            Ok(prompts) => prompts,
            Err(e) => {
                self.notify(&e.to_string());
                return;
            }
        };
        prompts.shuffle(&mut rand::thread_rng());
        log::info!("session: starting with {} prompts", prompts.len());

        {
            let mut st = self.state.lock().unwrap();
            *st = SessionState {
                prompts: prompts.into_vec(),
                phase: SessionPhase::Presenting,
                ..SessionState::default()
            };
        }
        self.present_current().await;
    }

    async fn handle_replay(&self) {
        let Some(prompt) = self.current_prompt_if_running() else {
            return;
        };
        let outcome = self.policy.narrate(&prompt).await;
        self.surface(&outcome.notices);
    }

    async fn handle_translate(&self) {
        let Some(prompt) = self.current_prompt_if_running() else {
            return;
        };
        let outcome = self.policy.translate(&prompt).await;
        self.surface(&outcome.notices);
        {
            let mut st = self.state.lock().unwrap();
            st.translation = Some(outcome.value);
        }
        self.render();
    }

    /// One full listening attempt: capture → evaluate → review.
    async fn handle_listen(&self) {
        {
            let mut st = self.state.lock().unwrap();
            if !matches!(
                st.phase,
                SessionPhase::Presenting | SessionPhase::Reviewing
            ) {
                return;
            }
            st.phase = SessionPhase::Listening;
            st.transcript = None;
            st.evaluation = None;
        }
        self.render();

        match self.capture.listen().await {
            Ok(transcript) => {
                let question = {
                    let mut st = self.state.lock().unwrap();
                    st.phase = SessionPhase::Processing;
                    st.transcript = Some(transcript.clone());
                    st.current_prompt().unwrap_or_default().to_string()
                };
                self.render();

                let outcome = self.policy.evaluate(&question, &transcript).await;
                self.surface(&outcome.notices);
                {
                    let mut st = self.state.lock().unwrap();
                    st.evaluation = Some(outcome.value);
                    st.phase = SessionPhase::Reviewing;
                }
                self.render();
            }
            Err(e) => {
                log::warn!("session: capture failed: {e}");
                self.notify(&e.user_message());
                {
                    let mut st = self.state.lock().unwrap();
                    st.phase = SessionPhase::Presenting;
                }
                self.render();
            }
        }
    }

    /// Clear the displayed answer and listen again for the same prompt.
    async fn handle_retry(&self) {
        {
            let mut st = self.state.lock().unwrap();
            if st.phase != SessionPhase::Reviewing {
                return;
            }
            st.transcript = None;
            st.evaluation = None;
            st.phase = SessionPhase::Presenting;
        }
        self.handle_listen().await;
    }

    /// Advance to the next prompt, or complete and auto-reset.
    ///
    /// Accepted from `Presenting` as well as `Reviewing` so a prompt can be
    /// skipped without answering it.
    async fn handle_continue(&self) {
        let completed = {
            let mut st = self.state.lock().unwrap();
            if !matches!(
                st.phase,
                SessionPhase::Presenting | SessionPhase::Reviewing
            ) {
                return;
            }
            if st.current + 1 < st.prompts.len() {
                st.current += 1;
                st.transcript = None;
                st.evaluation = None;
                st.phase = SessionPhase::Presenting;
                false
            } else {
                st.phase = SessionPhase::Complete;
                true
            }
        };

        if completed {
            self.notify(COMPLETION_NOTICE);
            self.render();
            tokio::time::sleep(COMPLETE_RESET_DELAY).await;
            self.handle_reset();
        } else {
            self.present_current().await;
        }
    }

    fn handle_reset(&self) {
        {
            let mut st = self.state.lock().unwrap();
            *st = SessionState::new();
        }
        self.render();
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Display the current prompt (clearing any stale translation) and
    /// narrate it.  Narration failures degrade inside the policy.
    async fn present_current(&self) {
        let prompt = {
            let mut st = self.state.lock().unwrap();
            st.translation = None;
            match st.current_prompt() {
                Some(p) => p.to_string(),
                None => return,
            }
        };
        self.render();

        let outcome = self.policy.narrate(&prompt).await;
        self.surface(&outcome.notices);
    }

    /// The current prompt, when a session is past `Setup` and not busy.
    fn current_prompt_if_running(&self) -> Option<String> {
        let st = self.state.lock().unwrap();
        if st.phase == SessionPhase::Setup || st.phase == SessionPhase::Complete {
            return None;
        }
        st.current_prompt().map(str::to_string)
    }

    fn render(&self) {
        let st = self.state.lock().unwrap();
        self.view.render(&st);
    }

    /// Set a transient notice and schedule its auto-dismissal.  A newer
    /// notice supersedes the pending dismissal of an older one.
    fn notify(&self, message: &str) {
        {
            let mut st = self.state.lock().unwrap();
            st.notice = Some(message.to_string());
        }
        self.view.notice(message);

        let state = Arc::clone(&self.state);
        let message = message.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(NOTICE_DISMISS).await;
            let mut st = state.lock().unwrap();
            if st.notice.as_deref() == Some(message.as_str()) {
                st.notice = None;
            }
        });
    }

    fn surface(&self, notices: &[String]) {
        for notice in notices {
            self.notify(notice);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpeechConfig;
    use crate::fallback::{ProviderRegistry, EVALUATION_FAILED_NOTICE};
    use crate::providers::evaluator::MockEvaluator;
    use crate::providers::translator::MockTranslator;
    use crate::providers::tts::MockTts;
    use crate::providers::{Evaluation, EvaluationCategory};
    use crate::session::state::new_shared_state;
    use crate::speech::{CaptureError, MockCapture, MockPlayback, MockSink};
    use crate::view::MockView;

    fn remote_evaluation() -> Evaluation {
        Evaluation {
            category: EvaluationCategory::Good,
            feedback: "Remote feedback.".into(),
            example: "我叫张三。".into(),
            score: 9,
            grammar_score: 9,
            pronunciation_tips: String::new(),
        }
    }

    struct Harness {
        state: SharedState,
        view: Arc<MockView>,
        playback: Arc<MockPlayback>,
        tx: mpsc::Sender<SessionEvent>,
        rx: mpsc::Receiver<SessionEvent>,
        controller: SessionController,
    }

    /// Build a controller with local-only providers and the given capture
    /// device.
    fn harness(capture: MockCapture, evaluator: MockEvaluator) -> Harness {
        let state = new_shared_state();
        let view = Arc::new(MockView::new());
        let playback = Arc::new(MockPlayback::ok());

        let registry = ProviderRegistry {
            tts: Arc::new(MockTts::not_ready()),
            evaluator: Arc::new(evaluator),
            translator: Arc::new(MockTranslator::not_ready()),
        };
        let policy = FallbackPolicy::new(
            registry,
            playback.clone(),
            Arc::new(MockSink::ok()),
            SpeechConfig::default(),
        );
        let controller = SessionController::new(
            Arc::clone(&state),
            policy,
            Arc::new(capture),
            view.clone(),
        );
        let (tx, rx) = mpsc::channel(16);

        Harness {
            state,
            view,
            playback,
            tx,
            rx,
            controller,
        }
    }

    async fn drive(h: Harness, events: Vec<SessionEvent>) -> (SharedState, Arc<MockView>, Arc<MockPlayback>) {
        for event in events {
            h.tx.send(event).await.unwrap();
        }
        drop(h.tx);
        h.controller.run(h.rx).await;
        (h.state, h.view, h.playback)
    }

    // ---- start ----

    #[tokio::test]
    async fn start_with_no_prompts_stays_in_setup() {
        let h = harness(MockCapture::ok("我叫小明"), MockEvaluator::not_ready());
        let (state, view, _) = drive(
            h,
            vec![SessionEvent::Start {
                raw: "   \n \n".into(),
            }],
        )
        .await;

        let st = state.lock().unwrap();
        assert_eq!(st.phase, SessionPhase::Setup);
        assert!(st.prompts.is_empty());
        assert_eq!(
            view.notices.lock().unwrap().as_slice(),
            ["Please enter at least one question first."]
        );
    }

    #[tokio::test]
    async fn start_shuffles_into_a_permutation_and_narrates() {
        let h = harness(MockCapture::ok("我叫小明"), MockEvaluator::not_ready());
        let raw = "一\n二\n三\n四\n五";
        let (state, _, playback) = drive(h, vec![SessionEvent::Start { raw: raw.into() }]).await;

        let st = state.lock().unwrap();
        assert_eq!(st.phase, SessionPhase::Presenting);
        assert_eq!(st.current, 0);

        let mut got = st.prompts.clone();
        got.sort();
        assert_eq!(got, ["一", "三", "二", "五", "四"]);

        // The first (shuffled) prompt was narrated via local playback.
        let spoken = playback.spoken.lock().unwrap();
        assert_eq!(spoken.as_slice(), [st.prompts[0].clone()]);
    }

    // ---- listen / evaluate ----

    #[tokio::test]
    async fn successful_capture_reaches_reviewing_with_heuristic_evaluation() {
        let h = harness(MockCapture::ok("我叫小明"), MockEvaluator::not_ready());
        let (state, view, _) = drive(
            h,
            vec![
                SessionEvent::Start {
                    raw: "你叫什么名字？".into(),
                },
                SessionEvent::BeginListening,
            ],
        )
        .await;

        let st = state.lock().unwrap();
        assert_eq!(st.phase, SessionPhase::Reviewing);
        assert_eq!(st.current, 0);
        assert_eq!(st.transcript.as_deref(), Some("我叫小明"));

        let eval = st.evaluation.as_ref().expect("evaluation present");
        assert_eq!(eval.category, EvaluationCategory::Poor);
        assert_eq!(eval.score, 4);
        // No provider was ready, so no fallback notice is surfaced.
        assert!(view.notices.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn remote_evaluation_result_is_displayed() {
        let h = harness(
            MockCapture::ok("我叫小明"),
            MockEvaluator::ok(remote_evaluation()),
        );
        let (state, _, _) = drive(
            h,
            vec![
                SessionEvent::Start {
                    raw: "你叫什么名字？".into(),
                },
                SessionEvent::BeginListening,
            ],
        )
        .await;

        let st = state.lock().unwrap();
        let eval = st.evaluation.as_ref().unwrap();
        assert_eq!(eval.feedback, "Remote feedback.");
        assert_eq!(eval.score, 9);
    }

    /// A mid-flight evaluation failure degrades to the heuristic with a
    /// notice and still reaches `Reviewing`.
    #[tokio::test]
    async fn evaluation_failure_degrades_and_keeps_session_moving() {
        let h = harness(MockCapture::ok("我叫小明"), MockEvaluator::failing());
        let (state, view, _) = drive(
            h,
            vec![
                SessionEvent::Start {
                    raw: "你叫什么名字？".into(),
                },
                SessionEvent::BeginListening,
            ],
        )
        .await;

        let st = state.lock().unwrap();
        assert_eq!(st.phase, SessionPhase::Reviewing);
        assert_eq!(st.evaluation.as_ref().unwrap().score, 4);
        assert!(view
            .notices
            .lock()
            .unwrap()
            .contains(&EVALUATION_FAILED_NOTICE.to_string()));
    }

    #[tokio::test]
    async fn capture_error_returns_to_presenting_with_message() {
        let h = harness(
            MockCapture::err(CaptureError::NoSpeech),
            MockEvaluator::not_ready(),
        );
        let (state, view, _) = drive(
            h,
            vec![
                SessionEvent::Start {
                    raw: "你叫什么名字？".into(),
                },
                SessionEvent::BeginListening,
            ],
        )
        .await;

        let st = state.lock().unwrap();
        assert_eq!(st.phase, SessionPhase::Presenting);
        assert!(st.evaluation.is_none());
        assert!(view
            .notices
            .lock()
            .unwrap()
            .contains(&"No speech detected, please try again.".to_string()));
    }

    /// Notices are transient: the state copy clears after the fixed
    /// dismissal delay.
    #[tokio::test(start_paused = true)]
    async fn notice_auto_dismisses_after_fixed_delay() {
        let h = harness(
            MockCapture::err(CaptureError::NoSpeech),
            MockEvaluator::not_ready(),
        );
        let (state, _, _) = drive(
            h,
            vec![
                SessionEvent::Start {
                    raw: "你叫什么名字？".into(),
                },
                SessionEvent::BeginListening,
            ],
        )
        .await;

        assert!(state.lock().unwrap().notice.is_some());

        tokio::time::sleep(NOTICE_DISMISS + Duration::from_millis(1)).await;
        assert!(state.lock().unwrap().notice.is_none());
    }

    // ---- retry ----

    /// Retry clears the displayed answer and listens again at the same index.
    #[tokio::test]
    async fn retry_keeps_index_and_reevaluates() {
        let h = harness(MockCapture::ok("我叫小明"), MockEvaluator::not_ready());
        let (state, _, _) = drive(
            h,
            vec![
                SessionEvent::Start {
                    raw: "你叫什么名字？\n你住在哪里？".into(),
                },
                SessionEvent::BeginListening,
                SessionEvent::Retry,
            ],
        )
        .await;

        let st = state.lock().unwrap();
        assert_eq!(st.current, 0);
        assert_eq!(st.phase, SessionPhase::Reviewing);
        assert!(st.evaluation.is_some());
        assert_eq!(st.transcript.as_deref(), Some("我叫小明"));
    }

    #[tokio::test]
    async fn retry_outside_reviewing_is_ignored() {
        let h = harness(MockCapture::ok("我叫小明"), MockEvaluator::not_ready());
        let (state, _, _) = drive(
            h,
            vec![
                SessionEvent::Start {
                    raw: "你叫什么名字？".into(),
                },
                SessionEvent::Retry,
            ],
        )
        .await;

        let st = state.lock().unwrap();
        assert_eq!(st.phase, SessionPhase::Presenting);
        assert!(st.evaluation.is_none());
    }

    // ---- continue / complete ----

    /// `current` increases by exactly 1 per continue until the last prompt.
    #[tokio::test]
    async fn continue_advances_index_and_clears_answer() {
        let h = harness(MockCapture::ok("我叫小明"), MockEvaluator::not_ready());
        let (state, _, _) = drive(
            h,
            vec![
                SessionEvent::Start {
                    raw: "一\n二\n三".into(),
                },
                SessionEvent::BeginListening,
                SessionEvent::Continue,
            ],
        )
        .await;

        let st = state.lock().unwrap();
        assert_eq!(st.current, 1);
        assert_eq!(st.phase, SessionPhase::Presenting);
        assert!(st.transcript.is_none());
        assert!(st.evaluation.is_none());
        assert!(st.translation.is_none());
    }

    /// Continuing past the last prompt completes and auto-resets to Setup.
    #[tokio::test(start_paused = true)]
    async fn continue_past_last_prompt_completes_and_resets() {
        let h = harness(MockCapture::ok("我叫小明"), MockEvaluator::not_ready());
        let (state, view, _) = drive(
            h,
            vec![
                SessionEvent::Start {
                    raw: "你叫什么名字？".into(),
                },
                SessionEvent::BeginListening,
                SessionEvent::Continue,
            ],
        )
        .await;

        let st = state.lock().unwrap();
        assert_eq!(st.phase, SessionPhase::Setup);
        assert!(st.prompts.is_empty());
        assert!(view
            .notices
            .lock()
            .unwrap()
            .contains(&COMPLETION_NOTICE.to_string()));
        // Complete was rendered before the reset.
        assert!(view
            .renders
            .lock()
            .unwrap()
            .contains(&SessionPhase::Complete));
    }

    #[tokio::test(start_paused = true)]
    async fn index_never_exceeds_last_prompt() {
        let h = harness(MockCapture::ok("我叫小明"), MockEvaluator::not_ready());
        let (state, _, _) = drive(
            h,
            vec![
                SessionEvent::Start { raw: "一\n二".into() },
                SessionEvent::Continue,
                SessionEvent::Continue,
            ],
        )
        .await;

        // Second continue completed the session instead of incrementing.
        let st = state.lock().unwrap();
        assert_eq!(st.phase, SessionPhase::Setup);
    }

    // ---- translate ----

    #[tokio::test]
    async fn translate_stores_phrasebook_result() {
        let h = harness(MockCapture::ok("我叫小明"), MockEvaluator::not_ready());
        let (state, _, _) = drive(
            h,
            vec![
                SessionEvent::Start {
                    raw: "你叫什么名字？".into(),
                },
                SessionEvent::Translate,
            ],
        )
        .await;

        let st = state.lock().unwrap();
        assert_eq!(st.phase, SessionPhase::Presenting);
        assert_eq!(st.translation.as_deref(), Some("What is your name?"));
    }

    /// Advancing hides the previous prompt's translation.
    #[tokio::test]
    async fn advancing_clears_translation() {
        let h = harness(MockCapture::ok("我叫小明"), MockEvaluator::not_ready());
        let (state, _, _) = drive(
            h,
            vec![
                SessionEvent::Start { raw: "一\n二".into() },
                SessionEvent::Translate,
                SessionEvent::Continue,
            ],
        )
        .await;

        let st = state.lock().unwrap();
        assert!(st.translation.is_none());
    }

    // ---- replay / reset ----

    #[tokio::test]
    async fn replay_narrates_current_prompt_again() {
        let h = harness(MockCapture::ok("我叫小明"), MockEvaluator::not_ready());
        let (_, _, playback) = drive(
            h,
            vec![
                SessionEvent::Start {
                    raw: "你叫什么名字？".into(),
                },
                SessionEvent::Replay,
            ],
        )
        .await;

        let spoken = playback.spoken.lock().unwrap();
        assert_eq!(spoken.as_slice(), ["你叫什么名字？", "你叫什么名字？"]);
    }

    #[tokio::test]
    async fn reset_returns_to_setup() {
        let h = harness(MockCapture::ok("我叫小明"), MockEvaluator::not_ready());
        let (state, _, _) = drive(
            h,
            vec![
                SessionEvent::Start { raw: "一\n二".into() },
                SessionEvent::Reset,
            ],
        )
        .await;

        let st = state.lock().unwrap();
        assert_eq!(st.phase, SessionPhase::Setup);
        assert!(st.prompts.is_empty());
    }
}
