//! Presentation boundary for Chinese Question Practice.
//!
//! The session controller depends only on [`PracticeView`], never on a
//! concrete frontend, so the whole session can be driven headlessly in
//! tests.  [`console`] provides the terminal frontend used by the binary.

pub mod console;

use std::time::Duration;

use crate::providers::{Evaluation, EvaluationCategory};
use crate::session::SessionState;

/// How long a transient notice stays visible before auto-dismissing.
pub const NOTICE_DISMISS: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// PracticeView
// ---------------------------------------------------------------------------

/// Rendering surface the session controller calls into.
///
/// `render` receives a full state snapshot after every transition; `notice`
/// carries transient, auto-dismissing messages (provider fallbacks, capture
/// errors, completion).
pub trait PracticeView: Send + Sync {
    fn render(&self, state: &SessionState);
    fn notice(&self, message: &str);
}

// ---------------------------------------------------------------------------
// Evaluation formatting
// ---------------------------------------------------------------------------

/// Badge line for an evaluation, e.g. `✓ Excellent (8/10)`.
pub fn badge_text(evaluation: &Evaluation) -> String {
    let label = match evaluation.category {
        EvaluationCategory::Good => "✓ Excellent",
        EvaluationCategory::Partial => "⚠ Good",
        EvaluationCategory::Poor => "✗ Needs Work",
    };
    format!("{label} ({}/10)", evaluation.score)
}

/// Feedback block: main feedback plus grammar score and pronunciation tips
/// when present.
pub fn feedback_text(evaluation: &Evaluation) -> String {
    let mut text = evaluation.feedback.clone();
    text.push_str(&format!(
        "\n\nGrammar Score: {}/10",
        evaluation.grammar_score
    ));
    if !evaluation.pronunciation_tips.is_empty() {
        text.push_str(&format!(
            "\n\nPronunciation Tips: {}",
            evaluation.pronunciation_tips
        ));
    }
    text
}

// ---------------------------------------------------------------------------
// MockView  (test-only)
// ---------------------------------------------------------------------------

/// Test double recording every render and notice.
#[cfg(test)]
pub struct MockView {
    pub renders: std::sync::Mutex<Vec<crate::session::SessionPhase>>,
    pub notices: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockView {
    pub fn new() -> Self {
        Self {
            renders: std::sync::Mutex::new(Vec::new()),
            notices: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
impl PracticeView for MockView {
    fn render(&self, state: &SessionState) {
        self.renders.lock().unwrap().push(state.phase);
    }

    fn notice(&self, message: &str) {
        self.notices.lock().unwrap().push(message.to_string());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluation(category: EvaluationCategory, score: u8, tips: &str) -> Evaluation {
        Evaluation {
            category,
            feedback: "Solid work.".into(),
            example: "我叫张三。".into(),
            score,
            grammar_score: 7,
            pronunciation_tips: tips.into(),
        }
    }

    #[test]
    fn badge_reflects_category_and_score() {
        assert_eq!(
            badge_text(&evaluation(EvaluationCategory::Good, 8, "")),
            "✓ Excellent (8/10)"
        );
        assert_eq!(
            badge_text(&evaluation(EvaluationCategory::Partial, 6, "")),
            "⚠ Good (6/10)"
        );
        assert_eq!(
            badge_text(&evaluation(EvaluationCategory::Poor, 4, "")),
            "✗ Needs Work (4/10)"
        );
    }

    #[test]
    fn feedback_includes_grammar_score() {
        let text = feedback_text(&evaluation(EvaluationCategory::Good, 8, ""));
        assert!(text.contains("Solid work."));
        assert!(text.contains("Grammar Score: 7/10"));
        assert!(!text.contains("Pronunciation Tips"));
    }

    #[test]
    fn feedback_appends_tips_when_present() {
        let text = feedback_text(&evaluation(EvaluationCategory::Good, 8, "Mind the tones."));
        assert!(text.contains("Pronunciation Tips: Mind the tones."));
    }
}
