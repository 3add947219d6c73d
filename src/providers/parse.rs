//! Defensive parsing of evaluation-provider responses.
//!
//! The provider is *asked* to answer with a bare JSON object but routinely
//! wraps it in prose or markdown.  [`parse_evaluation`] locates the first
//! well-formed JSON object substring, fills documented defaults for any
//! missing field, and degrades to a fully-defaulted [`Evaluation`] when no
//! usable JSON is present.  It never fails.

use crate::providers::evaluator::{Evaluation, EvaluationCategory};

/// Default example answer substituted when the provider omits one.
pub const DEFAULT_EXAMPLE: &str = "这是一个很好的回答示例。";

/// Default feedback when the provider response is empty.
pub const DEFAULT_FEEDBACK: &str = "Evaluation completed.";

/// Feedback used when a JSON object was found but could not be parsed.
const MALFORMED_FEEDBACK: &str = "Evaluation completed. Please practice more.";

const DEFAULT_SCORE: u8 = 5;

/// Parse a free-form provider response into an [`Evaluation`].
///
/// Field handling mirrors the provider contract: a missing, null, zero or
/// empty-string field gets its documented default (`type="partial"`,
/// `score=5`, `grammar_score=5`, empty tips, placeholder example).
///
/// ```
/// use chinese_practice::providers::parse_evaluation;
/// use chinese_practice::providers::EvaluationCategory;
///
/// let response = r#"Sure! Here is my evaluation:
/// {"type": "good", "score": 9, "feedback": "Well done."}
/// Hope that helps."#;
/// let eval = parse_evaluation(response);
/// assert_eq!(eval.category, EvaluationCategory::Good);
/// assert_eq!(eval.score, 9);
/// assert_eq!(eval.grammar_score, 5); // absent → default
/// ```
pub fn parse_evaluation(response: &str) -> Evaluation {
    let Some(json_text) = extract_json_object(response) else {
        // No JSON at all: surface the prose as feedback.
        let feedback = if response.trim().is_empty() {
            DEFAULT_FEEDBACK.to_string()
        } else {
            response.to_string()
        };
        return defaulted(feedback);
    };

    let value: serde_json::Value = match serde_json::from_str(json_text) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("evaluation response contained unparsable JSON: {e}");
            return defaulted(MALFORMED_FEEDBACK.to_string());
        }
    };

    Evaluation {
        category: value["type"]
            .as_str()
            .and_then(EvaluationCategory::parse)
            .unwrap_or(EvaluationCategory::Partial),
        feedback: non_empty_str(&value["feedback"]).unwrap_or_else(|| DEFAULT_FEEDBACK.into()),
        example: non_empty_str(&value["example"]).unwrap_or_else(|| DEFAULT_EXAMPLE.into()),
        score: score_or_default(&value["score"]),
        grammar_score: score_or_default(&value["grammar_score"]),
        pronunciation_tips: non_empty_str(&value["pronunciation_tips"]).unwrap_or_default(),
    }
}

fn defaulted(feedback: String) -> Evaluation {
    Evaluation {
        category: EvaluationCategory::Partial,
        feedback,
        example: DEFAULT_EXAMPLE.into(),
        score: DEFAULT_SCORE,
        grammar_score: DEFAULT_SCORE,
        pronunciation_tips: String::new(),
    }
}

fn non_empty_str(value: &serde_json::Value) -> Option<String> {
    value
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// A zero score is treated as absent, matching the provider contract's
/// 1–10 range; out-of-range values are clamped rather than rejected.
fn score_or_default(value: &serde_json::Value) -> u8 {
    match value.as_f64() {
        Some(n) if n >= 1.0 => (n.min(10.0)) as u8,
        _ => DEFAULT_SCORE,
    }
}

/// Locate the first well-formed JSON object substring via string-aware
/// brace matching.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_json_parses_every_field() {
        let response = r#"{
            "type": "good",
            "feedback": "Excellent sentence structure.",
            "example": "我叫张三。",
            "score": 9,
            "grammar_score": 8,
            "pronunciation_tips": "Mind the third tone."
        }"#;
        let eval = parse_evaluation(response);

        assert_eq!(eval.category, EvaluationCategory::Good);
        assert_eq!(eval.feedback, "Excellent sentence structure.");
        assert_eq!(eval.example, "我叫张三。");
        assert_eq!(eval.score, 9);
        assert_eq!(eval.grammar_score, 8);
        assert_eq!(eval.pronunciation_tips, "Mind the third tone.");
    }

    /// Extraneous prose around the object must not break extraction.
    #[test]
    fn json_embedded_in_prose_is_extracted() {
        let response = "Here is my assessment:\n{\"type\": \"poor\", \"score\": 2}\nKeep practicing!";
        let eval = parse_evaluation(response);

        assert_eq!(eval.category, EvaluationCategory::Poor);
        assert_eq!(eval.score, 2);
        // Absent fields fall back to documented defaults.
        assert_eq!(eval.feedback, DEFAULT_FEEDBACK);
        assert_eq!(eval.example, DEFAULT_EXAMPLE);
        assert_eq!(eval.grammar_score, 5);
        assert_eq!(eval.pronunciation_tips, "");
    }

    /// Braces inside JSON strings must not confuse the matcher.
    #[test]
    fn braces_inside_strings_are_ignored() {
        let response = r#"{"type": "partial", "feedback": "use {subject} + 叫 + {name}"}"#;
        let eval = parse_evaluation(response);
        assert_eq!(eval.feedback, "use {subject} + 叫 + {name}");
    }

    #[test]
    fn no_json_degrades_to_prose_feedback() {
        let response = "Nice try, but the word order is off.";
        let eval = parse_evaluation(response);

        assert_eq!(eval.category, EvaluationCategory::Partial);
        assert_eq!(eval.feedback, response);
        assert_eq!(eval.score, 5);
        assert_eq!(eval.grammar_score, 5);
    }

    #[test]
    fn empty_response_gets_default_feedback() {
        let eval = parse_evaluation("  ");
        assert_eq!(eval.feedback, DEFAULT_FEEDBACK);
        assert_eq!(eval.category, EvaluationCategory::Partial);
    }

    #[test]
    fn malformed_json_degrades_to_defaults() {
        let eval = parse_evaluation("{\"type\": \"good\", \"score\": }");
        assert_eq!(eval.category, EvaluationCategory::Partial);
        assert_eq!(eval.feedback, "Evaluation completed. Please practice more.");
        assert_eq!(eval.score, 5);
    }

    /// Zero and empty-string fields count as absent (provider contract says
    /// 1–10 and non-empty text).
    #[test]
    fn zero_and_empty_fields_use_defaults() {
        let response = r#"{"type": "", "feedback": "", "example": "", "score": 0, "grammar_score": 0}"#;
        let eval = parse_evaluation(response);

        assert_eq!(eval.category, EvaluationCategory::Partial);
        assert_eq!(eval.feedback, DEFAULT_FEEDBACK);
        assert_eq!(eval.example, DEFAULT_EXAMPLE);
        assert_eq!(eval.score, 5);
        assert_eq!(eval.grammar_score, 5);
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        let eval = parse_evaluation(r#"{"score": 42, "grammar_score": 7}"#);
        assert_eq!(eval.score, 10);
        assert_eq!(eval.grammar_score, 7);
    }

    #[test]
    fn unknown_category_falls_back_to_partial() {
        let eval = parse_evaluation(r#"{"type": "amazing"}"#);
        assert_eq!(eval.category, EvaluationCategory::Partial);
    }
}
