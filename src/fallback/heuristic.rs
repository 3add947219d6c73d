//! Local evaluation heuristic — deterministic, no network.
//!
//! Used when the evaluation provider is unconfigured or fails mid-flight.
//! Classification: answer length and shared interrogative keywords decide
//! the bucket; the example answer comes from a fixed pattern table matched
//! against the question in declaration order.

use crate::providers::{Evaluation, EvaluationCategory};

/// Chinese interrogative keywords checked in both question and answer.
pub const QUESTION_KEYWORDS: [&str; 7] =
    ["什么", "哪里", "怎么", "为什么", "什么时候", "谁", "哪个"];

/// Question-pattern → example-answer table.  Substring match against the
/// question; first match in declaration order wins.
const EXAMPLE_ANSWERS: [(&str, &str); 6] = [
    ("你叫什么名字", "我叫张三。"),
    ("你住在哪里", "我住在北京。"),
    ("你喜欢什么", "我喜欢运动。"),
    ("今天天气怎么样", "今天天气很好。"),
    ("你几岁了", "我25岁了。"),
    ("你是做什么工作的", "我是学生。"),
];

/// Example answer used when no pattern matches.
pub const GENERIC_EXAMPLE: &str = "这是一个很好的回答示例。";

/// Minimum answer length (in characters) for the answer to count as
/// complete.
const COMPLETE_LENGTH: usize = 5;

/// Evaluate `(question, answer)` locally.
///
/// * `is_complete` — answer is longer than 5 characters.
/// * `has_keyword` — some interrogative keyword appears in both the
///   question and the answer.
///
/// Both true → good (8/8); exactly one → partial (6/6); neither → poor
/// (4/4).  Pure function: identical input always yields an identical
/// [`Evaluation`].
pub fn evaluate(question: &str, answer: &str) -> Evaluation {
    let is_complete = answer.chars().count() > COMPLETE_LENGTH;
    let has_keyword = shares_keyword(question, answer);
    let example = example_answer(question).to_string();

    if is_complete && has_keyword {
        Evaluation {
            category: EvaluationCategory::Good,
            feedback: "Good answer! Your grammar and vocabulary are appropriate.".into(),
            example,
            score: 8,
            grammar_score: 8,
            pronunciation_tips: "Practice speaking slowly and clearly.".into(),
        }
    } else if is_complete || has_keyword {
        Evaluation {
            category: EvaluationCategory::Partial,
            feedback: "Your answer is mostly correct. Try to use more complete sentences.".into(),
            example,
            score: 6,
            grammar_score: 6,
            pronunciation_tips: "Focus on pronunciation of key words.".into(),
        }
    } else {
        Evaluation {
            category: EvaluationCategory::Poor,
            feedback: "Keep practicing! Try to answer with complete sentences.".into(),
            example,
            score: 4,
            grammar_score: 4,
            pronunciation_tips: "Practice basic vocabulary and sentence structure.".into(),
        }
    }
}

/// Look up an example answer for `question` from the fixed pattern table.
pub fn example_answer(question: &str) -> &'static str {
    for (pattern, example) in EXAMPLE_ANSWERS {
        if question.contains(pattern) {
            return example;
        }
    }
    GENERIC_EXAMPLE
}

fn shares_keyword(question: &str, answer: &str) -> bool {
    QUESTION_KEYWORDS
        .iter()
        .any(|keyword| question.contains(keyword) && answer.contains(keyword))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
