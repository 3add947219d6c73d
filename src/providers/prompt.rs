//! Prompt construction for the OpenAI evaluation/translation adapter.
//!
//! The evaluation prompt fixes the response contract: the model is
//! instructed to answer with a single JSON object carrying `type, feedback,
//! example, score, grammar_score, pronunciation_tips`.  The defensive
//! parser in [`crate::providers::parse`] handles everything the model does
//! anyway.

/// System instruction for answer evaluation.
pub const EVALUATION_SYSTEM: &str = "You are a Chinese language teacher evaluating student \
answers. Provide constructive feedback in English.";

/// System instruction for Chinese → English translation.
pub const TRANSLATION_SYSTEM: &str = "You are a professional Chinese to English translator. \
Provide accurate and natural translations.";

/// Build the user message for evaluating `answer` against `question`.
pub fn evaluation_prompt(question: &str, answer: &str) -> String {
    format!(
        r#"Please evaluate this Chinese language answer:

Question: "{question}"
Student's Answer: "{answer}"

Please provide an evaluation in the following JSON format:
{{
    "type": "good|partial|poor",
    "feedback": "Detailed feedback in English explaining what was good and what could be improved",
    "example": "A good example answer in Chinese",
    "score": 1-10,
    "grammar_score": 1-10,
    "pronunciation_tips": "Tips for pronunciation if applicable"
}}

Evaluation criteria:
- "good": Correct grammar, appropriate vocabulary, complete answer
- "partial": Mostly correct but has some issues
- "poor": Significant grammar/vocabulary issues or incomplete answer

Focus on:
1. Grammar accuracy
2. Vocabulary appropriateness
3. Answer completeness
4. Cultural appropriateness
5. Pronunciation guidance

Respond only with the JSON object, no additional text."#
    )
}

/// Build the user message for translating `text` to English.
pub fn translation_prompt(text: &str) -> String {
    format!(
        "Please translate this Chinese text to English. Provide only the English translation, \
no additional text or explanations:\n\n\"{text}\""
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluation_prompt_embeds_question_and_answer() {
        let prompt = evaluation_prompt("你叫什么名字？", "我叫小明。");
        assert!(prompt.contains("你叫什么名字？"));
        assert!(prompt.contains("我叫小明。"));
    }

    #[test]
    fn evaluation_prompt_fixes_the_json_contract() {
        let prompt = evaluation_prompt("q", "a");
        for field in [
            "\"type\"",
            "\"feedback\"",
            "\"example\"",
            "\"score\"",
            "\"grammar_score\"",
            "\"pronunciation_tips\"",
        ] {
            assert!(prompt.contains(field), "prompt must name {field}");
        }
        assert!(prompt.contains("Respond only with the JSON object"));
    }

    #[test]
    fn translation_prompt_embeds_source_text() {
        let prompt = translation_prompt("你好");
        assert!(prompt.contains("\"你好\""));
        assert!(prompt.contains("only the English translation"));
    }
}
