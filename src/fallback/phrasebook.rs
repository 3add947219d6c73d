//! Local translation fallback — a static phrasebook keyed by exact prompt
//! text.
//!
//! Deliberately covers only the handful of stock practice questions; an
//! unknown prompt yields the literal "not available" marker rather than a
//! guess.

/// Marker returned for prompts the phrasebook does not know.
pub const NOT_AVAILABLE: &str = "Translation not available";

const PHRASEBOOK: [(&str, &str); 10] = [
    ("你叫什么名字？", "What is your name?"),
    ("你住在哪里？", "Where do you live?"),
    ("你喜欢什么运动？", "What sports do you like?"),
    ("今天天气怎么样？", "How is the weather today?"),
    ("你几岁了？", "How old are you?"),
    ("你是做什么工作的？", "What do you do for work?"),
    ("你会说中文吗？", "Do you speak Chinese?"),
    ("你来自哪里？", "Where are you from?"),
    ("你喜欢吃什么？", "What do you like to eat?"),
    ("你周末做什么？", "What do you do on weekends?"),
];

/// Translate `prompt` via exact lookup.
pub fn translate(prompt: &str) -> &'static str {
    PHRASEBOOK
        .iter()
        .find(|(zh, _)| *zh == prompt)
        .map(|(_, en)| *en)
        .unwrap_or(NOT_AVAILABLE)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
