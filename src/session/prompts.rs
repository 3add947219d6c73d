//! Prompt-set parsing and shuffling.

use rand::Rng;
use thiserror::Error;

/// Session start was attempted with no usable prompt lines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Please enter at least one question first.")]
pub struct NoPrompts;

/// Ordered, non-empty set of practice prompts.
///
/// Created from raw multi-line user input — one prompt per non-blank line,
/// surrounding whitespace trimmed.  Immutable once a session begins, except
/// for the single shuffle applied at session start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    prompts: Vec<String>,
}

impl PromptSet {
    /// Parse raw user input into a prompt set.
    ///
    /// ```
    /// use chinese_practice::session::PromptSet;
    ///
    /// let set = PromptSet::parse("你叫什么名字？\n\n  你住在哪里？  \n").unwrap();
    /// assert_eq!(set.len(), 2);
    /// assert!(PromptSet::parse("  \n \n").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, NoPrompts> {
        let prompts: Vec<String> = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        if prompts.is_empty() {
            return Err(NoPrompts);
        }
        Ok(Self { prompts })
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.prompts
    }

    pub fn into_vec(self) -> Vec<String> {
        self.prompts
    }

    /// Fisher–Yates shuffle: uniform over permutations for a uniform `rng`.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        for i in (1..self.prompts.len()).rev() {
            let j = rng.gen_range(0..=i);
            self.prompts.swap(i, j);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn parse_keeps_one_prompt_per_non_blank_line() {
        let set = PromptSet::parse("你叫什么名字？\n你住在哪里？\n你几岁了？").unwrap();
        assert_eq!(
            set.as_slice(),
            ["你叫什么名字？", "你住在哪里？", "你几岁了？"]
        );
    }

    #[test]
    fn parse_trims_and_drops_blank_lines() {
        let set = PromptSet::parse("  你好吗？  \n\n   \n你住在哪里？\n").unwrap();
        assert_eq!(set.as_slice(), ["你好吗？", "你住在哪里？"]);
    }

    #[test]
    fn parse_rejects_empty_input() {
        assert_eq!(PromptSet::parse(""), Err(NoPrompts));
        assert_eq!(PromptSet::parse(" \n\t\n "), Err(NoPrompts));
    }

    /// Shuffling yields a permutation: same length, same multiset.
    #[test]
    fn shuffle_is_a_permutation() {
        let raw = "一\n二\n三\n四\n五\n六\n七\n八";
        let original = PromptSet::parse(raw).unwrap();

        for seed in 0..20 {
            let mut shuffled = original.clone();
            let mut rng = StdRng::seed_from_u64(seed);
            shuffled.shuffle(&mut rng);

            assert_eq!(shuffled.len(), original.len());
            let mut a: Vec<_> = shuffled.as_slice().to_vec();
            let mut b: Vec<_> = original.as_slice().to_vec();
            a.sort();
            b.sort();
            assert_eq!(a, b, "seed {seed} must produce a permutation");
        }
    }

    #[test]
    fn shuffle_is_deterministic_for_a_seed() {
        let original = PromptSet::parse("一\n二\n三\n四").unwrap();

        let mut first = original.clone();
        first.shuffle(&mut StdRng::seed_from_u64(7));
        let mut second = original.clone();
        second.shuffle(&mut StdRng::seed_from_u64(7));

        assert_eq!(first, second);
    }

    #[test]
    fn shuffle_of_single_prompt_is_noop() {
        let mut set = PromptSet::parse("你好吗？").unwrap();
        set.shuffle(&mut StdRng::seed_from_u64(0));
        assert_eq!(set.as_slice(), ["你好吗？"]);
    }
}
