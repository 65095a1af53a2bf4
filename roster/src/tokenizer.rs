//! Text normalization shared by prompts, roles and descriptions.

/// Splits free text into lowercase alphanumeric tokens.
pub struct Tokenizer;

impl Tokenizer {
    /// Tokenize `text`, splitting on every run of non-alphanumeric characters.
    ///
    /// Total and deterministic; empty tokens are dropped.
    pub fn tokenize(text: &str) -> Vec<String> {
        // Lowercase before splitting: some lowercase mappings emit
        // combining marks, which must act as separators
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_punctuation_runs() {
        assert_eq!(
            Tokenizer::tokenize("UI/UX Designer -- React, Tailwind!"),
            vec!["ui", "ux", "designer", "react", "tailwind"]
        );
    }

    #[test]
    fn test_empty_and_symbol_only_input() {
        assert!(Tokenizer::tokenize("").is_empty());
        assert!(Tokenizer::tokenize("  -- / !! ").is_empty());
    }

    #[test]
    fn test_tokens_stay_alphanumeric_after_lowercasing() {
        // 'İ' lowercases to 'i' followed by a combining dot above
        let tokens = Tokenizer::tokenize("İZMİR Developer");
        assert_eq!(tokens, vec!["i", "zmi", "r", "developer"]);
        assert!(tokens
            .iter()
            .all(|token| token.chars().all(char::is_alphanumeric)));
    }

    #[test]
    fn test_keeps_digits_and_order() {
        assert_eq!(
            Tokenizer::tokenize("Web3 dev, 2 years"),
            vec!["web3", "dev", "2", "years"]
        );
    }
}
