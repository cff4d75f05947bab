//! Token filters that transform token streams produced by tokenizers.
//!
//! - [`LowercaseFilter`] - converts tokens to lowercase
//! - [`StripPunctuationFilter`] - trims leading/trailing non-alphanumeric characters
//! - [`StopFilter`] - marks stop words as stopped
//! - [`RemoveEmptyFilter`] - drops stopped and empty tokens
//!
//! Filters are chained in an analyzer:
//!
//! ```text
//! Tokenizer → Lowercase → Strip → Stop Words → Remove Empty
//! ```

use ahash::AHashSet;

use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

/// Trait for token filters.
pub trait Filter: Send + Sync {
    /// Transform a token stream.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter.
    fn name(&self) -> &'static str;
}

/// A filter that converts tokens to lowercase.
#[derive(Clone, Debug, Default)]
pub struct LowercaseFilter;

impl LowercaseFilter {
    pub fn new() -> Self {
        LowercaseFilter
    }
}

impl Filter for LowercaseFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(Box::new(tokens.map(|token| {
            if token.is_stopped() {
                token
            } else {
                let lowered = token.text.to_lowercase();
                token.with_text(lowered)
            }
        })))
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}

/// A filter that trims punctuation and symbols from both ends of a token.
///
/// Tokens that consist only of punctuation become empty and are stopped.
#[derive(Clone, Debug, Default)]
pub struct StripPunctuationFilter;

impl StripPunctuationFilter {
    pub fn new() -> Self {
        StripPunctuationFilter
    }
}

impl Filter for StripPunctuationFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(Box::new(tokens.map(|token| {
            if token.is_stopped() {
                return token;
            }
            let trimmed = token.text.trim_matches(|c: char| !c.is_alphanumeric());
            if trimmed.is_empty() {
                token.with_text("").stop()
            } else if trimmed.len() == token.text.len() {
                token
            } else {
                let trimmed = trimmed.to_string();
                token.with_text(trimmed)
            }
        })))
    }

    fn name(&self) -> &'static str {
        "strip_punctuation"
    }
}

const DEFAULT_ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

/// A filter that marks stop words as stopped.
#[derive(Clone, Debug)]
pub struct StopFilter {
    stop_words: AHashSet<String>,
}

impl StopFilter {
    /// Create a stop filter with the default English stop list.
    pub fn new() -> Self {
        Self::from_words(DEFAULT_ENGLISH_STOP_WORDS.iter().copied())
    }

    /// Create a stop filter from a custom word list.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StopFilter {
            stop_words: words.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.stop_words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stop_words.is_empty()
    }
}

impl Default for StopFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for StopFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered: Vec<Token> = tokens
            .map(|token| {
                if !token.is_stopped() && self.is_stop_word(&token.text) {
                    token.stop()
                } else {
                    token
                }
            })
            .collect();

        Ok(Box::new(filtered.into_iter()))
    }

    fn name(&self) -> &'static str {
        "stop"
    }
}

/// A filter that removes stopped and empty tokens from the stream.
#[derive(Clone, Debug, Default)]
pub struct RemoveEmptyFilter;

impl RemoveEmptyFilter {
    pub fn new() -> Self {
        RemoveEmptyFilter
    }
}

impl Filter for RemoveEmptyFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(Box::new(
            tokens.filter(|token| !token.is_stopped() && !token.text.is_empty()),
        ))
    }

    fn name(&self) -> &'static str {
        "remove_empty"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(words: &[&str]) -> TokenStream {
        let tokens: Vec<Token> = words
            .iter()
            .enumerate()
            .map(|(i, w)| Token::new(*w, i))
            .collect();
        Box::new(tokens.into_iter())
    }

    #[test]
    fn test_lowercase_filter() {
        let result: Vec<Token> = LowercaseFilter::new()
            .filter(stream(&["The", "QUICK", "Brown"]))
            .unwrap()
            .collect();

        assert_eq!(result[0].text, "the");
        assert_eq!(result[1].text, "quick");
        assert_eq!(result[2].text, "brown");
    }

    #[test]
    fn test_strip_punctuation_filter() {
        let result: Vec<Token> = StripPunctuationFilter::new()
            .filter(stream(&["(sclerosis),", "it's", "--", "x"]))
            .unwrap()
            .collect();

        assert_eq!(result.len(), 4);
        assert_eq!(result[0].text, "sclerosis");
        assert_eq!(result[1].text, "it's");
        assert!(result[2].is_stopped());
        assert!(result[2].is_empty());
        assert_eq!(result[3].text, "x");
    }

    #[test]
    fn test_stop_filter() {
        let filter = StopFilter::new();
        let result: Vec<Token> = filter
            .filter(stream(&["the", "cat", "and", "dog"]))
            .unwrap()
            .collect();

        assert!(result[0].is_stopped());
        assert!(!result[1].is_stopped());
        assert!(result[2].is_stopped());
        assert!(!result[3].is_stopped());
    }

    #[test]
    fn test_custom_stop_words() {
        let filter = StopFilter::from_words(["cat"]);
        assert_eq!(filter.len(), 1);
        assert!(filter.is_stop_word("cat"));
        assert!(!filter.is_stop_word("the"));
    }

    #[test]
    fn test_remove_empty_filter() {
        let tokens = vec![
            Token::new("hello", 0),
            Token::new("", 1),
            Token::new("world", 2),
            Token::new("test", 3).stop(),
        ];

        let result: Vec<Token> = RemoveEmptyFilter::new()
            .filter(Box::new(tokens.into_iter()))
            .unwrap()
            .collect();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].text, "hello");
        assert_eq!(result[1].text, "world");
    }

    #[test]
    fn test_filter_names() {
        assert_eq!(LowercaseFilter::new().name(), "lowercase");
        assert_eq!(StripPunctuationFilter::new().name(), "strip_punctuation");
        assert_eq!(StopFilter::new().name(), "stop");
        assert_eq!(RemoveEmptyFilter::new().name(), "remove_empty");
    }
}
