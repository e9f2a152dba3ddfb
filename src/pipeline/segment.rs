//! Word segmentation used for the uppercase and stop-word ratios.

use crate::text::is_spaceless_script_char;

/// Splits a line's text into ordered word tokens.
///
/// Implementations may wrap a language model for scripts without word
/// spaces. Returning no tokens for non-empty text makes the caller fall back
/// to whitespace tokenization.
pub trait Segmenter: Send + Sync {
    /// Segment `text` into tokens.
    fn segment(&self, text: &str) -> Vec<String>;

    /// Name used in logs.
    fn name(&self) -> &str {
        "custom"
    }
}

/// Whitespace tokenization; the default when no segmenter is injected.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceSegmenter;

impl Segmenter for WhitespaceSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    fn name(&self) -> &str {
        "whitespace"
    }
}

/// Whitespace tokenization that also splits CJK runs into single characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptAwareSegmenter;

impl Segmenter for ScriptAwareSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        for word in text.split_whitespace() {
            let mut current = String::new();
            for c in word.chars() {
                if is_spaceless_script_char(c) {
                    if !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                    tokens.push(c.to_string());
                } else {
                    current.push(c);
                }
            }
            if !current.is_empty() {
                tokens.push(current);
            }
        }
        tokens
    }

    fn name(&self) -> &str {
        "script-aware"
    }
}

/// Tokenize with an optional segmenter, degrading to whitespace splitting.
pub fn tokenize(segmenter: Option<&dyn Segmenter>, text: &str) -> Vec<String> {
    if let Some(segmenter) = segmenter {
        let tokens: Vec<String> = segmenter
            .segment(text)
            .into_iter()
            .filter(|t| !t.trim().is_empty())
            .collect();
        if !tokens.is_empty() || text.trim().is_empty() {
            return tokens;
        }
        log::debug!(
            "Segmenter '{}' returned no tokens, falling back to whitespace",
            segmenter.name()
        );
    }
    WhitespaceSegmenter.segment(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SilentSegmenter;

    impl Segmenter for SilentSegmenter {
        fn segment(&self, _text: &str) -> Vec<String> {
            Vec::new()
        }
    }

    #[test]
    fn test_whitespace_segmenter() {
        assert_eq!(
            WhitespaceSegmenter.segment("  The  quick fox "),
            vec!["The", "quick", "fox"]
        );
    }

    #[test]
    fn test_script_aware_segmenter_splits_cjk() {
        let tokens = ScriptAwareSegmenter.segment("第1章 概要 Overview");
        assert_eq!(tokens, vec!["第", "1", "章", "概", "要", "Overview"]);
    }

    #[test]
    fn test_tokenize_falls_back_when_segmenter_is_silent() {
        let tokens = tokenize(Some(&SilentSegmenter), "Results and Discussion");
        assert_eq!(tokens, vec!["Results", "and", "Discussion"]);
    }

    #[test]
    fn test_tokenize_without_segmenter() {
        assert_eq!(tokenize(None, "a b"), vec!["a", "b"]);
        assert!(tokenize(None, "   ").is_empty());
    }
}
