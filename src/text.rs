//! Text helpers shared by the decoder and the pipeline.

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s\u{00A0}]+").expect("valid whitespace pattern"))
}

/// Collapse whitespace runs (including NBSP) into single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    whitespace_regex().replace_all(text, " ").trim().to_string()
}

/// NFKC-normalise and collapse whitespace.
///
/// NFKC folds ligatures ("ﬁ" → "fi") and full-width forms, which is what
/// downstream comparison and output both want.
pub fn normalize(text: &str) -> String {
    let folded: String = text.nfkc().collect();
    collapse_whitespace(&folded)
}

/// Case-insensitive comparison key used for running header detection.
pub fn comparison_key(text: &str) -> String {
    normalize(text).to_lowercase()
}

/// Whether the text contains at least one letter or digit.
pub fn has_alphanumeric(text: &str) -> bool {
    text.chars().any(char::is_alphanumeric)
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
pub fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions A-F
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}
