//! Decoding options.

use std::ops::RangeInclusive;

use crate::error::{Error, Result};

/// Options for turning a PDF into page fragments.
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Page selection (which pages to decode)
    pub pages: PageSelection,

    /// Stop after this many selected pages (0 = unlimited)
    pub max_pages: u32,
}

impl DecodeOptions {
    /// Create new decode options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Skip undecodable pages instead of failing.
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }

    /// Cap the number of decoded pages.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub(crate) fn is_lenient(&self) -> bool {
        self.error_mode == ErrorMode::Lenient
    }
}

/// Error handling mode during decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    #[default]
    Strict,
    /// Skip invalid pages and continue
    Lenient,
}

/// Which pages to decode (1-indexed).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// Every page
    #[default]
    All,
    /// An inclusive range of pages
    Range(RangeInclusive<u32>),
    /// Specific pages
    Pages(Vec<u32>),
    /// Sorted, non-overlapping ranges (parsed from lists like "1,3,5-7")
    Ranges(Vec<RangeInclusive<u32>>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
            PageSelection::Ranges(ranges) => ranges.iter().any(|r| r.contains(&page)),
        }
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5-7").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(PageSelection::All);
        }

        if !s.contains(',') {
            if let Some((start, end)) = s.split_once('-') {
                let (start, end) = parse_bounds(s, start, end)?;
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut ranges = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            let (start, end) = match part.split_once('-') {
                Some((start, end)) => parse_bounds(s, start, end)?,
                None => {
                    let page = parse_page(s, part)?;
                    (page, page)
                }
            };
            ranges.push(start..=end);
        }

        Ok(PageSelection::Ranges(merge_ranges(ranges)))
    }
}

/// Sort by start and join overlapping or touching ranges.
fn merge_ranges(mut ranges: Vec<RangeInclusive<u32>>) -> Vec<RangeInclusive<u32>> {
    ranges.sort_by_key(|r| *r.start());
    let mut merged: Vec<RangeInclusive<u32>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if *range.start() <= last.end().saturating_add(1) => {
                if range.end() > last.end() {
                    *last = *last.start()..=*range.end();
                }
            }
            _ => merged.push(range),
        }
    }
    merged
}

fn parse_page(spec: &str, part: &str) -> Result<u32> {
    match part.trim().parse::<u32>() {
        Ok(0) | Err(_) => Err(Error::InvalidPageRange(spec.to_string())),
        Ok(page) => Ok(page),
    }
}

fn parse_bounds(spec: &str, start: &str, end: &str) -> Result<(u32, u32)> {
    let start = parse_page(spec, start)?;
    let end = parse_page(spec, end)?;
    if start > end {
        return Err(Error::InvalidPageRange(spec.to_string()));
    }
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_options_builder() {
        let options = DecodeOptions::new()
            .lenient()
            .with_pages(PageSelection::Range(1..=3))
            .with_max_pages(2);

        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert!(options.is_lenient());
        assert_eq!(options.pages, PageSelection::Range(1..=3));
        assert_eq!(options.max_pages, 2);
    }

    #[test]
    fn test_page_selection_parse() {
        assert_eq!(PageSelection::parse("all").unwrap(), PageSelection::All);
        assert_eq!(PageSelection::parse("").unwrap(), PageSelection::All);
        assert_eq!(
            PageSelection::parse("1-10").unwrap(),
            PageSelection::Range(1..=10)
        );
        assert_eq!(
            PageSelection::parse("5,1,3-4,3").unwrap(),
            PageSelection::Ranges(vec![1..=1, 3..=5])
        );
    }

    #[test]
    fn test_page_selection_huge_list_range() {
        let selection = PageSelection::parse("1,1-4000000000,7").unwrap();
        assert_eq!(selection, PageSelection::Ranges(vec![1..=4_000_000_000]));
        assert!(selection.includes(3_999_999_999));
        assert!(!selection.includes(4_000_000_001));

        let gaps = PageSelection::parse("10-12,2,4-5").unwrap();
        assert_eq!(gaps, PageSelection::Ranges(vec![2..=2, 4..=5, 10..=12]));
        assert!(!gaps.includes(3));
        assert!(gaps.includes(11));
    }

    #[test]
    fn test_page_selection_rejects_bad_input() {
        for bad in ["0", "3-1", "x", "1,,2", "1-"] {
            assert!(
                matches!(PageSelection::parse(bad), Err(Error::InvalidPageRange(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_page_selection_includes() {
        let selection = PageSelection::parse("2-4").unwrap();
        assert!(!selection.includes(1));
        assert!(selection.includes(2));
        assert!(selection.includes(4));
        assert!(PageSelection::All.includes(99));
    }
}
