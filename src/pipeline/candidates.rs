//! Heading candidate filtering.

use crate::text::has_alphanumeric;

use super::features::ScoredLine;
use super::title::TitleSelection;
use super::OutlineConfig;

/// A line flagged as a possible heading.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub line: ScoredLine,
}

impl Candidate {
    pub fn font_size(&self) -> f32 {
        self.line.line.font_size
    }

    pub fn text(&self) -> &str {
        &self.line.line.text
    }

    pub fn page(&self) -> usize {
        self.line.line.page
    }

    pub fn size_zscore(&self) -> f32 {
        self.line.size_zscore
    }

    pub fn is_bold(&self) -> bool {
        self.line.is_bold
    }
}

/// Keeps lines that stand out from their page's body text.
pub struct CandidateFilter<'a> {
    config: &'a OutlineConfig,
}

impl<'a> CandidateFilter<'a> {
    pub fn new(config: &'a OutlineConfig) -> Self {
        Self { config }
    }

    /// Whether a line qualifies as a heading candidate on its features alone.
    pub fn qualifies(&self, line: &ScoredLine) -> bool {
        let text = line.line.text.trim();
        if text.is_empty() || !has_alphanumeric(text) {
            return false;
        }
        if text.chars().count() > self.config.max_heading_chars {
            return false;
        }

        line.size_zscore >= self.config.size_zscore
            || (line.is_bold && line.size_zscore >= self.config.bold_zscore)
    }

    /// Filter lines (in reading order) into candidates, skipping title lines.
    ///
    /// A one-line title that is the only qualifying line on its page is kept:
    /// it doubles as the first heading of that page.
    pub fn filter(&self, lines: &[ScoredLine], title: &TitleSelection) -> Vec<Candidate> {
        let keep_title = self.title_is_heading(lines, title);
        if keep_title {
            log::debug!("Title {:?} also opens the outline", title.text);
        }

        let candidates: Vec<Candidate> = lines
            .iter()
            .filter(|l| keep_title || !title.contains(l.ordinal))
            .filter(|l| self.qualifies(l))
            .map(|l| Candidate { line: l.clone() })
            .collect();

        log::debug!(
            "{} heading candidates out of {} lines",
            candidates.len(),
            lines.len()
        );
        candidates
    }

    fn title_is_heading(&self, lines: &[ScoredLine], title: &TitleSelection) -> bool {
        let &[ordinal] = title.ordinals.as_slice() else {
            return false;
        };
        let Some(title_line) = lines.iter().find(|l| l.ordinal == ordinal) else {
            return false;
        };
        let page = title_line.line.page;

        self.qualifies(title_line)
            && !lines
                .iter()
                .any(|l| l.ordinal != ordinal && l.line.page == page && self.qualifies(l))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::scored;

    #[test]
    fn test_size_outlier_qualifies_without_bold() {
        let config = OutlineConfig::default();
        let filter = CandidateFilter::new(&config);

        // z = (12 - 11) / 0.5 = 2.0
        assert!(filter.qualifies(&scored("Background", 12.0, false, 0, 100.0, 0, 11.0)));
        // z = 1.0
        assert!(!filter.qualifies(&scored("Body", 11.5, false, 0, 100.0, 0, 11.0)));
    }

    #[test]
    fn test_bold_lowers_the_bar() {
        let config = OutlineConfig::default();
        let filter = CandidateFilter::new(&config);

        // z = 0.5 bold
        assert!(filter.qualifies(&scored("Details", 11.25, true, 0, 100.0, 0, 11.0)));
        // z = 0 bold
        assert!(!filter.qualifies(&scored("Emphasis", 11.0, true, 0, 100.0, 0, 11.0)));
    }

    #[test]
    fn test_rejects_blank_symbolic_and_long_lines() {
        let config = OutlineConfig::default();
        let filter = CandidateFilter::new(&config);

        assert!(!filter.qualifies(&scored("   ", 20.0, true, 0, 100.0, 0, 11.0)));
        assert!(!filter.qualifies(&scored("• • •", 20.0, true, 0, 100.0, 0, 11.0)));
        let long = "word ".repeat(60);
        assert!(!filter.qualifies(&scored(&long, 20.0, true, 0, 100.0, 0, 11.0)));
    }

    #[test]
    fn test_title_lines_excluded_and_order_kept() {
        let config = OutlineConfig::default();
        let filter = CandidateFilter::new(&config);
        let lines = vec![
            scored("Title", 28.0, true, 0, 60.0, 0, 11.0),
            scored("First", 18.0, true, 0, 120.0, 1, 11.0),
            scored("body", 11.0, false, 0, 140.0, 2, 11.0),
            scored("Second", 16.0, true, 1, 80.0, 3, 11.0),
        ];
        let title = TitleSelection {
            text: "Title".to_string(),
            ordinals: vec![0],
        };
        let candidates = filter.filter(&lines, &title);
        let texts: Vec<&str> = candidates.iter().map(|c| c.text()).collect();

        assert_eq!(texts, vec!["First", "Second"]);
    }

    #[test]
    fn test_lone_title_line_kept_as_heading() {
        let config = OutlineConfig::default();
        let filter = CandidateFilter::new(&config);
        let lines = vec![
            scored("Introduction", 24.0, true, 0, 60.0, 0, 11.0),
            scored("body", 11.0, false, 0, 100.0, 1, 11.0),
            scored("Background", 18.0, false, 1, 80.0, 2, 11.0),
        ];
        let title = TitleSelection {
            text: "Introduction".to_string(),
            ordinals: vec![0],
        };
        let texts: Vec<String> = filter
            .filter(&lines, &title)
            .iter()
            .map(|c| c.text().to_string())
            .collect();
        assert_eq!(texts, vec!["Introduction", "Background"]);

        // a two-line title stays out
        let lines = vec![
            scored("Annual", 24.0, true, 0, 60.0, 0, 11.0),
            scored("Review", 24.0, true, 0, 86.0, 1, 11.0),
            scored("body", 11.0, false, 0, 140.0, 2, 11.0),
        ];
        let title = TitleSelection {
            text: "Annual Review".to_string(),
            ordinals: vec![0, 1],
        };
        assert!(filter.filter(&lines, &title).is_empty());
    }
}
