//! Title selection from the opening pages.

use std::collections::HashSet;

use crate::text::comparison_key;

use super::features::ScoredLine;
use super::OutlineConfig;

/// The chosen title and the lines it was built from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TitleSelection {
    /// Title text (empty when no line qualified)
    pub text: String,
    /// Reading-order ordinals of the lines that form the title
    pub ordinals: Vec<usize>,
}

impl TitleSelection {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Whether the line with this ordinal is part of the title.
    pub fn contains(&self, ordinal: usize) -> bool {
        self.ordinals.contains(&ordinal)
    }
}

/// Picks the title as the highest-scoring line of the first pages,
/// extended over vertically adjacent lines that score about as high.
pub struct TitleSelector<'a> {
    config: &'a OutlineConfig,
    running: Option<&'a HashSet<String>>,
}

impl<'a> TitleSelector<'a> {
    pub fn new(config: &'a OutlineConfig) -> Self {
        Self {
            config,
            running: None,
        }
    }

    /// Never pick lines whose comparison key is a running header or footer.
    pub fn skipping(mut self, running: &'a HashSet<String>) -> Self {
        self.running = Some(running);
        self
    }

    /// `font_size * 2 + uppercase_ratio - stopword_ratio`
    pub fn score(line: &ScoredLine) -> f32 {
        line.line.font_size * 2.0 + line.uppercase_ratio - line.stopword_ratio
    }

    /// Select the title from lines in reading order.
    pub fn select(&self, lines: &[ScoredLine]) -> TitleSelection {
        let in_scope: Vec<usize> = (0..lines.len())
            .filter(|&i| self.in_scan_window(&lines[i]))
            .collect();

        let mut best: Option<(usize, f32)> = None;
        for (pos, &i) in in_scope.iter().enumerate() {
            if !self.is_eligible(&lines[i]) {
                continue;
            }
            let score = Self::score(&lines[i]);
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((pos, score));
            }
        }

        let Some((best_pos, top_score)) = best else {
            log::debug!("No title candidate in the first {} pages", self.config.title_scan_pages);
            return TitleSelection::default();
        };

        let mut start = best_pos;
        while start > 0 && self.joins_title(lines, in_scope[start - 1], in_scope[start], top_score)
        {
            start -= 1;
        }
        let mut end = best_pos;
        while end + 1 < in_scope.len()
            && self.joins_title(lines, in_scope[end + 1], in_scope[end], top_score)
        {
            end += 1;
        }

        let group = &in_scope[start..=end];
        let text = group
            .iter()
            .map(|&i| lines[i].line.text.trim())
            .collect::<Vec<_>>()
            .join(" ");

        log::debug!("Selected title {:?} from {} line(s)", text, group.len());

        TitleSelection {
            text,
            ordinals: group.iter().map(|&i| lines[i].ordinal).collect(),
        }
    }

    /// Pages `0..floor(n)` entirely, then the leading fraction of the next page.
    fn in_scan_window(&self, line: &ScoredLine) -> bool {
        let scan = self.config.title_scan_pages;
        let page = line.line.page as f32;
        let full_pages = scan.floor();
        if page < full_pages {
            true
        } else if page == full_pages {
            line.relative_y < scan - full_pages
        } else {
            false
        }
    }

    /// Whether `candidate` extends the title group whose edge line is `edge`.
    ///
    /// The two must be neighbours in reading order on the same page.
    fn joins_title(&self, lines: &[ScoredLine], candidate: usize, edge: usize, top: f32) -> bool {
        if candidate.abs_diff(edge) != 1 {
            return false;
        }
        let (cand, edge_line) = (&lines[candidate], &lines[edge]);
        if cand.line.page != edge_line.line.page || !self.is_eligible(cand) {
            return false;
        }
        if (top - Self::score(cand)).abs() > self.config.title_tie_epsilon {
            return false;
        }

        let (upper, lower) = if candidate < edge {
            (cand, edge_line)
        } else {
            (edge_line, cand)
        };
        let gap = upper.line.gap_to(&lower.line);
        let size = upper.line.font_size.max(lower.line.font_size);
        gap < self.config.title_line_gap * size
    }

    fn is_eligible(&self, line: &ScoredLine) -> bool {
        if line.line.text.trim().is_empty() || line.line.font_size < line.body_median {
            return false;
        }
        self.running
            .map_or(true, |keys| !keys.contains(&comparison_key(&line.line.text)))
    }
}
