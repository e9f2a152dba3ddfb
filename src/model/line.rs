//! Logical text lines assembled from fragments.

use serde::{Deserialize, Serialize};

use super::{BBox, Fragment};
use crate::text::{is_spaceless_script_char, normalize};

/// One visual line of text: fragments sharing a baseline band, ordered by x.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// The fragments in this line, sorted by x position
    pub fragments: Vec<Fragment>,
    /// Joined, normalised text
    pub text: String,
    /// Dominant font size (the size covering the most characters)
    pub font_size: f32,
    /// Share of characters set in a bold face
    pub bold_ratio: f32,
    /// Union of the fragment boxes
    pub bbox: BBox,
    /// Page index (0-based)
    pub page: usize,
}

impl Line {
    /// Build a line from fragments of one page.
    ///
    /// Returns `None` for an empty fragment list.
    pub fn from_fragments(mut fragments: Vec<Fragment>) -> Option<Self> {
        let first = fragments.first()?;
        let page = first.page;

        fragments.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));

        let bbox = fragments
            .iter()
            .skip(1)
            .fold(fragments[0].bbox, |acc, f| acc.union(&f.bbox));

        let total_chars: usize = fragments.iter().map(Fragment::char_count).sum();
        let bold_chars: usize = fragments
            .iter()
            .filter(|f| f.bold)
            .map(Fragment::char_count)
            .sum();
        let bold_ratio = if total_chars > 0 {
            bold_chars as f32 / total_chars as f32
        } else {
            0.0
        };

        let font_size = dominant_font_size(&fragments);
        let text = normalize(&join_fragments(&fragments));

        Some(Self {
            fragments,
            text,
            font_size,
            bold_ratio,
            bbox,
            page,
        })
    }

    /// Whether more than half of the characters are bold.
    pub fn is_bold(&self) -> bool {
        self.bold_ratio > 0.5
    }

    /// Top edge of the line.
    pub fn top(&self) -> f32 {
        self.bbox.y0
    }

    /// Bottom edge of the line.
    pub fn bottom(&self) -> f32 {
        self.bbox.y1
    }

    /// Vertical distance from this line's bottom to the next line's top.
    pub fn gap_to(&self, next: &Line) -> f32 {
        next.top() - self.bottom()
    }
}

/// Font size weighted by character count; ties go to the larger size.
fn dominant_font_size(fragments: &[Fragment]) -> f32 {
    let mut weights: Vec<(f32, usize)> = Vec::new();
    for fragment in fragments {
        let chars = fragment.char_count().max(1);
        match weights
            .iter_mut()
            .find(|(size, _)| (*size - fragment.font_size).abs() < 0.01)
        {
            Some((_, count)) => *count += chars,
            None => weights.push((fragment.font_size, chars)),
        }
    }

    weights
        .into_iter()
        .max_by(|(size_a, count_a), (size_b, count_b)| {
            count_a.cmp(count_b).then(size_a.total_cmp(size_b))
        })
        .map(|(size, _)| size)
        .unwrap_or(0.0)
}

/// Join fragment texts, inserting a space where the horizontal gap reads as one.
///
/// No space is inserted between two characters of a spaceless script.
fn join_fragments(fragments: &[Fragment]) -> String {
    let mut result = String::new();

    for (i, fragment) in fragments.iter().enumerate() {
        if i == 0 {
            result.push_str(&fragment.text);
            continue;
        }

        let prev = &fragments[i - 1];
        let gap = fragment.bbox.x0 - prev.bbox.x1;
        let space_threshold = fragment.avg_char_width() * 0.2;

        let prev_last = prev.text.chars().last();
        let curr_first = fragment.text.chars().next();
        let both_spaceless = prev_last.map(is_spaceless_script_char).unwrap_or(false)
            && curr_first.map(is_spaceless_script_char).unwrap_or(false);

        let already_spaced = prev.text.ends_with(char::is_whitespace)
            || fragment.text.starts_with(char::is_whitespace);

        if gap > space_threshold && !both_spaceless && !already_spaced {
            result.push(' ');
        }
        result.push_str(&fragment.text);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(text: &str, x0: f32, x1: f32, size: f32, bold: bool) -> Fragment {
        Fragment::new(text, "Helvetica", size, BBox::new(x0, 100.0, x1, 100.0 + size), 0)
            .with_bold(bold)
    }

    #[test]
    fn test_from_fragments_sorts_and_joins() {
        let line = Line::from_fragments(vec![
            frag("World", 60.0, 90.0, 12.0, false),
            frag("Hello", 10.0, 40.0, 12.0, false),
        ])
        .unwrap();

        assert_eq!(line.text, "Hello World");
        assert_eq!(line.bbox.x0, 10.0);
        assert_eq!(line.bbox.x1, 90.0);
    }

    #[test]
    fn test_adjacent_fragments_not_spaced() {
        let line = Line::from_fragments(vec![
            frag("Head", 10.0, 34.0, 12.0, true),
            frag("ing", 34.0, 52.0, 12.0, true),
        ])
        .unwrap();
        assert_eq!(line.text, "Heading");
    }

    #[test]
    fn test_cjk_fragments_not_spaced() {
        let line = Line::from_fragments(vec![
            frag("概要", 10.0, 34.0, 12.0, false),
            frag("説明", 40.0, 64.0, 12.0, false),
        ])
        .unwrap();
        assert_eq!(line.text, "概要説明");
    }

    #[test]
    fn test_bold_ratio_and_dominant_size() {
        let line = Line::from_fragments(vec![
            frag("Chapter", 10.0, 60.0, 18.0, true),
            frag("1", 70.0, 80.0, 12.0, false),
        ])
        .unwrap();

        assert!(line.is_bold());
        assert_eq!(line.font_size, 18.0);
    }

    #[test]
    fn test_empty_fragments() {
        assert!(Line::from_fragments(Vec::new()).is_none());
    }
}
