//! Fragment aggregation: positioned runs into logical lines.

use crate::model::{Fragment, Line, PageFragments};

use super::OutlineConfig;

/// Groups a page's fragments into lines.
///
/// A fragment joins the open group when its vertical center sits within
/// `line_tolerance` of the smaller font size from the group's last fragment
/// and its horizontal gap to the group is at most `max_char_gap` average
/// character widths. Otherwise the group is closed and a new one opened.
pub struct FragmentAggregator<'a> {
    config: &'a OutlineConfig,
}

impl<'a> FragmentAggregator<'a> {
    pub fn new(config: &'a OutlineConfig) -> Self {
        Self { config }
    }

    /// Aggregate one page. Lines come back top to bottom, ties broken by x.
    pub fn aggregate(&self, page: &PageFragments) -> Vec<Line> {
        let fragments: Vec<&Fragment> = page
            .fragments
            .iter()
            .filter(|f| !f.bbox.is_empty() && !f.text.trim().is_empty())
            .collect();

        let dropped = page.fragments.len() - fragments.len();
        if dropped > 0 {
            log::debug!(
                "Page {}: dropped {} invisible or blank fragments",
                page.index,
                dropped
            );
        }

        let mut lines: Vec<Line> = Vec::new();
        let mut group: Vec<Fragment> = Vec::new();

        for fragment in fragments {
            if !group.is_empty() && !self.continues_group(&group, fragment) {
                lines.extend(Line::from_fragments(std::mem::take(&mut group)));
            }
            group.push(fragment.clone());
        }

        // Don't forget the last line
        lines.extend(Line::from_fragments(group));

        lines.sort_by(|a, b| {
            a.top()
                .total_cmp(&b.top())
                .then(a.bbox.x0.total_cmp(&b.bbox.x0))
        });

        log::debug!("Page {}: {} lines", page.index, lines.len());
        lines
    }

    fn continues_group(&self, group: &[Fragment], fragment: &Fragment) -> bool {
        let Some(last) = group.last() else {
            return false;
        };

        let min_size = last.font_size.min(fragment.font_size).max(0.0);
        let tolerance = min_size * self.config.line_tolerance;
        let same_band = (fragment.bbox.center_y() - last.bbox.center_y()).abs() <= tolerance;
        if !same_band {
            return false;
        }

        let extent = group
            .iter()
            .skip(1)
            .fold(group[0].bbox, |acc, f| acc.union(&f.bbox));
        let gap = extent.horizontal_gap(&fragment.bbox);

        gap <= average_char_width(group, fragment) * self.config.max_char_gap
    }
}

/// Average glyph width over the group and the incoming fragment.
fn average_char_width(group: &[Fragment], fragment: &Fragment) -> f32 {
    let (width, chars) = group
        .iter()
        .chain(std::iter::once(fragment))
        .filter(|f| f.char_count() > 0)
        .fold((0.0f32, 0usize), |(w, c), f| {
            (w + f.avg_char_width() * f.char_count() as f32, c + f.char_count())
        });

    if chars > 0 {
        width / chars as f32
    } else {
        fragment.font_size * 0.5
    }
}
