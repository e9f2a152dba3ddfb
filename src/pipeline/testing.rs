//! Fixtures shared by the pipeline unit tests.

use crate::model::{BBox, Fragment, Line};

use super::features::{stopword_ratio, uppercase_ratio, ScoredLine};

const PAGE_HEIGHT: f32 = 792.0;

/// A single-fragment line at `y` on a Letter page, scored against a page
/// whose body median is `body` and whose MAD sits at the 0.5pt floor.
pub fn scored(
    text: &str,
    size: f32,
    bold: bool,
    page: usize,
    y: f32,
    ordinal: usize,
    body: f32,
) -> ScoredLine {
    let fragment = Fragment::new(text, "Helvetica", size, BBox::new(50.0, y, 300.0, y + size), page)
        .with_bold(bold);
    let line = Line::from_fragments(vec![fragment]).expect("one fragment");
    let tokens: Vec<String> = line.text.split_whitespace().map(str::to_string).collect();

    ScoredLine {
        ordinal,
        size_zscore: (size - body) / 0.5,
        body_median: body,
        is_bold: bold,
        uppercase_ratio: uppercase_ratio(&tokens),
        stopword_ratio: stopword_ratio(&tokens),
        relative_y: line.bbox.center_y() / PAGE_HEIGHT,
        line,
    }
}
