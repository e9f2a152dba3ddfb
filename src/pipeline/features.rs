//! Per-page font statistics and per-line features.

use crate::model::Line;

use super::segment::{tokenize, Segmenter};
use super::OutlineConfig;

/// Short English stop-word list used for the stop-word ratio.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "in", "is", "it", "of", "on",
    "or", "that", "the", "this", "to", "was", "were", "with",
];

/// Body-text font statistics of one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageStats {
    /// Body size estimate: the mode of line sizes, rounded to the configured step
    pub body_size: f32,
    /// Median size over the body cluster
    pub median: f32,
    /// Median absolute deviation over the body cluster, floor-clamped
    pub mad: f32,
    /// Number of lines the statistics were computed from
    pub sample_size: usize,
}

impl PageStats {
    /// Compute statistics from a page's lines.
    ///
    /// With at least `min_body_lines` lines the median and MAD are taken over
    /// lines within `body_cluster_radius` of the mode, so headings do not
    /// bias the baseline. Smaller pages use all their lines.
    pub fn from_lines(lines: &[Line], config: &OutlineConfig) -> Self {
        let sizes: Vec<f32> = lines.iter().map(|l| l.font_size).collect();
        if sizes.is_empty() {
            return Self {
                body_size: 0.0,
                median: 0.0,
                mad: config.mad_floor,
                sample_size: 0,
            };
        }

        let body_size = rounded_mode(&sizes, config.body_size_step);

        let sample: Vec<f32> = if sizes.len() >= config.min_body_lines {
            let cluster: Vec<f32> = sizes
                .iter()
                .copied()
                .filter(|s| (s - body_size).abs() <= config.body_cluster_radius)
                .collect();
            if cluster.is_empty() {
                sizes.clone()
            } else {
                cluster
            }
        } else {
            sizes.clone()
        };

        let center = median(&sample);
        let deviations: Vec<f32> = sample.iter().map(|s| (s - center).abs()).collect();
        let mad = median(&deviations).max(config.mad_floor);

        Self {
            body_size,
            median: center,
            mad,
            sample_size: sample.len(),
        }
    }

    /// Robust z-score of a font size against this page's body text.
    pub fn zscore(&self, font_size: f32) -> f32 {
        (font_size - self.median) / self.mad
    }
}

/// A line with its computed features.
#[derive(Debug, Clone)]
pub struct ScoredLine {
    pub line: Line,
    /// Position in document reading order
    pub ordinal: usize,
    pub size_zscore: f32,
    /// Median body size of the line's page
    pub body_median: f32,
    pub is_bold: bool,
    pub uppercase_ratio: f32,
    pub stopword_ratio: f32,
    /// Vertical position of the line center as a fraction of page height
    pub relative_y: f32,
}

/// Attaches features to lines using their page's statistics.
pub struct FeatureScorer<'a> {
    segmenter: Option<&'a dyn Segmenter>,
}

impl<'a> FeatureScorer<'a> {
    pub fn new(segmenter: Option<&'a dyn Segmenter>) -> Self {
        Self { segmenter }
    }

    /// Score one line. `page_height` is the page's extent used for `relative_y`.
    pub fn score(
        &self,
        line: Line,
        ordinal: usize,
        stats: &PageStats,
        page_height: f32,
    ) -> ScoredLine {
        let tokens = tokenize(self.segmenter, &line.text);
        let relative_y = if page_height > 0.0 {
            (line.bbox.center_y() / page_height).clamp(0.0, 1.0)
        } else {
            0.5
        };

        ScoredLine {
            size_zscore: stats.zscore(line.font_size),
            body_median: stats.median,
            is_bold: line.is_bold(),
            uppercase_ratio: uppercase_ratio(&tokens),
            stopword_ratio: stopword_ratio(&tokens),
            relative_y,
            ordinal,
            line,
        }
    }
}

/// Share of letter-bearing tokens written entirely in uppercase.
pub fn uppercase_ratio(tokens: &[String]) -> f32 {
    let words: Vec<&String> = tokens
        .iter()
        .filter(|t| t.chars().any(char::is_alphabetic))
        .collect();
    if words.is_empty() {
        return 0.0;
    }
    let upper = words
        .iter()
        .filter(|t| {
            t.chars()
                .filter(|c| c.is_alphabetic())
                .all(char::is_uppercase)
        })
        .count();
    upper as f32 / words.len() as f32
}

/// Share of tokens found in the stop-word list.
pub fn stopword_ratio(tokens: &[String]) -> f32 {
    if tokens.is_empty() {
        return 0.0;
    }
    let stops = tokens
        .iter()
        .filter(|t| {
            let word = t
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            STOP_WORDS.contains(&word.as_str())
        })
        .count();
    stops as f32 / tokens.len() as f32
}

/// Mode of the sizes after rounding to `step`; ties go to the smaller size.
fn rounded_mode(sizes: &[f32], step: f32) -> f32 {
    let mut buckets: Vec<(i64, usize)> = Vec::new();
    for size in sizes {
        let key = (size / step).round() as i64;
        match buckets.iter_mut().find(|(k, _)| *k == key) {
            Some((_, count)) => *count += 1,
            None => buckets.push((key, 1)),
        }
    }
    buckets
        .into_iter()
        .max_by(|(key_a, count_a), (key_b, count_b)| count_a.cmp(count_b).then(key_b.cmp(key_a)))
        .map(|(key, _)| key as f32 * step)
        .unwrap_or(0.0)
}

/// Median of a non-empty sample (mean of the middle pair for even lengths).
pub(crate) fn median(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f32::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
