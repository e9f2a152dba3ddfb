//! Structure inference: fragments in, outline out.
//!
//! Stages run in order: line aggregation, feature scoring, title selection,
//! candidate filtering, level clustering, validation.

pub mod aggregate;
pub mod candidates;
pub mod classify;
pub mod config;
pub mod features;
pub mod segment;
pub mod title;
pub mod validate;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregate::FragmentAggregator;
pub use candidates::{Candidate, CandidateFilter};
pub use classify::{Classification, LevelClassifier, LeveledHeading};
pub use config::OutlineConfig;
pub use features::{FeatureScorer, PageStats, ScoredLine};
pub use segment::{ScriptAwareSegmenter, Segmenter, WhitespaceSegmenter};
pub use title::{TitleSelection, TitleSelector};
pub use validate::{OutlineValidator, Validated};

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::model::{HeadingLevel, Outline, PageFragments};

/// Non-fatal event raised while building an outline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// Fewer distinct candidate sizes than levels
    DegenerateClustering { distinct_sizes: usize, levels: usize },
    /// A heading's level was changed to keep nesting monotonic
    CoercionApplied {
        text: String,
        page: u32,
        from: HeadingLevel,
        to: HeadingLevel,
    },
    /// A repeated header/footer text was removed
    RunningHeaderDropped {
        text: String,
        pages: usize,
        occurrences: usize,
    },
    /// Consecutive heading lines were joined
    HeadingsMerged { text: String, page: u32 },
    /// The document produced no text
    EmptyDocument,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::DegenerateClustering {
                distinct_sizes,
                levels,
            } => write!(
                f,
                "only {} distinct heading size(s) for {} levels",
                distinct_sizes, levels
            ),
            Notice::CoercionApplied {
                text,
                page,
                from,
                to,
            } => write!(f, "{:?} on page {}: {} -> {}", text, page, from, to),
            Notice::RunningHeaderDropped {
                text,
                pages,
                occurrences,
            } => write!(
                f,
                "dropped running header {:?} ({} occurrences on {} pages)",
                text, occurrences, pages
            ),
            Notice::HeadingsMerged { text, page } => {
                write!(f, "merged heading {:?} on page {}", text, page)
            }
            Notice::EmptyDocument => write!(f, "document has no text"),
        }
    }
}

/// An outline together with the notices raised while building it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutlineReport {
    pub outline: Outline,
    pub notices: Vec<Notice>,
}

impl OutlineReport {
    pub fn has_notice(&self, predicate: impl Fn(&Notice) -> bool) -> bool {
        self.notices.iter().any(predicate)
    }
}

/// The structure-inference pipeline.
///
/// Holds only configuration; a single instance can serve many documents
/// across threads.
#[derive(Clone, Default)]
pub struct Pipeline {
    config: OutlineConfig,
    segmenter: Option<Arc<dyn Segmenter>>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("segmenter", &self.segmenter.as_ref().map(|s| s.name()))
            .finish()
    }
}

impl Pipeline {
    pub fn new(config: OutlineConfig) -> Self {
        Self {
            config,
            segmenter: None,
        }
    }

    pub fn with_config(mut self, config: OutlineConfig) -> Self {
        self.config = config;
        self
    }

    /// Inject a word segmenter for the uppercase/stop-word features.
    pub fn with_segmenter(mut self, segmenter: Arc<dyn Segmenter>) -> Self {
        self.segmenter = Some(segmenter);
        self
    }

    pub fn config(&self) -> &OutlineConfig {
        &self.config
    }

    /// Build the outline of one document.
    ///
    /// `metadata_title` is only consulted when the metadata fallback is
    /// enabled and no title line qualifies.
    pub fn run(&self, pages: &[PageFragments], metadata_title: Option<&str>) -> OutlineReport {
        let config = &self.config;
        let aggregator = FragmentAggregator::new(config);
        let scorer = FeatureScorer::new(self.segmenter.as_deref());

        let mut lines: Vec<ScoredLine> = Vec::new();
        for page in pages {
            let page_lines = aggregator.aggregate(page);
            if page_lines.is_empty() {
                continue;
            }
            let stats = PageStats::from_lines(&page_lines, config);
            let height = if page.height > 0.0 {
                page.height
            } else {
                page_lines
                    .iter()
                    .map(|l| l.bottom())
                    .fold(0.0f32, f32::max)
            };
            log::debug!(
                "Page {}: body {:.1}pt (median {:.2}, MAD {:.2})",
                page.index,
                stats.body_size,
                stats.median,
                stats.mad
            );

            for line in page_lines {
                let ordinal = lines.len();
                lines.push(scorer.score(line, ordinal, &stats, height));
            }
        }

        if lines.is_empty() {
            log::info!("No text found in {} page(s)", pages.len());
            return OutlineReport {
                outline: Outline::default(),
                notices: vec![Notice::EmptyDocument],
            };
        }

        let mut notices = Vec::new();

        let running: HashSet<String> = validate::running_headers(&lines, config)
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        let selection = TitleSelector::new(config).skipping(&running).select(&lines);
        let candidates = CandidateFilter::new(config).filter(&lines, &selection);

        let classification = LevelClassifier::new(config).classify(candidates);
        if !classification.headings.is_empty() && classification.is_degenerate(config.max_levels)
        {
            notices.push(Notice::DegenerateClustering {
                distinct_sizes: classification.distinct_sizes,
                levels: config.max_levels,
            });
        }

        let validated = OutlineValidator::new(config).validate(&classification.headings);
        notices.extend(validated.notices);

        let mut title = selection.text;
        if title.is_empty() && config.metadata_title_fallback {
            if let Some(meta) = metadata_title.map(crate::text::normalize) {
                if !meta.is_empty() {
                    log::debug!("Using document info title {:?}", meta);
                    title = meta;
                }
            }
        }

        log::info!(
            "Outline: title {:?}, {} entries",
            title,
            validated.entries.len()
        );

        OutlineReport {
            outline: Outline::new(title, validated.entries),
            notices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Fragment, OutlineEntry};

    fn page_with(index: usize, lines: &[(&str, f32, bool, f32)]) -> PageFragments {
        let mut page = PageFragments::letter(index);
        for (text, size, bold, y) in lines {
            let width = text.chars().count() as f32 * size * 0.5;
            page.push(
                Fragment::new(*text, "Helvetica", *size, BBox::new(72.0, *y, 72.0 + width, y + size), index)
                    .with_bold(*bold),
            );
        }
        page
    }

    #[test]
    fn test_empty_document() {
        let report = Pipeline::default().run(&[], None);
        assert_eq!(report.outline, Outline::default());
        assert_eq!(report.notices, vec![Notice::EmptyDocument]);

        let report = Pipeline::default().run(&[PageFragments::letter(0)], None);
        assert!(report.outline.is_empty());
        assert!(report.outline.title.is_empty());
    }

    #[test]
    fn test_single_candidate_becomes_h1() {
        let page = page_with(
            0,
            &[
                ("Annual Report", 24.0, true, 60.0),
                ("Methods", 16.0, true, 200.0),
                ("body text one", 11.0, false, 230.0),
                ("body text two", 11.0, false, 245.0),
                ("body text three", 11.0, false, 260.0),
            ],
        );
        let report = Pipeline::default().run(&[page], None);

        assert_eq!(report.outline.title, "Annual Report");
        assert_eq!(
            report.outline.outline,
            vec![OutlineEntry::new(HeadingLevel::H1, "Methods", 1)]
        );
        assert!(report.has_notice(|n| matches!(n, Notice::DegenerateClustering { .. })));
    }

    #[test]
    fn test_metadata_title_fallback() {
        // nothing readable on page 0 or the top half of page 1
        let pages = [
            PageFragments::letter(0),
            page_with(1, &[("Figure caption", 11.0, false, 600.0)]),
        ];

        let plain = Pipeline::default().run(&pages, Some("Info  Title"));
        assert!(plain.outline.title.is_empty());

        let pipeline =
            Pipeline::new(OutlineConfig::default().with_metadata_title_fallback(true));
        let report = pipeline.run(&pages, Some("Info  Title"));
        assert_eq!(report.outline.title, "Info Title");

        let report = pipeline.run(&pages, Some("   "));
        assert!(report.outline.title.is_empty());
    }

    #[test]
    fn test_notice_display() {
        let notice = Notice::CoercionApplied {
            text: "Details".to_string(),
            page: 2,
            from: HeadingLevel::H3,
            to: HeadingLevel::H2,
        };
        assert_eq!(notice.to_string(), "\"Details\" on page 2: H3 -> H2");
    }
}
