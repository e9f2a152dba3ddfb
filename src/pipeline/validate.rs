//! Outline validation and repair.
//!
//! One forward pass over leveled headings in reading order:
//! running header/footer removal, level coercion, then adjacent merge.

use std::collections::{HashMap, HashSet};

use crate::model::{HeadingLevel, OutlineEntry};
use crate::text::comparison_key;

use super::classify::LeveledHeading;
use super::features::ScoredLine;
use super::{Notice, OutlineConfig};

/// Validated outline entries plus what was changed on the way.
#[derive(Debug, Clone, Default)]
pub struct Validated {
    pub entries: Vec<OutlineEntry>,
    pub notices: Vec<Notice>,
}

/// Entry under construction; keeps geometry for the merge test.
struct Pending {
    entry: OutlineEntry,
    /// Level assigned by the classifier, before coercion
    classified: HeadingLevel,
    ordinal: usize,
    bottom: f32,
}

/// Page band a line sits in for running header/footer detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Band {
    Top,
    Bottom,
}

impl Band {
    fn of(relative_y: f32, band: f32) -> Option<Band> {
        if relative_y <= band {
            Some(Band::Top)
        } else if relative_y >= 1.0 - band {
            Some(Band::Bottom)
        } else {
            None
        }
    }
}

/// Comparison keys of texts repeated in the same band (top or bottom) on
/// at least `running_header_min_pages` distinct pages, with their page
/// counts, in first-seen order.
pub(crate) fn running_headers<'l>(
    lines: impl IntoIterator<Item = &'l ScoredLine>,
    config: &OutlineConfig,
) -> Vec<(String, usize)> {
    let mut pages_by_slot: HashMap<(String, Band), HashSet<usize>> = HashMap::new();
    let mut first_seen: Vec<(String, Band)> = Vec::new();

    for line in lines {
        let Some(band) = Band::of(line.relative_y, config.running_band) else {
            continue;
        };
        let key = comparison_key(&line.line.text);
        if key.is_empty() {
            continue;
        }
        let slot = (key, band);
        let pages = pages_by_slot.entry(slot.clone()).or_default();
        if pages.is_empty() {
            first_seen.push(slot);
        }
        pages.insert(line.line.page);
    }

    let mut running: Vec<(String, usize)> = Vec::new();
    for slot in first_seen {
        let pages = pages_by_slot[&slot].len();
        if pages >= config.running_header_min_pages && !running.iter().any(|(k, _)| *k == slot.0) {
            running.push((slot.0, pages));
        }
    }
    running
}

pub struct OutlineValidator<'a> {
    config: &'a OutlineConfig,
}

impl<'a> OutlineValidator<'a> {
    pub fn new(config: &'a OutlineConfig) -> Self {
        Self { config }
    }

    pub fn validate(&self, headings: &[LeveledHeading]) -> Validated {
        let mut notices = Vec::new();
        let running = self.running_keys(headings, &mut notices);

        let mut accepted: Vec<Pending> = Vec::new();
        let mut previous: Option<HeadingLevel> = None;

        for heading in headings {
            let text = heading.candidate.text().trim();
            if running.contains(&comparison_key(text)) {
                continue;
            }

            let line = &heading.candidate.line;
            let page = line.line.page as u32 + 1;
            if let Some(last) = accepted.last_mut() {
                if self.should_merge(last, heading) {
                    last.entry.text.push(' ');
                    last.entry.text.push_str(text);
                    last.ordinal = line.ordinal;
                    last.bottom = line.line.bottom();
                    notices.push(Notice::HeadingsMerged {
                        text: last.entry.text.clone(),
                        page,
                    });
                    continue;
                }
            }

            let level = self.coerce(heading.level, previous);
            if level != heading.level {
                notices.push(Notice::CoercionApplied {
                    text: text.to_string(),
                    page,
                    from: heading.level,
                    to: level,
                });
            }
            previous = Some(level);

            accepted.push(Pending {
                entry: OutlineEntry::new(level, text, page),
                classified: heading.level,
                ordinal: line.ordinal,
                bottom: line.line.bottom(),
            });
        }

        log::debug!(
            "Validated outline: {} of {} headings kept, {} notices",
            accepted.len(),
            headings.len(),
            notices.len()
        );

        Validated {
            entries: accepted.into_iter().map(|p| p.entry).collect(),
            notices,
        }
    }

    /// Running header/footer keys among the headings, with a notice each.
    fn running_keys(&self, headings: &[LeveledHeading], notices: &mut Vec<Notice>) -> HashSet<String> {
        let found = running_headers(headings.iter().map(|h| &h.candidate.line), self.config);

        let mut running = HashSet::new();
        for (key, pages) in found {
            let occurrences = headings
                .iter()
                .filter(|h| comparison_key(h.candidate.text()) == key)
                .count();
            log::debug!("Dropping running header {:?} ({} pages)", key, pages);
            notices.push(Notice::RunningHeaderDropped {
                text: key.clone(),
                pages,
                occurrences,
            });
            running.insert(key);
        }
        running
    }

    fn coerce(&self, level: HeadingLevel, previous: Option<HeadingLevel>) -> HeadingLevel {
        match previous {
            None => HeadingLevel::H1,
            Some(prev) => {
                let limit = prev.depth().saturating_add(self.config.max_level_jump);
                if level.depth() > limit {
                    HeadingLevel::from_depth(limit)
                } else {
                    level
                }
            }
        }
    }

    /// Compares classifier levels, not coerced ones.
    fn should_merge(&self, last: &Pending, heading: &LeveledHeading) -> bool {
        let line = &heading.candidate.line;
        if last.classified != heading.level
            || last.entry.page != line.line.page as u32 + 1
            || line.ordinal != last.ordinal + 1
        {
            return false;
        }
        let gap = line.line.top() - last.bottom;
        gap < self.config.merge_gap_factor * line.line.font_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::candidates::Candidate;
    use crate::pipeline::testing::scored;

    fn heading(text: &str, level: HeadingLevel, page: usize, y: f32, ordinal: usize) -> LeveledHeading {
        LeveledHeading {
            candidate: Candidate {
                line: scored(text, 16.0, true, page, y, ordinal, 11.0),
            },
            level,
        }
    }

    fn summary(validated: &Validated) -> Vec<(HeadingLevel, &str, u32)> {
        validated
            .entries
            .iter()
            .map(|e| (e.level, e.text.as_str(), e.page))
            .collect()
    }

    #[test]
    fn test_running_header_dropped_everywhere() {
        use HeadingLevel::*;
        let config = OutlineConfig::default();
        let mut headings = Vec::new();
        for page in 0..5 {
            headings.push(heading("Confidential Draft", H1, page, 20.0, page * 10));
            headings.push(heading(&format!("Section {}", page + 1), H1, page, 300.0, page * 10 + 3));
        }
        let validated = OutlineValidator::new(&config).validate(&headings);

        assert_eq!(validated.entries.len(), 5);
        assert!(validated
            .entries
            .iter()
            .all(|e| !e.text.contains("Confidential")));
        assert!(validated.notices.iter().any(|n| matches!(
            n,
            Notice::RunningHeaderDropped { pages: 5, occurrences: 5, .. }
        )));
    }

    #[test]
    fn test_repeated_text_in_body_is_kept() {
        use HeadingLevel::*;
        let config = OutlineConfig::default();
        let headings: Vec<LeveledHeading> = (0..4)
            .map(|page| heading("Summary", H2, page, 400.0, page * 5))
            .collect();
        let validated = OutlineValidator::new(&config).validate(&headings);
        assert_eq!(validated.entries.len(), 4);
    }

    #[test]
    fn test_dedupe_is_idempotent() {
        use HeadingLevel::*;
        let config = OutlineConfig::default();
        let validator = OutlineValidator::new(&config);
        let mut headings = Vec::new();
        for page in 0..3 {
            headings.push(heading("ACME Corp", H2, page, 760.0, page * 4));
            headings.push(heading("Part", H1, page, 200.0, page * 4 + 1));
        }
        let once = validator.validate(&headings);

        let survivors: Vec<LeveledHeading> = headings
            .iter()
            .filter(|h| h.candidate.text() != "ACME Corp")
            .cloned()
            .collect();
        let twice = validator.validate(&survivors);

        assert_eq!(summary(&once), summary(&twice));
    }

    #[test]
    fn test_first_entry_coerced_to_h1() {
        use HeadingLevel::*;
        let config = OutlineConfig::default();
        let validated =
            OutlineValidator::new(&config).validate(&[heading("Details", H3, 0, 300.0, 0)]);

        assert_eq!(summary(&validated), vec![(H1, "Details", 1)]);
        assert!(matches!(
            validated.notices[0],
            Notice::CoercionApplied { from: H3, to: H1, .. }
        ));
    }

    #[test]
    fn test_level_jump_limited_to_one() {
        use HeadingLevel::*;
        let config = OutlineConfig::default();
        let validated = OutlineValidator::new(&config).validate(&[
            heading("One", H1, 0, 100.0, 0),
            heading("Three", H3, 0, 300.0, 5),
            heading("Two", H2, 0, 500.0, 9),
            heading("Again", H1, 1, 100.0, 12),
        ]);

        assert_eq!(
            summary(&validated),
            vec![(H1, "One", 1), (H2, "Three", 1), (H2, "Two", 1), (H1, "Again", 2)]
        );
    }

    #[test]
    fn test_merges_wrapped_heading() {
        use HeadingLevel::*;
        let config = OutlineConfig::default();
        // 16pt lines at y=100..116 and y=120..136: gap 4 < 8
        let validated = OutlineValidator::new(&config).validate(&[
            heading("A Very Long Heading That", H1, 0, 100.0, 0),
            heading("Wraps Onto Two Lines", H1, 0, 120.0, 1),
        ]);

        assert_eq!(
            summary(&validated),
            vec![(H1, "A Very Long Heading That Wraps Onto Two Lines", 1)]
        );
    }

    #[test]
    fn test_merges_wrapped_heading_after_coercion() {
        use HeadingLevel::*;
        let config = OutlineConfig::default();
        // second half starts 2pt below the first: 316 -> 318
        let validated = OutlineValidator::new(&config).validate(&[
            heading("Chapter", H1, 0, 100.0, 0),
            heading("A Long Wrapped", H3, 0, 300.0, 5),
            heading("Section Title", H3, 0, 318.0, 6),
        ]);

        assert_eq!(
            summary(&validated),
            vec![(H1, "Chapter", 1), (H2, "A Long Wrapped Section Title", 1)]
        );
        assert!(validated
            .notices
            .iter()
            .any(|n| matches!(n, Notice::HeadingsMerged { .. })));
    }

    #[test]
    fn test_running_header_needs_same_band() {
        use HeadingLevel::*;
        let config = OutlineConfig::default();
        // top of pages 1 and 2, bottom of page 3
        let validated = OutlineValidator::new(&config).validate(&[
            heading("Summary", H1, 0, 20.0, 0),
            heading("Summary", H1, 1, 20.0, 10),
            heading("Summary", H1, 2, 760.0, 20),
        ]);

        assert_eq!(validated.entries.len(), 3);
        assert!(!validated
            .notices
            .iter()
            .any(|n| matches!(n, Notice::RunningHeaderDropped { .. })));
    }

    #[test]
    fn test_running_footer_on_bottom_band() {
        use HeadingLevel::*;
        let config = OutlineConfig::default();
        let headings: Vec<LeveledHeading> = (0..3)
            .map(|page| heading("Company Confidential", H2, page, 760.0, page * 3))
            .collect();
        let validated = OutlineValidator::new(&config).validate(&headings);

        assert!(validated.entries.is_empty());
    }

    #[test]
    fn test_no_merge_across_body_line_or_large_gap() {
        use HeadingLevel::*;
        let config = OutlineConfig::default();
        let validated = OutlineValidator::new(&config).validate(&[
            heading("First", H1, 0, 100.0, 0),
            // a body line sits at ordinal 1
            heading("Second", H1, 0, 120.0, 2),
            heading("Third", H1, 0, 300.0, 3),
        ]);
        assert_eq!(validated.entries.len(), 3);
    }

    #[test]
    fn test_empty_input() {
        let config = OutlineConfig::default();
        let validated = OutlineValidator::new(&config).validate(&[]);
        assert!(validated.entries.is_empty());
        assert!(validated.notices.is_empty());
    }
}
