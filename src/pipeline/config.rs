//! Tunable heuristics for the structure-inference pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Named thresholds used by every pipeline stage.
///
/// The defaults are heuristic; each can be overridden through the builder
/// methods or a (partial) JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    /// Vertical tolerance for joining fragments, as a fraction of the smaller font size
    pub line_tolerance: f32,
    /// Maximum horizontal gap inside a line, in average character widths
    pub max_char_gap: f32,

    /// Rounding step for the body-size mode, in points
    pub body_size_step: f32,
    /// Half-width of the body cluster around the mode, in points
    pub body_cluster_radius: f32,
    /// Minimum line count for body-cluster filtering
    pub min_body_lines: usize,
    /// Floor for the median absolute deviation
    pub mad_floor: f32,

    /// Pages scanned for the title (1.5 = page 1 plus the top half of page 2)
    pub title_scan_pages: f32,
    /// Score distance within which neighbouring lines join the title
    pub title_tie_epsilon: f32,
    /// Maximum gap between title lines, in font sizes
    pub title_line_gap: f32,
    /// Use the document-info title when no title line is found
    pub metadata_title_fallback: bool,

    /// z-score that makes any line a candidate
    pub size_zscore: f32,
    /// z-score that makes a bold line a candidate
    pub bold_zscore: f32,
    /// Longest text accepted as a heading, in characters
    pub max_heading_chars: usize,

    /// Upper bound on heading levels (1..=3)
    pub max_levels: usize,
    /// Iteration cap for the clustering loop
    pub max_iterations: usize,

    /// Distinct pages a repeated line needs to count as a running header/footer
    pub running_header_min_pages: usize,
    /// Height of the top and bottom bands, as a fraction of the page
    pub running_band: f32,
    /// Deepest allowed step from one heading to the next
    pub max_level_jump: u8,
    /// Maximum gap for merging split headings, in font sizes
    pub merge_gap_factor: f32,
}

impl OutlineConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a JSON file; missing keys keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Parse a config from JSON; missing keys keep their defaults.
    pub fn from_json_str(data: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(data).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the size z-score threshold.
    pub fn with_size_zscore(mut self, z: f32) -> Self {
        self.size_zscore = z;
        self
    }

    /// Set the bold z-score threshold.
    pub fn with_bold_zscore(mut self, z: f32) -> Self {
        self.bold_zscore = z;
        self
    }

    /// Set the vertical tolerance for line grouping.
    pub fn with_line_tolerance(mut self, tolerance: f32) -> Self {
        self.line_tolerance = tolerance;
        self
    }

    /// Set the running header repetition count.
    pub fn with_running_header_min_pages(mut self, pages: usize) -> Self {
        self.running_header_min_pages = pages;
        self
    }

    /// Set the maximum level jump.
    pub fn with_max_level_jump(mut self, jump: u8) -> Self {
        self.max_level_jump = jump;
        self
    }

    /// Set the number of heading levels.
    pub fn with_max_levels(mut self, levels: usize) -> Self {
        self.max_levels = levels.clamp(1, 3);
        self
    }

    /// Set how many pages are scanned for the title.
    pub fn with_title_scan_pages(mut self, pages: f32) -> Self {
        self.title_scan_pages = pages;
        self
    }

    /// Enable or disable the document-info title fallback.
    pub fn with_metadata_title_fallback(mut self, enabled: bool) -> Self {
        self.metadata_title_fallback = enabled;
        self
    }

    /// Reject values that would make a stage meaningless.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("line_tolerance", self.line_tolerance),
            ("max_char_gap", self.max_char_gap),
            ("body_size_step", self.body_size_step),
            ("mad_floor", self.mad_floor),
            ("title_line_gap", self.title_line_gap),
            ("merge_gap_factor", self.merge_gap_factor),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::Config(format!("{} must be positive, got {}", name, value)));
            }
        }

        let non_negative = [
            ("body_cluster_radius", self.body_cluster_radius),
            ("title_scan_pages", self.title_scan_pages),
            ("title_tie_epsilon", self.title_tie_epsilon),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "{} must not be negative, got {}",
                    name, value
                )));
            }
        }

        if !self.size_zscore.is_finite() || !self.bold_zscore.is_finite() {
            return Err(Error::Config("z-score thresholds must be finite".to_string()));
        }
        if !(0.0..=0.5).contains(&self.running_band) {
            return Err(Error::Config(format!(
                "running_band must be within 0..=0.5, got {}",
                self.running_band
            )));
        }
        if !(1..=3).contains(&self.max_levels) {
            return Err(Error::Config(format!(
                "max_levels must be within 1..=3, got {}",
                self.max_levels
            )));
        }
        if self.max_level_jump == 0 {
            return Err(Error::Config("max_level_jump must be at least 1".to_string()));
        }
        if self.max_iterations == 0 || self.running_header_min_pages == 0 {
            return Err(Error::Config(
                "max_iterations and running_header_min_pages must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            line_tolerance: 0.4,
            max_char_gap: 3.0,
            body_size_step: 0.5,
            body_cluster_radius: 1.0,
            min_body_lines: 3,
            mad_floor: 0.5,
            title_scan_pages: 1.5,
            title_tie_epsilon: 1.0,
            title_line_gap: 1.5,
            metadata_title_fallback: false,
            size_zscore: 1.5,
            bold_zscore: 0.5,
            max_heading_chars: 200,
            max_levels: 3,
            max_iterations: 50,
            running_header_min_pages: 3,
            running_band: 0.1,
            max_level_jump: 1,
            merge_gap_factor: 0.5,
        }
    }
}
