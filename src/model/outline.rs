//! Outline types: the terminal artifact of a pipeline run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Heading hierarchy level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// All levels, shallowest first.
    pub const ALL: [HeadingLevel; 3] = [HeadingLevel::H1, HeadingLevel::H2, HeadingLevel::H3];

    /// Nesting depth (H1 = 1).
    pub fn depth(self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }

    /// Level for a depth, clamped into 1..=3.
    pub fn from_depth(depth: u8) -> Self {
        match depth {
            0 | 1 => HeadingLevel::H1,
            2 => HeadingLevel::H2,
            _ => HeadingLevel::H3,
        }
    }

    /// Level for a 0-based rank (rank 0 = H1), or `None` past H3.
    pub fn from_rank(rank: usize) -> Option<Self> {
        Self::ALL.get(rank).copied()
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}", self.depth())
    }
}

/// A single heading in the final outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    /// Heading level
    pub level: HeadingLevel,
    /// Heading text
    pub text: String,
    /// Page number (1-indexed)
    pub page: u32,
}

impl OutlineEntry {
    pub fn new(level: HeadingLevel, text: impl Into<String>, page: u32) -> Self {
        Self {
            level,
            text: text.into(),
            page,
        }
    }
}

/// Document title plus headings in reading order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    /// Document title (empty when none was found)
    pub title: String,
    /// Headings in reading order
    pub outline: Vec<OutlineEntry>,
}

impl Outline {
    /// Create an outline.
    pub fn new(title: impl Into<String>, outline: Vec<OutlineEntry>) -> Self {
        Self {
            title: title.into(),
            outline,
        }
    }

    /// Check if the outline has no headings.
    pub fn is_empty(&self) -> bool {
        self.outline.is_empty()
    }

    /// Number of headings.
    pub fn len(&self) -> usize {
        self.outline.len()
    }

    /// Count headings per level (H1, H2, H3).
    pub fn level_counts(&self) -> [usize; 3] {
        let mut counts = [0; 3];
        for entry in &self.outline {
            counts[(entry.level.depth() - 1) as usize] += 1;
        }
        counts
    }
}
