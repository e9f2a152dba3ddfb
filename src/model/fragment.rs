//! Positioned text fragments as produced by a decoder.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in top-down page coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    /// Create a bounding box, normalising the corner order.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    /// Whether the box encloses no area (invisible or degenerate runs).
    pub fn is_empty(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Horizontal distance between the two boxes (0 when they overlap).
    pub fn horizontal_gap(&self, other: &BBox) -> f32 {
        (other.x0 - self.x1).max(self.x0 - other.x1).max(0.0)
    }
}

/// The smallest positioned text unit: one font run on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// The text content
    pub text: String,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Font size in points
    pub font_size: f32,
    /// Whether the run is set in a bold face
    pub bold: bool,
    /// Bounding box on the page
    pub bbox: BBox,
    /// Page index (0-based)
    pub page: usize,
}

impl Fragment {
    /// Create a fragment; boldness is inferred from the font name.
    pub fn new(
        text: impl Into<String>,
        font_name: impl Into<String>,
        font_size: f32,
        bbox: BBox,
        page: usize,
    ) -> Self {
        let font_name = font_name.into();
        let bold = is_bold_font_name(&font_name);
        Self {
            text: text.into(),
            font_name,
            font_size,
            bold,
            bbox,
            page,
        }
    }

    /// Override the inferred bold flag.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Number of characters, used for width and weight estimates.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Average glyph width, falling back to half the font size.
    pub fn avg_char_width(&self) -> f32 {
        let count = self.char_count();
        if count > 0 && self.bbox.width() > 0.0 {
            self.bbox.width() / count as f32
        } else {
            self.font_size * 0.5
        }
    }
}

/// Heuristic weight detection from a PostScript font name.
pub fn is_bold_font_name(font_name: &str) -> bool {
    let lower = font_name.to_lowercase();
    lower.contains("bold")
        || lower.contains("black")
        || lower.contains("heavy")
        || lower.contains("semibold")
        || lower.contains("demi")
}

/// The fragments of one page, in decoder-native order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageFragments {
    /// Page index (0-based)
    pub index: usize,
    /// Page width in points (0 when unknown)
    pub width: f32,
    /// Page height in points (0 when unknown)
    pub height: f32,
    /// Fragments in decoder order
    pub fragments: Vec<Fragment>,
}

impl PageFragments {
    /// Create an empty page with the given dimensions.
    pub fn new(index: usize, width: f32, height: f32) -> Self {
        Self {
            index,
            width,
            height,
            fragments: Vec::new(),
        }
    }

    /// Create a page with standard Letter size (8.5 x 11 inches).
    pub fn letter(index: usize) -> Self {
        Self::new(index, 612.0, 792.0)
    }

    /// Append a fragment, forcing its page index to this page.
    pub fn push(&mut self, mut fragment: Fragment) {
        fragment.page = self.index;
        self.fragments.push(fragment);
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}
