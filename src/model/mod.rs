//! Data model shared by the decoder, the pipeline, and the renderers.
//!
//! Fragments and pages come in from a decoder, lines are built by the
//! aggregator, and an [`Outline`] goes out to the renderers.

mod fragment;
mod line;
mod outline;

pub use fragment::{is_bold_font_name, BBox, Fragment, PageFragments};
pub use line::Line;
pub use outline::{HeadingLevel, Outline, OutlineEntry};
