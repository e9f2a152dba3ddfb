//! Document decoding: PDF bytes into positioned text fragments.

mod options;
mod pdf;
mod source;

pub use options::{DecodeOptions, ErrorMode, PageSelection};
pub use pdf::{decode_text_simple, sniff_pdf, LopdfSource};
pub use source::{DecodedDocument, FragmentSource};
