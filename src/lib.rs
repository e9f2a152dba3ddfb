//! # pdfoutline
//!
//! Infers a document outline (title plus H1–H3 headings with page numbers)
//! from the positioned text of a PDF.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfoutline::{extract_outline_file, render};
//!
//! fn main() -> pdfoutline::Result<()> {
//!     let outline = extract_outline_file("document.pdf")?;
//!     println!("{}", render::to_json(&outline, render::JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Stages
//!
//! - **Decode**: `lopdf` content streams into per-page text fragments
//! - **Aggregate**: fragments into visual lines
//! - **Score**: font size against each page's body text, weight, casing
//! - **Classify**: title selection, heading candidates, k-means levels
//! - **Validate**: running headers, level nesting, wrapped headings
//!
//! The pipeline itself never fails; only decoding and I/O return errors.

pub mod batch;
pub mod decode;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod text;

pub use batch::{BatchOptions, BatchReport, DocumentReport, DocumentStatus};
pub use decode::{
    DecodeOptions, DecodedDocument, ErrorMode, FragmentSource, LopdfSource, PageSelection,
};
pub use error::{Error, Result};
pub use model::{BBox, Fragment, HeadingLevel, Line, Outline, OutlineEntry, PageFragments};
pub use pipeline::{
    Notice, OutlineConfig, OutlineReport, Pipeline, ScriptAwareSegmenter, Segmenter,
    WhitespaceSegmenter,
};
pub use render::{JsonFormat, OutputFormat};

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

/// Extract the outline of a PDF file with default settings.
///
/// # Example
///
/// ```no_run
/// let outline = pdfoutline::extract_outline_file("document.pdf").unwrap();
/// println!("{} headings", outline.len());
/// ```
pub fn extract_outline_file<P: AsRef<Path>>(path: P) -> Result<Outline> {
    Ok(OutlineExtractor::new().extract_file(path)?.outline)
}

/// Extract the outline of an in-memory PDF with default settings.
pub fn extract_outline_bytes(data: &[u8]) -> Result<Outline> {
    Ok(OutlineExtractor::new().extract_bytes(data)?.outline)
}

/// Extract the outline of a PDF read from `reader`.
pub fn extract_outline_reader<R: Read>(reader: R) -> Result<Outline> {
    let source = LopdfSource::load_reader(reader)?;
    Ok(OutlineExtractor::new().extract_source(&source)?.outline)
}

/// Read and process a file on the tokio blocking pool.
#[cfg(feature = "async")]
pub async fn extract_outline_file_async<P: AsRef<Path>>(
    path: P,
    extractor: OutlineExtractor,
) -> Result<OutlineReport> {
    let data = tokio::fs::read(path).await?;
    tokio::task::spawn_blocking(move || extractor.extract_bytes(&data))
        .await
        .map_err(|e| Error::Other(format!("Extraction task failed: {}", e)))?
}

/// Builder tying decoding options to a configured pipeline.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::{OutlineConfig, OutlineExtractor};
///
/// let report = OutlineExtractor::new()
///     .with_config(OutlineConfig::default().with_size_zscore(2.0))
///     .lenient()
///     .extract_file("document.pdf")?;
/// for notice in &report.notices {
///     eprintln!("{}", notice);
/// }
/// # Ok::<(), pdfoutline::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct OutlineExtractor {
    pipeline: Pipeline,
    decode: DecodeOptions,
}

impl OutlineExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pipeline configuration.
    pub fn with_config(mut self, config: OutlineConfig) -> Self {
        self.pipeline = self.pipeline.with_config(config);
        self
    }

    /// Inject a word segmenter.
    pub fn with_segmenter(mut self, segmenter: Arc<dyn Segmenter>) -> Self {
        self.pipeline = self.pipeline.with_segmenter(segmenter);
        self
    }

    pub fn with_decode_options(mut self, options: DecodeOptions) -> Self {
        self.decode = options;
        self
    }

    /// Skip undecodable pages instead of failing.
    pub fn lenient(mut self) -> Self {
        self.decode = self.decode.lenient();
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.decode = self.decode.with_pages(pages);
        self
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn decode_options(&self) -> &DecodeOptions {
        &self.decode
    }

    /// Decode and process a PDF file.
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> Result<OutlineReport> {
        let path = path.as_ref();
        log::debug!("Extracting outline from {}", path.display());
        let source = LopdfSource::load_file(path)?;
        self.extract_source(&source)
    }

    /// Decode and process an in-memory PDF.
    pub fn extract_bytes(&self, data: &[u8]) -> Result<OutlineReport> {
        let source = LopdfSource::load_bytes(data)?;
        self.extract_source(&source)
    }

    /// Process any fragment source.
    pub fn extract_source(&self, source: &dyn FragmentSource) -> Result<OutlineReport> {
        let document = source.decode(&self.decode)?;
        Ok(self
            .pipeline
            .run(&document.pages, document.metadata_title.as_deref()))
    }
}
