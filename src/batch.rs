//! Directory batch processing.
//!
//! Every `*.pdf` in the input directory becomes `<output>/<stem>.json`.
//! Documents are independent; a failure is recorded and the batch goes on.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::pipeline::Notice;
use crate::render::{to_json, JsonFormat};
use crate::OutlineExtractor;

/// Options for [`process_directory`].
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Decoder and pipeline settings applied to every document
    pub extractor: OutlineExtractor,
    /// JSON layout of the written artifacts
    pub format: JsonFormat,
    /// Process documents in parallel (one document per worker)
    pub parallel: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            extractor: OutlineExtractor::default(),
            format: JsonFormat::Pretty,
            parallel: true,
        }
    }
}

impl BatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extractor(mut self, extractor: OutlineExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// Outcome for one input document.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentStatus {
    /// The artifact was written
    Written { output: PathBuf, entries: usize },
    /// Decoding or writing failed; no artifact exists
    Failed { error: String },
}

#[derive(Debug, Clone)]
pub struct DocumentReport {
    pub input: PathBuf,
    pub status: DocumentStatus,
    pub notices: Vec<Notice>,
}

impl DocumentReport {
    pub fn is_success(&self) -> bool {
        matches!(self.status, DocumentStatus::Written { .. })
    }
}

/// Per-document results, in input path order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub documents: Vec<DocumentReport>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.documents.iter().filter(|d| d.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.documents.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DocumentReport> {
        self.documents.iter().filter(|d| !d.is_success())
    }
}

/// List PDF files (case-insensitive extension) directly inside `dir`, sorted.
pub fn collect_inputs<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::Other(format!("Not a directory: {}", dir.display())));
    }

    let mut inputs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if is_pdf && path.is_file() {
            inputs.push(path);
        }
    }
    inputs.sort();
    Ok(inputs)
}

/// Artifact path for an input: `<output>/<stem>.json`.
pub fn output_path(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    output_dir.join(format!("{}.json", stem))
}

/// Process every PDF in `input_dir`, writing outlines into `output_dir`.
///
/// `on_done` is called once per document as it finishes (from worker
/// threads when parallel). Only directory-level I/O errors are returned;
/// per-document failures land in the report.
pub fn process_directory<F>(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    options: &BatchOptions,
    on_done: F,
) -> Result<BatchReport>
where
    F: Fn(&DocumentReport) + Sync,
{
    let inputs = collect_inputs(input_dir)?;
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;

    log::info!(
        "Processing {} document(s) into {} ({})",
        inputs.len(),
        output_dir.display(),
        if options.parallel { "parallel" } else { "sequential" }
    );

    let run = |input: &PathBuf| {
        let report = process_one(input, output_dir, options);
        on_done(&report);
        report
    };

    let documents: Vec<DocumentReport> = if options.parallel {
        inputs.par_iter().map(run).collect()
    } else {
        inputs.iter().map(run).collect()
    };

    let report = BatchReport { documents };
    log::info!(
        "Batch finished: {} written, {} failed",
        report.succeeded(),
        report.failed()
    );
    Ok(report)
}

fn process_one(input: &Path, output_dir: &Path, options: &BatchOptions) -> DocumentReport {
    let output = output_path(input, output_dir);
    let result = options.extractor.extract_file(input).and_then(|report| {
        let json = to_json(&report.outline, options.format)?;
        fs::write(&output, json + "\n")?;
        Ok(report)
    });

    match result {
        Ok(report) => DocumentReport {
            input: input.to_path_buf(),
            status: DocumentStatus::Written {
                output,
                entries: report.outline.len(),
            },
            notices: report.notices,
        },
        Err(e) => {
            log::warn!("Failed to process {}: {}", input.display(), e);
            DocumentReport {
                input: input.to_path_buf(),
                status: DocumentStatus::Failed {
                    error: e.to_string(),
                },
                notices: Vec::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path() {
        let path = output_path(Path::new("/in/Report.Final.PDF"), Path::new("/out"));
        assert_eq!(path, PathBuf::from("/out/Report.Final.json"));
    }

    #[test]
    fn test_batch_options_builder() {
        let options = BatchOptions::new().sequential().with_format(JsonFormat::Compact);
        assert!(!options.parallel);
        assert_eq!(options.format, JsonFormat::Compact);
        assert!(BatchOptions::default().parallel);
    }

    #[test]
    fn test_collect_inputs_requires_directory() {
        assert!(collect_inputs("/definitely/not/here").is_err());
    }
}
