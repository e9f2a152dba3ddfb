//! The boundary between document decoding and structure inference.

use crate::error::Result;
use crate::model::PageFragments;

use super::DecodeOptions;

/// Decoder output: per-page fragments plus document metadata.
#[derive(Debug, Clone, Default)]
pub struct DecodedDocument {
    /// Decoded pages in document order
    pub pages: Vec<PageFragments>,
    /// Document-info title, if present
    pub metadata_title: Option<String>,
    /// Total pages in the document (decoded or not)
    pub page_count: u32,
}

impl DecodedDocument {
    /// Total fragments across all decoded pages.
    pub fn fragment_count(&self) -> usize {
        self.pages.iter().map(|p| p.fragments.len()).sum()
    }
}

/// Anything that can produce positioned text fragments page by page.
pub trait FragmentSource {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Document-info title, if any.
    fn metadata_title(&self) -> Option<String>;

    /// Decode one page (1-indexed).
    fn decode_page(&self, page_num: u32) -> Result<PageFragments>;

    /// Decode the selected pages.
    ///
    /// In lenient mode a page that fails to decode is logged and skipped.
    fn decode(&self, options: &DecodeOptions) -> Result<DecodedDocument> {
        let page_count = self.page_count();
        let mut pages = Vec::new();

        for page_num in (1..=page_count).filter(|p| options.pages.includes(*p)) {
            if options.max_pages > 0 && pages.len() as u32 >= options.max_pages {
                log::debug!("Stopping at max_pages={}", options.max_pages);
                break;
            }
            match self.decode_page(page_num) {
                Ok(page) => pages.push(page),
                Err(e) if options.is_lenient() => {
                    log::warn!("Skipping page {}: {}", page_num, e);
                }
                Err(e) => return Err(e),
            }
        }

        let document = DecodedDocument {
            pages,
            metadata_title: self.metadata_title(),
            page_count,
        };
        log::debug!(
            "Decoded {} of {} pages ({} fragments)",
            document.pages.len(),
            page_count,
            document.fragment_count()
        );
        Ok(document)
    }
}
