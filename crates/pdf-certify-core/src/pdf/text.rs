use mupdf::TextPageOptions;
use tracing::debug;

use crate::error::{Error, Result};
use super::document::PdfDocument;

/// Plain-text extraction from PDF pages
pub struct TextExtractor<'a> {
    /// The PDF document to extract text from
    pub doc: &'a PdfDocument,
}

impl<'a> TextExtractor<'a> {
    pub const fn new(doc: &'a PdfDocument) -> Self {
        Self { doc }
    }

    /// Get plain text from a single page.
    ///
    /// Characters are emitted in reading order and every text line is
    /// terminated with `\n`.
    pub fn page_text(&self, page_num: usize) -> Result<String> {
        let total = self.doc.page_count();
        if page_num >= total {
            return Err(Error::DocumentRead(format!(
                "page {page_num} out of range (document has {total} pages)"
            )));
        }
        let page_index = i32::try_from(page_num).map_err(|_| {
            Error::DocumentRead(format!("page {page_num} out of range"))
        })?;

        let doc = self.doc.open_document()?;
        let page = doc.load_page(page_index).map_err(|e| {
            Error::DocumentRead(format!("Failed to load page {page_num}: {e}"))
        })?;

        let text_page = page.to_text_page(TextPageOptions::empty()).map_err(|e| {
            Error::DocumentRead(format!("Failed to get text of page {page_num}: {e}"))
        })?;

        let mut all_text = String::new();
        for block in text_page.blocks() {
            for line in block.lines() {
                for text_char in line.chars() {
                    if let Some(c) = text_char.char() {
                        all_text.push(c);
                    }
                }
                all_text.push('\n');
            }
        }

        Ok(all_text)
    }

    /// Concatenate the text of every page, in page order, without separators.
    pub fn extract_text(&self) -> Result<String> {
        let mut text = String::new();
        for page_num in 0..self.doc.page_count() {
            let page_text = self.page_text(page_num)?;
            debug!("Page {} yielded {} characters", page_num + 1, page_text.chars().count());
            text.push_str(&page_text);
        }
        Ok(text)
    }
}

/// Open the PDF at `path` and extract the text of all its pages.
///
/// The document handle is dropped before returning, on success and on error.
pub fn extract_text_from_pdf(path: impl AsRef<std::path::Path>) -> Result<String> {
    let doc = PdfDocument::from_file(path.as_ref())?;
    debug!("{} has {} pages", path.as_ref().display(), doc.page_count());
    TextExtractor::new(&doc).extract_text()
}
