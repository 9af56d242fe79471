use std::path::Path;
use std::sync::Arc;

use mupdf::Document as MuDocument;

use crate::error::{Error, Result};

/// A source PDF loaded into memory
pub struct PdfDocument {
    /// The raw PDF bytes
    bytes: Arc<Vec<u8>>,
    /// Number of pages
    page_count: usize,
}

impl PdfDocument {
    /// Open a PDF from bytes
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();

        // The handle only lives long enough to validate and count pages
        let doc = MuDocument::from_bytes(&bytes, "")
            .map_err(|e| Error::DocumentRead(format!("Failed to parse PDF: {e}")))?;

        let page_count = doc
            .page_count()
            .map_err(|e| Error::DocumentRead(format!("Failed to get page count: {e}")))?;

        let page_count = usize::try_from(page_count).unwrap_or(0);
        if page_count == 0 {
            return Err(Error::DocumentRead("document has no pages".to_string()));
        }

        Ok(Self {
            bytes: Arc::new(bytes),
            page_count,
        })
    }

    /// Open a PDF from a file path
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref()).map_err(|e| {
            Error::DocumentRead(format!("Failed to read file {}: {}", path.as_ref().display(), e))
        })?;
        Self::from_bytes(bytes)
    }

    /// Get number of pages
    pub const fn page_count(&self) -> usize {
        self.page_count
    }

    /// Get raw PDF bytes as a slice.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Open the document for operations (creates a temporary handle)
    pub(crate) fn open_document(&self) -> Result<MuDocument> {
        MuDocument::from_bytes(&self.bytes, "")
            .map_err(|e| Error::DocumentRead(format!("Failed to open document: {e}")))
    }
}

impl Clone for PdfDocument {
    /// O(1): only the `Arc` around the bytes is cloned.
    fn clone(&self) -> Self {
        Self {
            bytes: Arc::clone(&self.bytes),
            page_count: self.page_count,
        }
    }
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("page_count", &self.page_count)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}
