//! PDF text extraction using lopdf and pdf-extract.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use lopdf::Document;
use tracing::{debug, trace};

use super::{PageSource, Result};
use crate::error::PdfError;

/// PDF page text extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract page texts from PDF bytes.
    pub fn page_texts_from_mem(&self, data: &[u8]) -> Result<Vec<Option<String>>> {
        let data = self.prepare(data)?;

        // pdf-extract panics on some documents lopdf accepts (undefined fonts, odd encodings)
        let pages = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(&data)
        }))
        .map_err(|payload| {
            PdfError::TextExtraction(format!("extractor panicked: {}", panic_message(payload.as_ref())))
        })?
        .map_err(|e| PdfError::TextExtraction(e.to_string()))?;

        let texts: Vec<Option<String>> = pages
            .into_iter()
            .map(|text| if text.is_empty() { None } else { Some(text) })
            .collect();

        debug!(
            "Extracted text from {} of {} pages",
            texts.iter().filter(|t| t.is_some()).count(),
            texts.len()
        );
        Ok(texts)
    }

    /// Parse the document structure, decrypting it when it uses an empty password.
    ///
    /// Returns the bytes that should be handed to the text extractor.
    fn prepare(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if !doc.is_encrypted() {
            trace!("Loaded unencrypted PDF with {} pages", doc.get_pages().len());
            return Ok(data.to_vec());
        }

        if doc.decrypt("").is_err() {
            return Err(PdfError::Encrypted);
        }
        debug!("Decrypted PDF with empty password");

        let mut decrypted = Vec::new();
        doc.save_to(&mut decrypted)
            .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
        Ok(decrypted)
    }
}

impl PageSource for PdfExtractor {
    fn page_texts(&self, path: &Path) -> Result<Vec<Option<String>>> {
        let data = std::fs::read(path).map_err(|source| PdfError::Read {
            path: path.display().to_string(),
            source,
        })?;
        self.page_texts_from_mem(&data)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "malformed PDF"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::{text_pdf, undefined_font_pdf};

    #[test]
    fn test_extract_text_from_generated_pdf() {
        let extractor = PdfExtractor::new();
        let pdf = text_pdf("STATEMENT DATE 03/15/2024");

        let pages = extractor.page_texts_from_mem(&pdf).unwrap();
        assert_eq!(pages.len(), 1);

        let text = crate::pdf::join_pages(pages);
        assert!(text.contains("03/15/2024"), "unexpected text: {text:?}");
    }

    #[test]
    fn test_extract_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bill.pdf");
        std::fs::write(&path, text_pdf("Subtotal 88.50")).unwrap();

        let text = PdfExtractor::new().extract_text(&path).unwrap();
        assert!(text.contains("Subtotal"), "unexpected text: {text:?}");
    }

    #[test]
    fn test_garbage_bytes_fail_to_parse() {
        let result = PdfExtractor::new().page_texts_from_mem(b"not a pdf");
        assert!(matches!(result, Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_undefined_font_is_extraction_error() {
        let result = PdfExtractor::new().page_texts_from_mem(&undefined_font_pdf());
        assert!(
            matches!(result, Err(PdfError::TextExtraction(_))),
            "unexpected result: {result:?}"
        );
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = PdfExtractor::new().page_texts(Path::new("/nonexistent/bill.pdf"));
        assert!(matches!(result, Err(PdfError::Read { .. })));
    }
}
