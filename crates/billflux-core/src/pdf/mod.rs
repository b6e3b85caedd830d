//! PDF text extraction module.

mod extractor;
#[cfg(test)]
pub(crate) mod fixtures;

pub use extractor::PdfExtractor;

use std::path::Path;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Source of per-page document text.
pub trait PageSource {
    /// Text of every page in order. `None` for pages without extractable text.
    fn page_texts(&self, path: &Path) -> Result<Vec<Option<String>>>;

    /// Concatenated text of the whole document.
    ///
    /// Each page with text is followed by a newline; pages without text
    /// contribute nothing.
    fn extract_text(&self, path: &Path) -> Result<String> {
        Ok(join_pages(self.page_texts(path)?))
    }
}

/// Join page texts, skipping pages that have none.
pub fn join_pages<I>(pages: I) -> String
where
    I: IntoIterator<Item = Option<String>>,
{
    let mut text = String::new();
    for page in pages.into_iter().flatten() {
        text.push_str(&page);
        text.push('\n');
    }
    text
}
