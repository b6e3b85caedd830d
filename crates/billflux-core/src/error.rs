//! Error types for the billflux-core library.

use thiserror::Error;

/// Main error type for the billflux library.
#[derive(Error, Debug)]
pub enum BillfluxError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// The statement date could not be turned into a timestamp.
    #[error("date error: {0}")]
    DateFormat(#[from] DateFormatError),

    /// The time-series store did not accept a point.
    #[error("write error: {0}")]
    Write(#[from] WriteError),

    /// A configured extraction pattern is not a valid regex.
    #[error("invalid pattern for {field}: {source}")]
    Pattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to read the document from disk.
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,
}

/// The raw statement date did not match `MM/DD/YYYY`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("statement date {value:?} does not match MM/DD/YYYY")]
pub struct DateFormatError {
    /// The raw string that failed to parse.
    pub value: String,
}

/// Errors returned by a point writer.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Could not reach the store.
    #[error("cannot connect to {0}")]
    Connection(String),

    /// The request did not complete in time.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The store answered with a non-success status.
    #[error("store rejected point ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// Any other transport failure.
    #[error("HTTP client error: {0}")]
    Http(String),
}

/// Result type for the billflux library.
pub type Result<T> = std::result::Result<T, BillfluxError>;
