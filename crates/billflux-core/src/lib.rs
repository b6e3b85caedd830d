//! Core library for energy bill processing.
//!
//! This crate provides:
//! - PDF text extraction
//! - Bill field extraction with ordered fallback patterns
//! - Conversion of complete bills into InfluxDB points
//! - Directory batch processing with per-file error isolation

pub mod batch;
pub mod bill;
pub mod error;
pub mod influx;
pub mod models;
pub mod pdf;

pub use batch::{BatchReport, BatchRunner, FileOutcome, FileReport};
pub use bill::{BillParser, ExtractionResult, FieldSpec};
pub use error::{BillfluxError, Result};
pub use influx::{DryRunWriter, InfluxClient, Point, PointWriter, RecordWriter};
pub use models::bill::{BillRecord, CompleteBill, Field, FieldValue};
pub use models::config::BillfluxConfig;
pub use pdf::{PageSource, PdfExtractor};
