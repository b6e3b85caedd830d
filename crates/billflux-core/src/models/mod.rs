//! Data models for bills and configuration.

pub mod bill;
pub mod config;

pub use bill::{BillRecord, CompleteBill, Converter, Field, FieldValue};
pub use config::{BatchConfig, BillfluxConfig, ExtractionConfig, InfluxConfig};
