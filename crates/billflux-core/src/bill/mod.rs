//! Energy bill field extraction module.

mod parser;
pub mod rules;

pub use parser::{BillParser, ExtractionResult};
pub use rules::{extract_with_patterns, FieldMatch, FieldSpec};
