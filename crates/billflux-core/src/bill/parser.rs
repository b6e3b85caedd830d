//! Energy bill parser driving text extraction and field rules.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::Result;
use crate::models::bill::{BillRecord, Field};
use crate::models::config::ExtractionConfig;
use crate::pdf::PageSource;

use super::rules::FieldSpec;

/// Result of parsing one bill document.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted fields.
    pub record: BillRecord,
    /// Raw extracted text.
    pub raw_text: String,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Parses energy bills into [`BillRecord`]s.
#[derive(Debug, Clone)]
pub struct BillParser {
    specs: Vec<FieldSpec>,
}

impl BillParser {
    /// Create a parser using only the built-in patterns.
    pub fn new() -> Self {
        Self {
            specs: Field::ALL.into_iter().map(FieldSpec::builtin).collect(),
        }
    }

    /// Create a parser whose configured patterns run before the built-in ones.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        let specs = Field::ALL
            .into_iter()
            .map(|field| {
                let spec = FieldSpec::builtin(field);
                match config.extra_patterns.get(&field) {
                    Some(extra) if !extra.is_empty() => {
                        debug!("Using {} extra patterns for {}", extra.len(), field);
                        spec.with_preferred_patterns(extra.as_slice())
                    }
                    _ => Ok(spec),
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { specs })
    }

    /// Extract every field from already-extracted document text.
    pub fn parse_text(&self, text: &str) -> BillRecord {
        let mut record = BillRecord::new();
        for spec in &self.specs {
            record.set(spec.field(), spec.extract(text));
        }
        record
    }

    /// Extract text from a document and parse it.
    pub fn parse_file<S>(&self, source: &S, path: &Path) -> Result<ExtractionResult>
    where
        S: PageSource + ?Sized,
    {
        let start = Instant::now();

        let raw_text = source.extract_text(path)?;
        info!(
            "Parsing {} from {} characters of text",
            path.display(),
            raw_text.len()
        );

        let record = self.parse_text(&raw_text);
        let missing = record.missing_fields();
        if !missing.is_empty() {
            debug!("{}: missing fields {:?}", path.display(), missing);
        }

        Ok(ExtractionResult {
            record,
            raw_text,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

impl Default for BillParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BillfluxError, PdfError};
    use crate::models::bill::FieldValue;
    use pretty_assertions::assert_eq;

    const SAMPLE_BILL: &str = r#"
        XCEL ENERGY
        STATEMENT DATE: 03/15/2024
        ACCOUNT NUMBER 51-0000000-0

        ELECTRICITY SERVICE DETAILS
        Total Delivered by Customer 123 Actual 456 Actual 789 kWh
        Total Energy 1200 Actual 1712 Actual 512 kWh
        Energy Payment 789 kWh - $0.0534 - $42.13 CR

        Subtotal $88.50
    "#;

    struct TextOnly(&'static str);

    impl PageSource for TextOnly {
        fn page_texts(&self, _path: &Path) -> crate::pdf::Result<Vec<Option<String>>> {
            Ok(vec![Some(self.0.to_string())])
        }
    }

    struct Broken;

    impl PageSource for Broken {
        fn page_texts(&self, _path: &Path) -> crate::pdf::Result<Vec<Option<String>>> {
            Err(PdfError::Parse("bad xref".into()))
        }
    }

    #[test]
    fn test_parse_sample_bill() {
        let record = BillParser::new().parse_text(SAMPLE_BILL);

        assert!(record.is_complete());
        assert_eq!(
            record.get(Field::StatementDate),
            Some(&FieldValue::Text("03/15/2024".into()))
        );
        assert_eq!(record.get(Field::TotalDeliveredKwh), Some(&FieldValue::Integer(789)));
        assert_eq!(record.get(Field::TotalEnergyKwh), Some(&FieldValue::Integer(512)));
        assert_eq!(record.get(Field::EnergyPaymentCredit), Some(&FieldValue::Float(42.13)));
        assert_eq!(record.get(Field::Subtotal), Some(&FieldValue::Float(88.5)));
    }

    #[test]
    fn test_fields_are_independent() {
        let record = BillParser::new().parse_text("STATEMENT DATE 01/02/2023\nSubtotal $12.00");

        assert_eq!(
            record.missing_fields(),
            vec![
                Field::TotalDeliveredKwh,
                Field::TotalEnergyKwh,
                Field::EnergyPaymentCredit,
            ]
        );
        assert_eq!(record.get(Field::Subtotal), Some(&FieldValue::Float(12.0)));
    }

    #[test]
    fn test_empty_text_is_all_missing() {
        let record = BillParser::new().parse_text("");
        assert_eq!(record.missing_fields(), Field::ALL.to_vec());
    }

    #[test]
    fn test_parse_file_uses_source() {
        let result = BillParser::new()
            .parse_file(&TextOnly(SAMPLE_BILL), Path::new("march.pdf"))
            .unwrap();
        assert!(result.record.is_complete());
        assert!(result.raw_text.ends_with('\n'));
    }

    #[test]
    fn test_parse_file_propagates_extraction_error() {
        let err = BillParser::new()
            .parse_file(&Broken, Path::new("broken.pdf"))
            .unwrap_err();
        assert!(matches!(err, BillfluxError::Pdf(PdfError::Parse(_))));
    }

    #[test]
    fn test_from_config_prefers_extra_patterns() {
        let mut config = ExtractionConfig::default();
        config
            .extra_patterns
            .insert(Field::Subtotal, vec![r"Current Charges\s*\$([\d.]+)".into()]);

        let parser = BillParser::from_config(&config).unwrap();
        let record = parser.parse_text("Subtotal $10.00\nCurrent Charges $11.25");
        assert_eq!(record.get(Field::Subtotal), Some(&FieldValue::Float(11.25)));
    }

    #[test]
    fn test_from_config_rejects_bad_pattern() {
        let mut config = ExtractionConfig::default();
        config
            .extra_patterns
            .insert(Field::TotalEnergyKwh, vec!["(unclosed".into()]);

        assert!(matches!(
            BillParser::from_config(&config),
            Err(BillfluxError::Pattern { .. })
        ));
    }
}
