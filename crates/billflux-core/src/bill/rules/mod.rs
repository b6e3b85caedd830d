//! Rule-based field extraction with ordered fallback patterns.

pub mod patterns;

use regex::Regex;
use tracing::trace;

use crate::error::{BillfluxError, Result};
use crate::models::bill::{Converter, Field, FieldValue};

pub use patterns::{builtin_patterns, builtin_regexes, compile_pattern};

/// A successful extraction with the pattern that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatch {
    /// Converted value.
    pub value: FieldValue,
    /// Index of the matching pattern in the field's pattern list.
    pub pattern_index: usize,
    /// Captured text before conversion.
    pub source: String,
}

/// Try each pattern in order and return the first match that converts.
///
/// A match without a first capture group, or whose capture fails to convert,
/// counts as no match. Patterns after the first success are never evaluated.
pub fn extract_with_patterns<'a, I, F>(text: &str, patterns: I, convert: F) -> Option<FieldMatch>
where
    I: IntoIterator<Item = &'a Regex>,
    F: Fn(&str) -> Option<FieldValue>,
{
    patterns
        .into_iter()
        .enumerate()
        .find_map(|(pattern_index, re)| {
            let caps = re.captures(text)?;
            let source = caps.get(1)?.as_str();
            match convert(source) {
                Some(value) => Some(FieldMatch {
                    value,
                    pattern_index,
                    source: source.to_string(),
                }),
                None => {
                    trace!("Pattern {} matched {:?} but conversion failed", pattern_index, source);
                    None
                }
            }
        })
}

/// Extraction rules for one field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    field: Field,
    patterns: Vec<Regex>,
    converter: Converter,
}

impl FieldSpec {
    /// Rules for a field from the built-in pattern table.
    pub fn builtin(field: Field) -> Self {
        Self {
            field,
            patterns: builtin_regexes(field).to_vec(),
            converter: field.converter(),
        }
    }

    /// Prepend patterns that take precedence over the existing ones.
    pub fn with_preferred_patterns<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self> {
        let mut compiled = compile_sources(self.field, patterns)?;
        compiled.append(&mut self.patterns);
        self.patterns = compiled;
        Ok(self)
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }

    /// Extract this field from text, returning `None` when it is missing.
    pub fn extract(&self, text: &str) -> Option<FieldValue> {
        let found = extract_with_patterns(text, &self.patterns, |raw| self.converter.convert(raw))?;
        trace!(
            "{} matched pattern {} ({:?})",
            self.field, found.pattern_index, found.source
        );
        Some(found.value)
    }
}

fn compile_sources<S: AsRef<str>>(field: Field, patterns: &[S]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            compile_pattern(p.as_ref()).map_err(|source| BillfluxError::Pattern {
                field: field.to_string(),
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    #[test]
    fn test_first_successful_pattern_stops_search() {
        let patterns = vec![
            compile_pattern(r"Total Energy\s*(\d+)\s*kWh").unwrap(),
            compile_pattern(r"Total Energy.*?(\d+)").unwrap(),
        ];
        let tried = Cell::new(0);
        let conversions = Cell::new(0);

        let found = extract_with_patterns(
            "Total Energy 512 kWh",
            patterns.iter().inspect(|_| tried.set(tried.get() + 1)),
            |raw| {
                conversions.set(conversions.get() + 1);
                Converter::Integer.convert(raw)
            },
        )
        .unwrap();

        assert_eq!(found.value, FieldValue::Integer(512));
        assert_eq!(found.pattern_index, 0);
        assert_eq!(tried.get(), 1);
        assert_eq!(conversions.get(), 1);
    }

    #[test]
    fn test_conversion_failure_falls_through() {
        let patterns = vec![
            compile_pattern(r"Total Delivered by Customer\s*(\S+)\s*kWh").unwrap(),
            compile_pattern(r"Delivered.*?(\d+)\s*kWh").unwrap(),
        ];
        let conversions = Cell::new(0);

        let found = extract_with_patterns(
            "Total Delivered by Customer N/A kWh\nDelivered last period 640 kWh",
            &patterns,
            |raw| {
                conversions.set(conversions.get() + 1);
                Converter::Integer.convert(raw)
            },
        )
        .unwrap();

        assert_eq!(found.value, FieldValue::Integer(640));
        assert_eq!(found.pattern_index, 1);
        assert_eq!(conversions.get(), 2);
    }

    #[test]
    fn test_pattern_without_group_is_no_match() {
        let patterns = vec![
            compile_pattern(r"Subtotal \$\d+\.\d+").unwrap(),
            compile_pattern(r"Subtotal \$([\d.]+)").unwrap(),
        ];
        let found =
            extract_with_patterns("Subtotal $88.50", &patterns, |raw| Converter::Float.convert(raw))
                .unwrap();
        assert_eq!(found.value, FieldValue::Float(88.5));
        assert_eq!(found.pattern_index, 1);
    }

    #[test]
    fn test_no_match_is_missing() {
        for field in Field::ALL {
            assert_eq!(FieldSpec::builtin(field).extract("nothing to see here"), None);
            assert_eq!(FieldSpec::builtin(field).extract(""), None);
        }
    }

    #[test]
    fn test_statement_date_is_kept_raw() {
        let spec = FieldSpec::builtin(Field::StatementDate);
        assert_eq!(
            spec.extract("ACCOUNT 123\nSTATEMENT DATE: 03/15/2024\nDUE DATE 04/01/2024"),
            Some(FieldValue::Text("03/15/2024".into()))
        );
    }

    #[test]
    fn test_most_specific_delivered_pattern() {
        let spec = FieldSpec::builtin(Field::TotalDeliveredKwh);
        assert_eq!(
            spec.extract("Total Delivered by Customer 123 Actual 456 Actual 789 kWh"),
            Some(FieldValue::Integer(789))
        );

        let found = extract_with_patterns(
            "Total Delivered by Customer 123 Actual 456 Actual 789 kWh",
            spec.patterns(),
            |raw| Converter::Integer.convert(raw),
        )
        .unwrap();
        assert_eq!(found.pattern_index, 0);
    }

    #[test]
    fn test_permissive_energy_pattern() {
        let spec = FieldSpec::builtin(Field::TotalEnergyKwh);
        assert_eq!(
            spec.extract("Total Energy\nused this period: 1024 kWh"),
            Some(FieldValue::Integer(1024))
        );
    }

    #[test]
    fn test_energy_payment_credit() {
        let spec = FieldSpec::builtin(Field::EnergyPaymentCredit);
        assert_eq!(
            spec.extract("Energy Payment 640 kWh - $0.0654 - $41.86 CR"),
            Some(FieldValue::Float(41.86))
        );
    }

    #[test]
    fn test_credit_with_bad_number_falls_back() {
        // Every shape either captures "4.1.8", which does not parse, or does not match.
        let spec = FieldSpec::builtin(Field::EnergyPaymentCredit);
        assert_eq!(spec.extract("Energy Payment 640 kWh - $0.0654 - $4.1.8 CR"), None);
    }

    #[test]
    fn test_subtotal_case_insensitive() {
        let spec = FieldSpec::builtin(Field::Subtotal);
        assert_eq!(spec.extract("SUBTOTAL $102.33"), Some(FieldValue::Float(102.33)));
    }

    #[test]
    fn test_preferred_patterns_run_first() {
        let spec = FieldSpec::builtin(Field::Subtotal)
            .with_preferred_patterns(&[r"Amount Due\s*\$([\d.]+)"])
            .unwrap();
        assert_eq!(spec.patterns().len(), 2);
        assert_eq!(
            spec.extract("Subtotal $10.00\nAmount Due $12.00"),
            Some(FieldValue::Float(12.0))
        );
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = FieldSpec::builtin(Field::Subtotal)
            .with_preferred_patterns(&["Subtotal ($"])
            .unwrap_err();
        assert!(matches!(err, BillfluxError::Pattern { ref field, .. } if field == "subtotal"));
    }
}
