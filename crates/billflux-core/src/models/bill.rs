//! Energy bill data models.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A field extracted from an energy bill statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Statement date, kept as the raw `MM/DD/YYYY` text.
    StatementDate,
    /// Total kWh delivered by the customer (net metering export).
    TotalDeliveredKwh,
    /// Total energy consumed in kWh.
    TotalEnergyKwh,
    /// Energy payment credit in dollars.
    EnergyPaymentCredit,
    /// Statement subtotal in dollars.
    Subtotal,
}

impl Field {
    /// Every field, in extraction order.
    pub const ALL: [Field; 5] = [
        Field::StatementDate,
        Field::TotalDeliveredKwh,
        Field::TotalEnergyKwh,
        Field::EnergyPaymentCredit,
        Field::Subtotal,
    ];

    /// Stable snake_case name used for output, config keys and point fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::StatementDate => "statement_date",
            Field::TotalDeliveredKwh => "total_delivered_kwh",
            Field::TotalEnergyKwh => "total_energy_kwh",
            Field::EnergyPaymentCredit => "energy_payment_credit",
            Field::Subtotal => "subtotal",
        }
    }

    /// Converter applied to text captured for this field.
    pub fn converter(&self) -> Converter {
        match self {
            Field::StatementDate => Converter::Raw,
            Field::TotalDeliveredKwh | Field::TotalEnergyKwh => Converter::Integer,
            Field::EnergyPaymentCredit | Field::Subtotal => Converter::Float,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conversion from captured text to a typed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Converter {
    /// Keep the captured text as-is.
    Raw,
    /// Parse as a signed integer.
    Integer,
    /// Parse as a floating-point number.
    Float,
}

impl Converter {
    /// Convert captured text, returning `None` when it is not a valid value.
    pub fn convert(&self, raw: &str) -> Option<FieldValue> {
        match self {
            Converter::Raw => Some(FieldValue::Text(raw.to_string())),
            Converter::Integer => raw.trim().parse().ok().map(FieldValue::Integer),
            Converter::Float => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(FieldValue::Float),
        }
    }
}

/// A typed field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Fields extracted from one bill. `None` marks a field that could not be extracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BillRecord {
    values: BTreeMap<Field, Option<FieldValue>>,
}

impl BillRecord {
    /// Create a record with every field missing.
    pub fn new() -> Self {
        Self {
            values: Field::ALL.into_iter().map(|field| (field, None)).collect(),
        }
    }

    pub fn set(&mut self, field: Field, value: Option<FieldValue>) {
        self.values.insert(field, value);
    }

    pub fn with(mut self, field: Field, value: FieldValue) -> Self {
        self.set(field, Some(value));
        self
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.values.get(&field).and_then(|v| v.as_ref())
    }

    /// Fields that have no value, in extraction order.
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| self.get(*field).is_none())
            .collect()
    }

    /// A record is complete only when every field has a value.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Typed view of the record, available only when it is complete.
    pub fn complete(&self) -> Option<CompleteBill> {
        Some(CompleteBill {
            statement_date: self.get(Field::StatementDate)?.as_text()?.to_string(),
            total_delivered_kwh: self.get(Field::TotalDeliveredKwh)?.as_integer()?,
            total_energy_kwh: self.get(Field::TotalEnergyKwh)?.as_integer()?,
            energy_payment_credit: self.get(Field::EnergyPaymentCredit)?.as_float()?,
            subtotal: self.get(Field::Subtotal)?.as_float()?,
        })
    }
}

impl Default for BillRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// A bill with every field present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteBill {
    /// Raw statement date text (`MM/DD/YYYY`).
    pub statement_date: String,
    pub total_delivered_kwh: i64,
    pub total_energy_kwh: i64,
    pub energy_payment_credit: f64,
    pub subtotal: f64,
}
