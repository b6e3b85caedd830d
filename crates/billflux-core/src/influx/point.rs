//! Time-series points and InfluxDB line protocol rendering.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::bill::rules::patterns::STATEMENT_DATE_FORMAT;
use crate::error::DateFormatError;
use crate::models::bill::{CompleteBill, Field, FieldValue};

/// One timestamped, named set of field values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub measurement: String,
    pub timestamp: DateTime<Utc>,
    pub fields: Vec<(String, FieldValue)>,
}

impl Point {
    /// Build the point for a complete bill, timestamped at the statement date.
    pub fn from_bill(measurement: &str, bill: &CompleteBill) -> Result<Self, DateFormatError> {
        let timestamp = parse_statement_date(&bill.statement_date)?;

        Ok(Self {
            measurement: measurement.to_string(),
            timestamp,
            fields: vec![
                (
                    Field::TotalDeliveredKwh.to_string(),
                    FieldValue::Integer(bill.total_delivered_kwh),
                ),
                (
                    Field::TotalEnergyKwh.to_string(),
                    FieldValue::Integer(bill.total_energy_kwh),
                ),
                (
                    Field::EnergyPaymentCredit.to_string(),
                    FieldValue::Float(bill.energy_payment_credit),
                ),
                (Field::Subtotal.to_string(), FieldValue::Float(bill.subtotal)),
            ],
        })
    }

    /// Timestamp as ISO-8601 UTC with second precision, e.g. `2024-03-15T00:00:00Z`.
    pub fn time_rfc3339(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// Render as one line of InfluxDB line protocol with a seconds timestamp.
    pub fn to_line_protocol(&self) -> String {
        let fields = self
            .fields
            .iter()
            .map(|(key, value)| format!("{}={}", escape_key(key), format_value(value)))
            .collect::<Vec<_>>()
            .join(",");

        format!(
            "{} {} {}",
            escape_measurement(&self.measurement),
            fields,
            self.timestamp.timestamp()
        )
    }
}

/// Parse a `MM/DD/YYYY` statement date as midnight UTC.
pub fn parse_statement_date(raw: &str) -> Result<DateTime<Utc>, DateFormatError> {
    let err = || DateFormatError {
        value: raw.to_string(),
    };

    if !STATEMENT_DATE_FORMAT.is_match(raw) {
        return Err(err());
    }

    let date = NaiveDate::parse_from_str(raw, "%m/%d/%Y").map_err(|_| err())?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

fn format_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Integer(v) => format!("{}i", v),
        FieldValue::Float(v) => format!("{}", v),
        FieldValue::Text(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
    }
}

fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

fn escape_key(s: &str) -> String {
    s.replace(',', "\\,").replace('=', "\\=").replace(' ', "\\ ")
}
