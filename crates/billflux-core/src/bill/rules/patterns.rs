//! Built-in regex patterns for energy bill statements.
//!
//! Each field lists its known layout variants, most structured first and
//! most permissive last. Every pattern captures the value in group 1.

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

use crate::models::bill::Field;

pub const STATEMENT_DATE_PATTERNS: &[&str] = &[
    r"STATEMENT DATE.*?(\d{2}/\d{2}/\d{4})",
];

pub const TOTAL_DELIVERED_KWH_PATTERNS: &[&str] = &[
    r"Total Delivered by Customer\s*\d+\s*Actual\s*\d+\s*Actual\s*(\d+)\s*kWh",
    r"Total Delivered by Customer.*?(\d+)\s*kWh",
    r"Total Delivered by Customer Actual (\d+) kWh",
];

pub const TOTAL_ENERGY_KWH_PATTERNS: &[&str] = &[
    r"Total Energy\s*\d+\s*Actual\s*\d+\s*Actual\s*(\d+)\s*kWh",
    r"Total Energy.*?(\d+)\s*kWh",
    r"Total Energy Actual (\d+) kWh",
];

pub const ENERGY_PAYMENT_CREDIT_PATTERNS: &[&str] = &[
    r"Energy Payment\s*\d+\s*kWh\s*-\s*\$\d+\.\d+\s*-\s*\$\s*([\d\.]+)\s*CR",
    r"Energy Payment.*?-\s*\$\s*([\d\.]+)\s*CR",
    r"Energy Payment \d+.\d+ kWh - \$\d.\d+ - \$(\d+.\d+) CR",
];

pub const SUBTOTAL_PATTERNS: &[&str] = &[
    r"Subtotal\s*\$([\d\.]+)",
];

/// Built-in pattern sources for a field.
pub fn builtin_patterns(field: Field) -> &'static [&'static str] {
    match field {
        Field::StatementDate => STATEMENT_DATE_PATTERNS,
        Field::TotalDeliveredKwh => TOTAL_DELIVERED_KWH_PATTERNS,
        Field::TotalEnergyKwh => TOTAL_ENERGY_KWH_PATTERNS,
        Field::EnergyPaymentCredit => ENERGY_PAYMENT_CREDIT_PATTERNS,
        Field::Subtotal => SUBTOTAL_PATTERNS,
    }
}

/// Compile a field pattern: case-insensitive, with `.` matching newlines.
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
}

fn compile_all(field: Field) -> Vec<Regex> {
    builtin_patterns(field)
        .iter()
        .map(|p| compile_pattern(p).unwrap())
        .collect()
}

lazy_static! {
    pub static ref STATEMENT_DATE: Vec<Regex> = compile_all(Field::StatementDate);

    pub static ref TOTAL_DELIVERED_KWH: Vec<Regex> = compile_all(Field::TotalDeliveredKwh);

    pub static ref TOTAL_ENERGY_KWH: Vec<Regex> = compile_all(Field::TotalEnergyKwh);

    pub static ref ENERGY_PAYMENT_CREDIT: Vec<Regex> = compile_all(Field::EnergyPaymentCredit);

    pub static ref SUBTOTAL: Vec<Regex> = compile_all(Field::Subtotal);

    // Exact statement date layout expected when building timestamps
    pub static ref STATEMENT_DATE_FORMAT: Regex = Regex::new(
        r"^\d{2}/\d{2}/\d{4}$"
    ).unwrap();
}

/// Compiled built-in patterns for a field.
pub fn builtin_regexes(field: Field) -> &'static [Regex] {
    match field {
        Field::StatementDate => STATEMENT_DATE.as_slice(),
        Field::TotalDeliveredKwh => TOTAL_DELIVERED_KWH.as_slice(),
        Field::TotalEnergyKwh => TOTAL_ENERGY_KWH.as_slice(),
        Field::EnergyPaymentCredit => ENERGY_PAYMENT_CREDIT.as_slice(),
        Field::Subtotal => SUBTOTAL.as_slice(),
    }
}
