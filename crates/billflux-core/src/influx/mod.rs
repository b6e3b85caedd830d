//! Persisting bills as InfluxDB points.

mod client;
mod point;

pub use client::{DryRunWriter, InfluxClient};
pub use point::{parse_statement_date, Point};

use crate::error::{Result, WriteError};
use crate::models::bill::CompleteBill;
use crate::models::config::InfluxConfig;

/// Destination for time-series points.
pub trait PointWriter {
    /// Write a single point. Failures are not retried.
    fn write(&self, point: &Point) -> std::result::Result<(), WriteError>;
}

impl<W: PointWriter + ?Sized> PointWriter for &W {
    fn write(&self, point: &Point) -> std::result::Result<(), WriteError> {
        (**self).write(point)
    }
}

impl<W: PointWriter + ?Sized> PointWriter for Box<W> {
    fn write(&self, point: &Point) -> std::result::Result<(), WriteError> {
        (**self).write(point)
    }
}

/// Turns complete bills into points and submits them, one write per bill.
pub struct RecordWriter<W> {
    writer: W,
    measurement: String,
}

impl<W: PointWriter> RecordWriter<W> {
    pub fn new(writer: W, measurement: impl Into<String>) -> Self {
        Self {
            writer,
            measurement: measurement.into(),
        }
    }

    /// Build the point for `bill` and write it, returning the written point.
    pub fn write(&self, bill: &CompleteBill) -> Result<Point> {
        let point = Point::from_bill(&self.measurement, bill)?;
        self.writer.write(&point)?;
        Ok(point)
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }
}

impl RecordWriter<InfluxClient> {
    /// Writer targeting the configured InfluxDB server.
    pub fn from_config(config: &InfluxConfig) -> Result<Self> {
        Ok(Self::new(InfluxClient::new(config)?, config.measurement.clone()))
    }
}
