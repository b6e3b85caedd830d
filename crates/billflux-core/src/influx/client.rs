//! InfluxDB HTTP client and dry-run writer.

use std::time::Duration;

use reqwest::Url;
use tracing::{debug, info};

use super::{Point, PointWriter};
use crate::error::WriteError;
use crate::models::config::InfluxConfig;

/// InfluxDB 1.x client writing points through the `/write` endpoint.
pub struct InfluxClient {
    base_url: String,
    database: String,
    username: String,
    password: String,
    timeout_secs: u64,
    client: reqwest::blocking::Client,
}

impl InfluxClient {
    /// Create a client from connection settings.
    pub fn new(config: &InfluxConfig) -> Result<Self, WriteError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WriteError::Http(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url(),
            database: config.database.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            timeout_secs: config.timeout_secs,
            client,
        })
    }

    fn write_url(&self) -> Result<Url, WriteError> {
        Url::parse_with_params(
            &format!("{}/write", self.base_url),
            &[("db", self.database.as_str()), ("precision", "s")],
        )
        .map_err(|e| WriteError::Http(format!("invalid URL {}: {}", self.base_url, e)))
    }
}

impl PointWriter for InfluxClient {
    fn write(&self, point: &Point) -> Result<(), WriteError> {
        let url = self.write_url()?;
        let line = point.to_line_protocol();
        debug!("POST {} <- {}", url, line);

        let mut request = self.client.post(url).body(line);
        if !self.username.is_empty() {
            request = request.basic_auth(&self.username, Some(&self.password));
        }

        let response = request.send().map_err(|e| {
            if e.is_connect() {
                WriteError::Connection(format!("{}: {}", self.base_url, e))
            } else if e.is_timeout() {
                WriteError::Timeout(self.timeout_secs)
            } else {
                WriteError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(WriteError::Rejected {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        info!("Wrote {} point at {}", point.measurement, point.time_rfc3339());
        Ok(())
    }
}

/// Writer that logs points instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunWriter;

impl PointWriter for DryRunWriter {
    fn write(&self, point: &Point) -> Result<(), WriteError> {
        info!("Dry run, not writing: {}", point.to_line_protocol());
        Ok(())
    }
}
