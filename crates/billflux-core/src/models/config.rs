//! Configuration structures for the bill pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::bill::Field;
use crate::error::BillfluxError;

/// Main configuration for billflux.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BillfluxConfig {
    /// InfluxDB connection configuration.
    pub influx: InfluxConfig,

    /// Directory batch configuration.
    pub batch: BatchConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,
}

/// InfluxDB (1.x HTTP API) connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InfluxConfig {
    /// Server host name or address.
    pub host: String,

    /// Server port.
    pub port: u16,

    /// Use https instead of http.
    pub use_https: bool,

    /// Username for basic auth (empty = no auth).
    pub username: String,

    /// Password for basic auth.
    pub password: String,

    /// Target database.
    pub database: String,

    /// Measurement name for bill points.
    pub measurement: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8086,
            use_https: false,
            username: "influx".to_string(),
            password: String::new(),
            database: "xcel_bill".to_string(),
            measurement: "energy_usage".to_string(),
            timeout_secs: 30,
        }
    }
}

impl InfluxConfig {
    /// Base URL of the server, e.g. `http://localhost:8086`.
    pub fn base_url(&self) -> String {
        let scheme = if self.use_https { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}

/// Batch processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// File name suffix of documents to process (matched case-insensitively).
    pub document_suffix: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            document_suffix: ".pdf".to_string(),
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Additional patterns per field, tried before the built-in ones.
    pub extra_patterns: BTreeMap<Field, Vec<String>>,
}

impl BillfluxConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| BillfluxError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: BillfluxConfig = serde_json::from_str(
            r#"{ "influx": { "host": "influx.lan", "password": "secret" } }"#,
        )
        .unwrap();

        assert_eq!(config.influx.host, "influx.lan");
        assert_eq!(config.influx.port, 8086);
        assert_eq!(config.influx.database, "xcel_bill");
        assert_eq!(config.influx.measurement, "energy_usage");
        assert_eq!(config.batch.document_suffix, ".pdf");
        assert!(config.extraction.extra_patterns.is_empty());
    }

    #[test]
    fn test_extra_patterns_keyed_by_field() {
        let config: BillfluxConfig = serde_json::from_str(
            r#"{ "extraction": { "extra_patterns": { "subtotal": ["Amount Due\\s*\\$([\\d.]+)"] } } }"#,
        )
        .unwrap();

        let patterns = &config.extraction.extra_patterns[&Field::Subtotal];
        assert_eq!(patterns, &vec![r"Amount Due\s*\$([\d.]+)".to_string()]);
    }

    #[test]
    fn test_base_url() {
        let mut influx = InfluxConfig::default();
        assert_eq!(influx.base_url(), "http://localhost:8086");
        influx.use_https = true;
        influx.host = "db.example.com".into();
        assert_eq!(influx.base_url(), "https://db.example.com:8086");
    }

    #[test]
    fn test_save_and_load_roundtrip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = BillfluxConfig::default();
        config.influx.database = "bills".into();
        config.save(&path).unwrap();

        let loaded = BillfluxConfig::from_file(&path).unwrap();
        assert_eq!(loaded.influx.database, "bills");
    }

    #[test]
    fn test_invalid_config_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "influx": { "port": "not-a-port" } }"#).unwrap();

        let err = BillfluxConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, BillfluxError::Config(ref msg) if msg.contains("config.json")));
    }
}
