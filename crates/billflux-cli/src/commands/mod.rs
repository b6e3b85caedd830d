//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod process;

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::debug;

use billflux_core::influx::{DryRunWriter, InfluxClient, PointWriter, RecordWriter};
use billflux_core::models::config::{BillfluxConfig, InfluxConfig};

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("billflux")
        .join("config.json")
}

/// Load the explicit config file, else the default one if present, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<BillfluxConfig> {
    if let Some(path) = config_path {
        return Ok(BillfluxConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(BillfluxConfig::from_file(&default_path)?)
    } else {
        Ok(BillfluxConfig::default())
    }
}

/// Connection overrides shared by commands that write points.
#[derive(Args, Debug, Default)]
pub struct InfluxArgs {
    /// InfluxDB host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// InfluxDB port (overrides config)
    #[arg(long)]
    port: Option<u16>,

    /// InfluxDB database (overrides config)
    #[arg(long)]
    database: Option<String>,

    /// Log points instead of writing them
    #[arg(long)]
    dry_run: bool,
}

impl InfluxArgs {
    pub fn apply(&self, config: &mut InfluxConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(database) = &self.database {
            config.database = database.clone();
        }
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Record writer for the configured store, or a dry-run writer.
    pub fn record_writer(
        &self,
        config: &InfluxConfig,
    ) -> anyhow::Result<RecordWriter<Box<dyn PointWriter>>> {
        let writer: Box<dyn PointWriter> = if self.dry_run {
            Box::new(DryRunWriter)
        } else {
            debug!("Writing to {} database {}", config.base_url(), config.database);
            Box::new(InfluxClient::new(config)?)
        };
        Ok(RecordWriter::new(writer, config.measurement.clone()))
    }
}
