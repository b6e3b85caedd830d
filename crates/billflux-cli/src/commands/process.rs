//! Process command - extract fields from a single bill.

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use billflux_core::bill::{BillParser, ExtractionResult};
use billflux_core::models::bill::Field;
use billflux_core::pdf::PdfExtractor;

use super::{load_config, InfluxArgs};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input bill PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Write the bill to InfluxDB if every field was extracted (implied by --dry-run)
    #[arg(long)]
    write: bool,

    /// Print the extracted document text (useful when adding patterns)
    #[arg(long)]
    show_text: bool,

    #[command(flatten)]
    influx: InfluxArgs,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    args.influx.apply(&mut config.influx);

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let parser = BillParser::from_config(&config.extraction)?;
    let result = parser.parse_file(&PdfExtractor::new(), &args.input)?;

    if args.show_text {
        println!("{}", result.raw_text);
    }

    println!("{}", format_result(&result, args.format)?);

    // --dry-run implies --write
    if !args.write && !args.influx.dry_run() {
        return Ok(());
    }

    let Some(bill) = result.record.complete() else {
        anyhow::bail!(
            "Missing data in {}: {:?}",
            args.input.display(),
            result.record.missing_fields()
        );
    };

    let writer = args.influx.record_writer(&config.influx)?;
    let point = writer.write(&bill)?;

    if args.influx.dry_run() {
        println!(
            "{} Dry run, would write: {}",
            style("ℹ").blue(),
            point.to_line_protocol()
        );
    } else {
        println!(
            "{} Wrote {} point at {}",
            style("✓").green(),
            writer.measurement(),
            point.time_rfc3339()
        );
    }

    Ok(())
}

fn format_result(result: &ExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&result.record)?),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_text(result: &ExtractionResult) -> String {
    let mut output = String::new();

    for field in Field::ALL {
        let value = match result.record.get(field) {
            Some(value) => value.to_string(),
            None => style("missing").yellow().to_string(),
        };
        output.push_str(&format!("{:<24}{}\n", field.as_str(), value));
    }

    output.push_str(&format!(
        "\nComplete: {}  ({} chars, {}ms)\n",
        if result.record.is_complete() { "yes" } else { "no" },
        result.raw_text.len(),
        result.processing_time_ms
    ));

    output
}
