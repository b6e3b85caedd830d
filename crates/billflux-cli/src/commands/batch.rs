//! Batch command - load every bill in a directory.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use billflux_core::batch::{list_documents, BatchReport, BatchRunner, FileOutcome, FileReport};
use billflux_core::bill::BillParser;
use billflux_core::models::bill::Field;
use billflux_core::pdf::PdfExtractor;

use super::{load_config, InfluxArgs};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Directory containing bill PDFs
    #[arg(required = true)]
    dir: PathBuf,

    /// Document file name suffix (overrides config)
    #[arg(long)]
    suffix: Option<String>,

    /// Also write a summary CSV to this path
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Exit successfully even if some files were not written
    #[arg(long)]
    allow_partial: bool,

    #[command(flatten)]
    influx: InfluxArgs,
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    args.influx.apply(&mut config.influx);
    if let Some(suffix) = &args.suffix {
        config.batch.document_suffix = suffix.clone();
    }

    if !args.dir.is_dir() {
        anyhow::bail!("Not a directory: {}", args.dir.display());
    }

    let parser = BillParser::from_config(&config.extraction)?;
    let writer = args.influx.record_writer(&config.influx)?;
    let runner = BatchRunner::new(PdfExtractor::new(), parser, writer)
        .with_suffix(config.batch.document_suffix.clone());

    let total = list_documents(&args.dir, &config.batch.document_suffix)?.len();
    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        total
    );

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let dry_run = args.influx.dry_run();
    let report = runner.run(&args.dir, |file| {
        let line = format_file_line(file, dry_run);
        pb.suspend(|| println!("{}", line));
        pb.inc(1);
    })?;
    pb.finish_and_clear();

    if let Some(summary_path) = &args.summary {
        write_summary(summary_path, &report)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        report.files.len(),
        start.elapsed()
    );
    println!(
        "   {} written, {} missing data, {} failed",
        style(report.written()).green(),
        style(report.missing_data()).yellow(),
        style(report.failed()).red()
    );

    if !report.is_clean() && !args.allow_partial {
        anyhow::bail!(
            "{} of {} files were not written",
            report.files.len() - report.written(),
            report.files.len()
        );
    }

    Ok(())
}

fn format_file_line(file: &FileReport, dry_run: bool) -> String {
    match &file.outcome {
        FileOutcome::Written { point, .. } if dry_run => format!(
            "{} {} (dry run: {})",
            style("✓").green(),
            file,
            point.to_line_protocol()
        ),
        FileOutcome::Written { .. } => format!("{} {}", style("✓").green(), file),
        FileOutcome::MissingData { missing, .. } => format!(
            "{} {} ({})",
            style("⚠").yellow(),
            file,
            missing
                .iter()
                .map(Field::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        ),
        FileOutcome::Failed(_) => format!("{} {}", style("✗").red(), file),
    }
}

fn write_summary(path: &Path, report: &BatchReport) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["filename", "status"];
    header.extend(Field::ALL.iter().map(Field::as_str));
    header.extend(["processing_time_ms", "error"]);
    wtr.write_record(&header)?;

    for file in &report.files {
        let mut row = vec![file.file_name(), file.outcome.status().to_string()];

        for field in Field::ALL {
            let value = file
                .outcome
                .record()
                .and_then(|r| r.get(field))
                .map(|v| v.to_string())
                .unwrap_or_default();
            row.push(value);
        }

        row.push(file.processing_time_ms.to_string());
        row.push(match &file.outcome {
            FileOutcome::Failed(e) => e.clone(),
            _ => String::new(),
        });

        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    debug!("Wrote summary for {} files to {}", report.files.len(), path.display());
    Ok(())
}
