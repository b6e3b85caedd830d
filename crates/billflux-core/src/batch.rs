//! Directory batch processing of bill documents.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::bill::BillParser;
use crate::error::Result;
use crate::influx::{Point, PointWriter, RecordWriter};
use crate::models::bill::{BillRecord, Field};
use crate::pdf::PageSource;

/// What happened to one document.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// The bill was complete and its point was written.
    Written { record: BillRecord, point: Point },
    /// Some fields could not be extracted; nothing was written.
    MissingData { record: BillRecord, missing: Vec<Field> },
    /// Extraction, date parsing or the write failed.
    Failed(String),
}

impl FileOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            FileOutcome::Written { .. } => "success",
            FileOutcome::MissingData { .. } => "missing_data",
            FileOutcome::Failed(_) => "error",
        }
    }

    /// Extracted record, if extraction got that far.
    pub fn record(&self) -> Option<&BillRecord> {
        match self {
            FileOutcome::Written { record, .. } | FileOutcome::MissingData { record, .. } => {
                Some(record)
            }
            FileOutcome::Failed(_) => None,
        }
    }
}

/// Per-file result of a batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
    pub processing_time_ms: u64,
}

impl FileReport {
    /// File name for display.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

impl fmt::Display for FileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.file_name();
        match &self.outcome {
            FileOutcome::Written { .. } => write!(f, "Processed {} successfully", name),
            FileOutcome::MissingData { .. } => write!(f, "Missing data in {}", name),
            FileOutcome::Failed(e) => write!(f, "Error processing {}: {}", name, e),
        }
    }
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn written(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Written { .. }))
    }

    pub fn missing_data(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::MissingData { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed(_)))
    }

    /// True when every document was written.
    pub fn is_clean(&self) -> bool {
        self.written() == self.files.len()
    }

    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// List documents in `dir` whose names end with `suffix` (case-insensitive), sorted by name.
pub fn list_documents(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let suffix = suffix.to_lowercase();
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().to_lowercase();
        if !name.ends_with(&suffix) {
            continue;
        }
        // Follows symlinks; a dangling link is kept and fails when read.
        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        files.push(path);
    }

    files.sort();
    debug!("Found {} documents in {}", files.len(), dir.display());
    Ok(files)
}

/// Runs parse-then-write over every document in a directory.
pub struct BatchRunner<S, W> {
    source: S,
    parser: BillParser,
    writer: RecordWriter<W>,
    suffix: String,
}

impl<S: PageSource, W: PointWriter> BatchRunner<S, W> {
    pub fn new(source: S, parser: BillParser, writer: RecordWriter<W>) -> Self {
        Self {
            source,
            parser,
            writer,
            suffix: ".pdf".to_string(),
        }
    }

    /// Set the document file name suffix.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Process one document. Errors never escape; they become [`FileOutcome::Failed`].
    pub fn process_file(&self, path: &Path) -> FileReport {
        let start = Instant::now();

        let outcome = match self.try_process(path) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Failed to process {}: {}", path.display(), e);
                FileOutcome::Failed(e.to_string())
            }
        };

        FileReport {
            path: path.to_path_buf(),
            outcome,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }

    fn try_process(&self, path: &Path) -> Result<FileOutcome> {
        let record = self.parser.parse_file(&self.source, path)?.record;

        let Some(bill) = record.complete() else {
            let missing = record.missing_fields();
            info!("Skipping {}: missing {:?}", path.display(), missing);
            return Ok(FileOutcome::MissingData { record, missing });
        };

        let point = self.writer.write(&bill)?;
        Ok(FileOutcome::Written { record, point })
    }

    /// Process every document in `dir`, calling `on_file` after each one.
    ///
    /// Only a failure to list the directory aborts the run.
    pub fn run<F>(&self, dir: &Path, mut on_file: F) -> Result<BatchReport>
    where
        F: FnMut(&FileReport),
    {
        let files = list_documents(dir, &self.suffix)?;
        let mut report = BatchReport {
            files: Vec::with_capacity(files.len()),
        };

        for path in files {
            let file_report = self.process_file(&path);
            on_file(&file_report);
            report.files.push(file_report);
        }

        info!(
            "Batch finished: {} written, {} missing data, {} failed",
            report.written(),
            report.missing_data(),
            report.failed()
        );
        Ok(report)
    }
}
