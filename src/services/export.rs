//! CSV export
//!
//! The host supplies the exportable rows through an [`ExportSource`]. The
//! fetch runs on a background thread so only the export action waits for it;
//! the runner is polled on every tick like any other background job.

use crate::model::row::{Cell, Row};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{debug, warn};

/// Filename used when the host gives none
pub const DEFAULT_EXPORT_FILENAME: &str = "export.csv";

/// Host callback resolving to the current exportable dataset
pub trait ExportSource: Send + Sync {
    fn fetch(&self) -> Result<Vec<Row>>;
}

impl<F> ExportSource for F
where
    F: Fn() -> Result<Vec<Row>> + Send + Sync,
{
    fn fetch(&self) -> Result<Vec<Row>> {
        self()
    }
}

/// Upper-case the first character, leave the rest alone
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn export_field(cell: Option<&Cell>) -> String {
    cell.map(Cell::to_string).unwrap_or_default()
}

/// Serialize rows as CSV
///
/// The header row holds the capitalized `headers`; each row contributes the
/// cells under those keys. Fields containing a quote, comma or newline are
/// quoted with inner quotes doubled. Carriage returns are quoted too, and a
/// record made of one empty field is written as `""` so it is not read
/// back as a blank line.
pub fn to_csv(headers: &[String], rows: &[Row]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(headers.iter().map(|h| capitalize_first(h)))?;
    for row in rows {
        writer.write_record(headers.iter().map(|h| export_field(row.get(h))))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {}", e))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// Parse CSV text back into its header and records
pub fn parse_csv(text: &str) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.iter().map(String::from).collect();
    let mut records = Vec::new();
    for record in reader.records() {
        records.push(record?.iter().map(String::from).collect());
    }
    Ok((headers, records))
}

/// Serialize and write an export file
pub fn write_export(path: &Path, headers: &[String], rows: &[Row]) -> Result<()> {
    let contents = to_csv(headers, rows)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// What to export and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub path: PathBuf,
    /// Row keys to export, in column order
    pub headers: Vec<String>,
}

/// State of the export action
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExportStatus {
    #[default]
    Idle,
    Running,
    Finished { path: PathBuf, rows: usize },
    Failed(String),
}

enum ExportMessage {
    Finished { path: PathBuf, rows: usize },
    Failed(String),
}

struct ExportJob {
    receiver: Receiver<ExportMessage>,
    start_instant: Instant,
}

/// Runs one export at a time in the background
#[derive(Default)]
pub struct ExportRunner {
    job: Option<ExportJob>,
    status: ExportStatus,
}

impl ExportRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &ExportStatus {
        &self.status
    }

    /// Whether the export action is currently disabled
    pub fn is_running(&self) -> bool {
        self.job.is_some()
    }

    /// Start an export unless one is already running
    pub fn spawn(&mut self, source: Arc<dyn ExportSource>, request: ExportRequest) -> bool {
        if self.is_running() {
            return false;
        }

        let (tx, rx) = mpsc::channel();
        debug!(path = %request.path.display(), "starting export");
        thread::spawn(move || {
            Self::run_export(source.as_ref(), &request, tx);
        });

        self.job = Some(ExportJob {
            receiver: rx,
            start_instant: Instant::now(),
        });
        self.status = ExportStatus::Running;
        true
    }

    /// Check the running export
    ///
    /// Returns the final status once, when the export finishes or fails.
    pub fn poll(&mut self) -> Option<ExportStatus> {
        let job = self.job.as_ref()?;

        let status = match job.receiver.try_recv() {
            Ok(ExportMessage::Finished { path, rows }) => {
                debug!(
                    rows,
                    elapsed_ms = job.start_instant.elapsed().as_millis() as u64,
                    "export finished"
                );
                ExportStatus::Finished { path, rows }
            }
            Ok(ExportMessage::Failed(err)) => {
                warn!(error = %err, "export failed");
                ExportStatus::Failed(err)
            }
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                warn!("export worker stopped without a result");
                ExportStatus::Failed("Export stopped unexpectedly".to_string())
            }
        };

        self.job = None;
        self.status = status.clone();
        Some(status)
    }

    fn run_export(source: &dyn ExportSource, request: &ExportRequest, tx: Sender<ExportMessage>) {
        let result = source
            .fetch()
            .and_then(|rows| write_export(&request.path, &request.headers, &rows).map(|_| rows.len()));

        let message = match result {
            Ok(rows) => ExportMessage::Finished {
                path: request.path.clone(),
                rows,
            },
            Err(e) => ExportMessage::Failed(format!("{:#}", e)),
        };
        let _ = tx.send(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::row::row;
    use std::time::Duration;

    fn headers(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    fn wait_for(runner: &mut ExportRunner) -> ExportStatus {
        for _ in 0..500 {
            if let Some(status) = runner.poll() {
                return status;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("export did not finish");
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("report-tui-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("region"), "Region");
        assert_eq!(capitalize_first("éclair"), "Éclair");
        assert_eq!(capitalize_first(""), "");
        assert_eq!(capitalize_first("totalAmount"), "TotalAmount");
    }

    #[test]
    fn test_quotes_fields_that_need_it() {
        let rows = vec![row([
            ("note", Cell::from("He said, \"hi\"")),
            ("amount", Cell::from(12i64)),
        ])];
        let csv = to_csv(&headers(&["note", "amount"]), &rows).unwrap();
        assert_eq!(csv, "Note,Amount\n\"He said, \"\"hi\"\"\",12\n");
    }

    #[test]
    fn test_round_trip_restores_values() {
        let rows = vec![
            row([("note", Cell::from("He said, \"hi\"")), ("city", Cell::from("Paris"))]),
            row([("note", Cell::from("two\nlines")), ("city", Cell::Null)]),
            row([("note", Cell::from("plain")), ("city", Cell::from("Oslo, NO"))]),
        ];
        let keys = headers(&["note", "city"]);

        let csv = to_csv(&keys, &rows).unwrap();
        let (parsed_headers, records) = parse_csv(&csv).unwrap();

        assert_eq!(parsed_headers, vec!["Note", "City"]);
        let expected: Vec<Vec<String>> = rows
            .iter()
            .map(|r| keys.iter().map(|k| r[k].to_string()).collect())
            .collect();
        assert_eq!(records, expected);
        assert_eq!(records[0][0], "He said, \"hi\"");
    }

    #[test]
    fn test_missing_cells_export_empty() {
        let rows = vec![row([("a", Cell::from("x"))])];
        let csv = to_csv(&headers(&["a", "b"]), &rows).unwrap();
        assert_eq!(csv, "A,B\nx,\n");
    }

    #[test]
    fn test_carriage_return_and_lone_empty_field_are_quoted() {
        let rows = vec![
            row([("note", Cell::from("a\rb"))]),
            row([("note", Cell::Null)]),
        ];
        let keys = headers(&["note"]);
        let csv = to_csv(&keys, &rows).unwrap();
        assert_eq!(csv, "Note\n\"a\rb\"\n\"\"\n");

        let (_, records) = parse_csv(&csv).unwrap();
        assert_eq!(records, vec![vec!["a\rb".to_string()], vec![String::new()]]);
    }

    #[test]
    fn test_zero_rows_writes_header_only() {
        let csv = to_csv(&headers(&["region", "amount"]), &[]).unwrap();
        assert_eq!(csv, "Region,Amount\n");
    }

    #[test]
    fn test_runner_writes_file() {
        let path = temp_path("ok.csv");
        let source: Arc<dyn ExportSource> = Arc::new(|| -> Result<Vec<Row>> {
            Ok(vec![row([("region", Cell::from("east"))])])
        });

        let mut runner = ExportRunner::new();
        assert!(runner.spawn(
            source.clone(),
            ExportRequest {
                path: path.clone(),
                headers: headers(&["region"]),
            }
        ));
        assert!(runner.is_running());
        assert!(!runner.spawn(
            source,
            ExportRequest {
                path: path.clone(),
                headers: vec![],
            }
        ));

        let status = wait_for(&mut runner);
        assert_eq!(
            status,
            ExportStatus::Finished {
                path: path.clone(),
                rows: 1
            }
        );
        assert!(!runner.is_running());
        assert_eq!(fs::read_to_string(&path).unwrap(), "Region\neast\n");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_runner_reports_source_failure() {
        let source: Arc<dyn ExportSource> = Arc::new(|| -> Result<Vec<Row>> {
            anyhow::bail!("backend unavailable")
        });

        let mut runner = ExportRunner::new();
        runner.spawn(
            source,
            ExportRequest {
                path: temp_path("never.csv"),
                headers: vec![],
            },
        );

        match wait_for(&mut runner) {
            ExportStatus::Failed(msg) => assert!(msg.contains("backend unavailable")),
            other => panic!("unexpected status: {:?}", other),
        }
        assert!(!runner.is_running());
        assert!(matches!(runner.status(), ExportStatus::Failed(_)));
    }
}
