//! Output rendering: checksum lines and the run summary.
//!
//! Text output matches the familiar `sha256sum` binary-mode layout
//! (`<hash> *<path>`). JSON output writes one object per line, like the
//! rest of our NDJSON tooling.

use std::io::{self, Write};
use std::time::Duration;

use serde::Serialize;

use crate::aggregator::Summary;
use crate::config::OutputFormat;
use crate::worker::JobResult;

pub trait Reporter {
    /// Emit the record for one successfully hashed file.
    fn file(&mut self, result: &JobResult) -> io::Result<()>;

    /// Emit the final summary of a successful run.
    fn summary(&mut self, summary: &Summary) -> io::Result<()>;
}

/// Pick the reporter for the configured output format.
pub fn reporter_for<'a, W: Write + 'a>(format: OutputFormat, out: W) -> Box<dyn Reporter + 'a> {
    match format {
        OutputFormat::Text => Box::new(TextReporter::new(out)),
        OutputFormat::Json => Box::new(JsonReporter::new(out)),
    }
}

pub struct TextReporter<W> {
    out: W,
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn file(&mut self, result: &JobResult) -> io::Result<()> {
        writeln!(self.out, "{} *{}", result.hash, result.path.display())
    }

    fn summary(&mut self, summary: &Summary) -> io::Result<()> {
        let speed = match summary.throughput_mib_per_sec() {
            Some(mib_s) => format!("{mib_s:.2}MB/s"),
            None => "n/a".to_string(),
        };
        writeln!(
            self.out,
            "Total Bytes: {} Duration: {} Speed: {}",
            summary.total_bytes,
            format_duration(summary.total_duration),
            speed
        )?;
        self.out.flush()
    }
}

#[derive(Serialize)]
struct FileRecord<'a> {
    hash: &'a str,
    path: String,
    size: u64,
}

#[derive(Serialize)]
struct SummaryRecord {
    files: usize,
    total_bytes: u64,
    duration_secs: f64,
    speed_mib_s: Option<f64>,
}

pub struct JsonReporter<W> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn write_line<T: Serialize>(&mut self, value: &T) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, value)?;
        self.out.write_all(b"\n")
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn file(&mut self, result: &JobResult) -> io::Result<()> {
        self.write_line(&FileRecord {
            hash: &result.hash,
            path: result.path.to_string_lossy().into_owned(),
            size: result.size,
        })
    }

    fn summary(&mut self, summary: &Summary) -> io::Result<()> {
        self.write_line(&SummaryRecord {
            files: summary.files,
            total_bytes: summary.total_bytes,
            duration_secs: summary.total_duration.as_secs_f64(),
            speed_mib_s: summary.throughput_mib_per_sec(),
        })?;
        self.out.flush()
    }
}

/// Render a duration rounded to whole seconds: `0s`, `42s`, `1m5s`, `2h0m3s`.
pub fn format_duration(duration: Duration) -> String {
    let mut secs = duration.as_secs();
    if duration.subsec_millis() >= 500 {
        secs += 1;
    }

    let (hours, rem) = (secs / 3600, secs % 3600);
    let (mins, secs) = (rem / 60, rem % 60);

    if hours > 0 {
        format!("{hours}h{mins}m{secs}s")
    } else if mins > 0 {
        format!("{mins}m{secs}s")
    } else {
        format!("{secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn result(path: &str, hash: &str, size: u64) -> JobResult {
        JobResult {
            path: PathBuf::from(path),
            hash: hash.to_string(),
            size,
            duration: Duration::from_millis(10),
            error: None,
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::ZERO), "0s");
        assert_eq!(format_duration(Duration::from_millis(499)), "0s");
        assert_eq!(format_duration(Duration::from_millis(1500)), "2s");
        assert_eq!(format_duration(Duration::from_secs(65)), "1m5s");
        assert_eq!(format_duration(Duration::from_secs(7203)), "2h0m3s");
    }

    #[test]
    fn test_text_summary_line() {
        let mut out = Vec::new();
        let summary = Summary {
            files: 2,
            total_bytes: 3 * 1024 * 1024,
            total_duration: Duration::from_secs(2),
        };
        TextReporter::new(&mut out).summary(&summary).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Total Bytes: 3145728 Duration: 2s Speed: 1.50MB/s\n"
        );
    }

    #[test]
    fn test_text_summary_without_duration() {
        let mut out = Vec::new();
        TextReporter::new(&mut out).summary(&Summary::default()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Total Bytes: 0 Duration: 0s Speed: n/a\n"
        );
    }

    #[test]
    fn test_json_records() {
        let mut out = Vec::new();
        {
            let mut reporter = JsonReporter::new(&mut out);
            reporter.file(&result("dir/a.txt", "abcd", 3)).unwrap();
            reporter.summary(&Summary::default()).unwrap();
        }

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["hash"], "abcd");
        assert_eq!(lines[0]["path"], "dir/a.txt");
        assert_eq!(lines[0]["size"], 3);
        assert_eq!(lines[1]["total_bytes"], 0);
        assert!(lines[1]["speed_mib_s"].is_null());
    }

    #[test]
    fn test_reporter_for_text() {
        let mut out = Vec::new();
        {
            let mut reporter = reporter_for(OutputFormat::Text, &mut out);
            reporter.file(&result("x", "00ff", 1)).unwrap();
        }
        assert_eq!(String::from_utf8(out).unwrap(), "00ff *x\n");
    }
}
