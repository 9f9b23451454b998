//! Rendering of divergence records and run statistics
//!
//! The differ only ever talks to a [`Reporter`], which counts records and
//! forwards them to a [`ReportSink`]. Sinks decide the presentation: aligned
//! text lines, JSON lines, or plain collection in memory.

use rdirdiff_common::{Divergence, DivergenceRecord, RunStats};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

pub const BOLD: &str = "\x1b[1m";
pub const RESET: &str = "\x1b[0m";

/// Width used when no terminal width is known
pub const DEFAULT_WIDTH: usize = 80;

/// ANSI styling for each divergence label
pub fn label_style(divergence: Divergence) -> &'static str {
    match divergence {
        Divergence::OnlyInFirst => "\x1b[36m",            // Cyan
        Divergence::OnlyInSecond => "\x1b[35m",           // Magenta
        Divergence::Size | Divergence::Contents => "\x1b[33m",
        Divergence::SymbolicFile | Divergence::SymbolicDir => "\x1b[33m",
        Divergence::DateOnly => "\x1b[37m",               // White
        Divergence::CannotAccess | Divergence::CannotStat | Divergence::CannotRead => {
            "\x1b[43m\x1b[5m\x1b[31m"                      // Red, blinking, on yellow
        }
    }
}

/// Make a path safe to print: control characters such as `\r` or `\n` are
/// escaped so a hostile file name cannot rewrite or forge output lines.
pub fn sanitize_path(path: &Path) -> String {
    sanitize_text(&path.to_string_lossy())
}

pub fn sanitize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_control() {
            out.extend(c.escape_default());
        } else {
            out.push(c);
        }
    }
    out
}

/// Build one report line: `(<kind>) <path>`, padding, then the label.
/// The label is right-aligned to `width` when the path leaves room for it.
pub fn format_line(record: &DivergenceRecord, width: usize, color: bool) -> String {
    let label = record.divergence.label();
    let mut line = format!("({}) {}", record.kind.tag(), sanitize_path(&record.path));

    let used = line.chars().count() + label.chars().count();
    let padding = width.saturating_sub(used).max(1);
    line.extend(std::iter::repeat(' ').take(padding));

    if color {
        line.push_str(label_style(record.divergence));
        line.push_str(label);
        line.push_str(RESET);
    } else {
        line.push_str(label);
    }
    line
}

/// Receives every divergence the differ detects, in output order
pub trait ReportSink {
    fn record(&mut self, record: &DivergenceRecord) -> io::Result<()>;

    /// Called when the differ starts on a new directory pair
    fn scanning(&mut self, _dir: &Path) -> io::Result<()> {
        Ok(())
    }

    /// Called once after the traversal ends
    fn finish(&mut self, _stats: &RunStats) -> io::Result<()> {
        Ok(())
    }
}

/// Counts records and forwards them to a sink
pub struct Reporter<S: ReportSink> {
    sink: S,
    stats: RunStats,
}

impl<S: ReportSink> Reporter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            stats: RunStats::default(),
        }
    }

    pub fn emit(&mut self, record: DivergenceRecord) -> io::Result<()> {
        self.stats.differences += 1;
        if record.divergence.is_error() {
            self.stats.errors += 1;
        }
        self.sink.record(&record)
    }

    pub fn scanning(&mut self, dir: &Path) -> io::Result<()> {
        self.sink.scanning(dir)
    }

    pub fn finish(&mut self) -> io::Result<()> {
        self.sink.finish(&self.stats)
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

/// Aligned, optionally coloured text lines
pub struct TextSink<W: Write> {
    out: W,
    width: usize,
    color: bool,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            width: DEFAULT_WIDTH,
            color: false,
        }
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn with_color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for TextSink<W> {
    fn record(&mut self, record: &DivergenceRecord) -> io::Result<()> {
        writeln!(self.out, "{}", format_line(record, self.width, self.color))
    }

    fn finish(&mut self, _stats: &RunStats) -> io::Result<()> {
        self.out.flush()
    }
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    name: &'a str,
    path: String,
    kind: char,
    label: &'static str,
    is_error: bool,
}

#[derive(Serialize)]
struct JsonSummary {
    differences: u64,
    errors: u64,
    identical: bool,
}

#[derive(Serialize)]
struct JsonSummaryLine {
    summary: JsonSummary,
}

/// One JSON object per record, followed by a summary object
pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_json<T: Serialize>(&mut self, value: &T) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, value)?;
        writeln!(self.out)
    }
}

impl<W: Write> ReportSink for JsonLinesSink<W> {
    fn record(&mut self, record: &DivergenceRecord) -> io::Result<()> {
        let json = JsonRecord {
            name: &record.name,
            path: record.path.to_string_lossy().into_owned(),
            kind: record.kind.tag(),
            label: record.divergence.label(),
            is_error: record.divergence.is_error(),
        };
        self.write_json(&json)
    }

    fn finish(&mut self, stats: &RunStats) -> io::Result<()> {
        let summary = JsonSummaryLine {
            summary: JsonSummary {
                differences: stats.differences,
                errors: stats.errors,
                identical: stats.is_identical(),
            },
        };
        self.write_json(&summary)?;
        self.out.flush()
    }
}

/// Keeps every record in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub records: Vec<DivergenceRecord>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportSink for CollectingSink {
    fn record(&mut self, record: &DivergenceRecord) -> io::Result<()> {
        self.records.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdirdiff_common::EntryKind;
    use std::path::PathBuf;

    fn record(path: &str, divergence: Divergence) -> DivergenceRecord {
        DivergenceRecord::new("x", PathBuf::from(path), EntryKind::File, divergence)
    }

    #[test]
    fn test_sanitize_escapes_control_characters() {
        assert_eq!(sanitize_text("a\rb\nc\td"), "a\\rb\\nc\\td");
        assert_eq!(sanitize_text("esc\x1b[2J"), "esc\\u{1b}[2J");
        assert_eq!(sanitize_text("plain name.txt"), "plain name.txt");
        assert_eq!(sanitize_text("{braces} ünïcode"), "{braces} ünïcode");
    }

    #[test]
    fn test_format_line_pads_to_width() {
        let line = format_line(&record("/a/b.txt", Divergence::Size), 40, false);
        assert_eq!(line.chars().count(), 40);
        assert!(line.starts_with("(f) /a/b.txt "));
        assert!(line.ends_with("Diverge in size"));
    }

    #[test]
    fn test_format_line_keeps_one_space_when_too_long() {
        let long = format!("/{}", "x".repeat(100));
        let line = format_line(&record(&long, Divergence::Contents), 40, false);
        assert!(line.ends_with(&format!("{} Diverge in contents", "x".repeat(5))));
    }

    #[test]
    fn test_format_line_color() {
        let line = format_line(&record("/a", Divergence::OnlyInFirst), 20, true);
        assert!(line.contains("\x1b[36mOnly in first\x1b[0m"));
    }

    #[test]
    fn test_reporter_counts_errors_separately() {
        let mut reporter = Reporter::new(CollectingSink::new());
        reporter.emit(record("/a", Divergence::Contents)).unwrap();
        reporter.emit(record("/b", Divergence::CannotRead)).unwrap();
        reporter.emit(record("/c", Divergence::CannotAccess)).unwrap();

        let stats = reporter.stats();
        assert_eq!(stats.differences, 3);
        assert_eq!(stats.errors, 2);
        assert_eq!(reporter.into_sink().records.len(), 3);
    }

    #[test]
    fn test_text_sink_one_line_per_record() {
        let mut sink = TextSink::new(Vec::new()).with_width(30);
        sink.record(&record("/bad\nname", Divergence::OnlyInSecond)).unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("/bad\\nname"));
    }

    #[test]
    fn test_json_lines_sink() {
        let mut reporter = Reporter::new(JsonLinesSink::new(Vec::new()));
        reporter.emit(record("/a/x", Divergence::DateOnly)).unwrap();
        reporter.finish().unwrap();

        let text = String::from_utf8(reporter.into_sink().into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["label"], "Diverge only in date");
        assert_eq!(lines[0]["kind"], "f");
        assert_eq!(lines[0]["is_error"], false);
        assert_eq!(lines[1]["summary"]["differences"], 1);
        assert_eq!(lines[1]["summary"]["identical"], false);
    }
}
