use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use rdirdiff_common::{DivergenceRecord, RunStats};
use rdirdiff_core::report::{sanitize_path, DEFAULT_WIDTH};
use rdirdiff_core::{ReportSink, TextSink};
use std::io::{self, Write};
use std::path::Path;

/// Width of the attached terminal, if stdout is one
pub fn terminal_width() -> Option<usize> {
    console::Term::stdout()
        .size_checked()
        .map(|(_rows, cols)| cols as usize)
}

/// Interactive report output
///
/// Lines are rendered by a [`TextSink`] padded to the terminal width. While
/// the traversal runs, a transient `Scanning: <dir>` line is kept at the
/// bottom of the screen and cleared before every record so it never ends up
/// in the scrollback.
pub struct TerminalSink<W: Write> {
    text: TextSink<W>,
    progress: Option<ProgressBar>,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, width: usize, color: bool) -> Self {
        Self {
            text: TextSink::new(out).with_width(width).with_color(color),
            progress: None,
        }
    }

    /// Show the scanning line on stdout when it is a terminal
    pub fn with_progress(mut self, enabled: bool) -> Self {
        let target = ProgressDrawTarget::stdout();
        if !enabled || target.is_hidden() {
            return self;
        }

        let style = ProgressStyle::with_template("{prefix:.bold} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let bar = ProgressBar::with_draw_target(None, target);
        bar.set_style(style);
        bar.set_prefix("Scanning:");
        self.progress = Some(bar);
        self
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.text.into_inner()
    }
}

impl TerminalSink<io::Stdout> {
    pub fn stdout(color: bool) -> Self {
        let width = terminal_width().unwrap_or(DEFAULT_WIDTH);
        Self::new(io::stdout(), width, color)
    }
}

impl<W: Write> ReportSink for TerminalSink<W> {
    fn record(&mut self, record: &DivergenceRecord) -> io::Result<()> {
        let text = &mut self.text;
        match &self.progress {
            Some(bar) => bar.suspend(|| {
                text.record(record)?;
                text.flush()
            }),
            None => text.record(record),
        }
    }

    fn scanning(&mut self, dir: &Path) -> io::Result<()> {
        if let Some(bar) = &self.progress {
            bar.set_message(format!("{}/", sanitize_path(dir)));
        }
        Ok(())
    }

    fn finish(&mut self, stats: &RunStats) -> io::Result<()> {
        if let Some(bar) = self.progress.take() {
            bar.finish_and_clear();
        }
        self.text.finish(stats)
    }
}
