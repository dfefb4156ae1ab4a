//! User interface functions for the CLI.
//! Contains helpers for displaying headers and the sweep progress bar.

use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use engine::SweepProgress;

pub fn print_header() {
    let version = env!("CARGO_PKG_VERSION");
    // Avoid panics when the version exceeds the expected width
    let spaces = " ".repeat(24usize.saturating_sub(version.len()));
    eprintln!(
        r#"
    ╭──────────────────────────────────────╮
    │                                      │
    │          T A I N T M A P             │
    │                                      │
    │     Risk heatmaps and taint flow     │
    │     Version: {version}{spaces}│
    │                                      │
    ╰──────────────────────────────────────╯
"#
    );
}

struct BarState {
    files_completed: usize,
    last_line_len: usize,
    last_draw: Instant,
}

/// Sweep progress on stderr.
///
/// The bar renders only when stderr is attached to a terminal. For
/// non-interactive environments (CI, redirections), progress updates
/// are skipped to avoid noisy logs.
pub struct ProgressBar {
    total_files: usize,
    width: usize,
    min_interval: Duration,
    start: Instant,
    state: Mutex<BarState>,
}

impl ProgressBar {
    /// Returns `None` when there is nothing to track or when stderr is
    /// not attached to a terminal.
    pub fn new(total_files: usize) -> Option<Self> {
        if total_files == 0 || !io::stderr().is_terminal() {
            return None;
        }
        Some(Self::with_total(total_files))
    }

    fn with_total(total_files: usize) -> Self {
        let min_interval = Duration::from_millis(75);
        let start = Instant::now();
        Self {
            total_files,
            width: 28,
            min_interval,
            start,
            state: Mutex::new(BarState {
                files_completed: 0,
                last_line_len: 0,
                // first update always draws
                last_draw: start.checked_sub(min_interval).unwrap_or(start),
            }),
        }
    }

    /// Forces a final draw and moves the cursor to the next line.
    pub fn finish(&self) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        let line = self.render(state.files_completed);
        let mut stderr = io::stderr();
        let _ = writeln!(stderr, "\r{line}");
        state.last_line_len = 0;
    }

    fn render(&self, completed: usize) -> String {
        let completed = completed.min(self.total_files);
        let percent = (completed as f64 / self.total_files as f64).clamp(0.0, 1.0);
        let filled = ((self.width as f64) * percent).round() as usize;
        let filled = filled.min(self.width);
        let bar = format!(
            "{}{}",
            "█".repeat(filled),
            "░".repeat(self.width.saturating_sub(filled))
        );
        let eta = self
            .estimate_eta(completed)
            .unwrap_or_else(|| "--:--".to_string());
        format!(
            "▸ Sweep |{bar}| {:6.2}% | files {completed}/{} | ETA {eta}",
            percent * 100.0,
            self.total_files
        )
    }

    fn estimate_eta(&self, completed: usize) -> Option<String> {
        if completed == 0 {
            return None;
        }
        if completed >= self.total_files {
            return Some("00:00".to_string());
        }
        let elapsed = self.start.elapsed().as_secs_f64();
        if elapsed < f64::EPSILON {
            return None;
        }
        let per_second = completed as f64 / elapsed;
        let remaining = (self.total_files - completed) as f64 / per_second;
        Some(format_duration(Duration::from_secs_f64(remaining)))
    }
}

impl SweepProgress for ProgressBar {
    fn file_done(&self, processed: usize, _total: usize, _path: &Path) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        state.files_completed = state.files_completed.max(processed);
        let now = Instant::now();
        if now.duration_since(state.last_draw) < self.min_interval {
            return;
        }
        state.last_draw = now;
        let message = self.render(state.files_completed);
        let padding = " ".repeat(state.last_line_len.saturating_sub(message.len()));
        let mut stderr = io::stderr();
        let _ = write!(stderr, "\r{message}{padding}");
        let _ = stderr.flush();
        state.last_line_len = message.len();
    }
}

fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}
