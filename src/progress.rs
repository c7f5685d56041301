//! Progress reporting.
//!
//! Engines report progress through the [`ProgressSink`] trait so the same
//! engine code can drive a terminal bar, stay silent, or feed a recording
//! sink in tests. A reporting session runs start, any number of advances,
//! then close.
//!
//! # Examples
//!
//! ```
//! use pdfsuite::progress::{ProgressSink, TerminalProgress};
//!
//! let mut progress = TerminalProgress::new();
//! progress.start(100, "Merging files");
//! for _ in 0..100 {
//!     progress.advance(1);
//!     // Do work...
//! }
//! progress.close();
//! ```

use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Receiver for progress events emitted by the engines.
///
/// Implementations must tolerate `advance` pushing the position past the
/// total (the position is clamped for display) and `close` being called
/// without a preceding `start`.
pub trait ProgressSink {
    /// Begin a reporting session over `total` units with a display label.
    fn start(&mut self, total: u64, label: &str);

    /// Advance the position by `n` units.
    fn advance(&mut self, n: u64);

    /// Move the position to an absolute value.
    ///
    /// Used by percentage-based reporters (compression) whose estimate can
    /// move in jumps rather than increments.
    fn set_position(&mut self, position: u64) {
        // Default ignores absolute positions for sinks that only count.
        let _ = position;
    }

    /// End the session. The display is finalized at 100%.
    fn close(&mut self);
}

/// Terminal progress bar.
///
/// Renders `label [=====>    ] 42% 42/100 3s` on a single rewritten line.
/// Output is suppressed when stderr is not a terminal, so piping and
/// redirection stay clean.
pub struct TerminalProgress {
    total: u64,
    current: u64,
    label: String,
    start_time: Instant,
    /// Last render time, for rate limiting.
    last_render: Instant,
    render_interval: Duration,
    enabled: bool,
}

impl TerminalProgress {
    /// Create a terminal progress bar, enabled when stderr is a terminal.
    pub fn new() -> Self {
        Self::with_enabled(Self::is_terminal())
    }

    /// Create a bar with output explicitly enabled or disabled.
    pub fn with_enabled(enabled: bool) -> Self {
        Self {
            total: 0,
            current: 0,
            label: String::new(),
            start_time: Instant::now(),
            last_render: Instant::now() - Duration::from_secs(1),
            render_interval: Duration::from_millis(100),
            enabled,
        }
    }

    fn is_terminal() -> bool {
        use std::io::IsTerminal;
        io::stderr().is_terminal()
    }

    /// Current position as a percentage of the total.
    pub fn percent(&self) -> f64 {
        if self.total > 0 {
            (self.current.min(self.total) as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }

    fn render(&mut self, force: bool) {
        if !self.enabled {
            return;
        }
        if !force && self.last_render.elapsed() < self.render_interval {
            return;
        }
        self.last_render = Instant::now();

        let width = 40;
        let current = self.current.min(self.total);
        let filled = if self.total > 0 {
            (width as u64 * current / self.total) as usize
        } else {
            0
        };
        let bar = format!(
            "[{}{}]",
            "=".repeat(filled.saturating_sub(1)) + if filled > 0 { ">" } else { "" },
            " ".repeat(width - filled)
        );
        let elapsed = format_duration(self.start_time.elapsed());

        eprint!(
            "\r{} {} {:.0}% {}/{} {}",
            self.label,
            bar,
            self.percent(),
            current,
            self.total,
            elapsed
        );
        io::stderr().flush().ok();
    }
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for TerminalProgress {
    fn start(&mut self, total: u64, label: &str) {
        self.total = total;
        self.current = 0;
        self.label = label.to_string();
        self.start_time = Instant::now();
        self.render(true);
    }

    fn advance(&mut self, n: u64) {
        self.current = self.current.saturating_add(n);
        self.render(false);
    }

    fn set_position(&mut self, position: u64) {
        self.current = position;
        self.render(false);
    }

    fn close(&mut self) {
        if self.enabled {
            self.current = self.total;
            self.render(true);
            eprintln!();
        }
    }
}

/// Sink that discards all progress events.
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn start(&mut self, _total: u64, _label: &str) {}
    fn advance(&mut self, _n: u64) {}
    fn set_position(&mut self, _position: u64) {}
    fn close(&mut self) {}
}

/// Sink that records every event for assertion in tests.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    /// All events in arrival order.
    pub events: Vec<ProgressEvent>,
}

/// One recorded progress event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Session started with a total and label.
    Start(u64, String),
    /// Position advanced by an amount.
    Advance(u64),
    /// Position set to an absolute value.
    SetPosition(u64),
    /// Session closed.
    Close,
}

impl RecordingProgress {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// The final position implied by the recorded events.
    pub fn final_position(&self) -> u64 {
        let mut pos = 0u64;
        for ev in &self.events {
            match ev {
                ProgressEvent::Start(..) => pos = 0,
                ProgressEvent::Advance(n) => pos += n,
                ProgressEvent::SetPosition(p) => pos = *p,
                ProgressEvent::Close => {}
            }
        }
        pos
    }

    /// True if the recorded positions never decrease.
    pub fn is_monotonic(&self) -> bool {
        let mut pos = 0u64;
        for ev in &self.events {
            match ev {
                ProgressEvent::Start(..) => pos = 0,
                ProgressEvent::Advance(n) => pos += n,
                ProgressEvent::SetPosition(p) => {
                    if *p < pos {
                        return false;
                    }
                    pos = *p;
                }
                ProgressEvent::Close => {}
            }
        }
        true
    }
}

impl ProgressSink for RecordingProgress {
    fn start(&mut self, total: u64, label: &str) {
        self.events
            .push(ProgressEvent::Start(total, label.to_string()));
    }

    fn advance(&mut self, n: u64) {
        self.events.push(ProgressEvent::Advance(n));
    }

    fn set_position(&mut self, position: u64) {
        self.events.push(ProgressEvent::SetPosition(position));
    }

    fn close(&mut self) {
        self.events.push(ProgressEvent::Close);
    }
}

/// Format a duration as a human-readable string.
fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}
