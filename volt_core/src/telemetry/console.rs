//! Line-oriented telemetry for the driver station display
//!
//! This is the human-readable channel. Robots write their state into it from
//! `Robot::update`, and the tracer writes its running-actions listing into it.

use std::fmt::Display;

/// Sink for human-readable telemetry lines
pub trait Telemetry {
    /// Add a free-form line
    fn add_line(&mut self, line: &str);

    /// Add a `caption: value` row
    fn add_data(&mut self, caption: &str, value: &dyn Display);

    /// Push the accumulated lines to the display (optional override)
    fn update(&mut self) {}
}

/// In-memory telemetry that logs each frame on `update`
#[derive(Debug, Clone, Default)]
pub struct TelemetryLog {
    lines: Vec<String>,
    last_frame: Vec<String>,
    frames: u64,
}

impl TelemetryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines written since the last `update`
    pub fn pending(&self) -> &[String] {
        &self.lines
    }

    /// Lines of the most recently published frame
    pub fn last_frame(&self) -> &[String] {
        &self.last_frame
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Telemetry for TelemetryLog {
    fn add_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn add_data(&mut self, caption: &str, value: &dyn Display) {
        self.lines.push(format!("{}: {}", caption, value));
    }

    fn update(&mut self) {
        for line in &self.lines {
            log::trace!("[telemetry] {}", line);
        }
        self.last_frame = std::mem::take(&mut self.lines);
        self.frames += 1;
    }
}
