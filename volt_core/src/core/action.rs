use crate::error::VoltResult;
use crate::telemetry::packet::{Canvas, TelemetryPacket};
use std::fmt;

/// Completion state reported by `Action::advance`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Running,
    Done,
}

impl Status {
    /// Map a "still running" flag to a status
    pub fn running_if(running: bool) -> Self {
        if running {
            Status::Running
        } else {
            Status::Done
        }
    }

    pub fn is_done(self) -> bool {
        self == Status::Done
    }

    pub fn is_running(self) -> bool {
        self == Status::Running
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Running => write!(f, "Running"),
            Status::Done => write!(f, "Done"),
        }
    }
}

/// A pollable unit of robot behavior
///
/// Actions are stateful and single-use: once `advance` has returned
/// [`Status::Done`] the action must not be advanced again. `advance` must not
/// block; long-running work keeps returning [`Status::Running`] until it is
/// finished.
pub trait Action: Send {
    /// Run one tick. Telemetry and overlay drawings go into `packet`.
    fn advance(&mut self, packet: &mut TelemetryPacket) -> VoltResult<Status>;

    /// Draw the static overlay shown before the first tick (optional override)
    fn preview(&self, _canvas: &mut Canvas) {}

    /// Label used by tracing and logs (optional override)
    fn name(&self) -> &str {
        "Action"
    }
}

impl<A: Action + ?Sized> Action for Box<A> {
    fn advance(&mut self, packet: &mut TelemetryPacket) -> VoltResult<Status> {
        (**self).advance(packet)
    }

    fn preview(&self, canvas: &mut Canvas) {
        (**self).preview(canvas)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_if() {
        assert_eq!(Status::running_if(true), Status::Running);
        assert_eq!(Status::running_if(false), Status::Done);
        assert!(Status::Done.is_done());
        assert!(Status::Running.is_running());
    }
}
