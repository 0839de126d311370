//! Sequential and parallel composition of actions
//!
//! Both composites own their children. Neither catches a child's error: the
//! first `Err` returned by a child is handed straight back to the caller.

use super::action::{Action, Status};
use crate::error::VoltResult;
use crate::telemetry::packet::{Canvas, TelemetryPacket};

/// Runs owned children one at a time, in order
///
/// Exactly one child is advanced per tick. The composite finishes on the same
/// tick its last child reports `Done`.
pub struct SequentialAction {
    actions: Vec<Box<dyn Action>>,
    cursor: usize,
}

impl SequentialAction {
    pub fn new(actions: Vec<Box<dyn Action>>) -> Self {
        Self { actions, cursor: 0 }
    }

    /// Index of the child that will receive the next tick
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.actions.len()
    }
}

impl Action for SequentialAction {
    fn advance(&mut self, packet: &mut TelemetryPacket) -> VoltResult<Status> {
        let Some(current) = self.actions.get_mut(self.cursor) else {
            return Ok(Status::Done);
        };

        if current.advance(packet)?.is_done() {
            self.cursor += 1;
            if self.is_finished() {
                return Ok(Status::Done);
            }
        }

        Ok(Status::Running)
    }

    fn preview(&self, canvas: &mut Canvas) {
        for action in &self.actions {
            action.preview(canvas);
        }
    }

    fn name(&self) -> &str {
        "Sequence"
    }
}

/// Runs every unfinished child once per tick
///
/// Children are advanced in insertion order. A child that reported `Done` is
/// never advanced again; the composite is `Done` once every child is.
pub struct ParallelAction {
    actions: Vec<Box<dyn Action>>,
    finished: Vec<bool>,
}

impl ParallelAction {
    pub fn new(actions: Vec<Box<dyn Action>>) -> Self {
        let finished = vec![false; actions.len()];
        Self { actions, finished }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Number of children that have not reported `Done` yet
    pub fn remaining(&self) -> usize {
        self.finished.iter().filter(|done| !**done).count()
    }

    pub fn is_finished(&self) -> bool {
        self.finished.iter().all(|done| *done)
    }
}

impl Action for ParallelAction {
    fn advance(&mut self, packet: &mut TelemetryPacket) -> VoltResult<Status> {
        for (action, finished) in self.actions.iter_mut().zip(self.finished.iter_mut()) {
            if *finished {
                continue;
            }
            if action.advance(packet)?.is_done() {
                *finished = true;
            }
        }

        Ok(Status::running_if(!self.is_finished()))
    }

    fn preview(&self, canvas: &mut Canvas) {
        for action in &self.actions {
            action.preview(canvas);
        }
    }

    fn name(&self) -> &str {
        "Parallel"
    }
}
