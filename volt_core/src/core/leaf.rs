//! Ready-made leaf actions

use super::action::{Action, Status};
use crate::error::VoltResult;
use crate::telemetry::packet::TelemetryPacket;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Runs a closure once and finishes on the first tick
pub struct InstantAction<F> {
    f: F,
}

impl<F: FnMut() + Send> InstantAction<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F: FnMut() + Send> Action for InstantAction<F> {
    fn advance(&mut self, _packet: &mut TelemetryPacket) -> VoltResult<Status> {
        (self.f)();
        Ok(Status::Done)
    }

    fn name(&self) -> &str {
        "Instant"
    }
}

/// Keeps running until `duration` has passed since its first tick
#[derive(Debug, Clone)]
pub struct WaitAction {
    duration: Duration,
    started: Option<Instant>,
}

impl WaitAction {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            started: None,
        }
    }

    /// Negative or NaN waits finish at once; waits too long for a
    /// `Duration` saturate to `Duration::MAX`
    pub fn from_secs_f64(seconds: f64) -> Self {
        Self::new(Duration::try_from_secs_f64(seconds.max(0.0)).unwrap_or(Duration::MAX))
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl Action for WaitAction {
    fn advance(&mut self, packet: &mut TelemetryPacket) -> VoltResult<Status> {
        let started = *self.started.get_or_insert_with(Instant::now);
        let elapsed = started.elapsed();
        let remaining_ms = self.duration.saturating_sub(elapsed).as_millis();
        packet.put("wait/remaining_ms", u64::try_from(remaining_ms).unwrap_or(u64::MAX));
        Ok(Status::running_if(elapsed < self.duration))
    }

    fn name(&self) -> &str {
        "Wait"
    }
}

/// Leaf built from a single tick closure
pub struct FnAction<F> {
    label: String,
    f: F,
}

impl<F> FnAction<F>
where
    F: FnMut(&mut TelemetryPacket) -> VoltResult<Status> + Send,
{
    pub fn new(label: &str, f: F) -> Self {
        Self {
            label: label.to_string(),
            f,
        }
    }
}

impl<F> Action for FnAction<F>
where
    F: FnMut(&mut TelemetryPacket) -> VoltResult<Status> + Send,
{
    fn advance(&mut self, packet: &mut TelemetryPacket) -> VoltResult<Status> {
        (self.f)(packet)
    }

    fn name(&self) -> &str {
        &self.label
    }
}

type InitFn = Box<dyn FnOnce() + Send>;
type UpdateFn = Box<dyn FnMut(&mut TelemetryPacket) -> VoltResult<bool> + Send>;
type StopFn = Box<dyn FnOnce() + Send>;

/// Control action for an attachment: init once, update until finished, stop once
///
/// `update` returns `Ok(true)` once the attachment has reached its goal. The
/// shared `running` flag is raised after `init` and lowered after `on_stop`,
/// or as soon as `update` fails.
pub struct ControlAction {
    label: String,
    init: Option<InitFn>,
    update: UpdateFn,
    on_stop: Option<StopFn>,
    running: Arc<AtomicBool>,
    initialized: bool,
}

impl ControlAction {
    pub fn new<U>(label: &str, update: U) -> Self
    where
        U: FnMut(&mut TelemetryPacket) -> VoltResult<bool> + Send + 'static,
    {
        Self {
            label: label.to_string(),
            init: None,
            update: Box::new(update),
            on_stop: None,
            running: Arc::new(AtomicBool::new(false)),
            initialized: false,
        }
    }

    pub fn on_init(mut self, init: impl FnOnce() + Send + 'static) -> Self {
        self.init = Some(Box::new(init));
        self
    }

    pub fn on_stop(mut self, stop: impl FnOnce() + Send + 'static) -> Self {
        self.on_stop = Some(Box::new(stop));
        self
    }

    /// Share the attachment's running flag with this action
    pub fn with_running_flag(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = running;
        self
    }

    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }
}

impl Action for ControlAction {
    fn advance(&mut self, packet: &mut TelemetryPacket) -> VoltResult<Status> {
        if !self.initialized {
            if let Some(init) = self.init.take() {
                init();
            }
            self.initialized = true;
            self.running.store(true, Ordering::SeqCst);
        }

        let finished = match (self.update)(packet) {
            Ok(finished) => finished,
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };

        if finished {
            if let Some(stop) = self.on_stop.take() {
                stop();
            }
            self.running.store(false, Ordering::SeqCst);
            return Ok(Status::Done);
        }

        Ok(Status::Running)
    }

    fn name(&self) -> &str {
        &self.label
    }
}
