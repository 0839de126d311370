use super::cancel::CancellationToken;
use super::config::LoopConfig;
use crate::core::action::{Action, Status};
use crate::error::VoltResult;
use crate::telemetry::packet::{Canvas, TelemetryPacket};
use crate::telemetry::sink::{DiagnosticsSink, LogSink};
use crate::telemetry::tracer::ActionTracer;
use std::fmt;
use std::time::{Duration, Instant};

/// Where the loop is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Ticking,
    Cancelled,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopState::Idle => write!(f, "Idle"),
            LoopState::Ticking => write!(f, "Ticking"),
            LoopState::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The root reported `Done`
    Completed,
    /// Cancellation (or the tick limit) was observed at a tick boundary
    Cancelled,
}

/// Summary returned once per run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub ticks: u64,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn completed(&self) -> bool {
        self.outcome == RunOutcome::Completed
    }
}

/// Drives a root action to completion, one tick at a time
///
/// Each run sends the root's preview overlay once, then busy-polls: a fresh
/// packet per tick, one `advance` on the root, a flush to the diagnostics
/// sink. The loop never sleeps. Cancellation is checked before every tick,
/// never during one. A failing root aborts the run with its error; packets of
/// earlier ticks have already been flushed.
pub struct ExecutionLoop {
    config: LoopConfig,
    sink: Box<dyn DiagnosticsSink>,
    tracer: Option<ActionTracer>,
    cancel: CancellationToken,
    state: LoopState,
    total_ticks: u64,
}

impl Default for ExecutionLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionLoop {
    /// Loop with the standard config, logging sink and no tracer
    pub fn new() -> Self {
        Self {
            config: LoopConfig::standard(),
            sink: Box::new(LogSink),
            tracer: None,
            cancel: CancellationToken::new(),
            state: LoopState::Idle,
            total_ticks: 0,
        }
    }

    pub fn with_config(mut self, config: LoopConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_sink(mut self, sink: impl DiagnosticsSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Publish this tracer's history with every tick packet
    pub fn with_tracer(mut self, tracer: ActionTracer) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Share an existing cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn tracer(&self) -> Option<&ActionTracer> {
        self.tracer.as_ref()
    }

    /// Handle that cancels this loop at its next tick boundary
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Ticks performed over every run of this loop
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Run `root` until it is done or the loop is cancelled
    pub fn run<A: Action>(&mut self, root: A) -> VoltResult<RunReport> {
        self.run_with_hook(root, |_| {})
    }

    /// Like [`run`](Self::run), calling `after_tick` with each flushed packet
    pub fn run_with_hook<A, F>(&mut self, mut root: A, mut after_tick: F) -> VoltResult<RunReport>
    where
        A: Action,
        F: FnMut(&TelemetryPacket),
    {
        let started = Instant::now();
        let preview = self.begin(&root);
        let mut ticks = 0;

        let outcome = loop {
            if let Some(outcome) = self.step(&mut root, &preview, &mut ticks, &mut after_tick)? {
                break outcome;
            }
        };

        Ok(self.finish(root.name(), outcome, ticks, started))
    }

    /// Async variant yielding to the runtime after every tick
    ///
    /// Lets several loops share one tokio runtime. Ticking semantics are the
    /// same as [`run`](Self::run).
    pub async fn run_async<A: Action>(&mut self, mut root: A) -> VoltResult<RunReport> {
        let started = Instant::now();
        let preview = self.begin(&root);
        let mut ticks = 0;

        let outcome = loop {
            let mut no_hook = |_: &TelemetryPacket| {};
            if let Some(outcome) = self.step(&mut root, &preview, &mut ticks, &mut no_hook)? {
                break outcome;
            }
            tokio::task::yield_now().await;
        };

        Ok(self.finish(root.name(), outcome, ticks, started))
    }

    /// One boundary check plus at most one tick; `Some` ends the run
    fn step<A: Action + ?Sized>(
        &mut self,
        root: &mut A,
        preview: &Canvas,
        ticks: &mut u64,
        after_tick: &mut dyn FnMut(&TelemetryPacket),
    ) -> VoltResult<Option<RunOutcome>> {
        if let Some(outcome) = self.boundary(*ticks) {
            return Ok(Some(outcome));
        }
        *ticks += 1;
        let (status, packet) = self.tick_once(root, preview, *ticks)?;
        after_tick(&packet);
        Ok(status.is_done().then_some(RunOutcome::Completed))
    }

    fn begin<A: Action + ?Sized>(&mut self, root: &A) -> Canvas {
        let mut preview = Canvas::new();
        root.preview(&mut preview);
        if self.config.preview_overlay {
            self.sink.send_preview(&preview);
        }

        self.state = LoopState::Ticking;
        log::info!(
            "[{}] Running '{}' ({} preview ops)",
            self.config.name,
            root.name(),
            preview.len()
        );
        preview
    }

    /// Outcome to stop with before tick `ticks + 1`, if any
    fn boundary(&self, ticks: u64) -> Option<RunOutcome> {
        if self.cancel.is_cancelled() {
            return Some(RunOutcome::Cancelled);
        }
        match self.config.max_ticks {
            Some(max) if ticks >= max => {
                log::warn!("[{}] Tick limit of {} reached", self.config.name, max);
                Some(RunOutcome::Cancelled)
            }
            _ => None,
        }
    }

    fn tick_once<A: Action + ?Sized>(
        &mut self,
        root: &mut A,
        preview: &Canvas,
        tick: u64,
    ) -> VoltResult<(Status, TelemetryPacket)> {
        let mut packet = TelemetryPacket::for_tick(tick);
        if self.config.persist_preview {
            packet.field_overlay().extend_from(preview);
        }

        let status = match root.advance(&mut packet) {
            Ok(status) => status,
            Err(e) => {
                log::error!(
                    "[{}] '{}' failed on tick {}: {}",
                    self.config.name,
                    root.name(),
                    tick,
                    e
                );
                self.state = LoopState::Idle;
                self.total_ticks += tick;
                return Err(e);
            }
        };

        if self.config.publish_trace {
            if let Some(tracer) = &self.tracer {
                tracer.write_packet(&mut packet);
            }
        }
        self.sink.send_packet(&packet);

        Ok((status, packet))
    }

    fn finish(&mut self, name: &str, outcome: RunOutcome, ticks: u64, started: Instant) -> RunReport {
        self.total_ticks += ticks;
        let elapsed = started.elapsed();

        match outcome {
            RunOutcome::Completed => {
                self.state = LoopState::Idle;
                log::info!(
                    "[{}] '{}' completed after {} ticks ({:?})",
                    self.config.name,
                    name,
                    ticks,
                    elapsed
                );
            }
            RunOutcome::Cancelled => {
                self.state = LoopState::Cancelled;
                log::info!(
                    "[{}] '{}' cancelled after {} ticks ({:?})",
                    self.config.name,
                    name,
                    ticks,
                    elapsed
                );
            }
        }

        RunReport {
            outcome,
            ticks,
            elapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::leaf::FnAction;
    use crate::telemetry::sink::RecordingSink;

    fn counting(ticks: u64) -> FnAction<impl FnMut(&mut TelemetryPacket) -> VoltResult<Status> + Send> {
        let mut n = 0;
        FnAction::new("counting", move |packet: &mut TelemetryPacket| {
            n += 1;
            packet.put("n", n);
            Ok(Status::running_if(n < ticks))
        })
    }

    #[test]
    fn test_run_to_completion() {
        let sink = RecordingSink::new();
        let mut exec = ExecutionLoop::new().with_sink(sink.clone());

        let report = exec.run(counting(3)).unwrap();
        assert_eq!(report.outcome, RunOutcome::Completed);
        assert_eq!(report.ticks, 3);
        assert_eq!(exec.state(), LoopState::Idle);
        assert_eq!(sink.packet_count(), 3);
        assert_eq!(sink.previews().len(), 1);
    }

    #[test]
    fn test_cancel_before_start() {
        let mut exec = ExecutionLoop::new().with_sink(RecordingSink::new());
        exec.cancellation_token().cancel();

        let report = exec.run(counting(3)).unwrap();
        assert_eq!(report.outcome, RunOutcome::Cancelled);
        assert_eq!(report.ticks, 0);
        assert_eq!(exec.state(), LoopState::Cancelled);
    }

    #[test]
    fn test_max_ticks_cancels() {
        let mut exec = ExecutionLoop::new()
            .with_config(LoopConfig::quiet().with_max_ticks(5))
            .with_sink(RecordingSink::new());

        let report = exec.run(counting(100)).unwrap();
        assert_eq!(report.outcome, RunOutcome::Cancelled);
        assert_eq!(report.ticks, 5);
    }

    #[test]
    fn test_quiet_config_skips_preview() {
        let sink = RecordingSink::new();
        let mut exec = ExecutionLoop::new()
            .with_config(LoopConfig::quiet())
            .with_sink(sink.clone());
        exec.run(counting(1)).unwrap();
        assert!(sink.previews().is_empty());
        assert_eq!(sink.packet_count(), 1);
    }

    #[tokio::test]
    async fn test_run_async_completes() {
        let mut exec = ExecutionLoop::new().with_sink(RecordingSink::new());
        let report = exec.run_async(counting(4)).await.unwrap();
        assert!(report.completed());
        assert_eq!(exec.total_ticks(), 4);
    }

    #[tokio::test]
    async fn test_run_async_cancels_at_tick_boundary() {
        let sink = RecordingSink::new();
        let mut exec = ExecutionLoop::new().with_sink(sink.clone());
        let token = exec.cancellation_token();

        let mut n = 0;
        let root = FnAction::new("endless", move |_: &mut TelemetryPacket| {
            n += 1;
            if n == 2 {
                token.cancel();
            }
            Ok(Status::Running)
        });

        let report = exec.run_async(root).await.unwrap();
        assert_eq!(report.outcome, RunOutcome::Cancelled);
        assert_eq!(report.ticks, 2);
        assert_eq!(sink.packet_count(), 2);
        assert_eq!(exec.state(), LoopState::Cancelled);
    }

    #[tokio::test]
    async fn test_run_async_cancelled_by_other_task() {
        let mut exec = ExecutionLoop::new()
            .with_config(LoopConfig::quiet())
            .with_sink(RecordingSink::new());
        let token = exec.cancellation_token();
        let canceller = tokio::spawn(async move {
            token.cancel();
        });

        let root = FnAction::new("endless", |_: &mut TelemetryPacket| Ok(Status::Running));
        let report = exec.run_async(root).await.unwrap();
        assert_eq!(report.outcome, RunOutcome::Cancelled);
        assert!(report.ticks >= 1);
        canceller.await.unwrap();
    }
}
