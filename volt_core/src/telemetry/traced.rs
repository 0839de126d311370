use super::tracer::{ActionTracer, TraceRecord};
use crate::core::action::{Action, Status};
use crate::error::VoltResult;
use crate::telemetry::packet::{Canvas, TelemetryPacket};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Decorator that reports an action's lifecycle to an [`ActionTracer`]
///
/// The first `advance` stamps the start time and registers the action as
/// running; the tick on which the inner action reports `Done` deregisters
/// it. Control flow is unchanged: the inner status and errors pass through.
pub struct TracedAction<A> {
    label: String,
    inner: A,
    tracer: ActionTracer,
    record: Option<Arc<TraceRecord>>,
}

impl<A: Action> TracedAction<A> {
    pub fn new(label: &str, inner: A, tracer: ActionTracer) -> Self {
        Self {
            label: label.to_string(),
            inner,
            tracer,
            record: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Tracer entry id, assigned on the first tick
    pub fn id(&self) -> Option<Uuid> {
        self.record.as_ref().map(|record| record.id())
    }

    pub fn start_time(&self) -> Option<Instant> {
        self.record.as_ref().map(|record| record.started_at())
    }

    /// Zero before the first tick, frozen once the inner action is done
    pub fn elapsed(&self) -> Duration {
        self.record
            .as_ref()
            .map(|record| record.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }
}

impl<A: Action> Action for TracedAction<A> {
    fn advance(&mut self, packet: &mut TelemetryPacket) -> VoltResult<Status> {
        let record = match &self.record {
            Some(record) => record.clone(),
            None => {
                let record = Arc::new(TraceRecord::start(&self.label));
                self.tracer.mark_running(&record);
                log::trace!("Traced action '{}' started", self.label);
                self.record = Some(record.clone());
                record
            }
        };

        let status = self.inner.advance(packet)?;
        if status.is_done() {
            record.finish();
            self.tracer.mark_completed(record.id());
            log::trace!(
                "Traced action '{}' completed in {}ms",
                self.label,
                record.elapsed_ms()
            );
        }

        Ok(status)
    }

    fn preview(&self, canvas: &mut Canvas) {
        self.inner.preview(canvas);
    }

    fn name(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::leaf::FnAction;

    fn ticking(ticks: usize) -> FnAction<impl FnMut(&mut TelemetryPacket) -> VoltResult<Status> + Send> {
        let mut n = 0;
        FnAction::new("ticking", move |_| {
            n += 1;
            Ok(Status::running_if(n < ticks))
        })
    }

    #[test]
    fn test_unstarted_has_zero_elapsed() {
        let traced = TracedAction::new("idle", ticking(1), ActionTracer::new(4));
        assert_eq!(traced.elapsed(), Duration::ZERO);
        assert!(traced.id().is_none());
    }

    #[test]
    fn test_running_membership_follows_lifecycle() {
        let tracer = ActionTracer::new(4);
        let mut traced = TracedAction::new("arm", ticking(2), tracer.clone());
        let mut packet = TelemetryPacket::new();

        assert_eq!(traced.advance(&mut packet).unwrap(), Status::Running);
        let id = traced.id().unwrap();
        assert!(tracer.is_running(id));
        let before = traced.elapsed();

        assert_eq!(traced.advance(&mut packet).unwrap(), Status::Done);
        assert!(!tracer.is_running(id));
        assert!(traced.elapsed() >= before);
        assert_eq!(tracer.len_history(), 1);
    }

    #[test]
    fn test_elapsed_non_decreasing() {
        let tracer = ActionTracer::new(4);
        let mut traced = TracedAction::new("spin", ticking(5), tracer);
        let mut packet = TelemetryPacket::new();
        let mut last = Duration::ZERO;
        for _ in 0..4 {
            traced.advance(&mut packet).unwrap();
            let now = traced.elapsed();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn test_name_is_label() {
        let traced = TracedAction::new("claw", ticking(1), ActionTracer::new(4));
        assert_eq!(traced.name(), "claw");
        assert_eq!(traced.label(), "claw");
    }
}
