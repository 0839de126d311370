//! Autonomous routine: a queue of action trees run back to back on one robot

use super::scheduler::{ExecutionLoop, RunOutcome, RunReport};
use crate::builder::{volt_action, ActionBuilder};
use crate::core::action::Action;
use crate::core::robot::Robot;
use crate::error::VoltResult;
use crate::telemetry::console::{Telemetry, TelemetryLog};
use std::collections::VecDeque;

type ActionFactory<R> = Box<dyn FnOnce(&R) -> Box<dyn Action> + Send>;

/// Result of a whole routine
#[derive(Debug, Clone)]
pub struct AutonomousReport {
    pub outcome: RunOutcome,
    pub runs: Vec<RunReport>,
}

impl AutonomousReport {
    pub fn total_ticks(&self) -> u64 {
        self.runs.iter().map(|run| run.ticks).sum()
    }
}

/// Owns a robot and the ordered steps of its autonomous routine
///
/// Each step is a factory that builds its action tree from the robot when the
/// step starts, so later steps see the robot state left by earlier ones.
pub struct AutonomousMode<R: Robot> {
    robot: R,
    steps: VecDeque<ActionFactory<R>>,
    exec: ExecutionLoop,
    telemetry: TelemetryLog,
}

impl<R: Robot + 'static> AutonomousMode<R> {
    pub fn new(robot: R) -> Self {
        Self {
            robot,
            steps: VecDeque::new(),
            exec: ExecutionLoop::new(),
            telemetry: TelemetryLog::new(),
        }
    }

    pub fn with_loop(mut self, exec: ExecutionLoop) -> Self {
        self.exec = exec;
        self
    }

    /// Queue a step built by `factory`
    pub fn then<F>(&mut self, factory: F) -> &mut Self
    where
        F: FnOnce(&R) -> Box<dyn Action> + Send + 'static,
    {
        self.steps.push_back(Box::new(factory));
        self
    }

    /// Queue a step described with the builder DSL
    pub fn then_build<F>(&mut self, block: F) -> &mut Self
    where
        F: FnOnce(&mut ActionBuilder<'_, R>) + Send + 'static,
    {
        self.then(move |robot: &R| Box::new(volt_action(robot, block)) as Box<dyn Action>)
    }

    pub fn pending_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn robot(&self) -> &R {
        &self.robot
    }

    pub fn robot_mut(&mut self) -> &mut R {
        &mut self.robot
    }

    pub fn telemetry(&self) -> &TelemetryLog {
        &self.telemetry
    }

    pub fn execution_loop(&self) -> &ExecutionLoop {
        &self.exec
    }

    /// Run every queued step in order
    ///
    /// Stops early once a step is cancelled. The robot is stopped at the end
    /// in every case, including when a step fails.
    pub fn execute(&mut self) -> VoltResult<AutonomousReport> {
        let mut runs = Vec::new();
        let mut outcome = RunOutcome::Completed;

        while let Some(factory) = self.steps.pop_front() {
            let action = factory(&self.robot);
            let robot = &mut self.robot;
            let telemetry = &mut self.telemetry;
            let tracer = self.exec.tracer().cloned();

            let result = self.exec.run_with_hook(action, |_| {
                if let Some(tracer) = &tracer {
                    tracer.write_telemetry(telemetry);
                }
                robot.update(telemetry);
                if !telemetry.pending().is_empty() {
                    telemetry.update();
                }
            });

            let report = match result {
                Ok(report) => report,
                Err(e) => {
                    self.robot.stop();
                    self.telemetry.add_data("Autonomous", &"Failed");
                    self.telemetry.update();
                    return Err(e);
                }
            };

            let cancelled = report.outcome == RunOutcome::Cancelled;
            runs.push(report);
            if cancelled {
                outcome = RunOutcome::Cancelled;
                break;
            }
        }

        self.robot.stop();
        let status = match outcome {
            RunOutcome::Completed => "Completed",
            RunOutcome::Cancelled => "Cancelled",
        };
        log::info!("Autonomous routine for '{}' {}", self.robot.name(), status.to_lowercase());
        self.telemetry.add_data("Autonomous", &status);
        self.telemetry.update();

        Ok(AutonomousReport { outcome, runs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::leaf::{InstantAction, WaitAction};
    use crate::telemetry::sink::NullSink;
    use crate::telemetry::tracer::ActionTracer;
    use std::time::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct TestBot {
        updates: usize,
        stopped: bool,
        hits: Arc<AtomicUsize>,
    }

    impl Robot for TestBot {
        fn update(&mut self, _telemetry: &mut dyn Telemetry) {
            self.updates += 1;
        }

        fn stop(&mut self) {
            self.stopped = true;
        }
    }

    #[test]
    fn test_steps_run_in_order() {
        let mut auto = AutonomousMode::new(TestBot::default())
            .with_loop(ExecutionLoop::new().with_sink(NullSink));
        auto.then(|bot: &TestBot| {
            let hits = bot.hits.clone();
            Box::new(InstantAction::new(move || {
                hits.fetch_add(1, Ordering::SeqCst);
            })) as Box<dyn Action>
        });
        auto.then_build(|b| {
            let hits = b.robot().hits.clone();
            b.instant(move || {
                hits.fetch_add(10, Ordering::SeqCst);
            });
        });

        let report = auto.execute().unwrap();
        assert_eq!(report.outcome, RunOutcome::Completed);
        assert_eq!(report.runs.len(), 2);
        assert_eq!(auto.robot().hits.load(Ordering::SeqCst), 11);
        assert_eq!(auto.robot().updates, 2);
        assert!(auto.robot().stopped);
        assert_eq!(auto.telemetry().last_frame(), &["Autonomous: Completed"]);
    }

    struct QuietBot;

    impl Robot for QuietBot {
        fn update(&mut self, _telemetry: &mut dyn Telemetry) {}
    }

    #[test]
    fn test_frames_flushed_when_robot_does_not() {
        let exec = ExecutionLoop::new()
            .with_sink(NullSink)
            .with_tracer(ActionTracer::default());
        let mut auto = AutonomousMode::new(QuietBot).with_loop(exec);
        auto.then(|_: &QuietBot| {
            Box::new(WaitAction::new(Duration::from_millis(30))) as Box<dyn Action>
        });

        let report = auto.execute().unwrap();
        let ticks = report.total_ticks();
        assert!(ticks > 1);
        // One frame per tick plus the closing status frame
        assert_eq!(auto.telemetry().frames(), ticks + 1);
        assert!(auto.telemetry().pending().is_empty());
        assert_eq!(auto.telemetry().last_frame(), &["Autonomous: Completed"]);
    }

    #[test]
    fn test_cancelled_routine_skips_remaining_steps() {
        let exec = ExecutionLoop::new().with_sink(NullSink);
        exec.cancellation_token().cancel();
        let mut auto = AutonomousMode::new(TestBot::default()).with_loop(exec);
        auto.then_build(|b| {
            b.instant(|| {});
        });
        auto.then_build(|b| {
            b.instant(|| {});
        });

        let report = auto.execute().unwrap();
        assert_eq!(report.outcome, RunOutcome::Cancelled);
        assert_eq!(report.runs.len(), 1);
        assert_eq!(auto.pending_steps(), 1);
        assert!(auto.robot().stopped);
    }
}
