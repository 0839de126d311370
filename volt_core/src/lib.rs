//! # Volt Core
//!
//! The core runtime of the Volt robot action framework.
//!
//! Robot behavior is written as a tree of cooperative actions. Each action is
//! polled once per tick, writes what it wants to show into that tick's
//! telemetry packet, and reports whether it is still running:
//!
//! - **Actions**: the `Action` trait plus sequential and parallel composites
//! - **Builder**: a scoped DSL that assembles action trees for a robot
//! - **Telemetry**: per-tick packets, field overlays and diagnostics sinks
//! - **Tracing**: bounded history and live view of action lifecycles
//! - **Scheduling**: the busy-polling execution loop and cancellation
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use volt_core::{volt_action, ExecutionLoop, NullSink, Robot};
//!
//! struct Bot;
//! impl Robot for Bot {}
//!
//! let bot = Bot;
//! let root = volt_action(&bot, |b| {
//!     b.instant(|| println!("starting"));
//!     b.parallel(|p| {
//!         p.wait(Duration::from_millis(1));
//!         p.instant(|| println!("lift"));
//!     });
//! });
//!
//! let mut exec = ExecutionLoop::new().with_sink(NullSink);
//! let report = exec.run(root).unwrap();
//! assert!(report.completed());
//! ```

pub mod builder;
pub mod core;
pub mod error;
pub mod params;
pub mod registry;
pub mod scheduling;
pub mod telemetry;

// Re-export commonly used types for easy access
pub use builder::{traced_volt_action, volt_action, ActionBuilder};
pub use crate::core::{
    Action, ControlAction, FnAction, InstantAction, ParallelAction, Robot, SequentialAction,
    Status, WaitAction,
};
pub use error::{VoltError, VoltResult};
pub use params::ActionParams;
pub use registry::{ActionDescriptor, ActionParameter, ActionRegistry, ParamKind};
pub use scheduling::{
    AutonomousMode, AutonomousReport, CancellationToken, ExecutionLoop, LoopConfig, LoopState,
    RunOutcome, RunReport,
};
pub use telemetry::{
    ActionTracer, Canvas, DiagnosticsSink, DrawOp, JsonLinesSink, LogSink, NullSink,
    RecordingSink, Telemetry, TelemetryLog, TelemetryPacket, TracedAction,
};
