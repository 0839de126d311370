//! # Telemetry and diagnostics
//!
//! - **TelemetryPacket**: per-tick key/value data plus field overlay
//! - **Telemetry**: line-oriented driver station output
//! - **DiagnosticsSink**: where previews and packets are flushed
//! - **ActionTracer / TracedAction**: lifecycle timing of actions

pub mod console;
pub mod packet;
pub mod sink;
pub mod traced;
pub mod tracer;

pub use console::{Telemetry, TelemetryLog};
pub use packet::{Canvas, DrawOp, TelemetryEntry, TelemetryPacket};
pub use sink::{DiagnosticsSink, JsonLinesSink, LogSink, NullSink, RecordingSink};
pub use traced::TracedAction;
pub use tracer::{ActionTracer, RunningAction, TraceRecord, DEFAULT_TRACE_CAPACITY};
