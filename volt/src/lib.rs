//! # VOLT - cooperative action scheduling for competition robots
//!
//! VOLT lets robot behavior be written as trees of small, pollable actions
//! that a single-threaded loop advances once per tick.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use volt::prelude::*;
//!
//! struct MyBot;
//! impl Robot for MyBot {}
//!
//! let bot = MyBot;
//! let root = volt_action(&bot, |b| {
//!     b.instant(|| println!("intake on"));
//!     b.wait(Duration::from_millis(500));
//! });
//!
//! let mut exec = ExecutionLoop::new();
//! exec.run(root).unwrap();
//! ```
//!
//! ## Features
//!
//! - **Sequential and parallel composition** with a scoped builder
//! - **Action tracing** with a bounded history and live running listing
//! - **Per-tick telemetry packets** and field overlays for diagnostics
//! - **Cooperative cancellation** at tick boundaries

// Re-export core components
pub use volt_core::{self, *};

/// The VOLT prelude - everything you need to get started
pub mod prelude {
    // Actions and composition
    pub use volt_core::builder::{traced_volt_action, volt_action, ActionBuilder};
    pub use volt_core::core::{
        Action, ControlAction, FnAction, InstantAction, ParallelAction, Robot, SequentialAction,
        Status, WaitAction,
    };

    // Telemetry and tracing
    pub use volt_core::telemetry::{
        ActionTracer, Canvas, DiagnosticsSink, Telemetry, TelemetryLog, TelemetryPacket,
        TracedAction,
    };

    // Scheduling
    pub use volt_core::scheduling::{
        AutonomousMode, CancellationToken, ExecutionLoop, LoopConfig, RunOutcome,
    };

    // Registry
    pub use volt_core::params::ActionParams;
    pub use volt_core::registry::{ActionDescriptor, ActionParameter, ActionRegistry, ParamKind};

    // Error types
    pub use volt_core::error::{VoltError, VoltResult};
    pub type Result<T> = VoltResult<T>;

    // Common std types
    pub use std::sync::Arc;
    pub use std::time::{Duration, Instant};

    // Common traits
    pub use serde::{Deserialize, Serialize};

    // Re-export anyhow for error handling
    pub use anyhow::{anyhow, bail, ensure, Context, Result as AnyResult};
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get VOLT version
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    struct Bot;
    impl Robot for Bot {}

    #[test]
    fn test_prelude_covers_a_run() {
        let root = volt_action(&Bot, |b| {
            b.instant(|| {});
        });
        let mut exec = ExecutionLoop::new().with_config(LoopConfig::quiet());
        let report = exec.run(root).unwrap();
        assert_eq!(report.outcome, RunOutcome::Completed);
        assert!(!super::version().is_empty());
    }
}
