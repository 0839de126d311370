//! # Volt Scheduling
//!
//! Drives action trees to completion, one cooperative tick at a time:
//!
//! - **ExecutionLoop**: busy-polling tick loop with preview, packet flush and cancellation
//! - **LoopConfig**: loop settings, loadable from TOML or YAML
//! - **CancellationToken**: tick-boundary cancellation, optionally bound to Ctrl+C
//! - **AutonomousMode**: a robot plus a queue of routines run back to back
//!
//! ## Usage
//!
//! ```rust,ignore
//! use volt_core::ExecutionLoop;
//!
//! let mut exec = ExecutionLoop::new();
//! exec.cancellation_token().install_ctrlc_handler()?;
//! let report = exec.run(root)?;
//! ```

pub mod autonomous;
pub mod cancel;
pub mod config;
pub mod scheduler;

pub use autonomous::{AutonomousMode, AutonomousReport};
pub use cancel::CancellationToken;
pub use config::LoopConfig;
pub use scheduler::{ExecutionLoop, LoopState, RunOutcome, RunReport};
