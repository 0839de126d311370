//! # Core action types
//!
//! - **Action**: the pollable unit of behavior, reporting `Running` or `Done`
//! - **Composites**: `SequentialAction` and `ParallelAction`
//! - **Leaves**: instant, wait, closure and attachment control actions
//! - **Robot**: the control subject an action tree is built for
//!
//! ## Action Lifecycle
//!
//! 1. **Construction** - usually through `ActionBuilder`
//! 2. **Preview** - `preview()` draws the static overlay once
//! 3. **Execution** - `advance()` is called once per tick until it returns `Done`
//! 4. **Retired** - a finished action is never advanced again

pub mod action;
pub mod composite;
pub mod leaf;
pub mod robot;

pub use action::{Action, Status};
pub use composite::{ParallelAction, SequentialAction};
pub use leaf::{ControlAction, FnAction, InstantAction, WaitAction};
pub use robot::Robot;
