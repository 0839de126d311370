//! Scoped construction of action trees
//!
//! ```rust
//! use std::time::Duration;
//! use volt_core::builder::volt_action;
//! use volt_core::core::Robot;
//!
//! struct Bot;
//! impl Robot for Bot {}
//!
//! let root = volt_action(&Bot, |b| {
//!     b.instant(|| println!("start"));
//!     b.parallel(|p| {
//!         p.wait(Duration::from_millis(10));
//!         p.instant(|| println!("raise lift"));
//!     });
//!     b.wait(Duration::from_millis(5));
//! });
//! assert_eq!(root.len(), 3);
//! ```

use crate::core::action::Action;
use crate::core::composite::{ParallelAction, SequentialAction};
use crate::core::leaf::{InstantAction, WaitAction};
use crate::telemetry::traced::TracedAction;
use crate::telemetry::tracer::ActionTracer;
use std::time::Duration;

/// Accumulates actions for one scope of an action tree
///
/// Nested `sequence` and `parallel` scopes collect into their own builder and
/// append only the wrapping composite to this one. `build` always yields a
/// sequential root.
pub struct ActionBuilder<'r, R: ?Sized> {
    robot: &'r R,
    tracer: Option<ActionTracer>,
    actions: Vec<Box<dyn Action>>,
}

impl<'r, R: ?Sized> ActionBuilder<'r, R> {
    pub fn new(robot: &'r R) -> Self {
        Self {
            robot,
            tracer: None,
            actions: Vec::new(),
        }
    }

    /// Builder that wraps every included item in a `TracedAction`
    pub fn traced(robot: &'r R, tracer: ActionTracer) -> Self {
        Self {
            robot,
            tracer: Some(tracer),
            actions: Vec::new(),
        }
    }

    /// The control subject this tree is built for
    pub fn robot(&self) -> &'r R {
        self.robot
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Append an action to the current scope
    pub fn include(&mut self, action: impl Action + 'static) -> &mut Self {
        self.include_boxed(Box::new(action))
    }

    pub fn include_boxed(&mut self, action: Box<dyn Action>) -> &mut Self {
        let action: Box<dyn Action> = match &self.tracer {
            Some(tracer) => {
                let label = action.name().to_string();
                Box::new(TracedAction::new(&label, action, tracer.clone()))
            }
            None => action,
        };
        self.actions.push(action);
        self
    }

    /// Run `block` in a nested scope and append its actions as one sequence
    pub fn sequence(&mut self, block: impl FnOnce(&mut ActionBuilder<'r, R>)) -> &mut Self {
        let actions = self.collect(block);
        self.include(SequentialAction::new(actions))
    }

    /// Run `block` in a nested scope and append its actions as one parallel group
    pub fn parallel(&mut self, block: impl FnOnce(&mut ActionBuilder<'r, R>)) -> &mut Self {
        let actions = self.collect(block);
        self.include(ParallelAction::new(actions))
    }

    pub fn wait(&mut self, duration: Duration) -> &mut Self {
        self.include(WaitAction::new(duration))
    }

    pub fn instant(&mut self, f: impl FnMut() + Send + 'static) -> &mut Self {
        self.include(InstantAction::new(f))
    }

    fn collect(&self, block: impl FnOnce(&mut ActionBuilder<'r, R>)) -> Vec<Box<dyn Action>> {
        let mut scope = ActionBuilder {
            robot: self.robot,
            tracer: self.tracer.clone(),
            actions: Vec::new(),
        };
        block(&mut scope);
        scope.actions
    }

    /// Wrap the top-level actions into the sequential root
    pub fn build(self) -> SequentialAction {
        SequentialAction::new(self.actions)
    }
}

/// Build an action tree for `robot` in one expression
pub fn volt_action<R: ?Sized>(
    robot: &R,
    block: impl FnOnce(&mut ActionBuilder<'_, R>),
) -> SequentialAction {
    let mut builder = ActionBuilder::new(robot);
    block(&mut builder);
    builder.build()
}

/// Like [`volt_action`], tracing every included item
pub fn traced_volt_action<R: ?Sized>(
    robot: &R,
    tracer: &ActionTracer,
    block: impl FnOnce(&mut ActionBuilder<'_, R>),
) -> SequentialAction {
    let mut builder = ActionBuilder::traced(robot, tracer.clone());
    block(&mut builder);
    builder.build()
}
