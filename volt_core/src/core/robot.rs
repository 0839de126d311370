use crate::telemetry::console::Telemetry;

/// The control subject that action trees are built for
///
/// Hardware access lives in the implementor; the scheduler only calls the
/// per-tick `update` hook and the final `stop`.
pub trait Robot: Send {
    /// Robot name used in logs (optional override)
    fn name(&self) -> &str {
        "robot"
    }

    /// Called after every tick of an autonomous routine
    ///
    /// Lines written here join the tick's frame; the runner publishes the
    /// frame once this returns.
    fn update(&mut self, _telemetry: &mut dyn Telemetry) {}

    /// Called once when a routine ends, completed or not
    fn stop(&mut self) {}
}
