//! Shared diagnostic state for traced actions
//!
//! The tracer keeps two structures behind one cloneable handle:
//! a bounded history of every traced action that ever started (oldest
//! evicted first) and the set of traced actions currently running.
//! Construct one per program, hand clones to the execution loop and to
//! every `TracedAction`, and call [`ActionTracer::clear`] on teardown.

use crate::telemetry::console::Telemetry;
use crate::telemetry::packet::TelemetryPacket;
use colored::Colorize;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Default number of history entries kept by a tracer
pub const DEFAULT_TRACE_CAPACITY: usize = 100;

/// Start order across all records, breaks ties between equal start instants
static NEXT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Lifecycle timing of one traced action
#[derive(Debug)]
pub struct TraceRecord {
    id: Uuid,
    seq: u64,
    label: String,
    started_at: Instant,
    finished_at: OnceLock<Instant>,
}

impl TraceRecord {
    /// Start a record now
    pub fn start(label: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            seq: NEXT_SEQ.fetch_add(1, Ordering::Relaxed),
            label: label.to_string(),
            started_at: Instant::now(),
            finished_at: OnceLock::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Creation order, increasing across the process
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.get().is_some()
    }

    /// Stamp the completion time; later calls keep the first stamp
    pub fn finish(&self) {
        let _ = self.finished_at.set(Instant::now());
    }

    /// Time since start, frozen at completion
    pub fn elapsed(&self) -> Duration {
        match self.finished_at.get() {
            Some(end) => end.saturating_duration_since(self.started_at),
            None => self.started_at.elapsed(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }
}

/// One row of the human-readable running listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningAction {
    pub index: usize,
    pub label: String,
    pub elapsed_ms: u64,
}

struct TracerInner {
    capacity: usize,
    history: Mutex<VecDeque<Arc<TraceRecord>>>,
    running: Mutex<HashMap<Uuid, Arc<TraceRecord>>>,
}

/// Cloneable handle to the shared trace history and running set
#[derive(Clone)]
pub struct ActionTracer {
    inner: Arc<TracerInner>,
}

impl Default for ActionTracer {
    fn default() -> Self {
        Self::new(DEFAULT_TRACE_CAPACITY)
    }
}

impl ActionTracer {
    /// Create a tracer keeping at most `capacity` history entries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(TracerInner {
                capacity,
                history: Mutex::new(VecDeque::with_capacity(capacity)),
                running: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Record a traced action as started
    pub fn mark_running(&self, record: &Arc<TraceRecord>) {
        {
            let mut history = self.inner.history.lock();
            history.push_back(record.clone());
            while history.len() > self.inner.capacity {
                if let Some(evicted) = history.pop_front() {
                    log::debug!(
                        "Trace history full ({}), evicted '{}'",
                        self.inner.capacity,
                        evicted.label()
                    );
                }
            }
        }
        self.inner.running.lock().insert(record.id(), record.clone());
    }

    /// Remove a traced action from the running set; history is untouched
    pub fn mark_completed(&self, id: Uuid) {
        self.inner.running.lock().remove(&id);
    }

    pub fn is_running(&self, id: Uuid) -> bool {
        self.inner.running.lock().contains_key(&id)
    }

    pub fn len_running(&self) -> usize {
        self.inner.running.lock().len()
    }

    pub fn len_history(&self) -> usize {
        self.inner.history.lock().len()
    }

    /// Running actions sorted by start time, earliest first
    pub fn running(&self) -> Vec<RunningAction> {
        let mut records: Vec<Arc<TraceRecord>> =
            self.inner.running.lock().values().cloned().collect();
        records.sort_by_key(|record| (record.started_at(), record.seq()));

        records
            .iter()
            .enumerate()
            .map(|(index, record)| RunningAction {
                index,
                label: record.label().to_string(),
                elapsed_ms: record.elapsed_ms(),
            })
            .collect()
    }

    /// History in insertion order as `action/{ordinal}/{label}` -> elapsed ms
    pub fn history(&self) -> Vec<(String, u64)> {
        self.inner
            .history
            .lock()
            .iter()
            .enumerate()
            .map(|(i, record)| (format!("action/{}/{}", i, record.label()), record.elapsed_ms()))
            .collect()
    }

    /// Labels currently held in history, oldest first
    pub fn history_labels(&self) -> Vec<String> {
        self.inner
            .history
            .lock()
            .iter()
            .map(|record| record.label().to_string())
            .collect()
    }

    /// Write the running listing to the driver station telemetry
    pub fn write_telemetry(&self, telemetry: &mut dyn Telemetry) {
        telemetry.add_line("=== Running Actions ===");
        telemetry.add_line("");

        let running = self.running();
        if running.is_empty() {
            telemetry.add_line("None");
        } else {
            for entry in running {
                telemetry.add_data(
                    &format!("[{}]", entry.index),
                    &format!("{} ({}ms)", entry.label, entry.elapsed_ms),
                );
            }
        }
    }

    /// Write the history listing into a telemetry packet
    pub fn write_packet(&self, packet: &mut TelemetryPacket) {
        for (key, elapsed_ms) in self.history() {
            packet.put(key, elapsed_ms);
        }
    }

    /// Print the running listing to stdout
    pub fn print_running(&self) {
        println!("{}", "=== Running Actions ===".bold());
        let running = self.running();
        if running.is_empty() {
            println!("  None");
        }
        for entry in running {
            println!(
                "  [{}] {} {}",
                entry.index,
                entry.label.yellow(),
                format!("({}ms)", entry.elapsed_ms).cyan()
            );
        }
    }

    /// Drop all history and running entries
    pub fn clear(&self) {
        self.inner.history.lock().clear();
        self.inner.running.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::console::TelemetryLog;

    fn started(tracer: &ActionTracer, label: &str) -> Arc<TraceRecord> {
        let record = Arc::new(TraceRecord::start(label));
        tracer.mark_running(&record);
        record
    }

    #[test]
    fn test_history_evicts_oldest() {
        let tracer = ActionTracer::default();
        for i in 0..101 {
            started(&tracer, &format!("a{}", i));
        }

        let labels = tracer.history_labels();
        assert_eq!(labels.len(), 100);
        assert!(!labels.contains(&"a0".to_string()));
        assert_eq!(labels.first().unwrap(), "a1");
        assert_eq!(labels.last().unwrap(), "a100");
    }

    #[test]
    fn test_completed_leaves_history() {
        let tracer = ActionTracer::new(10);
        let record = started(&tracer, "drive");
        assert!(tracer.is_running(record.id()));

        tracer.mark_completed(record.id());
        assert!(!tracer.is_running(record.id()));
        assert_eq!(tracer.len_history(), 1);
        assert_eq!(tracer.history()[0].0, "action/0/drive");
    }

    #[test]
    fn test_running_sorted_by_start() {
        let tracer = ActionTracer::new(10);
        started(&tracer, "first");
        std::thread::sleep(Duration::from_millis(2));
        started(&tracer, "second");

        let running = tracer.running();
        assert_eq!(running.len(), 2);
        assert_eq!(running[0].label, "first");
        assert_eq!(running[0].index, 0);
        assert_eq!(running[1].label, "second");
    }

    #[test]
    fn test_running_order_is_deterministic() {
        let tracer = ActionTracer::new(64);
        let records: Vec<Arc<TraceRecord>> = (0..32)
            .map(|i| Arc::new(TraceRecord::start(&format!("r{}", i))))
            .collect();
        // Registration order differs from start order
        for record in records.iter().rev() {
            tracer.mark_running(record);
        }

        let labels: Vec<String> = tracer.running().into_iter().map(|r| r.label).collect();
        let expected: Vec<String> = (0..32).map(|i| format!("r{}", i)).collect();
        assert_eq!(labels, expected);
        assert!(records[0].seq() < records[1].seq());
    }

    #[test]
    fn test_write_telemetry_none() {
        let tracer = ActionTracer::new(10);
        let mut telemetry = TelemetryLog::new();
        tracer.write_telemetry(&mut telemetry);
        assert_eq!(telemetry.pending(), &["=== Running Actions ===", "", "None"]);
    }

    #[test]
    fn test_elapsed_frozen_after_finish() {
        let record = TraceRecord::start("x");
        record.finish();
        let first = record.elapsed();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(record.elapsed(), first);
    }

    #[test]
    fn test_concurrent_registration() {
        let tracer = ActionTracer::new(1000);
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let tracer = tracer.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        let record = Arc::new(TraceRecord::start(&format!("t{}-{}", t, i)));
                        tracer.mark_running(&record);
                        if i % 2 == 0 {
                            tracer.mark_completed(record.id());
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(tracer.len_history(), 400);
        assert_eq!(tracer.len_running(), 200);
    }
}
