//! Diagnostics sinks receiving previews and per-tick packets

use super::packet::{Canvas, TelemetryPacket};
use crate::error::VoltResult;
use parking_lot::Mutex;
use serde_json::json;
use std::io::Write;
use std::sync::Arc;

/// Destination for the one-shot preview overlay and per-tick packets
///
/// Sends are best-effort: an implementation should not block the loop.
pub trait DiagnosticsSink: Send {
    fn send_preview(&mut self, canvas: &Canvas);

    fn send_packet(&mut self, packet: &TelemetryPacket);
}

impl<S: DiagnosticsSink + ?Sized> DiagnosticsSink for Box<S> {
    fn send_preview(&mut self, canvas: &Canvas) {
        (**self).send_preview(canvas)
    }

    fn send_packet(&mut self, packet: &TelemetryPacket) {
        (**self).send_packet(packet)
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticsSink for NullSink {
    fn send_preview(&mut self, _canvas: &Canvas) {}

    fn send_packet(&mut self, _packet: &TelemetryPacket) {}
}

/// Writes a debug log line per preview and packet
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticsSink for LogSink {
    fn send_preview(&mut self, canvas: &Canvas) {
        log::debug!("preview: {} overlay ops", canvas.len());
    }

    fn send_packet(&mut self, packet: &TelemetryPacket) {
        let data = packet
            .entries()
            .iter()
            .map(|entry| format!("{}={}", entry.key, entry.value))
            .collect::<Vec<_>>()
            .join(", ");
        log::debug!(
            "tick {}: [{}] ({} overlay ops)",
            packet.tick(),
            data,
            packet.overlay().len()
        );
    }
}

#[derive(Debug, Default)]
struct Recorded {
    previews: Vec<Canvas>,
    packets: Vec<TelemetryPacket>,
}

/// Keeps every preview and packet in memory
///
/// Clones share the same storage, so a clone can be kept for inspection
/// after the original has been moved into an execution loop.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    recorded: Arc<Mutex<Recorded>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previews(&self) -> Vec<Canvas> {
        self.recorded.lock().previews.clone()
    }

    pub fn packets(&self) -> Vec<TelemetryPacket> {
        self.recorded.lock().packets.clone()
    }

    pub fn packet_count(&self) -> usize {
        self.recorded.lock().packets.len()
    }

    pub fn last_packet(&self) -> Option<TelemetryPacket> {
        self.recorded.lock().packets.last().cloned()
    }
}

impl DiagnosticsSink for RecordingSink {
    fn send_preview(&mut self, canvas: &Canvas) {
        self.recorded.lock().previews.push(canvas.clone());
    }

    fn send_packet(&mut self, packet: &TelemetryPacket) {
        self.recorded.lock().packets.push(packet.clone());
    }
}

/// Writes one JSON object per line: `{"kind", "timestamp", "body"}`
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
    failed: bool,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            failed: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, kind: &str, body: serde_json::Value) -> VoltResult<()> {
        let line = json!({
            "kind": kind,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "body": body,
        });
        serde_json::to_writer(&mut self.writer, &line)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    fn record(&mut self, kind: &str, body: VoltResult<serde_json::Value>) {
        let result = body.and_then(|body| self.write_line(kind, body));
        if let Err(e) = result {
            // Report once; keep ticking without diagnostics
            if !self.failed {
                log::warn!("JSON diagnostics sink failed: {}", e);
                self.failed = true;
            }
        }
    }
}

impl<W: Write + Send> DiagnosticsSink for JsonLinesSink<W> {
    fn send_preview(&mut self, canvas: &Canvas) {
        let body = serde_json::to_value(canvas).map_err(Into::into);
        self.record("preview", body);
    }

    fn send_packet(&mut self, packet: &TelemetryPacket) {
        let body = serde_json::to_value(packet).map_err(Into::into);
        self.record("packet", body);
    }
}
