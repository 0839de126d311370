use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single drawable primitive for the field overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Stroke { color: String },
    Fill { color: String },
    StrokeWidth { width: u32 },
    Circle { x: f64, y: f64, radius: f64, filled: bool },
    Polyline { xs: Vec<f64>, ys: Vec<f64> },
    Polygon { xs: Vec<f64>, ys: Vec<f64>, filled: bool },
    Text { text: String, x: f64, y: f64 },
}

/// Ordered list of drawing operations sent to the diagnostics sink
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    ops: Vec<DrawOp>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_stroke(&mut self, color: &str) -> &mut Self {
        self.push(DrawOp::Stroke {
            color: color.to_string(),
        })
    }

    pub fn set_fill(&mut self, color: &str) -> &mut Self {
        self.push(DrawOp::Fill {
            color: color.to_string(),
        })
    }

    pub fn set_stroke_width(&mut self, width: u32) -> &mut Self {
        self.push(DrawOp::StrokeWidth { width })
    }

    pub fn stroke_circle(&mut self, x: f64, y: f64, radius: f64) -> &mut Self {
        self.push(DrawOp::Circle {
            x,
            y,
            radius,
            filled: false,
        })
    }

    pub fn fill_circle(&mut self, x: f64, y: f64, radius: f64) -> &mut Self {
        self.push(DrawOp::Circle {
            x,
            y,
            radius,
            filled: true,
        })
    }

    pub fn stroke_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> &mut Self {
        self.stroke_polyline(vec![x1, x2], vec![y1, y2])
    }

    pub fn stroke_polyline(&mut self, xs: Vec<f64>, ys: Vec<f64>) -> &mut Self {
        self.push(DrawOp::Polyline { xs, ys })
    }

    pub fn fill_polygon(&mut self, xs: Vec<f64>, ys: Vec<f64>) -> &mut Self {
        self.push(DrawOp::Polygon {
            xs,
            ys,
            filled: true,
        })
    }

    pub fn fill_text(&mut self, text: &str, x: f64, y: f64) -> &mut Self {
        self.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
        })
    }

    pub fn push(&mut self, op: DrawOp) -> &mut Self {
        self.ops.push(op);
        self
    }

    /// Append every operation of `other`, keeping its order
    pub fn extend_from(&mut self, other: &Canvas) -> &mut Self {
        self.ops.extend(other.ops.iter().cloned());
        self
    }

    pub fn operations(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }
}

/// One key/value row of a telemetry packet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEntry {
    pub key: String,
    pub value: Value,
}

/// Per-tick buffer handed to `Action::advance`
///
/// Actions write key/value telemetry with [`put`](Self::put) and draw into
/// [`field_overlay`](Self::field_overlay). The execution loop flushes the
/// packet to the diagnostics sink once the tick is over.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryPacket {
    tick: u64,
    data: Vec<TelemetryEntry>,
    overlay: Canvas,
}

impl TelemetryPacket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty packet for the given tick number (1-based)
    pub fn for_tick(tick: u64) -> Self {
        Self {
            tick,
            ..Self::default()
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Insert or overwrite a value; new keys keep insertion order
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.data.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => entry.value = value,
            None => self.data.push(TelemetryEntry { key, value }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.value)
    }

    pub fn entries(&self) -> &[TelemetryEntry] {
        &self.data
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.iter().map(|entry| entry.key.as_str())
    }

    pub fn field_overlay(&mut self) -> &mut Canvas {
        &mut self.overlay
    }

    pub fn overlay(&self) -> &Canvas {
        &self.overlay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_keeps_order_and_overwrites() {
        let mut packet = TelemetryPacket::for_tick(3);
        packet.put("x", 1.0);
        packet.put("y", 2.0);
        packet.put("x", 5.0);

        let keys: Vec<&str> = packet.keys().collect();
        assert_eq!(keys, vec!["x", "y"]);
        assert_eq!(packet.get("x"), Some(&Value::from(5.0)));
        assert_eq!(packet.tick(), 3);
    }

    #[test]
    fn test_canvas_chaining() {
        let mut canvas = Canvas::new();
        canvas
            .set_stroke("#4CAF50")
            .stroke_circle(0.0, 0.0, 9.0)
            .stroke_line(0.0, 0.0, 24.0, 24.0);

        assert_eq!(canvas.len(), 3);
        assert!(matches!(canvas.operations()[2], DrawOp::Polyline { .. }));
    }

    #[test]
    fn test_draw_op_json_shape() {
        let op = DrawOp::Text {
            text: "start".into(),
            x: 1.0,
            y: 2.0,
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["op"], "text");
        assert_eq!(json["text"], "start");
    }
}
