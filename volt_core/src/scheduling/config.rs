//! Execution loop configuration

use crate::error::{VoltError, VoltResult};
use crate::telemetry::tracer::DEFAULT_TRACE_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for an [`ExecutionLoop`](super::ExecutionLoop)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Name used in log lines
    pub name: String,
    /// Send the root's static overlay once before the first tick
    pub preview_overlay: bool,
    /// Copy the preview drawing into every tick packet
    pub persist_preview: bool,
    /// Write the tracer history into every tick packet
    pub publish_trace: bool,
    /// Stop the run as cancelled after this many ticks
    pub max_ticks: Option<u64>,
    /// History size for a tracer created from this config
    pub tracer_capacity: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl LoopConfig {
    /// Full diagnostics: preview, persistent overlay and trace publishing
    pub fn standard() -> Self {
        Self {
            name: "ExecutionLoop".to_string(),
            preview_overlay: true,
            persist_preview: true,
            publish_trace: true,
            max_ticks: None,
            tracer_capacity: DEFAULT_TRACE_CAPACITY,
        }
    }

    /// Ticking only; packets carry just what actions write
    pub fn quiet() -> Self {
        Self {
            preview_overlay: false,
            persist_preview: false,
            publish_trace: false,
            ..Self::standard()
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    pub fn validate(&self) -> VoltResult<()> {
        if self.tracer_capacity == 0 {
            return Err(VoltError::config("tracer_capacity must be at least 1"));
        }
        if self.max_ticks == Some(0) {
            return Err(VoltError::config("max_ticks must be at least 1 when set"));
        }
        Ok(())
    }

    pub fn from_toml_str(s: &str) -> VoltResult<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(s: &str) -> VoltResult<Self> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.toml`, `.yaml` or `.yml` file
    pub fn from_file(path: &Path) -> VoltResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&contents),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&contents),
            _ => Err(VoltError::config(format!(
                "Unsupported config file extension: {}",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = LoopConfig::default();
        assert!(config.preview_overlay);
        assert!(config.publish_trace);
        assert_eq!(config.tracer_capacity, 100);
        assert_eq!(config.max_ticks, None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = LoopConfig::from_toml_str("name = \"auto\"\nmax_ticks = 500\n").unwrap();
        assert_eq!(config.name, "auto");
        assert_eq!(config.max_ticks, Some(500));
        assert!(config.persist_preview);
    }

    #[test]
    fn test_yaml_and_validation() {
        let config = LoopConfig::from_yaml_str("publish_trace: false\n").unwrap();
        assert!(!config.publish_trace);

        assert!(LoopConfig::from_yaml_str("tracer_capacity: 0\n").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "preview_overlay = false").unwrap();
        let config = LoopConfig::from_file(file.path()).unwrap();
        assert!(!config.preview_overlay);

        let other = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        assert!(matches!(
            LoopConfig::from_file(other.path()),
            Err(VoltError::Config(_))
        ));
    }
}
