//! Simple parameter set for registry-built actions
//!
//! Provides a straightforward ordered key-value store passed to action factories

use crate::error::{VoltError, VoltResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Parameter values keyed by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionParams {
    /// BTreeMap maintains sorted order
    params: BTreeMap<String, Value>,
}

impl ActionParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with<T: Serialize>(mut self, key: &str, value: T) -> VoltResult<Self> {
        self.set(key, value)?;
        Ok(self)
    }

    /// Get a parameter value
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        let value = self.params.get(key)?;
        serde_json::from_value(value.clone()).ok()
    }

    /// Get parameter with default
    pub fn get_or<T: for<'de> Deserialize<'de>>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    pub fn get_f64(&self, key: &str, default: f64) -> f64 {
        self.get_or(key, default)
    }

    pub fn get_i64(&self, key: &str, default: i64) -> i64 {
        self.get_or(key, default)
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get_or(key, default)
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.get_or(key, default.to_string())
    }

    /// Required value; missing or mistyped parameters are an error
    pub fn require<T: for<'de> Deserialize<'de>>(&self, key: &str) -> VoltResult<T> {
        let value = self
            .params
            .get(key)
            .ok_or_else(|| VoltError::invalid_parameter(key, "missing"))?;
        serde_json::from_value(value.clone())
            .map_err(|e| VoltError::invalid_parameter(key, e.to_string()))
    }

    /// Raw JSON value
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Set a parameter value
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> VoltResult<()> {
        let json_value = serde_json::to_value(value)?;
        self.params.insert(key.to_string(), json_value);
        Ok(())
    }

    /// List all parameter keys
    pub fn keys(&self) -> Vec<String> {
        self.params.keys().cloned().collect()
    }

    pub fn has(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.params.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Parse parameters from a YAML mapping
    pub fn from_yaml_str(yaml: &str) -> VoltResult<Self> {
        let params: BTreeMap<String, Value> = serde_yaml::from_str(yaml)?;
        Ok(Self { params })
    }

    /// Load parameters from a YAML file
    pub fn load_from_disk(path: &Path) -> VoltResult<Self> {
        let yaml_str = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml_str)
    }
}

impl From<BTreeMap<String, Value>> for ActionParams {
    fn from(params: BTreeMap<String, Value>) -> Self {
        Self { params }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        let mut params = ActionParams::new();

        // Test defaults
        assert_eq!(params.get_f64("max_speed", 1.0), 1.0);

        // Test set/get
        params.set("distance", 42.5).unwrap();
        assert_eq!(params.get::<f64>("distance"), Some(42.5));

        // Test overwrite
        params.set("distance", 2.0).unwrap();
        assert_eq!(params.get_f64("distance", 0.0), 2.0);
    }

    #[test]
    fn test_require_reports_missing() {
        let params = ActionParams::new();
        let err = params.require::<f64>("power").unwrap_err();
        assert!(matches!(err, VoltError::InvalidParameter { ref name, .. } if name == "power"));
    }

    #[test]
    fn test_from_yaml() {
        let params = ActionParams::from_yaml_str("power: 0.5\nlabel: lift\nticks: 3\n").unwrap();
        assert_eq!(params.get_f64("power", 0.0), 0.5);
        assert_eq!(params.get_string("label", ""), "lift");
        assert_eq!(params.get_i64("ticks", 0), 3);
        assert_eq!(params.keys(), vec!["label", "power", "ticks"]);
    }
}
