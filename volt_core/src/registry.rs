//! Explicit registration table for externally described actions
//!
//! Tools that compose routines from outside the program look actions up by
//! id. Each entry pairs an [`ActionDescriptor`] with a factory that builds the
//! action from an [`ActionParams`] set. Register everything at startup.

use crate::core::action::Action;
use crate::error::{VoltError, VoltResult};
use crate::params::ActionParams;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Value kind of an action parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Number,
    Integer,
    Boolean,
    String,
}

impl ParamKind {
    /// JSON schema type name
    pub fn schema_type(&self) -> &'static str {
        match self {
            ParamKind::Number => "number",
            ParamKind::Integer => "integer",
            ParamKind::Boolean => "boolean",
            ParamKind::String => "string",
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            ParamKind::Number => value.is_number(),
            ParamKind::Integer => value.is_i64() || value.is_u64(),
            ParamKind::Boolean => value.is_boolean(),
            ParamKind::String => value.is_string(),
        }
    }
}

/// Description of one factory parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionParameter {
    pub name: String,
    pub kind: ParamKind,
    pub description: String,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

fn default_required() -> bool {
    true
}

impl ActionParameter {
    pub fn new(name: &str, kind: ParamKind, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            description: description.to_string(),
            required: true,
            default: None,
            min: None,
            max: None,
        }
    }

    /// Optional parameter with a default value
    pub fn optional(mut self, default: impl Into<Value>) -> Self {
        self.required = false;
        self.default = Some(default.into());
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    fn validate(&self, value: &Value) -> VoltResult<()> {
        if !self.kind.accepts(value) {
            return Err(VoltError::invalid_parameter(
                &self.name,
                format!("expected {}, got {}", self.kind.schema_type(), value),
            ));
        }
        if let Some(v) = value.as_f64() {
            if let Some(min) = self.min {
                if v < min {
                    return Err(VoltError::invalid_parameter(
                        &self.name,
                        format!("{} is below minimum {}", v, min),
                    ));
                }
            }
            if let Some(max) = self.max {
                if v > max {
                    return Err(VoltError::invalid_parameter(
                        &self.name,
                        format!("{} is above maximum {}", v, max),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Metadata describing a registered action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub parameters: Vec<ActionParameter>,
    #[serde(default = "default_returns")]
    pub returns: String,
}

fn default_returns() -> String {
    "Action".to_string()
}

impl ActionDescriptor {
    pub fn new(id: &str, name: &str, description: &str, category: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            parameters: Vec::new(),
            returns: default_returns(),
        }
    }

    pub fn with_parameter(mut self, parameter: ActionParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// JSON-schema style tool description
    pub fn tool_schema(&self) -> Value {
        let properties: serde_json::Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| {
                let mut property = json!({
                    "type": p.kind.schema_type(),
                    "description": p.description,
                });
                if let Some(min) = p.min {
                    property["minimum"] = json!(min);
                }
                if let Some(max) = p.max {
                    property["maximum"] = json!(max);
                }
                if let Some(default) = &p.default {
                    property["default"] = default.clone();
                }
                (p.name.clone(), property)
            })
            .collect();
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "name": self.id,
            "description": self.description,
            "input_schema": {
                "type": "object",
                "properties": properties,
                "required": required,
            }
        })
    }
}

type ActionFactory = Box<dyn Fn(&ActionParams) -> VoltResult<Box<dyn Action>> + Send + Sync>;

struct RegisteredAction {
    descriptor: ActionDescriptor,
    factory: ActionFactory,
}

/// Table of action factories keyed by descriptor id
#[derive(Default)]
pub struct ActionRegistry {
    actions: BTreeMap<String, RegisteredAction>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory; an existing entry with the same id is replaced
    pub fn register<F>(&mut self, descriptor: ActionDescriptor, factory: F) -> &mut Self
    where
        F: Fn(&ActionParams) -> VoltResult<Box<dyn Action>> + Send + Sync + 'static,
    {
        if self.actions.contains_key(&descriptor.id) {
            log::warn!("Replacing registered action '{}'", descriptor.id);
        }
        self.actions.insert(
            descriptor.id.clone(),
            RegisteredAction {
                descriptor,
                factory: Box::new(factory),
            },
        );
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.actions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn descriptor(&self, id: &str) -> Option<&ActionDescriptor> {
        self.actions.get(id).map(|registered| &registered.descriptor)
    }

    /// All descriptors sorted by id
    pub fn descriptors(&self) -> Vec<&ActionDescriptor> {
        self.actions.values().map(|registered| &registered.descriptor).collect()
    }

    pub fn tool_schemas(&self) -> Vec<Value> {
        self.actions
            .values()
            .map(|registered| registered.descriptor.tool_schema())
            .collect()
    }

    /// Validate `params` against the descriptor and build the action
    ///
    /// Missing optional parameters are filled from their declared defaults
    /// before the factory runs.
    pub fn create(&self, id: &str, params: &ActionParams) -> VoltResult<Box<dyn Action>> {
        let registered = self
            .actions
            .get(id)
            .ok_or_else(|| VoltError::UnknownAction(id.to_string()))?;

        let mut resolved = params.clone();
        for parameter in &registered.descriptor.parameters {
            match params.value(&parameter.name) {
                Some(value) => parameter.validate(value)?,
                None if parameter.required => {
                    return Err(VoltError::invalid_parameter(&parameter.name, "missing"));
                }
                None => {
                    if let Some(default) = &parameter.default {
                        resolved.set(&parameter.name, default)?;
                    }
                }
            }
        }

        (registered.factory)(&resolved)
    }
}
