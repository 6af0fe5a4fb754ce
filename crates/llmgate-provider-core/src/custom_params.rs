//! Administrator-configured extra request fields, overlaid onto every outbound
//! body of a channel.
//!
//! Shape (JSON object):
//!
//! ```json
//! { "overwrite": false, "per_model": true,
//!   "claude-sonnet-4-5": { "top_k": 40 },
//!   "claude-haiku-4-5": { "temperature": 0.2 } }
//! ```

use serde_json::{Map, Value};

use crate::errors::{ProviderError, ProviderResult};

/// Never copied into an outbound body, at any nesting level.
pub const RESERVED_KEYS: [&str; 4] = ["stream", "overwrite", "per_model", "pre_add"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomParams {
    overwrite: bool,
    per_model: bool,
    pre_add: bool,
    spec: Map<String, Value>,
}

impl CustomParams {
    /// Validates the control keys. `null` means "no custom params".
    pub fn parse(value: &Value) -> ProviderResult<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(map) => Self::from_map(map.clone()),
            other => Err(ProviderError::InvalidConfig(format!(
                "custom_params must be a JSON object, got {}",
                json_kind(other)
            ))),
        }
    }

    pub fn from_map(spec: Map<String, Value>) -> ProviderResult<Self> {
        // `stream` is never applied, but a non-bool value still marks a broken spec.
        control_flag(&spec, "stream")?;
        Ok(Self {
            overwrite: control_flag(&spec, "overwrite")?,
            per_model: control_flag(&spec, "per_model")?,
            pre_add: control_flag(&spec, "pre_add")?,
            spec,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.spec.is_empty()
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    pub fn per_model(&self) -> bool {
        self.per_model
    }

    pub fn pre_add(&self) -> bool {
        self.pre_add
    }

    /// Overlays the active parameter set onto `body`.
    ///
    /// `pre_add` specs belong to an earlier augmentation phase and are a no-op
    /// here. Without `overwrite`, keys already in `body` keep their value.
    pub fn merge(&self, body: &mut Map<String, Value>) {
        if self.pre_add {
            return;
        }
        let Some(active) = self.active_params(body) else {
            return;
        };
        let mut applied = Vec::new();
        for (key, value) in active {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            if self.overwrite || !body.contains_key(key) {
                applied.push((key.clone(), value.clone()));
            }
        }
        for (key, value) in applied {
            body.insert(key, value);
        }
    }

    /// Convenience for callers holding an arbitrary JSON value; non-objects are
    /// returned unchanged.
    pub fn merge_value(&self, mut body: Value) -> Value {
        if let Value::Object(map) = &mut body {
            self.merge(map);
        }
        body
    }

    fn active_params(&self, body: &Map<String, Value>) -> Option<&Map<String, Value>> {
        if !self.per_model {
            return Some(&self.spec);
        }
        let model = body.get("model").and_then(Value::as_str)?;
        self.spec.get(model).and_then(Value::as_object)
    }
}

fn control_flag(spec: &Map<String, Value>, key: &'static str) -> ProviderResult<bool> {
    match spec.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(other) => Err(ProviderError::InvalidConfig(format!(
            "custom_params.{key} must be a boolean, got {}",
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
