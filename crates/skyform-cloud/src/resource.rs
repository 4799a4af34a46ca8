//! Handles to declared resources

use crate::error::{CloudError, Result};
use crate::output::Output;
use serde_json::{Map, Value};

/// A resource after the engine registered it
#[derive(Debug, Clone)]
pub struct RegisteredResource {
    pub type_token: String,
    pub name: String,
    pub id: String,
    pub outputs: Map<String, Value>,
}

impl RegisteredResource {
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.outputs.get(key).and_then(Value::as_str)
    }

    pub fn require_str(&self, key: &str) -> Result<String> {
        self.get_str(key)
            .map(str::to_string)
            .ok_or_else(|| CloudError::MissingOutput {
                resource: self.name.clone(),
                key: key.to_string(),
            })
    }
}

/// The pending state of a declared resource
#[derive(Debug, Clone)]
pub struct ResourceOutput {
    type_token: String,
    name: String,
    state: Output<RegisteredResource>,
    id: Output<String>,
}

impl ResourceOutput {
    pub(crate) fn new(type_token: String, name: String, state: Output<RegisteredResource>) -> Self {
        let id = state.apply(|r| r.id);
        Self {
            type_token,
            name,
            state,
            id,
        }
    }

    pub fn type_token(&self) -> &str {
        &self.type_token
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> Output<String> {
        self.id.clone()
    }

    pub fn state(&self) -> Output<RegisteredResource> {
        self.state.clone()
    }

    /// A string output the engine must report
    pub fn string(&self, key: &str) -> Output<String> {
        let key = key.to_string();
        self.state.try_apply(move |r| r.require_str(&key))
    }

    /// A string output the engine may leave unset
    pub fn optional_string(&self, key: &str) -> Output<Option<String>> {
        let key = key.to_string();
        self.state
            .apply(move |r| r.get_str(&key).map(str::to_string))
    }
}
