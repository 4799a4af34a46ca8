//! Orchestration engine trait definition

use crate::error::Result;
use crate::secret::REDACTED;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

/// Orchestration engine abstraction
///
/// The engine turns declarations into provider API calls and owns the whole
/// resource lifecycle: diffing, state, retries and rollback all live behind
/// this trait. The declaration side only hands over fully resolved inputs and
/// consumes what comes back.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Returns the engine name (e.g., "preview")
    fn name(&self) -> &str;

    /// Provision (or adopt) a declared resource and report its outputs
    async fn register(&self, request: RegisterRequest) -> Result<RegisterResponse>;

    /// Run a provider data-source query
    async fn invoke(&self, request: InvokeRequest) -> Result<Value>;
}

/// A resource declaration with every input resolved
#[derive(Clone)]
pub struct RegisterRequest {
    /// Declaration order within the run; engines may see requests in any order
    pub sequence: u64,

    /// Provider type token (e.g., "alicloud:vpc/network:Network")
    pub type_token: String,

    /// Logical name, unique per type within a run
    pub name: String,

    /// Input properties
    pub props: Map<String, Value>,

    /// Keys of `props` holding secret values
    pub secret_keys: BTreeSet<String>,
}

impl RegisterRequest {
    /// Short resource kind derived from the type token ("Network" -> "network")
    pub fn kind(&self) -> String {
        kind_of(&self.type_token)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.props.get(key).and_then(Value::as_str)
    }

    /// Input properties with secret values replaced
    pub fn redacted_props(&self) -> Map<String, Value> {
        self.props
            .iter()
            .map(|(k, v)| {
                if self.secret_keys.contains(k) {
                    (k.clone(), Value::String(REDACTED.to_string()))
                } else {
                    (k.clone(), v.clone())
                }
            })
            .collect()
    }
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("sequence", &self.sequence)
            .field("type_token", &self.type_token)
            .field("name", &self.name)
            .field("props", &self.redacted_props())
            .finish()
    }
}

/// What the engine reports back for a registered resource
#[derive(Debug, Clone, Default)]
pub struct RegisterResponse {
    /// Provider-assigned identifier
    pub id: String,

    /// Output properties (status, addresses, echoed inputs, ...)
    pub outputs: Map<String, Value>,
}

impl RegisterResponse {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            outputs: Map::new(),
        }
    }

    pub fn with_output(mut self, key: impl Into<String>, value: Value) -> Self {
        self.outputs.insert(key.into(), value);
        self
    }
}

/// A data-source query
#[derive(Debug, Clone)]
pub struct InvokeRequest {
    /// Function token (e.g., "alicloud:index/getZones:getZones")
    pub token: String,

    pub args: Value,
}

/// Last segment of a type token, lowercased
pub fn kind_of(type_token: &str) -> String {
    type_token
        .rsplit(':')
        .next()
        .unwrap_or(type_token)
        .to_lowercase()
}
