//! In-memory preview engine
//!
//! Records declarations instead of provisioning them. Ids are derived from the
//! type token and name so repeated previews of the same stack agree with each
//! other. Used by `skyform preview` and throughout the tests.

use crate::engine::{Engine, InvokeRequest, RegisterRequest, RegisterResponse, kind_of};
use crate::error::{CloudError, Result};
use crate::plan::Plan;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, PoisonError};

/// Answers a data-source query, seeing every resource registered so far
pub type InvokeHandler = Box<dyn Fn(&Value, &[RegisterRequest]) -> Result<Value> + Send + Sync>;

#[derive(Default)]
pub struct PreviewEngine {
    records: Mutex<Vec<RegisterRequest>>,
    handlers: HashMap<String, InvokeHandler>,
    defaults: HashMap<String, Map<String, Value>>,
    failing: HashSet<String>,
}

impl PreviewEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_invoke<F>(mut self, token: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Value, &[RegisterRequest]) -> Result<Value> + Send + Sync + 'static,
    {
        self.handlers.insert(token.into(), Box::new(handler));
        self
    }

    /// Outputs reported for every resource of a type unless its inputs set them
    pub fn with_default_output(
        mut self,
        type_token: impl Into<String>,
        key: impl Into<String>,
        value: Value,
    ) -> Self {
        self.defaults
            .entry(type_token.into())
            .or_default()
            .insert(key.into(), value);
        self
    }

    /// Makes registration of the named resource fail
    pub fn fail_resource(mut self, name: impl Into<String>) -> Self {
        self.failing.insert(name.into());
        self
    }

    /// Registered requests in declaration order
    pub fn records(&self) -> Vec<RegisterRequest> {
        let mut records = self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        records.sort_by_key(|r| r.sequence);
        records
    }

    /// Registered requests of one type
    pub fn records_of(&self, type_token: &str) -> Vec<RegisterRequest> {
        self.records()
            .into_iter()
            .filter(|r| r.type_token == type_token)
            .collect()
    }

    /// The recorded declarations as a plan of creations
    pub fn plan(&self) -> Plan {
        Plan::from_requests(&self.records())
    }

    pub fn preview_id(type_token: &str, name: &str) -> String {
        let mut hasher = DefaultHasher::new();
        type_token.hash(&mut hasher);
        name.hash(&mut hasher);
        format!(
            "{}-{:012x}",
            kind_of(type_token),
            hasher.finish() & 0xffff_ffff_ffff
        )
    }
}

#[async_trait]
impl Engine for PreviewEngine {
    fn name(&self) -> &str {
        "preview"
    }

    async fn register(&self, request: RegisterRequest) -> Result<RegisterResponse> {
        if self.failing.contains(&request.name) {
            return Err(CloudError::ProviderError {
                resource: request.name.clone(),
                message: "registration rejected by preview engine".to_string(),
            });
        }

        let mut response = RegisterResponse::new(Self::preview_id(&request.type_token, &request.name));
        if let Some(defaults) = self.defaults.get(&request.type_token) {
            response.outputs.extend(defaults.clone());
        }
        for (key, value) in &request.props {
            if !request.secret_keys.contains(key) {
                response.outputs.insert(key.clone(), value.clone());
            }
        }

        tracing::debug!(type_token = %request.type_token, name = %request.name, id = %response.id, "Preview registered");
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        Ok(response)
    }

    async fn invoke(&self, request: InvokeRequest) -> Result<Value> {
        let handler = self
            .handlers
            .get(&request.token)
            .ok_or_else(|| CloudError::InvokeFailed {
                token: request.token.clone(),
                message: "no handler registered".to_string(),
            })?;
        let records = self.records();
        handler(&request.args, &records)
    }
}
