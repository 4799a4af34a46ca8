//! Declaration inputs

use crate::error::{CloudError, Resolution};
use crate::output::Output;
use crate::secret::Secret;
use futures_util::future::{self, BoxFuture, FutureExt};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

enum PropertyValue {
    Known(Value),
    Pending(BoxFuture<'static, Resolution<Value>>),
    Secret(Secret),
}

/// Input properties of a resource declaration, keyed by the provider's
/// camelCase property names. Pending entries are awaited before the engine
/// sees the declaration.
#[derive(Default)]
pub struct PropertyMap {
    entries: BTreeMap<String, PropertyValue>,
}

impl fmt::Debug for PropertyMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, value) in &self.entries {
            match value {
                PropertyValue::Known(v) => map.entry(key, v),
                PropertyValue::Pending(_) => map.entry(key, &"<pending>"),
                PropertyValue::Secret(s) => map.entry(key, s),
            };
        }
        map.finish()
    }
}

/// Fully resolved inputs handed to the engine
#[derive(Debug, Clone, Default)]
pub struct ResolvedProperties {
    pub values: Map<String, Value>,
    pub secret_keys: BTreeSet<String>,
}

fn to_value<T: Serialize>(value: T) -> Resolution<Value> {
    serde_json::to_value(value).map_err(|e| Arc::new(CloudError::from(e)))
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.entries
            .insert(key.to_string(), PropertyValue::Known(value.into()));
        self
    }

    /// Sets the property only when a value is present
    pub fn set_opt<V: Into<Value>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(key, v),
            None => self,
        }
    }

    pub fn set_output<T>(mut self, key: &str, output: &Output<T>) -> Self
    where
        T: Serialize + Clone + Send + Sync + 'static,
    {
        let output = output.clone();
        let pending = async move { to_value(output.resolve().await?) }.boxed();
        self.entries
            .insert(key.to_string(), PropertyValue::Pending(pending));
        self
    }

    /// A list property whose elements are all pending
    pub fn set_outputs<T>(mut self, key: &str, outputs: &[Output<T>]) -> Self
    where
        T: Serialize + Clone + Send + Sync + 'static,
    {
        let outputs = outputs.to_vec();
        let pending = async move {
            let values = future::join_all(outputs.iter().map(|o| o.resolve()))
                .await
                .into_iter()
                .collect::<Resolution<Vec<T>>>()?;
            to_value(values)
        }
        .boxed();
        self.entries
            .insert(key.to_string(), PropertyValue::Pending(pending));
        self
    }

    pub fn set_secret(mut self, key: &str, secret: &Secret) -> Self {
        self.entries
            .insert(key.to_string(), PropertyValue::Secret(secret.clone()));
        self
    }

    pub fn set_secret_opt(self, key: &str, secret: Option<&Secret>) -> Self {
        match secret {
            Some(s) => self.set_secret(key, s),
            None => self,
        }
    }

    /// Awaits every pending input. The first failing dependency wins.
    pub async fn resolve(self) -> Resolution<ResolvedProperties> {
        let mut resolved = ResolvedProperties::default();
        for (key, value) in self.entries {
            let value = match value {
                PropertyValue::Known(v) => v,
                PropertyValue::Pending(fut) => fut.await?,
                PropertyValue::Secret(s) => {
                    resolved.secret_keys.insert(key.clone());
                    Value::String(s.expose().to_string())
                }
            };
            resolved.values.insert(key, value);
        }
        Ok(resolved)
    }
}
