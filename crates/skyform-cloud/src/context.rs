//! Explicit declaration context
//!
//! Every declaration and lookup goes through a [`Context`]: it knows which
//! project and stack is being declared, which engine receives the declarations,
//! and which continuations are still in flight.

use crate::engine::{Engine, InvokeRequest, RegisterRequest};
use crate::error::{CloudError, Result};
use crate::output::Output;
use crate::props::PropertyMap;
use crate::resource::{RegisteredResource, ResourceOutput};
use crate::tasks::TaskSet;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    project: String,
    stack: String,
    engine: Arc<dyn Engine>,
    tasks: TaskSet,
    declared: Mutex<HashSet<(String, String)>>,
}

/// Outcome of a completed declaration pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub project: String,
    pub stack: String,
    pub declared: usize,
}

impl Context {
    pub fn new(project: impl Into<String>, stack: impl Into<String>, engine: Arc<dyn Engine>) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                project: project.into(),
                stack: stack.into(),
                engine,
                tasks: TaskSet::default(),
                declared: Mutex::new(HashSet::new()),
            }),
        }
    }

    pub fn project(&self) -> &str {
        &self.inner.project
    }

    pub fn stack(&self) -> &str {
        &self.inner.stack
    }

    pub fn engine_name(&self) -> &str {
        self.inner.engine.name()
    }

    pub(crate) fn tasks(&self) -> &TaskSet {
        &self.inner.tasks
    }

    /// Declares a resource.
    ///
    /// Validation errors are returned immediately. Everything else surfaces
    /// through the returned outputs: the engine is called only after every
    /// pending input resolved, and a failed input fails this resource without
    /// calling the engine.
    pub fn register_resource(
        &self,
        type_token: &str,
        name: &str,
        props: PropertyMap,
    ) -> Result<ResourceOutput> {
        if name.trim().is_empty() {
            return Err(CloudError::InvalidDeclaration(format!(
                "{} requires a name",
                type_token
            )));
        }

        let sequence = {
            let mut declared = self
                .inner
                .declared
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if !declared.insert((type_token.to_string(), name.to_string())) {
                return Err(CloudError::DuplicateResource {
                    type_token: type_token.to_string(),
                    name: name.to_string(),
                });
            }
            declared.len() as u64 - 1
        };

        debug!(type_token = %type_token, name = %name, sequence, "Declared resource");

        let engine = Arc::clone(&self.inner.engine);
        let (token, resource_name) = (type_token.to_string(), name.to_string());
        let state = Output::spawn(&self.inner.tasks, async move {
            let resolved = props.resolve().await?;
            let request = RegisterRequest {
                sequence,
                type_token: token.clone(),
                name: resource_name.clone(),
                props: resolved.values,
                secret_keys: resolved.secret_keys,
            };

            match engine.register(request).await {
                Ok(response) => {
                    debug!(type_token = %token, name = %resource_name, id = %response.id, "Registered resource");
                    Ok(RegisteredResource {
                        type_token: token,
                        name: resource_name,
                        id: response.id,
                        outputs: response.outputs,
                    })
                }
                Err(e) => {
                    warn!(type_token = %token, name = %resource_name, error = %e, "Resource registration failed");
                    Err(Arc::new(e))
                }
            }
        });

        Ok(ResourceOutput::new(
            type_token.to_string(),
            name.to_string(),
            state,
        ))
    }

    /// Runs a data-source query through the engine
    pub async fn invoke(&self, token: &str, args: Value) -> Result<Value> {
        debug!(token = %token, "Invoking data source");
        self.inner
            .engine
            .invoke(InvokeRequest {
                token: token.to_string(),
                args,
            })
            .await
    }

    /// Number of resources declared so far
    pub fn declared(&self) -> usize {
        self.inner
            .declared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Waits for every outstanding continuation and reports the run outcome
    pub async fn finish(&self) -> Result<RunSummary> {
        self.inner.tasks.drain().await;

        let failures = self.inner.tasks.failures();
        if !failures.is_empty() {
            return Err(CloudError::RunFailed(failures));
        }

        Ok(RunSummary {
            project: self.inner.project.clone(),
            stack: self.inner.stack.clone(),
            declared: self.declared(),
        })
    }
}
