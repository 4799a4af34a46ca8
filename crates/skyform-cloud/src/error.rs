//! Cloud declaration error types

use std::sync::Arc;
use thiserror::Error;

/// Errors raised while declaring resources or driving their outputs
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Invalid declaration: {0}")]
    InvalidDeclaration(String),

    #[error("Resource already declared: {type_token} {name}")]
    DuplicateResource { type_token: String, name: String },

    #[error("Provider error for {resource}: {message}")]
    ProviderError { resource: String, message: String },

    #[error("Invoke {token} failed: {message}")]
    InvokeFailed { token: String, message: String },

    #[error("Resource {resource} has no output '{key}'")]
    MissingOutput { resource: String, key: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Output was dropped before it resolved")]
    Abandoned,

    #[error("Continuation panicked: {0}")]
    TaskPanicked(String),

    #[error("{} operation(s) failed, first: {}", .0.len(), first_failure(.0))]
    RunFailed(Vec<Arc<CloudError>>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn first_failure(failures: &[Arc<CloudError>]) -> String {
    failures
        .first()
        .map(|e| e.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub type Result<T> = std::result::Result<T, CloudError>;

/// Outcome of an output: failures are shared between every dependent
pub type Resolution<T> = std::result::Result<T, Arc<CloudError>>;
