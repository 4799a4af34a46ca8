//! The plan of a preview pass
//!
//! A declaration pass only adds resources; comparing them with what already
//! exists is the orchestration engine's job. A [`Plan`] is therefore a list of
//! creations, in the order the resources were declared.

use crate::engine::RegisterRequest;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// A resource the pass would create
#[derive(Debug, Clone, Serialize)]
pub struct PlannedResource {
    /// Position in declaration order
    pub sequence: u64,

    /// Short kind ("network", "switch", ...)
    pub kind: String,

    /// Provider type token (e.g., "alicloud:vpc/network:Network")
    pub type_token: String,

    pub name: String,

    /// Input properties, secrets redacted
    pub inputs: Map<String, Value>,
}

impl From<&RegisterRequest> for PlannedResource {
    fn from(request: &RegisterRequest) -> Self {
        Self {
            sequence: request.sequence,
            kind: request.kind(),
            type_token: request.type_token.clone(),
            name: request.name.clone(),
            inputs: request.redacted_props(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Plan {
    pub resources: Vec<PlannedResource>,
}

impl Plan {
    /// Orders the requests by declaration sequence, whatever order the engine saw them in
    pub fn from_requests<'a>(requests: impl IntoIterator<Item = &'a RegisterRequest>) -> Self {
        let mut resources: Vec<PlannedResource> =
            requests.into_iter().map(PlannedResource::from).collect();
        resources.sort_by_key(|r| r.sequence);
        Self { resources }
    }

    pub fn summary(&self) -> PlanSummary {
        let mut by_kind = BTreeMap::new();
        for resource in &self.resources {
            *by_kind.entry(resource.kind.clone()).or_insert(0) += 1;
        }
        PlanSummary {
            create: self.resources.len(),
            by_kind,
        }
    }
}

/// Creation counts, overall and per kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSummary {
    pub create: usize,
    pub by_kind: BTreeMap<String, usize>,
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to create", self.create)?;
        if !self.by_kind.is_empty() {
            let kinds: Vec<String> = self
                .by_kind
                .iter()
                .map(|(kind, count)| format!("{} {}", kind, count))
                .collect();
            write!(f, " ({})", kinds.join(", "))?;
        }
        Ok(())
    }
}
