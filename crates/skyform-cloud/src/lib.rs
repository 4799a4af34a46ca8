//! skyform Cloud Declarations
//!
//! This crate is the seam between topology programs and the orchestration
//! engine that provisions what they declare.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │               topology program                   │
//! │         (skyform preview / declare_topology)     │
//! └─────────────────┬───────────────────────────────┘
//!                   │  Context (explicit handle)
//! ┌─────────────────▼───────────────────────────────┐
//! │               skyform-cloud                      │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  Output<T>: resolve-then-continue         │   │
//! │  │  PropertyMap: pending inputs              │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  trait Engine { register, invoke }        │   │
//! │  └──────────────────────────────────────────┘   │
//! └───────┬─────────────────┬───────────────────────┘
//!         │                 │
//! ┌───────▼───────┐ ┌───────▼────────┐
//! │ PreviewEngine │ │ external engine │
//! └───────────────┘ └────────────────┘
//! ```
//!
//! A declaration is submitted once. Its id and outputs resolve later, after all
//! of its inputs resolved, and continuations on those outputs run strictly after
//! that. [`Context::finish`] waits for the whole graph and reports every failure.

pub mod context;
pub mod engine;
pub mod error;
pub mod output;
pub mod plan;
pub mod preview;
pub mod props;
pub mod resource;
pub mod secret;
mod tasks;

// Re-exports
pub use context::{Context, RunSummary};
pub use engine::{Engine, InvokeRequest, RegisterRequest, RegisterResponse, kind_of};
pub use error::{CloudError, Resolution, Result};
pub use output::Output;
pub use plan::{Plan, PlanSummary, PlannedResource};
pub use preview::{InvokeHandler, PreviewEngine};
pub use props::{PropertyMap, ResolvedProperties};
pub use resource::{RegisteredResource, ResourceOutput};
pub use secret::{REDACTED, Secret};
