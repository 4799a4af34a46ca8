//! skyform: the Alibaba Cloud topology of one environment
//!
//! One VPC with a vSwitch per zone, a default security group with its ingress
//! rules, an ECS instance and, in `cn-wulanchabu` only, a serverless Kubernetes
//! cluster. [`declare_topology`] declares all of it through an explicit
//! [`Context`](skyform_cloud::Context); [`run_preview`] runs it against the
//! in-memory preview engine.

pub mod preview;
pub mod settings;
pub mod topology;

pub use preview::{PreviewReport, StackOutputs, default_zones, run_preview};
pub use settings::StackSettings;
pub use topology::{SubnetPlan, Topology, declare_topology, plan_subnets};
