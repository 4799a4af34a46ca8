//! Alibaba Cloud resources for skyform
//!
//! Typed declarations for the Alibaba Cloud resources a skyform topology uses.
//! Each constructor takes the explicit [`Context`](skyform_cloud::Context),
//! validates its arguments, and submits one declaration; the returned handle
//! exposes the resource's outputs as [`Output`](skyform_cloud::Output)s.
//!
//! # Resources
//!
//! - **vpc**: `Network` (VPC), `Switch` (vSwitch), `get_switches`
//! - **ecs**: `SecurityGroup`, `SecurityGroupRule`, `Instance`
//! - **cs**: `ServerlessKubernetes` (ASK)
//! - **zones**: `get_zones`
//!
//! # Example
//!
//! ```ignore
//! use skyform_cloud_aliyun::vpc::{Network, NetworkArgs};
//!
//! let network = Network::new(&ctx, "acme-zadig-dev", NetworkArgs {
//!     vpc_name: Some("acme-zadig-dev".into()),
//!     cidr_block: Some("10.0.0.0/16".into()),
//!     ..Default::default()
//! })?;
//! let vpc_id = network.id();
//! ```

pub mod cs;
pub mod ecs;
pub mod preview;
pub mod vpc;
pub mod zones;

use serde_json::Value;
use std::collections::BTreeMap;

/// Resource tags
pub type Tags = BTreeMap<String, String>;

pub(crate) fn tags_value(tags: &Tags) -> Value {
    Value::Object(
        tags.iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

pub use cs::{ServerlessKubernetes, ServerlessKubernetesArgs};
pub use ecs::{
    Instance, InstanceArgs, InstanceChargeType, InstanceStatus, InternetChargeType, IpProtocol,
    RuleDirection, SecurityGroup, SecurityGroupArgs, SecurityGroupRule, SecurityGroupRuleArgs,
};
pub use vpc::{GetSwitchesArgs, Network, NetworkArgs, Switch, SwitchArgs, get_switches};
pub use zones::{GetZonesArgs, GetZonesResult, get_zones, zone_suffix};
