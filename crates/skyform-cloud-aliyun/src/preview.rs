//! Preview engine preloaded for Alibaba Cloud
//!
//! Answers `getZones` from a fixed zone list and `getSwitches` from the vSwitches
//! registered so far, and reports the statuses a freshly provisioned resource
//! would have.

use crate::ecs::INSTANCE_TYPE;
use crate::vpc::{GET_SWITCHES, NETWORK_TYPE, SWITCH_TYPE};
use crate::zones::GET_ZONES;
use serde_json::{Value, json};
use skyform_cloud::PreviewEngine;

pub fn engine(zones: Vec<String>) -> PreviewEngine {
    PreviewEngine::new()
        .with_invoke(GET_ZONES, move |_, _| Ok(json!({ "ids": zones })))
        .with_invoke(GET_SWITCHES, |args, records| {
            let vpc_id = args.get("vpcId").and_then(Value::as_str);
            let ids: Vec<String> = records
                .iter()
                .filter(|r| r.type_token == SWITCH_TYPE)
                .filter(|r| vpc_id.is_none() || r.get_str("vpcId") == vpc_id)
                .map(|r| PreviewEngine::preview_id(&r.type_token, &r.name))
                .collect();
            Ok(json!({ "ids": ids }))
        })
        .with_default_output(NETWORK_TYPE, "status", json!("Available"))
        .with_default_output(SWITCH_TYPE, "status", json!("Available"))
        .with_default_output(INSTANCE_TYPE, "status", json!("Pending"))
}
