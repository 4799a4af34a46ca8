//! VPC networks and vSwitches

use crate::{Tags, tags_value};
use serde::{Deserialize, Serialize};
use skyform_cloud::{Context, Output, PropertyMap, ResourceOutput, Result};
use tracing::debug;

pub const NETWORK_TYPE: &str = "alicloud:vpc/network:Network";
pub const SWITCH_TYPE: &str = "alicloud:vpc/switch:Switch";
pub const GET_SWITCHES: &str = "alicloud:vpc/getSwitches:getSwitches";

#[derive(Debug, Clone, Default)]
pub struct NetworkArgs {
    pub vpc_name: Option<String>,
    pub cidr_block: Option<String>,
    pub description: Option<String>,
    pub tags: Tags,
}

/// A VPC
#[derive(Debug, Clone)]
pub struct Network {
    resource: ResourceOutput,
}

impl Network {
    pub fn new(ctx: &Context, name: &str, args: NetworkArgs) -> Result<Self> {
        let props = PropertyMap::new()
            .set_opt("vpcName", args.vpc_name)
            .set_opt("cidrBlock", args.cidr_block)
            .set_opt("description", args.description)
            .set("tags", tags_value(&args.tags));

        Ok(Self {
            resource: ctx.register_resource(NETWORK_TYPE, name, props)?,
        })
    }

    pub fn id(&self) -> Output<String> {
        self.resource.id()
    }

    pub fn vpc_name(&self) -> Output<String> {
        self.resource.string("vpcName")
    }

    pub fn status(&self) -> Output<Option<String>> {
        self.resource.optional_string("status")
    }

    pub fn resource(&self) -> &ResourceOutput {
        &self.resource
    }
}

#[derive(Debug, Clone)]
pub struct SwitchArgs {
    pub vpc_id: Output<String>,
    pub vswitch_name: Option<String>,
    pub cidr_block: String,
    pub zone_id: String,
    pub tags: Tags,
}

/// A vSwitch (subnet) inside a VPC
#[derive(Debug, Clone)]
pub struct Switch {
    resource: ResourceOutput,
}

impl Switch {
    pub fn new(ctx: &Context, name: &str, args: SwitchArgs) -> Result<Self> {
        let props = PropertyMap::new()
            .set_output("vpcId", &args.vpc_id)
            .set_opt("vswitchName", args.vswitch_name)
            .set("cidrBlock", args.cidr_block)
            .set("zoneId", args.zone_id)
            .set("tags", tags_value(&args.tags));

        Ok(Self {
            resource: ctx.register_resource(SWITCH_TYPE, name, props)?,
        })
    }

    pub fn id(&self) -> Output<String> {
        self.resource.id()
    }

    pub fn vswitch_name(&self) -> Output<String> {
        self.resource.string("vswitchName")
    }

    pub fn status(&self) -> Output<Option<String>> {
        self.resource.optional_string("status")
    }

    pub fn resource(&self) -> &ResourceOutput {
        &self.resource
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetSwitchesArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetSwitchesResult {
    #[serde(default)]
    pub ids: Vec<String>,
}

/// Lists the vSwitch ids matching the filter
pub async fn get_switches(ctx: &Context, args: &GetSwitchesArgs) -> Result<GetSwitchesResult> {
    let value = ctx
        .invoke(GET_SWITCHES, serde_json::to_value(args)?)
        .await?;
    let result: GetSwitchesResult = serde_json::from_value(value)?;
    debug!(vpc_id = ?args.vpc_id, count = result.ids.len(), "Listed vSwitches");
    Ok(result)
}
