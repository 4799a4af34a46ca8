//! Availability zone lookup

use serde::{Deserialize, Serialize};
use skyform_cloud::{CloudError, Context, Result};

pub const GET_ZONES: &str = "alicloud:index/getZones:getZones";

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetZonesArgs {
    /// Only zones where this resource can be created (e.g., "VSwitch")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_resource_creation: Option<String>,

    /// "Vpc" or "Classic"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetZonesResult {
    #[serde(default)]
    pub ids: Vec<String>,
}

pub async fn get_zones(ctx: &Context, args: &GetZonesArgs) -> Result<GetZonesResult> {
    let value = ctx
        .invoke(GET_ZONES, serde_json::to_value(args)?)
        .await?;
    Ok(serde_json::from_value(value)?)
}

/// Zone letter of a zone id: the third hyphen-separated token ("cn-hangzhou-a" -> "a")
pub fn zone_suffix(zone_id: &str) -> Result<&str> {
    zone_id
        .split('-')
        .nth(2)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CloudError::InvalidConfig(format!("unexpected zone id: {}", zone_id)))
}
