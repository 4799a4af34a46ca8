//! ECS: security groups, security group rules and instances

use crate::{Tags, tags_value};
use skyform_cloud::{Context, Output, PropertyMap, ResourceOutput, Result, Secret};
use std::fmt;

pub const SECURITY_GROUP_TYPE: &str = "alicloud:ecs/securityGroup:SecurityGroup";
pub const SECURITY_GROUP_RULE_TYPE: &str = "alicloud:ecs/securityGroupRule:SecurityGroupRule";
pub const INSTANCE_TYPE: &str = "alicloud:ecs/instance:Instance";

#[derive(Debug, Clone)]
pub struct SecurityGroupArgs {
    pub name: Option<String>,
    pub vpc_id: Output<String>,
    /// "Accept" or "Drop"
    pub inner_access_policy: Option<String>,
    /// "normal" or "enterprise"
    pub security_group_type: Option<String>,
    pub description: Option<String>,
    pub tags: Tags,
}

#[derive(Debug, Clone)]
pub struct SecurityGroup {
    resource: ResourceOutput,
}

impl SecurityGroup {
    pub fn new(ctx: &Context, name: &str, args: SecurityGroupArgs) -> Result<Self> {
        let props = PropertyMap::new()
            .set_opt("name", args.name)
            .set_output("vpcId", &args.vpc_id)
            .set_opt("innerAccessPolicy", args.inner_access_policy)
            .set_opt("securityGroupType", args.security_group_type)
            .set_opt("description", args.description)
            .set("tags", tags_value(&args.tags));

        Ok(Self {
            resource: ctx.register_resource(SECURITY_GROUP_TYPE, name, props)?,
        })
    }

    pub fn id(&self) -> Output<String> {
        self.resource.id()
    }

    pub fn name(&self) -> Output<String> {
        self.resource.string("name")
    }

    pub fn resource(&self) -> &ResourceOutput {
        &self.resource
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleDirection {
    Ingress,
    Egress,
}

impl RuleDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleDirection::Ingress => "ingress",
            RuleDirection::Egress => "egress",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpProtocol {
    Tcp,
    Udp,
    Icmp,
    Gre,
    All,
}

impl IpProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            IpProtocol::Tcp => "tcp",
            IpProtocol::Udp => "udp",
            IpProtocol::Icmp => "icmp",
            IpProtocol::Gre => "gre",
            IpProtocol::All => "all",
        }
    }
}

impl fmt::Display for IpProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct SecurityGroupRuleArgs {
    pub direction: RuleDirection,
    pub ip_protocol: IpProtocol,
    /// "22/22"; the provider defaults to "-1/-1" for icmp and all
    pub port_range: Option<String>,
    pub cidr_ip: Option<String>,
    pub security_group_id: Output<String>,
    pub description: Option<String>,
}

impl SecurityGroupRuleArgs {
    /// Ingress rule for a single port from a CIDR block
    pub fn ingress(security_group_id: Output<String>, ip_protocol: IpProtocol, port: Option<u16>, cidr_ip: &str) -> Self {
        Self {
            direction: RuleDirection::Ingress,
            ip_protocol,
            port_range: port.map(|p| format!("{}/{}", p, p)),
            cidr_ip: Some(cidr_ip.to_string()),
            security_group_id,
            description: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SecurityGroupRule {
    resource: ResourceOutput,
}

impl SecurityGroupRule {
    pub fn new(ctx: &Context, name: &str, args: SecurityGroupRuleArgs) -> Result<Self> {
        let props = PropertyMap::new()
            .set("type", args.direction.as_str())
            .set("ipProtocol", args.ip_protocol.as_str())
            .set_opt("portRange", args.port_range)
            .set_opt("cidrIp", args.cidr_ip)
            .set_output("securityGroupId", &args.security_group_id)
            .set_opt("description", args.description);

        Ok(Self {
            resource: ctx.register_resource(SECURITY_GROUP_RULE_TYPE, name, props)?,
        })
    }

    pub fn id(&self) -> Output<String> {
        self.resource.id()
    }

    pub fn resource(&self) -> &ResourceOutput {
        &self.resource
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceChargeType {
    PrePaid,
    PostPaid,
}

impl InstanceChargeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceChargeType::PrePaid => "PrePaid",
            InstanceChargeType::PostPaid => "PostPaid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternetChargeType {
    PayByTraffic,
    PayByBandwidth,
}

impl InternetChargeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InternetChargeType::PayByTraffic => "PayByTraffic",
            InternetChargeType::PayByBandwidth => "PayByBandwidth",
        }
    }
}

/// Desired power state of an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceStatus {
    Running,
    Stopped,
}

impl InstanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceStatus::Running => "Running",
            InstanceStatus::Stopped => "Stopped",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InstanceArgs {
    pub host_name: Option<String>,
    pub instance_name: Option<String>,
    pub image_id: Option<String>,
    pub password: Option<Secret>,
    pub instance_type: Option<String>,
    pub instance_charge_type: Option<InstanceChargeType>,
    pub period_unit: Option<String>,
    pub auto_renew_period: Option<u32>,
    pub renewal_status: Option<String>,
    pub internet_charge_type: Option<InternetChargeType>,
    pub internet_max_bandwidth_out: Option<u32>,
    pub spot_strategy: Option<String>,
    pub system_disk_category: Option<String>,
    pub system_disk_size: Option<u32>,
    pub include_data_disks: Option<bool>,
    pub deletion_protection: Option<bool>,
    pub force_delete: Option<bool>,
    pub dry_run: Option<bool>,
    pub vswitch_id: Option<Output<String>>,
    pub security_groups: Vec<Output<String>>,
    pub status: Option<InstanceStatus>,
    pub tags: Tags,
}

#[derive(Debug, Clone)]
pub struct Instance {
    resource: ResourceOutput,
}

impl Instance {
    pub fn new(ctx: &Context, name: &str, args: InstanceArgs) -> Result<Self> {
        let mut props = PropertyMap::new()
            .set_opt("hostName", args.host_name)
            .set_opt("instanceName", args.instance_name)
            .set_opt("imageId", args.image_id)
            .set_secret_opt("password", args.password.as_ref())
            .set_opt("instanceType", args.instance_type)
            .set_opt("instanceChargeType", args.instance_charge_type.map(|c| c.as_str()))
            .set_opt("periodUnit", args.period_unit)
            .set_opt("autoRenewPeriod", args.auto_renew_period)
            .set_opt("renewalStatus", args.renewal_status)
            .set_opt("internetChargeType", args.internet_charge_type.map(|c| c.as_str()))
            .set_opt("internetMaxBandwidthOut", args.internet_max_bandwidth_out)
            .set_opt("spotStrategy", args.spot_strategy)
            .set_opt("systemDiskCategory", args.system_disk_category)
            .set_opt("systemDiskSize", args.system_disk_size)
            .set_opt("includeDataDisks", args.include_data_disks)
            .set_opt("deletionProtection", args.deletion_protection)
            .set_opt("forceDelete", args.force_delete)
            .set_opt("dryRun", args.dry_run)
            .set_opt("status", args.status.map(|s| s.as_str()))
            .set("tags", tags_value(&args.tags));

        if let Some(vswitch_id) = &args.vswitch_id {
            props = props.set_output("vswitchId", vswitch_id);
        }
        if !args.security_groups.is_empty() {
            props = props.set_outputs("securityGroups", &args.security_groups);
        }

        Ok(Self {
            resource: ctx.register_resource(INSTANCE_TYPE, name, props)?,
        })
    }

    pub fn id(&self) -> Output<String> {
        self.resource.id()
    }

    pub fn instance_name(&self) -> Output<Option<String>> {
        self.resource.optional_string("instanceName")
    }

    pub fn public_ip(&self) -> Output<Option<String>> {
        self.resource.optional_string("publicIp")
    }

    pub fn status(&self) -> Output<Option<String>> {
        self.resource.optional_string("status")
    }

    pub fn resource(&self) -> &ResourceOutput {
        &self.resource
    }
}
