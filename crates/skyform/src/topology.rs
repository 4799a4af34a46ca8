//! The environment topology
//!
//! Declares, in order: the VPC, one vSwitch per eligible zone, the default
//! security group and its ingress rules, the serverless Kubernetes cluster (only
//! in [`CLUSTER_REGION`](crate::settings::CLUSTER_REGION)), and the ECS instance.
//! Each resource gets an observer that logs its attributes once they resolve.

use crate::settings::StackSettings;
use skyform_cloud::{CloudError, Context, Output, Resolution, Result};
use skyform_cloud_aliyun::cs::{ServerlessKubernetes, ServerlessKubernetesArgs};
use skyform_cloud_aliyun::ecs::{
    Instance, InstanceArgs, InstanceChargeType, InstanceStatus, InternetChargeType, IpProtocol,
    SecurityGroup, SecurityGroupArgs, SecurityGroupRule, SecurityGroupRuleArgs,
};
use skyform_cloud_aliyun::vpc::{GetSwitchesArgs, Network, NetworkArgs, Switch, SwitchArgs, get_switches};
use skyform_cloud_aliyun::zones::{GetZonesArgs, get_zones, zone_suffix};
use std::sync::Arc;
use tracing::{error, info};

pub const VPC_CIDR: &str = "10.0.0.0/16";
pub const ANY_CIDR: &str = "0.0.0.0/0";

pub const ASK_VERSION: &str = "v1.20.11-aliyun.1";
pub const ASK_SERVICE_CIDR: &str = "172.16.0.0/24";
pub const ASK_SLB_SPEC: &str = "slb.s1.small";

pub const ECS_IMAGE_ID: &str = "ubuntu_20_04_x64_20G_alibase_20210927.vhd";
pub const ECS_INSTANCE_TYPE: &str = "ecs.c7.xlarge";
pub const ECS_MAX_BANDWIDTH_OUT: u32 = 5;
pub const ECS_SYSTEM_DISK_CATEGORY: &str = "cloud_essd";
pub const ECS_SYSTEM_DISK_SIZE: u32 = 30;

/// An ingress rule opened on the default security group
#[derive(Debug, Clone, Copy)]
pub struct IngressRule {
    pub name: &'static str,
    pub protocol: IpProtocol,
    pub port: Option<u16>,
}

/// Declared in this order; the first failure skips the rest.
pub const INGRESS_RULES: [IngressRule; 3] = [
    IngressRule {
        name: "icmp",
        protocol: IpProtocol::Icmp,
        port: None,
    },
    IngressRule {
        name: "tcp-22",
        protocol: IpProtocol::Tcp,
        port: Some(22),
    },
    IngressRule {
        name: "tcp-zadig",
        protocol: IpProtocol::Tcp,
        port: Some(30000),
    },
];

/// Name, block and zone of one vSwitch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetPlan {
    pub name: String,
    pub cidr_block: String,
    pub zone_id: String,
}

/// One vSwitch per zone, in zone order: `{vpc}-{zone letter}` with `10.0.{i}.0/24`.
pub fn plan_subnets(vpc_name: &str, zone_ids: &[String]) -> Result<Vec<SubnetPlan>> {
    if zone_ids.len() > 256 {
        return Err(CloudError::InvalidConfig(format!(
            "{} zones do not fit in {}",
            zone_ids.len(),
            VPC_CIDR
        )));
    }

    zone_ids
        .iter()
        .enumerate()
        .map(|(idx, zone_id)| {
            Ok(SubnetPlan {
                name: format!("{}-{}", vpc_name, zone_suffix(zone_id)?),
                cidr_block: format!("10.0.{}.0/24", idx),
                zone_id: zone_id.clone(),
            })
        })
        .collect()
}

/// Handles to everything [`declare_topology`] declared
#[derive(Debug, Clone)]
pub struct Topology {
    pub network: Network,
    pub zones: Vec<String>,
    pub switches: Vec<Switch>,
    pub security_group: SecurityGroup,
    /// Ids of the ingress rules, resolved once all of them exist
    pub rule_ids: Output<Vec<String>>,
    /// vSwitch ids listed from the VPC
    pub vswitch_ids: Output<Vec<String>>,
    pub cluster: Option<ServerlessKubernetes>,
    pub instance: Instance,
}

pub async fn declare_topology(ctx: &Context, settings: &StackSettings) -> Result<Topology> {
    let base_name = settings.base_name();
    let vpc_name = base_name.clone();
    let tags = settings.tags();

    let network = Network::new(
        ctx,
        &vpc_name,
        NetworkArgs {
            vpc_name: Some(vpc_name.clone()),
            cidr_block: Some(VPC_CIDR.to_string()),
            description: None,
            tags: tags.clone(),
        },
    )?;
    network
        .id()
        .zip3(&network.vpc_name(), &network.status())
        .apply(|(id, name, status)| {
            info!(kind = "vpc", id = %id, name = %name, status = status.as_deref().unwrap_or("unknown"), "VPCInfo");
        });

    let zones = get_zones(
        ctx,
        &GetZonesArgs {
            available_resource_creation: Some("VSwitch".to_string()),
            network_type: Some("Vpc".to_string()),
        },
    )
    .await?;
    info!(zone = %zones.ids.join(","), "ZoneInfo");

    let mut switches = Vec::new();
    for subnet in plan_subnets(&vpc_name, &zones.ids)? {
        let switch = Switch::new(
            ctx,
            &subnet.name,
            SwitchArgs {
                vpc_id: network.id(),
                vswitch_name: Some(subnet.name.clone()),
                cidr_block: subnet.cidr_block,
                zone_id: subnet.zone_id,
                tags: tags.clone(),
            },
        )?;
        switch
            .id()
            .zip3(&switch.vswitch_name(), &switch.status())
            .apply(|(id, name, status)| {
                info!(kind = "vswitch", id = %id, name = %name, status = status.as_deref().unwrap_or("unknown"), "VSwitchInfo");
            });
        switches.push(switch);
    }

    let security_group = SecurityGroup::new(
        ctx,
        &settings.security_group_name(),
        SecurityGroupArgs {
            name: Some(settings.security_group_name()),
            vpc_id: network.id(),
            inner_access_policy: Some("Accept".to_string()),
            security_group_type: Some("normal".to_string()),
            description: None,
            tags: tags.clone(),
        },
    )?;
    security_group
        .id()
        .zip(&security_group.name())
        .apply(|(id, name)| {
            info!(kind = "security_group", id = %id, name = %name, "SGInfo");
        });

    let rule_ids = declare_ingress_rules(ctx, &security_group);
    let vswitch_ids = lookup_vswitch_ids(ctx, &network, &switches);
    let first_vswitch = vswitch_ids.try_apply(|ids| {
        ids.into_iter()
            .next()
            .ok_or_else(|| CloudError::InvalidConfig("no vSwitch found in the VPC".to_string()))
    });

    let cluster = if settings.cluster_enabled() {
        let cluster = ServerlessKubernetes::new(
            ctx,
            &base_name,
            ServerlessKubernetesArgs {
                name: Some(base_name.clone()),
                version: Some(ASK_VERSION.to_string()),
                vpc_id: network.id(),
                vswitch_ids: vec![first_vswitch.clone()],
                service_cidr: Some(ASK_SERVICE_CIDR.to_string()),
                service_discovery_types: vec!["CoreDNS".to_string()],
                new_nat_gateway: Some(true),
                endpoint_public_access_enabled: Some(true),
                load_balancer_spec: Some(ASK_SLB_SPEC.to_string()),
                kube_config: Some(settings.kubeconfig_path().display().to_string()),
                deletion_protection: Some(false),
                time_zone: settings.timezone.clone(),
                tags: tags.clone(),
            },
        )?;
        cluster
            .id()
            .zip3(&cluster.name(), &cluster.version())
            .apply(|(id, name, version)| {
                info!(kind = "serverless_kubernetes", id = %id, name = %name, version = version.as_deref().unwrap_or("unknown"), "ASKInfo");
            });
        Some(cluster)
    } else {
        None
    };

    let instance = Instance::new(
        ctx,
        &base_name,
        InstanceArgs {
            host_name: Some(base_name.clone()),
            instance_name: Some(base_name.clone()),
            image_id: Some(ECS_IMAGE_ID.to_string()),
            password: settings.ecs_password.clone(),
            instance_type: Some(ECS_INSTANCE_TYPE.to_string()),
            instance_charge_type: Some(InstanceChargeType::PostPaid),
            period_unit: Some("Month".to_string()),
            auto_renew_period: Some(1),
            renewal_status: Some("Normal".to_string()),
            internet_charge_type: Some(InternetChargeType::PayByTraffic),
            internet_max_bandwidth_out: Some(ECS_MAX_BANDWIDTH_OUT),
            spot_strategy: Some("NoSpot".to_string()),
            system_disk_category: Some(ECS_SYSTEM_DISK_CATEGORY.to_string()),
            system_disk_size: Some(ECS_SYSTEM_DISK_SIZE),
            include_data_disks: Some(true),
            deletion_protection: Some(true),
            force_delete: Some(false),
            dry_run: Some(false),
            vswitch_id: Some(first_vswitch),
            security_groups: vec![security_group.id()],
            status: Some(InstanceStatus::Running),
            tags,
        },
    )?;
    instance
        .id()
        .zip4(&instance.instance_name(), &instance.public_ip(), &instance.status())
        .apply(|(id, name, public_ip, status)| {
            info!(
                kind = "ecs",
                id = %id,
                name = name.as_deref().unwrap_or(""),
                public_ip = public_ip.as_deref().unwrap_or("pending"),
                status = status.as_deref().unwrap_or("unknown"),
                "ECSInfo"
            );
        });

    Ok(Topology {
        network,
        zones: zones.ids,
        switches,
        security_group,
        rule_ids,
        vswitch_ids,
        cluster,
        instance,
    })
}

/// Declares [`INGRESS_RULES`] once the group id is known, one at a time.
fn declare_ingress_rules(ctx: &Context, security_group: &SecurityGroup) -> Output<Vec<String>> {
    let ctx = ctx.clone();
    security_group.id().apply_async(move |sg_id| async move {
        let mut ids = Vec::with_capacity(INGRESS_RULES.len());
        for rule in INGRESS_RULES {
            let args = SecurityGroupRuleArgs::ingress(
                Output::known(&ctx, sg_id.clone()),
                rule.protocol,
                rule.port,
                ANY_CIDR,
            );
            let created: Resolution<String> = match SecurityGroupRule::new(&ctx, rule.name, args) {
                Ok(declared) => declared.id().resolve().await,
                Err(e) => Err(Arc::new(e)),
            };
            match created {
                Ok(id) => ids.push(id),
                Err(e) => {
                    error!(error = %e, policy = rule.name, "SetSecurityGroupPolicy");
                    return Err(e);
                }
            }
        }
        Ok(ids)
    })
}

/// Lists the VPC's vSwitches after the VPC and this run's vSwitches exist.
fn lookup_vswitch_ids(ctx: &Context, network: &Network, switches: &[Switch]) -> Output<Vec<String>> {
    let declared = Output::all(ctx, switches.iter().map(Switch::id).collect());
    let ctx = ctx.clone();
    network
        .id()
        .zip(&declared)
        .apply_async(move |(vpc_id, _)| async move {
            let result = get_switches(
                &ctx,
                &GetSwitchesArgs {
                    vpc_id: Some(vpc_id),
                    ..Default::default()
                },
            )
            .await?;
            info!(info = %result.ids.join(","), "GetVSwitches");
            Ok::<_, Arc<CloudError>>(result.ids)
        })
}
