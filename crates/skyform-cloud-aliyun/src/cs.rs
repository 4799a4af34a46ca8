//! Container Service: serverless Kubernetes (ASK)

use crate::{Tags, tags_value};
use skyform_cloud::{Context, Output, PropertyMap, ResourceOutput, Result};

pub const SERVERLESS_KUBERNETES_TYPE: &str = "alicloud:cs/serverlessKubernetes:ServerlessKubernetes";

#[derive(Debug, Clone)]
pub struct ServerlessKubernetesArgs {
    pub name: Option<String>,
    pub version: Option<String>,
    pub vpc_id: Output<String>,
    pub vswitch_ids: Vec<Output<String>>,
    pub service_cidr: Option<String>,
    pub service_discovery_types: Vec<String>,
    pub new_nat_gateway: Option<bool>,
    pub endpoint_public_access_enabled: Option<bool>,
    pub load_balancer_spec: Option<String>,
    /// Local path the provider writes the cluster kubeconfig to
    pub kube_config: Option<String>,
    pub deletion_protection: Option<bool>,
    pub time_zone: Option<String>,
    pub tags: Tags,
}

#[derive(Debug, Clone)]
pub struct ServerlessKubernetes {
    resource: ResourceOutput,
}

impl ServerlessKubernetes {
    pub fn new(ctx: &Context, name: &str, args: ServerlessKubernetesArgs) -> Result<Self> {
        let mut props = PropertyMap::new()
            .set_opt("name", args.name)
            .set_opt("version", args.version)
            .set_output("vpcId", &args.vpc_id)
            .set_outputs("vswitchIds", &args.vswitch_ids)
            .set_opt("serviceCidr", args.service_cidr)
            .set_opt("newNatGateway", args.new_nat_gateway)
            .set_opt("endpointPublicAccessEnabled", args.endpoint_public_access_enabled)
            .set_opt("loadBalancerSpec", args.load_balancer_spec)
            .set_opt("kubeConfig", args.kube_config)
            .set_opt("deletionProtection", args.deletion_protection)
            .set_opt("timeZone", args.time_zone)
            .set("tags", tags_value(&args.tags));

        if !args.service_discovery_types.is_empty() {
            props = props.set("serviceDiscoveryTypes", args.service_discovery_types);
        }

        Ok(Self {
            resource: ctx.register_resource(SERVERLESS_KUBERNETES_TYPE, name, props)?,
        })
    }

    pub fn id(&self) -> Output<String> {
        self.resource.id()
    }

    pub fn name(&self) -> Output<String> {
        self.resource.string("name")
    }

    pub fn version(&self) -> Output<Option<String>> {
        self.resource.optional_string("version")
    }

    pub fn resource(&self) -> &ResourceOutput {
        &self.resource
    }
}
