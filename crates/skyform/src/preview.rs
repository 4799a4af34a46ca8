//! Preview runs of the topology against the in-memory engine

use crate::settings::StackSettings;
use crate::topology::{Topology, declare_topology};
use skyform_cloud::{CloudError, Context, Plan, RunSummary};
use skyform_cloud_aliyun::preview;
use std::sync::Arc;
use tracing::info;

/// Zones a preview uses when none are given: `{region}-a` and `{region}-b`
pub fn default_zones(region: Option<&str>) -> skyform_cloud::Result<Vec<String>> {
    let region = region.ok_or_else(|| {
        CloudError::InvalidConfig(
            "alicloud:region is not set; pass --zone or configure a region".to_string(),
        )
    })?;
    Ok(vec![format!("{}-a", region), format!("{}-b", region)])
}

/// Values exported by a declaration pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackOutputs {
    pub vpc_id: String,
    pub vswitch_ids: Vec<String>,
    pub security_group_id: String,
    pub rule_ids: Vec<String>,
    pub cluster_id: Option<String>,
    pub instance_id: String,
}

impl StackOutputs {
    async fn collect(topology: &Topology) -> anyhow::Result<Self> {
        let cluster_id = match &topology.cluster {
            Some(cluster) => Some(cluster.id().resolve().await?),
            None => None,
        };

        Ok(Self {
            vpc_id: topology.network.id().resolve().await?,
            vswitch_ids: topology.vswitch_ids.resolve().await?,
            security_group_id: topology.security_group.id().resolve().await?,
            rule_ids: topology.rule_ids.resolve().await?,
            cluster_id,
            instance_id: topology.instance.id().resolve().await?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PreviewReport {
    pub summary: RunSummary,
    pub plan: Plan,
    pub outputs: StackOutputs,
}

/// Declares the topology against a preview engine seeded with `zones` and
/// waits for the whole graph.
pub async fn run_preview(
    settings: &StackSettings,
    project: &str,
    zones: Vec<String>,
) -> anyhow::Result<PreviewReport> {
    let engine = Arc::new(preview::engine(zones));
    let ctx = Context::new(project, settings.stack.as_str(), engine.clone());
    info!(project = %project, stack = %settings.stack, engine = ctx.engine_name(), "Declaring topology");

    let topology = declare_topology(&ctx, settings).await?;
    let summary = ctx.finish().await?;
    let outputs = StackOutputs::collect(&topology).await?;

    Ok(PreviewReport {
        summary,
        plan: engine.plan(),
        outputs,
    })
}
