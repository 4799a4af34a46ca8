//! Stack settings read from configuration

use skyform_cloud::Secret;
use skyform_cloud_aliyun::Tags;
use skyform_config::{ConfigError, StackConfig};
use std::path::PathBuf;

/// Namespace of the topology's own settings
pub const CONFIG_NAMESPACE: &str = "koderover";
/// Namespace of the provider settings
pub const PROVIDER_NAMESPACE: &str = "alicloud";
/// The only region where the serverless Kubernetes cluster is declared
pub const CLUSTER_REGION: &str = "cn-wulanchabu";
/// Config key of the instance login password
pub const ECS_PASSWORD_KEY: &str = "zadig-ecs-passwd";

#[derive(Debug, Clone)]
pub struct StackSettings {
    pub org: String,
    pub project: String,
    pub stack: String,
    pub region: Option<String>,
    pub timezone: Option<String>,
    pub ecs_password: Option<Secret>,
    /// Base of the kubeconfig path
    pub home_dir: PathBuf,
}

impl StackSettings {
    pub fn from_config(
        config: &StackConfig,
        stack: &str,
        home_dir: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let ns = config.namespace(CONFIG_NAMESPACE);
        let provider = config.namespace(PROVIDER_NAMESPACE);

        let ecs_password = ns.get_secret(ECS_PASSWORD_KEY);
        if ecs_password.is_none() {
            tracing::warn!(key = ECS_PASSWORD_KEY, "No instance password configured");
        }

        let settings = Self {
            org: ns.require("org")?.to_string(),
            project: ns.require("project")?.to_string(),
            stack: stack.to_string(),
            region: provider.get("region").map(str::to_string),
            timezone: ns.get("timezone").map(str::to_string),
            ecs_password,
            home_dir: home_dir.into(),
        };
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [("org", &self.org), ("project", &self.project), ("stack", &self.stack)] {
            if value.is_empty() || value.contains(char::is_whitespace) {
                return Err(ConfigError::InvalidConfig(format!(
                    "{} must be a non-empty name without whitespace, got '{}'",
                    key, value
                )));
            }
        }
        Ok(())
    }

    /// `{org}-{project}-{stack}`, the prefix of every resource name
    pub fn base_name(&self) -> String {
        format!("{}-{}-{}", self.org, self.project, self.stack)
    }

    pub fn security_group_name(&self) -> String {
        format!("{}-default", self.base_name())
    }

    /// Tags applied to every taggable resource
    pub fn tags(&self) -> Tags {
        [
            ("org", &self.org),
            ("project", &self.project),
            ("stack", &self.stack),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
    }

    pub fn cluster_enabled(&self) -> bool {
        self.region.as_deref() == Some(CLUSTER_REGION)
    }

    /// `{home}/.kube/config.ask.{stack}`
    pub fn kubeconfig_path(&self) -> PathBuf {
        self.home_dir
            .join(".kube")
            .join(format!("config.ask.{}", self.stack))
    }
}
