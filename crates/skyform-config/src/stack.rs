//! Stack configuration values
//!
//! Keys are namespaced the way providers expect them: `koderover:org`,
//! `alicloud:region`. In KDL a namespace is a `config` node:
//!
//! ```kdl
//! project "zadig-infra"
//!
//! config "koderover" {
//!     org "acme"
//!     project "zadig"
//!     zadig-ecs-passwd secure="UGFzc3cwcmQh"
//! }
//!
//! config "alicloud" {
//!     region "cn-wulanchabu"
//! }
//! ```
//!
//! `secure=` values are base64 and load as [`Secret`]s.

use crate::error::{ConfigError, Result};
use base64::Engine;
use kdl::{KdlDocument, KdlEntry, KdlNode};
use skyform_cloud::Secret;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Plain(String),
    Secret(Secret),
}

impl ConfigValue {
    pub fn is_secret(&self) -> bool {
        matches!(self, ConfigValue::Secret(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct StackConfig {
    project: Option<String>,
    values: BTreeMap<String, ConfigValue>,
}

impl StackConfig {
    pub fn parse(content: &str) -> Result<Self> {
        let doc: KdlDocument = content.parse()?;
        let mut config = StackConfig::default();

        for node in doc.nodes() {
            match node.name().value() {
                "project" => {
                    config.project = node
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_string())
                        .map(|s| s.to_string());
                }
                "config" => parse_namespace(node, &mut config.values)?,
                _ => {
                    // unknown top-level nodes are ignored
                }
            }
        }

        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Loading stack config");
        Self::parse(&content)
    }

    /// Values from `other` win
    pub fn merge(&mut self, other: StackConfig) {
        if other.project.is_some() {
            self.project = other.project;
        }
        self.values.extend(other.values);
    }

    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    pub fn namespace<'a>(&'a self, name: &'a str) -> Namespace<'a> {
        Namespace { name, config: self }
    }

    /// Fully qualified keys with their values, sorted by key
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn parse_namespace(node: &KdlNode, values: &mut BTreeMap<String, ConfigValue>) -> Result<()> {
    let namespace = node
        .entries()
        .first()
        .and_then(|e| e.value().as_string())
        .ok_or_else(|| ConfigError::InvalidConfig("config requires a namespace".to_string()))?;

    if let Some(children) = node.children() {
        for child in children.nodes() {
            let key = format!("{}:{}", namespace, child.name().value());
            let entry = child.entries().first().ok_or_else(|| {
                ConfigError::InvalidConfig(format!("config key '{}' has no value", key))
            })?;
            let value = parse_value(&key, entry)?;
            values.insert(key, value);
        }
    }

    Ok(())
}

fn parse_value(key: &str, entry: &KdlEntry) -> Result<ConfigValue> {
    let text = if let Some(s) = entry.value().as_string() {
        s.to_string()
    } else if let Some(i) = entry.value().as_integer() {
        i.to_string()
    } else if let Some(b) = entry.value().as_bool() {
        b.to_string()
    } else {
        return Err(ConfigError::InvalidConfig(format!(
            "config key '{}' must be a string, integer or boolean",
            key
        )));
    };

    match entry.name().map(|n| n.value()) {
        None => Ok(ConfigValue::Plain(text)),
        Some("secure") => decode_secure(key, &text).map(ConfigValue::Secret),
        Some(other) => Err(ConfigError::InvalidConfig(format!(
            "unknown property '{}' on config key '{}'",
            other, key
        ))),
    }
}

fn decode_secure(key: &str, encoded: &str) -> Result<Secret> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| ConfigError::InvalidSecret {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
    let value = String::from_utf8(bytes).map_err(|_| ConfigError::InvalidSecret {
        key: key.to_string(),
        reason: "not valid UTF-8".to_string(),
    })?;
    Ok(Secret::new(value))
}

/// Values of one namespace (`koderover`, `alicloud`, ...)
#[derive(Debug, Clone, Copy)]
pub struct Namespace<'a> {
    name: &'a str,
    config: &'a StackConfig,
}

impl<'a> Namespace<'a> {
    fn full_key(&self, key: &str) -> String {
        format!("{}:{}", self.name, key)
    }

    /// A plain value. Secrets are never returned here.
    pub fn get(&self, key: &str) -> Option<&'a str> {
        match self.config.values.get(&self.full_key(key)) {
            Some(ConfigValue::Plain(v)) => Some(v.as_str()),
            Some(ConfigValue::Secret(_)) => {
                tracing::warn!(key = %self.full_key(key), "Secret config value read as plain; ignoring");
                None
            }
            None => None,
        }
    }

    pub fn require(&self, key: &str) -> Result<&'a str> {
        let full_key = self.full_key(key);
        match self.config.values.get(&full_key) {
            Some(ConfigValue::Plain(v)) => Ok(v.as_str()),
            Some(ConfigValue::Secret(_)) => Err(ConfigError::SecretAsPlain(full_key)),
            None => Err(ConfigError::MissingKey(full_key)),
        }
    }

    /// A value as a secret; plain values are wrapped
    pub fn get_secret(&self, key: &str) -> Option<Secret> {
        match self.config.values.get(&self.full_key(key))? {
            ConfigValue::Plain(v) => Some(Secret::new(v.clone())),
            ConfigValue::Secret(s) => Some(s.clone()),
        }
    }

    pub fn require_secret(&self, key: &str) -> Result<Secret> {
        self.get_secret(key)
            .ok_or_else(|| ConfigError::MissingKey(self.full_key(key)))
    }
}
