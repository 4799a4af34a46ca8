use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found")]
    ConfigDirNotFound,

    #[error(
        "Stack file for '{0}' not found. Looked in:\n\
        - SKYFORM_CONFIG_PATH\n\
        - current directory: skyform.{0}.local.kdl, skyform.{0}.kdl\n\
        - ./.skyform/ directory\n\
        - ~/.config/skyform/skyform.{0}.kdl"
    )]
    StackFileNotFound(String),

    #[error("KDL parse error: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Missing required configuration value '{0}'")]
    MissingKey(String),

    #[error("Configuration value '{0}' is a secret; read it with get_secret")]
    SecretAsPlain(String),

    #[error("Invalid secure value for '{key}': {reason}")]
    InvalidSecret { key: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
