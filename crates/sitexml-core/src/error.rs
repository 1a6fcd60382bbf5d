use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SiteXmlError {
    #[error("{message}: {path}")]
    Configuration { message: String, path: PathBuf },

    #[error("Unable to read repository metadata {path}: {message}")]
    Metadata { path: PathBuf, message: String },

    #[error("Invalid feature archive {path}: {message}")]
    FeatureFormat { path: PathBuf, message: String },

    #[error("Error writing site.xml file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Unknown config key: {key}")]
    ConfigKeyNotFound { key: String },

    #[error("Invalid value for {key}: '{value}'")]
    InvalidConfigValue { key: String, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SiteXmlError>;

impl SiteXmlError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration { .. } => 2,
            Self::Metadata { .. } => 3,
            Self::FeatureFormat { .. } => 4,
            Self::Write { .. } => 5,
            Self::ConfigParse { .. }
            | Self::ConfigKeyNotFound { .. }
            | Self::InvalidConfigValue { .. } => 6,
            Self::Io(_) => 1,
        }
    }

    pub(crate) fn configuration(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::Configuration {
            message: message.into(),
            path: path.into(),
        }
    }

    pub(crate) fn metadata(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Metadata {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn feature_format(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::FeatureFormat {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
