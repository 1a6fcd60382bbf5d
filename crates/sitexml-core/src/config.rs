use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::category::CategoryStrategy;
use crate::error::{Result, SiteXmlError};
use crate::feature::ExtractionMode;

pub const CONFIG_FILE: &str = "p2-sitexml.toml";
pub const DEFAULT_REPOSITORY: &str = "target/repository";

/// Default config template with rich comments
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# p2-sitexml configuration file

[site]
# p2 repository containing the features/ directory
# Default: "target/repository"
repository = "target/repository"

# Category applied to every feature. Leave empty to infer categories
# from the repository's content.xml / content.jar.
# Example: category = "My Features"
category = ""

# How feature id/version are read from each archive
#   "metadata" - the feature.xml packaged inside the jar (default)
#   "filename" - the <id>_<version>.jar file name
extractor = "metadata"
"#;

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
}

/// Site generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Repository directory
    #[serde(default = "default_repository")]
    pub repository: PathBuf,

    /// Category override (empty = infer)
    #[serde(default)]
    pub category: String,

    /// Feature identity extraction strategy
    #[serde(default)]
    pub extractor: ExtractionMode,
}

fn default_repository() -> PathBuf {
    PathBuf::from(DEFAULT_REPOSITORY)
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            repository: default_repository(),
            category: String::new(),
            extractor: ExtractionMode::default(),
        }
    }
}

/// Plain values the generator runs with
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    pub repository: PathBuf,
    pub category: CategoryStrategy,
    pub extractor: ExtractionMode,
}

impl Config {
    /// Load config from an explicit file; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| SiteXmlError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(config)
    }

    /// Save config to the given file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| SiteXmlError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Config file path in `dir`
    pub fn path(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE)
    }

    /// Write the commented default template unless the file already exists
    pub fn init(path: &Path) -> Result<PathBuf> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        if !path.exists() {
            fs::write(path, DEFAULT_CONFIG_TEMPLATE)?;
        }

        Ok(path.to_path_buf())
    }

    /// Get a config value by dot-notation key
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "site.repository" => Some(self.site.repository.display().to_string()),
            "site.category" => Some(self.site.category.clone()),
            "site.extractor" => Some(self.site.extractor.to_string()),
            _ => None,
        }
    }

    /// Set a config value by dot-notation key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "site.repository" => {
                if value.trim().is_empty() {
                    return Err(SiteXmlError::InvalidConfigValue {
                        key: key.to_string(),
                        value: value.to_string(),
                    });
                }
                self.site.repository = PathBuf::from(value.trim());
            }
            "site.category" => self.site.category = value.to_string(),
            "site.extractor" => self.site.extractor = value.parse()?,
            _ => {
                return Err(SiteXmlError::ConfigKeyNotFound {
                    key: key.to_string(),
                })
            }
        }
        Ok(())
    }

    /// List all config keys with their current values
    pub fn list(&self) -> Vec<(String, String)> {
        ["site.repository", "site.category", "site.extractor"]
            .iter()
            .filter_map(|key| self.get(key).map(|value| (key.to_string(), value)))
            .collect()
    }

    pub fn to_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            repository: self.site.repository.clone(),
            category: CategoryStrategy::from_override(Some(self.site.category.as_str())),
            extractor: self.site.extractor,
        }
    }
}
