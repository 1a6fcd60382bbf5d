//! Feature identity extraction
//!
//! A feature archive's `id` and `version` come either from the `feature.xml`
//! packaged inside it, or from its file name (`<id>_<version>.jar`). Both
//! strategies fail hard: a feature without a readable identity aborts the run.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::archive::ArchiveReader;
use crate::error::{Result, SiteXmlError};
use crate::repository::FeatureArchive;
use crate::xml::Document;

const FEATURE_XML: &str = "feature.xml";

static FILENAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^_]+)_(.+)\.[^.]+$").expect("valid feature filename regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureIdentity {
    pub id: String,
    pub version: String,
}

pub trait FeatureIdentityExtractor {
    fn extract(&self, archive: &FeatureArchive) -> Result<FeatureIdentity>;
}

/// Reads `id`/`version` off the root element of the packaged `feature.xml`
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataExtractor;

impl FeatureIdentityExtractor for MetadataExtractor {
    fn extract(&self, archive: &FeatureArchive) -> Result<FeatureIdentity> {
        let path = &archive.path;
        let mut reader =
            ArchiveReader::open(path).map_err(|e| SiteXmlError::feature_format(path, e))?;
        let bytes = reader
            .find_entry(FEATURE_XML)
            .map_err(|e| SiteXmlError::feature_format(path, e))?
            .ok_or_else(|| {
                SiteXmlError::feature_format(path, format!("no {} entry found", FEATURE_XML))
            })?;

        let document = Document::parse(&bytes).map_err(|e| {
            SiteXmlError::feature_format(path, format!("unreadable {}: {}", FEATURE_XML, e))
        })?;
        let root = document.root().ok_or_else(|| {
            SiteXmlError::feature_format(path, format!("empty {}", FEATURE_XML))
        })?;

        let attr = |name: &str| -> Result<String> {
            match root.attribute(name) {
                Some(value) if !value.is_empty() => Ok(value.to_string()),
                _ => Err(SiteXmlError::feature_format(
                    path,
                    format!("{} has no '{}' attribute", FEATURE_XML, name),
                )),
            }
        };

        Ok(FeatureIdentity {
            id: attr("id")?,
            version: attr("version")?,
        })
    }
}

/// Parses `<id>_<version>.<ext>` where `id` has no underscore
#[derive(Debug, Clone, Copy, Default)]
pub struct FilenameExtractor;

impl FeatureIdentityExtractor for FilenameExtractor {
    fn extract(&self, archive: &FeatureArchive) -> Result<FeatureIdentity> {
        parse_file_name(archive.file_name()).ok_or_else(|| {
            SiteXmlError::feature_format(
                &archive.path,
                "file name does not match <id>_<version>.jar",
            )
        })
    }
}

pub fn parse_file_name(file_name: &str) -> Option<FeatureIdentity> {
    let captures = FILENAME_PATTERN.captures(file_name)?;
    Some(FeatureIdentity {
        id: captures[1].to_string(),
        version: captures[2].to_string(),
    })
}

/// Which extraction strategy a run uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    #[default]
    Metadata,
    Filename,
}

impl ExtractionMode {
    pub fn extractor(self) -> Box<dyn FeatureIdentityExtractor> {
        match self {
            Self::Metadata => Box::new(MetadataExtractor),
            Self::Filename => Box::new(FilenameExtractor),
        }
    }
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metadata => write!(f, "metadata"),
            Self::Filename => write!(f, "filename"),
        }
    }
}

impl FromStr for ExtractionMode {
    type Err = SiteXmlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "metadata" => Ok(Self::Metadata),
            "filename" => Ok(Self::Filename),
            _ => Err(SiteXmlError::InvalidConfigValue {
                key: "site.extractor".to_string(),
                value: s.to_string(),
            }),
        }
    }
}
