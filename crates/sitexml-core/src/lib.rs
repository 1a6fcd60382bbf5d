pub mod archive;
pub mod category;
pub mod config;
pub mod error;
pub mod feature;
pub mod generator;
pub mod metadata;
pub mod repository;
pub mod site;
pub mod xml;

pub use category::{resolve_category, CategoryStrategy};
pub use config::{Config, GeneratorOptions, SiteConfig, CONFIG_FILE, DEFAULT_REPOSITORY};
pub use error::{Result, SiteXmlError};
pub use feature::{
    ExtractionMode, FeatureIdentity, FeatureIdentityExtractor, FilenameExtractor,
    MetadataExtractor,
};
pub use generator::{FeatureEntry, GenerateResult, SiteGenerator, SitePlan};
pub use metadata::{MetadataDocument, MetadataSource};
pub use repository::{FeatureArchive, Repository};
pub use site::{write_site_xml, SiteBuilder, SITE_XML};
