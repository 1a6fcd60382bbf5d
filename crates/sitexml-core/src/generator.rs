//! The `site.xml` generation pipeline
//!
//! locate repository -> load metadata -> per archive (extract identity, resolve
//! category) -> build document -> write. The first error aborts the run before
//! anything is written.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::category::CategoryStrategy;
use crate::config::GeneratorOptions;
use crate::error::Result;
use crate::feature::{FeatureIdentity, FeatureIdentityExtractor};
use crate::metadata::{MetadataDocument, MetadataSource};
use crate::repository::{FeatureArchive, Repository};
use crate::site::{write_site_xml, SiteBuilder};

/// One archive with everything resolved for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureEntry {
    pub archive: FeatureArchive,
    pub identity: FeatureIdentity,
    pub category: Option<String>,
}

/// What a run found, before (or instead of) writing anything
#[derive(Debug, Clone)]
pub struct SitePlan {
    pub repository: PathBuf,
    pub metadata_source: MetadataSource,
    pub entries: Vec<FeatureEntry>,
    pub categories: Vec<String>,
    pub xml: String,
}

/// Result of a completed generation
#[derive(Debug, Clone)]
pub struct GenerateResult {
    pub output: Option<PathBuf>,
    pub plan: SitePlan,
}

pub struct SiteGenerator {
    options: GeneratorOptions,
    extractor: Box<dyn FeatureIdentityExtractor>,
}

impl SiteGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        let extractor = options.extractor.extractor();
        Self { options, extractor }
    }

    /// Use a custom extractor instead of the one selected by the options
    pub fn with_extractor(
        options: GeneratorOptions,
        extractor: Box<dyn FeatureIdentityExtractor>,
    ) -> Self {
        Self { options, extractor }
    }

    /// Resolve every feature and render the document without touching disk
    pub fn plan(&self) -> Result<SitePlan> {
        info!(repository = %self.options.repository.display(), "Looking at repository");
        let repository = Repository::open(&self.options.repository)?;

        // Metadata only matters when categories are inferred
        let metadata = match &self.options.category {
            CategoryStrategy::Fixed(_) => MetadataDocument::empty(),
            CategoryStrategy::Inferred => MetadataDocument::load(repository.root())?,
        };

        let mut builder = SiteBuilder::new();
        if let Some(name) = self.options.category.fixed_name() {
            builder.add_explicit_category(name);
        }

        let mut entries = Vec::new();
        for archive in repository.archives()? {
            let identity = self.extractor.extract(&archive)?;
            let category = self.options.category.category_for(&metadata, &identity.id);
            debug!(
                url = %archive.url,
                id = %identity.id,
                version = %identity.version,
                category = category.as_deref().unwrap_or("-"),
                "Adding feature"
            );

            builder.add_feature(&identity, &archive.url, category.as_deref());
            entries.push(FeatureEntry {
                archive,
                identity,
                category,
            });
        }

        Ok(SitePlan {
            repository: repository.root().to_path_buf(),
            metadata_source: metadata.source(),
            categories: builder.categories().into_iter().map(String::from).collect(),
            xml: builder.to_xml()?,
            entries,
        })
    }

    /// Run the pipeline and write `site.xml` into the repository root
    pub fn generate(&self) -> Result<GenerateResult> {
        let plan = self.plan()?;
        let output = write_site_xml(&plan.repository, &plan.xml)?;
        info!(
            path = %output.display(),
            features = plan.entries.len(),
            categories = plan.categories.len(),
            "Wrote site.xml contents"
        );

        Ok(GenerateResult {
            output: Some(output),
            plan,
        })
    }

    /// Render only; nothing is written
    pub fn dry_run(&self) -> Result<GenerateResult> {
        Ok(GenerateResult {
            output: None,
            plan: self.plan()?,
        })
    }
}
