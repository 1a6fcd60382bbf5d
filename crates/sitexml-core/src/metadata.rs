use std::fmt;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::archive::ArchiveReader;
use crate::error::{Result, SiteXmlError};
use crate::xml::Document;

const CONTENT_XML: &str = "content.xml";
const CONTENT_JAR: &str = "content.jar";

/// Where the repository metadata came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataSource {
    ContentXml,
    ContentJar,
    Empty,
}

impl fmt::Display for MetadataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContentXml => write!(f, "{}", CONTENT_XML),
            Self::ContentJar => write!(f, "{}", CONTENT_JAR),
            Self::Empty => write!(f, "none"),
        }
    }
}

/// The repository's unit metadata (`content.xml`), read-only once loaded
#[derive(Debug, Clone)]
pub struct MetadataDocument {
    document: Document,
    source: MetadataSource,
}

impl MetadataDocument {
    /// Load `content.xml`, else the first entry of `content.jar`, else an empty document
    pub fn load(root: &Path) -> Result<Self> {
        let xml_path = root.join(CONTENT_XML);
        if xml_path.is_file() {
            let bytes = fs::read(&xml_path).map_err(|e| SiteXmlError::metadata(&xml_path, e))?;
            let document =
                Document::parse(&bytes).map_err(|e| SiteXmlError::metadata(&xml_path, e))?;
            debug!(path = %xml_path.display(), "Loaded repository metadata");
            return Ok(Self {
                document,
                source: MetadataSource::ContentXml,
            });
        }

        let jar_path = root.join(CONTENT_JAR);
        if jar_path.is_file() {
            let mut archive =
                ArchiveReader::open(&jar_path).map_err(|e| SiteXmlError::metadata(&jar_path, e))?;
            let bytes = archive
                .first_entry()
                .map_err(|e| SiteXmlError::metadata(&jar_path, e))?
                .ok_or_else(|| SiteXmlError::metadata(&jar_path, "archive has no entries"))?;
            let document =
                Document::parse(&bytes).map_err(|e| SiteXmlError::metadata(&jar_path, e))?;
            debug!(path = %jar_path.display(), "Loaded repository metadata");
            return Ok(Self {
                document,
                source: MetadataSource::ContentJar,
            });
        }

        debug!("No repository metadata found; categories will not be inferred");
        Ok(Self::empty())
    }

    pub fn empty() -> Self {
        Self {
            document: Document::empty(),
            source: MetadataSource::Empty,
        }
    }

    pub fn from_document(document: Document, source: MetadataSource) -> Self {
        Self { document, source }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn source(&self) -> MetadataSource {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::testing::write_jar;
    use tempfile::TempDir;

    const CONTENT: &str = r#"<?xml version='1.0' encoding='UTF-8'?>
<repository name='test' type='org.eclipse.equinox.internal.p2.metadata.repository.LocalMetadataRepository' version='1'>
  <units size='1'>
    <unit id='tools.category' version='1.0.0'/>
  </units>
</repository>"#;

    fn unit_id(metadata: &MetadataDocument) -> Option<String> {
        metadata
            .document()
            .select("repository/units/unit", None)
            .first()
            .and_then(|m| m.element.attribute("id"))
            .map(str::to_string)
    }

    #[test]
    fn load_prefers_content_xml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONTENT_XML), CONTENT).unwrap();
        write_jar(&tmp.path().join(CONTENT_JAR), &[("content.xml", "<broken")]);

        let metadata = MetadataDocument::load(tmp.path()).unwrap();
        assert_eq!(metadata.source(), MetadataSource::ContentXml);
        assert_eq!(unit_id(&metadata).as_deref(), Some("tools.category"));
    }

    #[test]
    fn load_falls_back_to_first_jar_entry() {
        let tmp = TempDir::new().unwrap();
        write_jar(
            &tmp.path().join(CONTENT_JAR),
            &[("renamed.xml", CONTENT), ("content.xml", "<broken")],
        );

        let metadata = MetadataDocument::load(tmp.path()).unwrap();
        assert_eq!(metadata.source(), MetadataSource::ContentJar);
        assert_eq!(unit_id(&metadata).as_deref(), Some("tools.category"));
    }

    #[test]
    fn load_without_metadata_is_empty() {
        let tmp = TempDir::new().unwrap();
        let metadata = MetadataDocument::load(tmp.path()).unwrap();
        assert_eq!(metadata.source(), MetadataSource::Empty);
        assert!(metadata.document().is_empty());
        assert!(unit_id(&metadata).is_none());
    }

    #[test]
    fn load_ignores_content_xml_directory() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join(CONTENT_XML)).unwrap();
        let metadata = MetadataDocument::load(tmp.path()).unwrap();
        assert_eq!(metadata.source(), MetadataSource::Empty);
    }

    #[test]
    fn load_unparsable_content_xml_is_fatal() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONTENT_XML), "<repository><units>").unwrap();
        let err = MetadataDocument::load(tmp.path()).unwrap_err();
        assert!(matches!(err, SiteXmlError::Metadata { .. }));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn load_corrupt_content_jar_is_fatal() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONTENT_JAR), "not a zip").unwrap();
        let err = MetadataDocument::load(tmp.path()).unwrap_err();
        assert!(matches!(err, SiteXmlError::Metadata { .. }));
    }

    #[test]
    fn load_empty_content_jar_is_fatal() {
        let tmp = TempDir::new().unwrap();
        write_jar(&tmp.path().join(CONTENT_JAR), &[]);
        let err = MetadataDocument::load(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("archive has no entries"));
    }
}
