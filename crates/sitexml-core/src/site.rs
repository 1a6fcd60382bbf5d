use std::collections::HashSet;
use std::fs::{self, Permissions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{Result, SiteXmlError};
use crate::feature::FeatureIdentity;
use crate::xml::{render, Element};

pub const SITE_XML: &str = "site.xml";

/// Accumulates the `site.xml` tree for one run
#[derive(Debug)]
pub struct SiteBuilder {
    root: Element,
    defined: HashSet<String>,
}

impl Default for SiteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteBuilder {
    pub fn new() -> Self {
        Self {
            root: Element::new("site"),
            defined: HashSet::new(),
        }
    }

    /// Emit the run-wide category definition up front
    pub fn add_explicit_category(&mut self, name: &str) {
        self.define_category(name);
    }

    pub fn add_feature(&mut self, identity: &FeatureIdentity, url: &str, category: Option<&str>) {
        if let Some(name) = category {
            self.define_category(name);
        }

        let feature = self.root.push_child(
            Element::new("feature")
                .with_attribute("url", url)
                .with_attribute("id", &identity.id)
                .with_attribute("version", &identity.version),
        );
        if let Some(name) = category {
            feature.push_child(Element::new("category").with_attribute("name", name));
        }
    }

    /// Category names defined so far, in emission order
    pub fn categories(&self) -> Vec<&str> {
        self.root
            .children()
            .iter()
            .filter(|e| e.name() == "category-def")
            .filter_map(|e| e.attribute("name"))
            .collect()
    }

    pub fn to_xml(&self) -> Result<String> {
        Ok(render(&self.root)?)
    }

    fn define_category(&mut self, name: &str) {
        if !self.defined.insert(name.to_string()) {
            return;
        }
        self.root.push_child(
            Element::new("category-def")
                .with_attribute("name", name)
                .with_attribute("label", name),
        );
    }
}

/// Write `<root>/site.xml`, replacing any previous file atomically.
///
/// A replaced file keeps its permissions; a new one is created world-readable.
pub fn write_site_xml(root: &Path, xml: &str) -> Result<PathBuf> {
    let output = root.join(SITE_XML);
    let write_error = |source: std::io::Error| SiteXmlError::Write {
        path: output.clone(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(root).map_err(write_error)?;
    tmp.write_all(xml.as_bytes()).map_err(write_error)?;
    tmp.flush().map_err(write_error)?;
    if let Some(permissions) = target_permissions(&output) {
        tmp.as_file()
            .set_permissions(permissions)
            .map_err(write_error)?;
    }
    tmp.persist(&output).map_err(|e| write_error(e.error))?;

    Ok(output)
}

fn target_permissions(output: &Path) -> Option<Permissions> {
    match fs::metadata(output) {
        Ok(existing) => Some(existing.permissions()),
        Err(_) => new_file_permissions(),
    }
}

#[cfg(unix)]
fn new_file_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<Permissions> {
    None
}
