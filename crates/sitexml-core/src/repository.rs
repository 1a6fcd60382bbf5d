use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Result, SiteXmlError};

pub const FEATURES_DIR: &str = "features";
const ARCHIVE_EXTENSION: &str = "jar";

/// A validated p2 repository directory
#[derive(Debug, Clone)]
pub struct Repository {
    root: PathBuf,
    features: PathBuf,
}

/// A packaged feature found under `features/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureArchive {
    /// Absolute (or root-joined) path on disk
    pub path: PathBuf,
    /// Path relative to the repository root, always `/`-separated
    pub url: String,
}

impl FeatureArchive {
    pub fn file_name(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or(&self.url)
    }
}

impl Repository {
    pub fn open(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(SiteXmlError::configuration(
                "Repository directory does not exist",
                root,
            ));
        }

        let features = root.join(FEATURES_DIR);
        if !features.is_dir() {
            return Err(SiteXmlError::configuration(
                "Unable to find features directory",
                features,
            ));
        }

        Ok(Self {
            root: root.to_path_buf(),
            features,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Feature archives directly under `features/`, sorted by file name
    pub fn archives(&self) -> Result<Vec<FeatureArchive>> {
        let mut archives = Vec::new();

        for entry in WalkDir::new(&self.features)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| match e.into_io_error() {
                Some(io) => SiteXmlError::Io(io),
                None => SiteXmlError::configuration(
                    "Unable to list features directory",
                    &self.features,
                ),
            })?;

            if !entry.path().is_file() || !is_archive(entry.path()) {
                continue;
            }

            let relative = match entry.path().strip_prefix(&self.root) {
                Ok(r) => r,
                Err(_) => continue,
            };
            archives.push(FeatureArchive {
                path: entry.path().to_path_buf(),
                url: to_url(relative),
            });
        }

        Ok(archives)
    }
}

fn is_archive(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
}

fn to_url(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
