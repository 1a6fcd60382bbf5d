//! Sequential reader over packaged archives (`.jar` is a zip container).

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use thiserror::Error;
use zip::result::ZipError;
use zip::ZipArchive;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("{0}")]
    Zip(#[from] ZipError),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// An opened archive. The file handle is released when the reader is dropped.
pub struct ArchiveReader {
    archive: ZipArchive<BufReader<File>>,
}

impl ArchiveReader {
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        let file = File::open(path)?;
        let archive = ZipArchive::new(BufReader::new(file))?;
        Ok(Self { archive })
    }

    pub fn is_empty(&self) -> bool {
        self.archive.len() == 0
    }

    /// Contents of the first entry, whatever its name
    pub fn first_entry(&mut self) -> Result<Option<Vec<u8>>, ArchiveError> {
        if self.is_empty() {
            return Ok(None);
        }
        let entry = self.archive.by_index(0)?;
        let size = entry.size();
        Ok(Some(read_entry(entry, size)?))
    }

    /// Scan entries in archive order and return the contents of the first one named `name`
    pub fn find_entry(&mut self, name: &str) -> Result<Option<Vec<u8>>, ArchiveError> {
        for index in 0..self.archive.len() {
            let entry = self.archive.by_index(index)?;
            if entry.name() != name {
                continue;
            }
            let size = entry.size();
            return Ok(Some(read_entry(entry, size)?));
        }
        Ok(None)
    }
}

/// Upper bound for preallocation; the declared size comes from the archive header
const PREALLOC_LIMIT: u64 = 1 << 20;

fn read_entry(mut entry: impl Read, declared_size: u64) -> Result<Vec<u8>, ArchiveError> {
    let mut bytes = Vec::with_capacity(declared_size.min(PREALLOC_LIMIT) as usize);
    entry.read_to_end(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::fs::File;
    use std::io::Write;
    use std::path::Path;

    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// Write a zip archive with the given entries, in order
    pub fn write_jar(path: &Path, entries: &[(&str, &str)]) {
        let entries: Vec<(&str, &[u8])> = entries
            .iter()
            .map(|(name, content)| (*name, content.as_bytes()))
            .collect();
        write_jar_bytes(path, &entries);
    }

    pub fn write_jar_bytes(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        for (name, content) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content).unwrap();
        }
        zip.finish().unwrap();
    }

    pub fn feature_xml(id: &str, version: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<feature id="{id}" label="{id}" version="{version}" provider-name="Test">
  <plugin id="{id}.core" version="{version}"/>
</feature>"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::testing::write_jar;
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn first_entry_ignores_name() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("content.jar");
        write_jar(&path, &[("whatever.xml", "first"), ("content.xml", "second")]);

        let mut reader = ArchiveReader::open(&path).unwrap();
        assert_eq!(reader.first_entry().unwrap().unwrap(), b"first");
    }

    #[test]
    fn find_entry_scans_until_exact_name() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.jar");
        write_jar(
            &path,
            &[
                ("META-INF/MANIFEST.MF", "Manifest-Version: 1.0"),
                ("nested/feature.xml", "nested"),
                ("feature.xml", "top"),
            ],
        );

        let mut reader = ArchiveReader::open(&path).unwrap();
        assert_eq!(reader.find_entry("feature.xml").unwrap().unwrap(), b"top");
        assert!(reader.find_entry("missing.xml").unwrap().is_none());
    }

    #[test]
    fn empty_archive_has_no_first_entry() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("empty.jar");
        write_jar(&path, &[]);

        let mut reader = ArchiveReader::open(&path).unwrap();
        assert!(reader.is_empty());
        assert!(reader.first_entry().unwrap().is_none());
    }

    #[test]
    fn oversized_header_does_not_drive_allocation() {
        let declared = u64::MAX;
        let bytes = read_entry(&b"tiny"[..], declared).unwrap();
        assert_eq!(bytes, b"tiny");
        assert!(bytes.capacity() <= PREALLOC_LIMIT as usize);
    }

    #[test]
    fn open_rejects_non_zip_files() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.jar");
        std::fs::write(&path, "not a zip").unwrap();

        assert!(matches!(
            ArchiveReader::open(&path),
            Err(ArchiveError::Zip(_))
        ));
    }
}
