use std::fs::File;
use std::io::{self, BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use crate::detect::detect_path;
use crate::error::{Error, Result};
use crate::index::{ArchiveIndex, EntryKind, IndexEntry};
use crate::sanitize::{normalize_relative, sanitize_path};

/// Upper bound on buffer space reserved from a declared entry size.
const MAX_PREALLOC: u64 = 1 << 20;

/// Summary of one extraction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractReport {
    /// Files written. Directories are not counted.
    pub entry_count: usize,
    pub total_bytes: u64,
}

/// An opened zip archive together with its directory index.
pub struct Archive<R> {
    zip: zip::ZipArchive<R>,
    index: ArchiveIndex,
}

impl Archive<BufReader<File>> {
    /// Open the archive at `path`, checking its magic bytes first.
    pub fn open(path: &Path) -> Result<Self> {
        match detect_path(path)? {
            Some(format) if format.is_supported() => {}
            Some(other) => return Err(Error::UnsupportedFormat(other)),
            None => return Err(Error::UnknownFormat),
        }

        let file = File::open(path)?;
        let archive = Self::from_reader(BufReader::new(file))?;
        tracing::debug!(
            archive = %path.display(),
            entries = archive.index.len(),
            "indexed archive"
        );
        Ok(archive)
    }
}

impl<R: Read + Seek> Archive<R> {
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut zip = zip::ZipArchive::new(reader)?;
        let mut index = ArchiveIndex::new();

        for i in 0..zip.len() {
            let file = zip.by_index_raw(i)?;
            let name = file.name().to_owned();
            let path = file
                .enclosed_name()
                .and_then(|p| normalize_relative(&p.to_string_lossy()))
                .ok_or_else(|| Error::InvalidPath(name.clone()))?;

            if path.as_os_str().is_empty() {
                continue;
            }

            let kind = if file.is_dir() {
                EntryKind::Dir
            } else {
                EntryKind::File
            };
            index.insert(
                path,
                IndexEntry {
                    kind,
                    zip_index: Some(i),
                    size: file.size(),
                },
            );
        }

        Ok(Self { zip, index })
    }

    pub fn index(&self) -> &ArchiveIndex {
        &self.index
    }

    /// Read the full content of the file entry at `path`.
    pub fn read(&mut self, path: &Path) -> Result<Vec<u8>> {
        let entry = self
            .index
            .get(path)
            .ok_or_else(|| Error::EntryNotFound(path.to_path_buf()))?;

        let zip_index = match (entry.kind, entry.zip_index) {
            (EntryKind::File, Some(i)) => i,
            _ => return Err(Error::IsADirectory(path.to_path_buf())),
        };

        let mut file = self.zip.by_index(zip_index)?;
        let mut content = Vec::with_capacity(entry.size.min(MAX_PREALLOC) as usize);
        file.read_to_end(&mut content)?;
        Ok(content)
    }

    /// Write the entry at `path` to `destination`.
    ///
    /// A file entry becomes the file `destination`; a directory entry becomes
    /// the directory `destination` with its whole subtree below it.
    pub fn extract(&mut self, path: &Path, destination: &Path) -> Result<ExtractReport> {
        let kind = self
            .index
            .kind(path)
            .ok_or_else(|| Error::EntryNotFound(path.to_path_buf()))?;

        let mut report = ExtractReport::default();

        match kind {
            EntryKind::File => {
                let entry = self.index.get(path).cloned();
                if let Some(IndexEntry {
                    zip_index: Some(i), ..
                }) = entry
                {
                    report.total_bytes += self.write_entry(i, destination)?;
                    report.entry_count += 1;
                }
            }
            EntryKind::Dir => {
                create_dir_all(destination)?;

                let pending: Vec<(PathBuf, IndexEntry)> = self
                    .index
                    .descendants(path)
                    .map(|(p, e)| (p.to_path_buf(), e.clone()))
                    .collect();

                for (entry_path, entry) in pending {
                    let relative = entry_path.strip_prefix(path).unwrap_or(&entry_path);
                    let target = sanitize_path(relative, destination)?;

                    match (entry.kind, entry.zip_index) {
                        (EntryKind::Dir, _) => create_dir_all(&target)?,
                        (EntryKind::File, Some(i)) => {
                            report.total_bytes += self.write_entry(i, &target)?;
                            report.entry_count += 1;
                        }
                        (EntryKind::File, None) => {}
                    }
                }
            }
        }

        tracing::debug!(
            entry = %path.display(),
            destination = %destination.display(),
            files = report.entry_count,
            bytes = report.total_bytes,
            "extracted archive entry"
        );
        Ok(report)
    }

    fn write_entry(&mut self, zip_index: usize, target: &Path) -> Result<u64> {
        let mut file = self.zip.by_index(zip_index)?;

        if let Some(parent) = target.parent() {
            create_dir_all(parent)?;
        }

        let mut out = File::create(target).map_err(|e| Error::ExtractionFailed {
            path: target.to_path_buf(),
            source: e,
        })?;
        let written = io::copy(&mut file, &mut out).map_err(|e| Error::ExtractionFailed {
            path: target.to_path_buf(),
            source: e,
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            if let Some(mode) = file.unix_mode() {
                // Keep the executable bits but never produce an unreadable file.
                let perms = std::fs::Permissions::from_mode((mode & 0o777) | 0o600);
                std::fs::set_permissions(target, perms).map_err(|e| {
                    Error::ExtractionFailed {
                        path: target.to_path_buf(),
                        source: e,
                    }
                })?;
            }
        }

        Ok(written)
    }
}

fn create_dir_all(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| Error::DirectoryCreationFailed {
        path: path.to_path_buf(),
        source: e,
    })
}
