use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use pkgdata_archive::Archive;

use super::{Child, EntryKind, Provider, not_found};
use crate::{Error, Result};

/// A package tree packed inside a zip archive.
///
/// The central directory is indexed once when the provider is opened; entry
/// contents are decompressed on demand.
pub struct ZipProvider {
    origin: PathBuf,
    base: PathBuf,
    archive: Mutex<Archive<BufReader<File>>>,
}

impl ZipProvider {
    /// Treat the whole archive as the package tree.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let archive = Archive::open(&path)?;
        Ok(Self {
            origin: path,
            base: PathBuf::new(),
            archive: Mutex::new(archive),
        })
    }

    /// Open the archive for `package`.
    ///
    /// When the archive holds a top-level directory named after the package,
    /// that directory is the root; otherwise the archive root is.
    pub fn open_package(path: impl Into<PathBuf>, package: &str) -> Result<Self> {
        let path = path.into();
        let archive = Archive::open(&path)?;

        let (origin, base) = if archive.index().kind(Path::new(package)) == Some(EntryKind::Dir) {
            (path.join(package), PathBuf::from(package))
        } else {
            (path, PathBuf::new())
        };

        Ok(Self {
            origin,
            base,
            archive: Mutex::new(archive),
        })
    }

    fn entry(&self, path: &Path) -> PathBuf {
        self.base.join(path)
    }

    fn archive(&self) -> MutexGuard<'_, Archive<BufReader<File>>> {
        self.archive.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn convert_err(&self, path: &Path, err: pkgdata_archive::Error) -> Error {
        use pkgdata_archive::Error as ArchiveError;

        match err {
            ArchiveError::EntryNotFound(_) => not_found(self, path),
            ArchiveError::IsADirectory(_) => Error::IsADirectory(self.origin.join(path)),
            ArchiveError::ExtractionFailed { path, source }
            | ArchiveError::DirectoryCreationFailed { path, source } => {
                Error::Extraction { path, source }
            }
            other => Error::Archive(other),
        }
    }
}

impl fmt::Debug for ZipProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZipProvider")
            .field("origin", &self.origin)
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

impl Provider for ZipProvider {
    fn origin(&self) -> &Path {
        &self.origin
    }

    fn kind(&self, path: &Path) -> Option<EntryKind> {
        self.archive().index().kind(&self.entry(path))
    }

    fn children(&self, path: &Path) -> Result<Vec<Child>> {
        let entry = self.entry(path);
        let archive = self.archive();
        let index = archive.index();

        match index.kind(&entry) {
            None => return Err(not_found(self, path)),
            Some(EntryKind::File) => return Err(Error::NotADirectory(self.origin.join(path))),
            Some(EntryKind::Dir) => {}
        }

        let mut children: Vec<Child> = index
            .children(&entry)
            .filter_map(|(p, e)| {
                let name = p.file_name()?.to_string_lossy().into_owned();
                Some(Child { name, kind: e.kind })
            })
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let entry = self.entry(path);
        let result = self.archive().read(&entry);
        result.map_err(|e| self.convert_err(path, e))
    }

    fn extract(&self, path: &Path, destination: &Path) -> Result<()> {
        let entry = self.entry(path);
        let result = self.archive().extract(&entry, destination);
        result.map(drop).map_err(|e| self.convert_err(path, e))
    }
}
