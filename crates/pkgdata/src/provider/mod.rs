//! Resource providers: the package file trees resources are resolved against.
//!
//! A provider answers questions about paths relative to its root. Paths are
//! always normalized and relative; the empty path is the root itself.

use std::fmt;
use std::path::{Path, PathBuf};

pub use pkgdata_archive::EntryKind;

use crate::{Error, Result};

mod archive;
mod dir;

pub use archive::ZipProvider;
pub use dir::DirProvider;

/// An immediate child of a directory resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Child {
    pub name: String,
    pub kind: EntryKind,
}

pub trait Provider: Send + Sync + fmt::Debug {
    /// Location identifying this tree. Part of every resource identity.
    fn origin(&self) -> &Path;

    /// Kind of the entry at `path`, or `None` if nothing is there.
    fn kind(&self, path: &Path) -> Option<EntryKind>;

    fn children(&self, path: &Path) -> Result<Vec<Child>>;

    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Real filesystem path of `path`, for trees that live on disk.
    ///
    /// Returning `Some` means the resource never needs extracting.
    fn local_path(&self, _path: &Path) -> Option<PathBuf> {
        None
    }

    /// Write the file or directory at `path` to `destination`.
    fn extract(&self, path: &Path, destination: &Path) -> Result<()>;
}

pub(crate) fn not_found(provider: &dyn Provider, path: &Path) -> Error {
    Error::NotFound {
        origin: provider.origin().to_path_buf(),
        path: path.to_path_buf(),
    }
}
