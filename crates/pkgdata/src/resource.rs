use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pkgdata_archive::normalize_relative;

use crate::provider::{EntryKind, Provider, not_found};
use crate::{Error, Result};

/// Identity of a resolved resource: the tree it belongs to plus its
/// normalized path inside that tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceId {
    pub origin: PathBuf,
    /// `None` when the path climbed above the tree root.
    pub path: Option<PathBuf>,
}

/// A path inside a package tree.
///
/// Joining never fails and never touches the provider; a path that does not
/// exist only surfaces as [`Error::NotFound`] once it is read, listed or
/// materialized.
#[derive(Clone)]
pub struct Resource {
    provider: Arc<dyn Provider>,
    path: Option<PathBuf>,
}

impl Resource {
    /// The root of `provider`'s tree.
    pub fn root(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            path: Some(PathBuf::new()),
        }
    }

    /// Descend by `/`-separated segments.
    pub fn joinpath(&self, segment: &str) -> Self {
        let path = self.path.as_ref().and_then(|current| {
            let joined = format!("{}/{}", current.to_string_lossy(), segment);
            normalize_relative(&joined)
        });
        Self {
            provider: Arc::clone(&self.provider),
            path,
        }
    }

    pub fn join(&self, segments: &[&str]) -> Self {
        segments
            .iter()
            .fold(self.clone(), |resource, segment| resource.joinpath(segment))
    }

    /// Final path component; the tree's own name for the root.
    pub fn name(&self) -> String {
        let name = match &self.path {
            Some(path) if !path.as_os_str().is_empty() => path.file_name(),
            Some(_) => self.provider.origin().file_name(),
            None => None,
        };
        name.map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Path relative to the tree root, `None` if it escaped the root.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn origin(&self) -> &Path {
        self.provider.origin()
    }

    pub fn id(&self) -> ResourceId {
        ResourceId {
            origin: self.origin().to_path_buf(),
            path: self.path.clone(),
        }
    }

    pub fn kind(&self) -> Option<EntryKind> {
        self.path.as_deref().and_then(|p| self.provider.kind(p))
    }

    pub fn exists(&self) -> bool {
        self.kind().is_some()
    }

    pub fn is_dir(&self) -> bool {
        self.kind().is_some_and(EntryKind::is_dir)
    }

    pub fn is_file(&self) -> bool {
        self.kind() == Some(EntryKind::File)
    }

    /// Immediate children, sorted by name.
    pub fn iter_dir(&self) -> Result<Vec<Resource>> {
        let path = self.existing_path()?;
        let children = self.provider.children(path)?;
        Ok(children
            .into_iter()
            .map(|child| Self {
                provider: Arc::clone(&self.provider),
                path: Some(path.join(child.name)),
            })
            .collect())
    }

    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        let path = self.existing_path()?;
        self.provider.read(path)
    }

    pub fn read_to_string(&self) -> Result<String> {
        Ok(String::from_utf8(self.read_bytes()?)?)
    }

    /// Real filesystem location, when the provider is filesystem-backed.
    pub fn local_path(&self) -> Option<PathBuf> {
        self.path
            .as_deref()
            .and_then(|p| self.provider.local_path(p))
    }

    /// Copy the file or directory tree to `destination`.
    pub fn copy_to(&self, destination: &Path) -> Result<()> {
        let path = self.existing_path()?;
        self.provider.extract(path, destination)
    }

    pub(crate) fn provider(&self) -> &dyn Provider {
        self.provider.as_ref()
    }

    /// The relative path, failing as not-found if it escaped the root.
    pub(crate) fn existing_path(&self) -> Result<&Path> {
        self.path.as_deref().ok_or_else(|| self.escaped())
    }

    fn escaped(&self) -> Error {
        Error::NotFound {
            origin: self.origin().to_path_buf(),
            path: PathBuf::from(".."),
        }
    }

    pub(crate) fn require_kind(&self) -> Result<EntryKind> {
        let path = self.existing_path()?;
        self.provider
            .kind(path)
            .ok_or_else(|| not_found(self.provider(), path))
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("origin", &self.origin())
            .field("path", &self.path)
            .finish()
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}", self.origin().join(path).display()),
            None => write!(f, "{}/<outside>", self.origin().display()),
        }
    }
}
