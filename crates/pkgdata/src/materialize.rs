use std::ops::Deref;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::resource::Resource;
use crate::{Error, Result};

/// Where and how temporary extraction directories are created.
#[derive(Clone, Debug)]
pub struct TempSettings {
    prefix: String,
    dir: Option<PathBuf>,
}

impl Default for TempSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl TempSettings {
    pub fn new() -> Self {
        Self {
            prefix: "pkgdata-".to_owned(),
            dir: None,
        }
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Parent directory for extractions; the system temp dir when unset.
    pub fn dir(mut self, dir: Option<PathBuf>) -> Self {
        self.dir = dir;
        self
    }

    pub fn get_prefix(&self) -> &str {
        &self.prefix
    }

    pub fn get_dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    fn create(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(&self.prefix);
        let created = match &self.dir {
            Some(dir) => builder.tempdir_in(dir),
            None => builder.tempdir(),
        };
        created.map_err(|e| Error::Extraction {
            path: self.dir.clone().unwrap_or_else(std::env::temp_dir),
            source: e,
        })
    }
}

/// A resource available at a real filesystem path.
///
/// Filesystem-backed resources are handed out in place. Anything else is
/// extracted into a fresh temporary directory that is deleted when this
/// value is dropped.
#[derive(Debug)]
pub struct Materialized {
    path: PathBuf,
    temp: Option<TempDir>,
}

impl Materialized {
    /// A path that already exists on disk and is not owned by this value.
    pub fn in_place(path: PathBuf) -> Self {
        Self { path, temp: None }
    }

    /// A path inside `temp`, removed together with it.
    pub fn temporary(path: PathBuf, temp: TempDir) -> Self {
        Self {
            path,
            temp: Some(temp),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True if the path points into a temporary extraction.
    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }

    /// Delete any temporary extraction now, reporting failures that a plain
    /// drop would swallow.
    pub fn close(self) -> Result<()> {
        match self.temp {
            Some(temp) => {
                let location = temp.path().to_path_buf();
                temp.close().map_err(|e| Error::Extraction {
                    path: location,
                    source: e,
                })
            }
            None => Ok(()),
        }
    }

    pub(crate) fn into_parts(self) -> (PathBuf, Option<TempDir>) {
        (self.path, self.temp)
    }
}

impl Deref for Materialized {
    type Target = Path;

    fn deref(&self) -> &Path {
        &self.path
    }
}

impl AsRef<Path> for Materialized {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// Make `resource` available as a filesystem path.
pub fn materialize(resource: &Resource, temp: &TempSettings) -> Result<Materialized> {
    let kind = resource.require_kind()?;

    if let Some(path) = resource.local_path() {
        tracing::trace!(resource = %resource, "resource already on filesystem");
        return Ok(Materialized::in_place(path));
    }

    let dir = temp.create()?;
    let name = match resource.name() {
        name if name.is_empty() => "resource".to_owned(),
        name => name,
    };
    let target = dir.path().join(name);
    resource.copy_to(&target)?;

    tracing::debug!(
        resource = %resource,
        path = %target.display(),
        ?kind,
        "materialized resource"
    );
    Ok(Materialized::temporary(target, dir))
}
