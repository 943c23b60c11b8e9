//! Package resolution: turning a package name into the root of its tree.
//!
//! The [`PackageResolver`] trait is the only contract between the loader and
//! the policy deciding where packages live.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pkgdata_archive::detect_path;

use crate::config::Config;
use crate::provider::{DirProvider, ZipProvider};
use crate::resource::Resource;
use crate::{Error, Result};

pub trait PackageResolver {
    /// Root resource of top-level package `package`, `None` if unknown here.
    fn resolve(&self, package: &str) -> Result<Option<Resource>>;
}

impl<R: PackageResolver + ?Sized> PackageResolver for &R {
    fn resolve(&self, package: &str) -> Result<Option<Resource>> {
        (**self).resolve(package)
    }
}

/// Searches directories in order for a package directory or archive.
#[derive(Clone, Debug)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
    extensions: Vec<String>,
}

impl SearchPath {
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
            extensions: vec!["zip".to_owned()],
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            dirs: config.search_paths.clone(),
            extensions: config.archive_extensions.clone(),
        }
    }
}

impl PackageResolver for SearchPath {
    fn resolve(&self, package: &str) -> Result<Option<Resource>> {
        for dir in &self.dirs {
            let candidate = dir.join(package);
            if candidate.is_dir() {
                tracing::debug!(package, path = %candidate.display(), "resolved package directory");
                let provider = DirProvider::new(candidate)?;
                return Ok(Some(Resource::root(Arc::new(provider))));
            }

            for ext in &self.extensions {
                let archive = dir.join(format!("{package}.{ext}"));
                if !archive.is_file() {
                    continue;
                }
                match detect_path(&archive) {
                    Ok(Some(format)) if format.is_supported() => {
                        tracing::debug!(package, path = %archive.display(), "resolved package archive");
                        let provider = ZipProvider::open_package(archive, package)?;
                        return Ok(Some(Resource::root(Arc::new(provider))));
                    }
                    Ok(format) => {
                        tracing::debug!(path = %archive.display(), ?format, "skipping non-zip candidate");
                    }
                    Err(e) => {
                        tracing::debug!(path = %archive.display(), error = %e, "skipping unreadable candidate");
                    }
                }
            }
        }
        Ok(None)
    }
}

/// Tries `primary`, then `fallback`.
#[derive(Clone, Debug)]
pub struct PairResolver<R1, R2> {
    primary: R1,
    fallback: R2,
}

impl<R1, R2> PairResolver<R1, R2>
where
    R1: PackageResolver,
    R2: PackageResolver,
{
    pub fn new(primary: R1, fallback: R2) -> Self {
        Self { primary, fallback }
    }
}

impl<R1, R2> PackageResolver for PairResolver<R1, R2>
where
    R1: PackageResolver,
    R2: PackageResolver,
{
    fn resolve(&self, package: &str) -> Result<Option<Resource>> {
        match self.primary.resolve(package)? {
            Some(root) => Ok(Some(root)),
            None => self.fallback.resolve(package),
        }
    }
}

/// Open a package tree directly from a directory or zip archive path.
pub fn open_root(path: &Path) -> Result<Resource> {
    if path.is_dir() {
        return Ok(Resource::root(Arc::new(DirProvider::new(path)?)));
    }
    if path.is_file() {
        return Ok(Resource::root(Arc::new(ZipProvider::open(path)?)));
    }
    Err(Error::PackageNotFound(path.display().to_string()))
}

/// Resolve a possibly dotted package name (`pkg.sub`) to its directory.
pub fn resolve_package(name: &str, resolver: &dyn PackageResolver) -> Result<Resource> {
    let parts: Vec<&str> = name.split('.').collect();
    let valid = parts
        .iter()
        .all(|p| !p.is_empty() && !p.contains(['/', '\\', ':']));
    if !valid {
        return Err(Error::InvalidPackageName(name.to_owned()));
    }

    let root = resolver
        .resolve(parts[0])?
        .ok_or_else(|| Error::PackageNotFound(name.to_owned()))?;

    let package = root.join(&parts[1..]);
    if !package.is_dir() {
        return Err(Error::PackageNotFound(name.to_owned()));
    }
    Ok(package)
}
