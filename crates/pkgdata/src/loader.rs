use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::cache::ExtractionCache;
use crate::config::Config;
use crate::materialize::{Materialized, TempSettings, materialize};
use crate::resolver::{PackageResolver, SearchPath, resolve_package};
use crate::resource::Resource;
use crate::{Error, Result};

/// What a [`Loader`] is bound to: a package name to resolve, or a package
/// root that was already resolved.
#[derive(Clone, Debug)]
pub enum Anchor {
    Name(String),
    Root(Resource),
}

impl From<&str> for Anchor {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for Anchor {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<Resource> for Anchor {
    fn from(root: Resource) -> Self {
        Self::Root(root)
    }
}

/// Loads files shipped inside a package.
///
/// | On filesystem | Lifetime       | Method                    |
/// |---------------|----------------|---------------------------|
/// | yes           | process        | [`Loader::cached`]        |
/// | yes           | guard value    | [`Loader::as_path`]       |
/// | no            | n/a            | [`Loader::readable`]      |
///
/// Directory-backed packages hand out their real paths. Archive-backed ones
/// are extracted into temporary directories: per call for `as_path`, once
/// per resource for `cached`, the latter removed when the process exits.
///
/// ```no_run
/// use pkgdata::Loader;
///
/// let load_data = Loader::new("mypkg")?;
///
/// let schema = load_data.readable(&["schema.json"]).read_to_string()?;
///
/// let table = load_data.as_path(&["data", "table.csv"])?;
/// println!("{}", table.display());
///
/// let models = load_data.cached(&["models"])?;
/// # let _ = (schema, models);
/// # Ok::<(), pkgdata::Error>(())
/// ```
pub struct Loader {
    anchor: String,
    files: Resource,
    temp: TempSettings,
    cache: Arc<ExtractionCache>,
    description: OnceCell<String>,
}

impl Loader {
    /// Bind to `anchor` using configuration discovered from the environment.
    pub fn new(anchor: impl Into<Anchor>) -> Result<Self> {
        Self::with_config(anchor, &Config::discover()?)
    }

    pub fn with_config(anchor: impl Into<Anchor>, config: &Config) -> Result<Self> {
        Self::with_resolver(anchor, &SearchPath::from_config(config), config.temp_settings())
    }

    pub fn with_resolver(
        anchor: impl Into<Anchor>,
        resolver: &dyn PackageResolver,
        temp: TempSettings,
    ) -> Result<Self> {
        let (anchor, files) = match anchor.into() {
            Anchor::Name(name) => {
                let files = resolve_package(&name, resolver)?;
                (name, files)
            }
            Anchor::Root(root) => {
                if !root.is_dir() {
                    return Err(Error::PackageNotFound(root.to_string()));
                }
                (root.to_string(), root)
            }
        };

        tracing::debug!(anchor = %anchor, root = %files, "bound loader");
        Ok(Self {
            anchor,
            files,
            temp,
            cache: ExtractionCache::global(),
            description: OnceCell::new(),
        })
    }

    /// Use `cache` instead of the process-wide one.
    pub fn with_cache(mut self, cache: Arc<ExtractionCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn anchor(&self) -> &str {
        &self.anchor
    }

    /// Root of the package tree.
    pub fn files(&self) -> &Resource {
        &self.files
    }

    pub fn cache(&self) -> &ExtractionCache {
        &self.cache
    }

    /// Public top-level entries, sorted, directories suffixed with `/`.
    ///
    /// Names starting with `.` or `_` and the `tests` directory are left out.
    pub fn top_level(&self) -> Result<Vec<String>> {
        let mut entries: Vec<String> = self
            .files
            .iter_dir()?
            .into_iter()
            .filter_map(|child| {
                let name = child.name();
                if name.is_empty() || name.starts_with(['.', '_']) || name == "tests" {
                    return None;
                }
                Some(if child.is_dir() { format!("{name}/") } else { name })
            })
            .collect();
        entries.sort();
        Ok(entries)
    }

    /// Human readable summary of the package, computed on first use.
    pub fn description(&self) -> Result<&str> {
        self.description
            .get_or_try_init(|| {
                let mut lines = vec![
                    format!("Load package files relative to ``{}``.", self.anchor),
                    String::new(),
                    "This package contains the following (top-level) files/directories:"
                        .to_owned(),
                    String::new(),
                ];
                lines.extend(self.top_level()?.iter().map(|p| format!("* ``{p}``")));
                Ok(lines.join("\n"))
            })
            .map(String::as_str)
    }

    /// Read access without touching the filesystem.
    ///
    /// The resource may not exist; that only shows once it is read.
    pub fn readable(&self, segments: &[&str]) -> Resource {
        self.files.join(segments)
    }

    /// The resource as a filesystem path for as long as the guard lives.
    ///
    /// Not cached: every call extracts afresh, and the extraction is deleted
    /// when the guard is dropped.
    pub fn as_path(&self, segments: &[&str]) -> Result<Materialized> {
        materialize(&self.readable(segments), &self.temp)
    }

    /// Run `f` with the resource's filesystem path, cleaning up afterwards.
    pub fn with_path<T, F>(&self, segments: &[&str], f: F) -> Result<T>
    where
        F: FnOnce(&Path) -> T,
    {
        let materialized = self.as_path(segments)?;
        let out = f(materialized.path());
        materialized.close()?;
        Ok(out)
    }

    /// The resource as a filesystem path valid until the process exits.
    ///
    /// Extractions are memoized per resource. A directory and a file inside
    /// it requested separately are extracted separately.
    pub fn cached(&self, segments: &[&str]) -> Result<PathBuf> {
        self.cache.cached_path(&self.readable(segments), &self.temp)
    }

    /// Shorthand for [`Loader::cached`].
    pub fn get(&self, segments: &[&str]) -> Result<PathBuf> {
        self.cached(segments)
    }
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("anchor", &self.anchor)
            .field("files", &self.files)
            .finish_non_exhaustive()
    }
}
