//! Process-lifetime extraction cache and its cleanup registry.
//!
//! Cached extractions stay on disk until the cache is released. The global
//! cache registers its release with the C runtime's `atexit` the first time
//! it is used, so temporaries disappear on normal process exit.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use once_cell::sync::{Lazy, OnceCell};
use tempfile::TempDir;

use crate::Result;
use crate::materialize::{Materialized, TempSettings, materialize};
use crate::resource::{Resource, ResourceId};

static GLOBAL: Lazy<Arc<ExtractionCache>> = Lazy::new(|| {
    register_exit_hook();
    Arc::new(ExtractionCache::new())
});

extern "C" fn release_global_at_exit() {
    // Must not unwind across the C boundary.
    let _ = std::panic::catch_unwind(|| {
        let report = GLOBAL.release_all();
        tracing::debug!(
            released = report.released,
            failed = report.failed,
            "released extraction cache at exit"
        );
    });
}

fn register_exit_hook() {
    let rc = unsafe { libc::atexit(release_global_at_exit) };
    if rc != 0 {
        tracing::warn!("failed to register extraction cleanup at exit");
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Outcome of [`ExtractionCache::release_all`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub released: usize,
    pub failed: usize,
}

/// Memoized materializations keyed by [`ResourceId`].
///
/// Each key owns a cell that is filled at most once: concurrent requests for
/// the same resource wait on the first extraction and then share its path.
/// A failed extraction leaves the cell empty so a later call can retry.
#[derive(Default)]
pub struct ExtractionCache {
    entries: Mutex<HashMap<ResourceId, Arc<OnceCell<PathBuf>>>>,
    cleanup: Mutex<Vec<TempDir>>,
}

impl ExtractionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache shared by every loader.
    pub fn global() -> Arc<ExtractionCache> {
        Arc::clone(&GLOBAL)
    }

    /// Materialize `resource` once and keep it for the life of the cache.
    pub fn cached_path(&self, resource: &Resource, temp: &TempSettings) -> Result<PathBuf> {
        self.get_or_try_insert_with(resource.id(), || materialize(resource, temp))
    }

    /// Look up `id`, running `materialize` on a miss.
    ///
    /// Any temporary directory produced by `materialize` is moved into the
    /// cleanup registry.
    pub fn get_or_try_insert_with<F>(&self, id: ResourceId, materialize: F) -> Result<PathBuf>
    where
        F: FnOnce() -> Result<Materialized>,
    {
        let cell = {
            let mut entries = lock(&self.entries);
            Arc::clone(entries.entry(id.clone()).or_default())
        };

        if let Some(path) = cell.get() {
            tracing::trace!(origin = %id.origin.display(), path = ?id.path, "extraction cache hit");
            return Ok(path.clone());
        }

        let result = cell.get_or_try_init(|| {
            let (path, temp) = materialize()?.into_parts();
            if let Some(temp) = temp {
                lock(&self.cleanup).push(temp);
            }
            tracing::debug!(
                origin = %id.origin.display(),
                path = %path.display(),
                "cached materialized resource"
            );
            Ok::<_, crate::Error>(path)
        });

        match result {
            Ok(path) => Ok(path.clone()),
            Err(e) => {
                self.forget_empty(&id, &cell);
                Err(e)
            }
        }
    }

    /// Drop the map entry for `id` if it is still `cell` and was never filled.
    fn forget_empty(&self, id: &ResourceId, cell: &Arc<OnceCell<PathBuf>>) {
        let mut entries = lock(&self.entries);
        let stale = entries
            .get(id)
            .is_some_and(|current| Arc::ptr_eq(current, cell) && current.get().is_none());
        if stale {
            entries.remove(id);
        }
    }

    pub fn get(&self, id: &ResourceId) -> Option<PathBuf> {
        lock(&self.entries)
            .get(id)
            .and_then(|cell| cell.get().cloned())
    }

    pub fn contains(&self, id: &ResourceId) -> bool {
        self.get(id).is_some()
    }

    /// Number of populated entries.
    pub fn len(&self) -> usize {
        lock(&self.entries)
            .values()
            .filter(|cell| cell.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Temporary directories waiting for release.
    pub fn pending_cleanup(&self) -> usize {
        lock(&self.cleanup).len()
    }

    /// Delete every registered temporary directory, newest first, and forget
    /// all cached paths.
    ///
    /// Every directory is attempted even if an earlier one fails. Directories
    /// that are already gone count as released. Calling this again without new
    /// extractions in between does nothing.
    pub fn release_all(&self) -> CleanupReport {
        let dirs = std::mem::take(&mut *lock(&self.cleanup));
        lock(&self.entries).clear();

        let mut report = CleanupReport::default();
        for dir in dirs.into_iter().rev() {
            let path = dir.path().to_path_buf();
            match dir.close() {
                Ok(()) => report.released += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => report.released += 1,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove extraction");
                    report.failed += 1;
                }
            }
        }
        report
    }
}
