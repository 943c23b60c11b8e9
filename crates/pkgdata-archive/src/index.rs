use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Whether an entry is a regular file or a directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Dir,
}

impl EntryKind {
    pub fn is_dir(self) -> bool {
        matches!(self, Self::Dir)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    pub kind: EntryKind,
    /// Position in the central directory. `None` for directories that are
    /// only implied by the paths of their contents.
    pub zip_index: Option<usize>,
    pub size: u64,
}

/// Directory tree of an archive, keyed by normalized relative path.
///
/// The root is always present under the empty path.
#[derive(Clone, Debug)]
pub struct ArchiveIndex {
    entries: BTreeMap<PathBuf, IndexEntry>,
}

impl Default for ArchiveIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveIndex {
    pub fn new() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            PathBuf::new(),
            IndexEntry {
                kind: EntryKind::Dir,
                zip_index: None,
                size: 0,
            },
        );
        Self { entries }
    }

    /// Record an entry and every directory implied by its path.
    pub fn insert(&mut self, path: PathBuf, entry: IndexEntry) {
        for ancestor in path.ancestors().skip(1) {
            self.entries
                .entry(ancestor.to_path_buf())
                .or_insert(IndexEntry {
                    kind: EntryKind::Dir,
                    zip_index: None,
                    size: 0,
                });
        }

        match self.entries.get_mut(&path) {
            // An explicit directory record refines an implied one.
            Some(existing) if existing.kind == entry.kind => *existing = entry,
            Some(_) => {}
            None => {
                self.entries.insert(path, entry);
            }
        }
    }

    pub fn get(&self, path: &Path) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    pub fn kind(&self, path: &Path) -> Option<EntryKind> {
        self.get(path).map(|e| e.kind)
    }

    /// Immediate children of `path`, in path order.
    pub fn children<'a>(
        &'a self,
        path: &'a Path,
    ) -> impl Iterator<Item = (&'a Path, &'a IndexEntry)> + 'a {
        self.descendants(path)
            .filter(move |(p, _)| p.parent() == Some(path))
    }

    /// Every entry strictly below `path`, parents before children.
    pub fn descendants<'a>(
        &'a self,
        path: &'a Path,
    ) -> impl Iterator<Item = (&'a Path, &'a IndexEntry)> + 'a {
        self.entries
            .range(path.to_path_buf()..)
            .skip_while(move |(p, _)| p.as_path() == path)
            .take_while(move |(p, _)| p.starts_with(path))
            .map(|(p, e)| (p.as_path(), e))
    }

    /// Number of entries, the root included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() == 1
    }
}
