use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{Child, EntryKind, Provider, not_found};
use crate::{Error, Result};

/// A package tree that already lives on the filesystem.
#[derive(Clone, Debug)]
pub struct DirProvider {
    root: PathBuf,
}

impl DirProvider {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::NotADirectory(root));
        }
        Ok(Self { root })
    }

    fn full(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl Provider for DirProvider {
    fn origin(&self) -> &Path {
        &self.root
    }

    fn kind(&self, path: &Path) -> Option<EntryKind> {
        let metadata = fs::metadata(self.full(path)).ok()?;
        if metadata.is_dir() {
            Some(EntryKind::Dir)
        } else if metadata.is_file() {
            Some(EntryKind::File)
        } else {
            None
        }
    }

    fn children(&self, path: &Path) -> Result<Vec<Child>> {
        match self.kind(path) {
            None => return Err(not_found(self, path)),
            Some(EntryKind::File) => return Err(Error::NotADirectory(self.full(path))),
            Some(EntryKind::Dir) => {}
        }

        let full = self.full(path);
        let read_err = |e| Error::Read {
            path: full.clone(),
            source: e,
        };

        let mut children = Vec::new();
        for entry in fs::read_dir(&full).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            // Follows symlinks; dangling links are skipped.
            let Ok(metadata) = fs::metadata(entry.path()) else {
                continue;
            };
            let kind = if metadata.is_dir() {
                EntryKind::Dir
            } else {
                EntryKind::File
            };
            children.push(Child {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
            });
        }

        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let full = self.full(path);
        fs::read(&full).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => not_found(self, path),
            _ if full.is_dir() => Error::IsADirectory(full.clone()),
            _ => Error::Read {
                path: full.clone(),
                source: e,
            },
        })
    }

    fn local_path(&self, path: &Path) -> Option<PathBuf> {
        self.kind(path).map(|_| self.full(path))
    }

    fn extract(&self, path: &Path, destination: &Path) -> Result<()> {
        let src = self.full(path);
        match self.kind(path) {
            None => Err(not_found(self, path)),
            Some(EntryKind::Dir) => copy_dir_all(&src, destination),
            Some(EntryKind::File) => fs::copy(&src, destination)
                .map(drop)
                .map_err(|e| Error::Extraction {
                    path: destination.to_path_buf(),
                    source: e,
                }),
        }
    }
}

fn copy_dir_all(src: &Path, dest: &Path) -> Result<()> {
    let write_err = |path: &Path| {
        let path = path.to_path_buf();
        move |e| Error::Extraction { path, source: e }
    };
    let read_err = |path: &Path| {
        let path = path.to_path_buf();
        move |e| Error::Read { path, source: e }
    };

    fs::create_dir_all(dest).map_err(write_err(dest))?;

    for entry in fs::read_dir(src).map_err(read_err(src))? {
        let entry = entry.map_err(read_err(src))?;
        let src_path = entry.path();
        let dest_path = dest.join(entry.file_name());

        if src_path.is_dir() {
            copy_dir_all(&src_path, &dest_path)?;
        } else {
            fs::copy(&src_path, &dest_path).map_err(write_err(&dest_path))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> (tempfile::TempDir, DirProvider) {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("data").join("nested")).unwrap();
        fs::write(dir.path().join("schema.json"), "{}").unwrap();
        fs::write(dir.path().join("data").join("a.txt"), "alpha").unwrap();
        fs::write(dir.path().join("data").join("nested").join("b.txt"), "beta").unwrap();
        let provider = DirProvider::new(dir.path()).unwrap();
        (dir, provider)
    }

    #[test]
    fn rejects_missing_root() {
        let dir = tempdir().unwrap();
        let result = DirProvider::new(dir.path().join("missing"));
        assert!(matches!(result, Err(Error::NotADirectory(_))));
    }

    #[test]
    fn classifies_entries() {
        let (_dir, provider) = sample();
        assert_eq!(provider.kind(Path::new("")), Some(EntryKind::Dir));
        assert_eq!(provider.kind(Path::new("data")), Some(EntryKind::Dir));
        assert_eq!(provider.kind(Path::new("schema.json")), Some(EntryKind::File));
        assert_eq!(provider.kind(Path::new("missing")), None);
    }

    #[test]
    fn children_are_sorted() {
        let (_dir, provider) = sample();
        let children = provider.children(Path::new("")).unwrap();
        let names: Vec<_> = children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["data", "schema.json"]);
        assert_eq!(children[0].kind, EntryKind::Dir);
    }

    #[test]
    fn children_of_file_is_an_error() {
        let (_dir, provider) = sample();
        let result = provider.children(Path::new("schema.json"));
        assert!(matches!(result, Err(Error::NotADirectory(_))));
    }

    #[test]
    fn read_missing_is_not_found() {
        let (_dir, provider) = sample();
        let err = provider.read(Path::new("missing.txt")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn local_path_passes_through() {
        let (dir, provider) = sample();
        let path = provider.local_path(Path::new("schema.json")).unwrap();
        assert_eq!(path, dir.path().join("schema.json"));
        assert!(provider.local_path(Path::new("missing")).is_none());
    }

    #[test]
    fn extract_copies_subtree() {
        let (_dir, provider) = sample();
        let out = tempdir().unwrap();
        let dest = out.path().join("data");
        provider.extract(Path::new("data"), &dest).unwrap();
        assert!(dest.join("a.txt").exists());
        assert!(dest.join("nested").join("b.txt").exists());
    }
}
