use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Lexically normalize a `/`-separated relative path.
///
/// Empty and `.` parts are dropped and `..` pops the previous part. Returns
/// `None` when the path climbs above its root. Backslashes are treated as
/// separators so archives written on Windows index the same way.
pub fn normalize_relative(path: &str) -> Option<PathBuf> {
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            part if cfg!(windows) && part.contains(':') => return None,
            part => parts.push(part),
        }
    }

    Some(parts.iter().collect())
}

/// Resolve `entry` under `base`, refusing anything that would land outside it.
pub fn sanitize_path(entry: &Path, base: &Path) -> Result<PathBuf> {
    let mut resolved = base.to_path_buf();

    for component in entry.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if resolved == base || !resolved.pop() {
                    return Err(Error::ZipSlip {
                        entry: entry.to_path_buf(),
                        resolved,
                    });
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(Error::ZipSlip {
                    entry: entry.to_path_buf(),
                    resolved: entry.to_path_buf(),
                });
            }
        }
    }

    Ok(resolved)
}
