use std::io;
use std::path::PathBuf;

use crate::detect::ArchiveFormat;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported archive format: {0}")]
    UnsupportedFormat(ArchiveFormat),

    #[error("not a recognised archive")]
    UnknownFormat,

    #[error("zip-slip attack detected: entry '{entry}' resolves to '{resolved}'")]
    ZipSlip { entry: PathBuf, resolved: PathBuf },

    #[error("entry path '{0}' is not a safe relative path")]
    InvalidPath(String),

    #[error("entry '{0}' not found in archive")]
    EntryNotFound(PathBuf),

    #[error("entry '{0}' is a directory")]
    IsADirectory(PathBuf),

    #[error("failed to extract '{path}': {source}")]
    ExtractionFailed { path: PathBuf, source: io::Error },

    #[error("failed to create directory: {path}: {source}")]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },

    #[error("archive is corrupted: {0}")]
    Corrupted(#[from] zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
