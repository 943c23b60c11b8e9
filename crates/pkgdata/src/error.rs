use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("package '{0}' could not be located")]
    PackageNotFound(String),

    #[error("invalid package name '{0}'")]
    InvalidPackageName(String),

    #[error("resource '{}' not found in '{}'", path.display(), origin.display())]
    NotFound { origin: PathBuf, path: PathBuf },

    #[error("'{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("'{}' is a directory", .0.display())]
    IsADirectory(PathBuf),

    #[error("failed to materialize '{}': {source}", path.display())]
    Extraction { path: PathBuf, source: io::Error },

    #[error("failed to read '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Archive(#[from] pkgdata_archive::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("resource content is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl Error {
    /// True for the lazily raised "resource does not exist" family.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Archive(pkgdata_archive::Error::EntryNotFound(_))
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
