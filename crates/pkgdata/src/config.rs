//! Loader configuration.
//!
//! Read from TOML (`$PKGDATA_CONFIG`, else `~/.config/pkgdata/config.toml`)
//! with `$PKGDATA_PATH` appended to the package search path.

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::materialize::TempSettings;
use crate::{Error, Result};

pub const CONFIG_ENV: &str = "PKGDATA_CONFIG";
pub const PATH_ENV: &str = "PKGDATA_PATH";

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Directories searched, in order, for `<name>/` or `<name>.<ext>`.
    pub search_paths: Vec<PathBuf>,
    pub archive_extensions: Vec<String>,
    pub temp_prefix: String,
    pub temp_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_paths: Vec::new(),
            archive_extensions: vec!["zip".to_owned()],
            temp_prefix: "pkgdata-".to_owned(),
            temp_dir: None,
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(s)?;
        config.normalize()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn default_location() -> Option<PathBuf> {
        home::home_dir().map(|home| home.join(".config").join("pkgdata").join("config.toml"))
    }

    /// Configuration from the environment.
    ///
    /// An explicit `$PKGDATA_CONFIG` must exist; the default location is
    /// optional.
    pub fn discover() -> Result<Self> {
        let file = match env::var_os(CONFIG_ENV) {
            Some(path) => Some(PathBuf::from(path)),
            None => Self::default_location().filter(|p| p.is_file()),
        };

        let mut config = match file {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading configuration");
                Self::load(&path)?
            }
            None => Self::default(),
        };

        if let Some(paths) = env::var_os(PATH_ENV) {
            config.extend_search_path(&paths);
        }
        Ok(config)
    }

    /// Append entries of a platform path list (`:` or `;` separated).
    pub fn extend_search_path(&mut self, paths: &OsStr) {
        self.search_paths
            .extend(env::split_paths(paths).filter(|p| !p.as_os_str().is_empty()));
    }

    pub fn with_search_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_paths.push(dir.into());
        self
    }

    pub fn temp_settings(&self) -> TempSettings {
        TempSettings::new()
            .prefix(self.temp_prefix.clone())
            .dir(self.temp_dir.clone())
    }

    fn normalize(&mut self) -> Result<()> {
        for ext in &mut self.archive_extensions {
            let trimmed = ext.trim_start_matches('.');
            if trimmed.is_empty() {
                return Err(Error::Config("archive extensions must not be empty".into()));
            }
            *ext = trimmed.to_owned();
        }

        if self.temp_prefix.contains(['/', '\\']) {
            return Err(Error::Config(format!(
                "temp-prefix '{}' must not contain path separators",
                self.temp_prefix
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert!(config.search_paths.is_empty());
        assert_eq!(config.archive_extensions, vec!["zip"]);
        assert_eq!(config.temp_prefix, "pkgdata-");
    }

    #[test]
    fn parse_full_file() {
        let config = Config::from_toml_str(
            r#"
            search-paths = ["/usr/share/pkgdata", "vendor"]
            archive-extensions = [".zip", "whl"]
            temp-prefix = "app-"
            temp-dir = "/var/tmp"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.search_paths,
            vec![PathBuf::from("/usr/share/pkgdata"), PathBuf::from("vendor")]
        );
        assert_eq!(config.archive_extensions, vec!["zip", "whl"]);
        assert_eq!(config.temp_dir, Some(PathBuf::from("/var/tmp")));

        let temp = config.temp_settings();
        assert_eq!(temp.get_prefix(), "app-");
    }

    #[test]
    fn missing_keys_take_defaults() {
        let config = Config::from_toml_str("search-paths = [\"data\"]").unwrap();
        assert_eq!(config.archive_extensions, vec!["zip"]);
        assert_eq!(config.temp_prefix, "pkgdata-");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = Config::from_toml_str("search-path = [\"typo\"]");
        assert!(matches!(result, Err(Error::Toml(_))));
    }

    #[test]
    fn separator_in_prefix_is_rejected() {
        let result = Config::from_toml_str("temp-prefix = \"a/b\"");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn empty_extension_is_rejected() {
        let result = Config::from_toml_str("archive-extensions = [\".\"]");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn search_path_list_is_appended() {
        let joined = env::join_paths([Path::new("first"), Path::new("second")]).unwrap();
        let mut config = Config::default().with_search_path("zeroth");
        config.extend_search_path(&joined);
        assert_eq!(
            config.search_paths,
            vec![
                PathBuf::from("zeroth"),
                PathBuf::from("first"),
                PathBuf::from("second")
            ]
        );
    }

    #[test]
    fn load_missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(Error::Read { .. })));
    }
}
