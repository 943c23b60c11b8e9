//! Access to files bundled with a package.
//!
//! # Architecture
//!
//! - `provider/` - Package trees: plain directories and zip archives
//! - `resource.rs` - Lazily checked paths inside a tree
//! - `resolver.rs` - Package name to tree root
//! - `materialize.rs` - Real filesystem paths, extracting when needed
//! - `cache.rs` - Process-lifetime extraction cache and exit cleanup
//! - `loader.rs` - The three access styles bound to one package
//!
//! # Example
//!
//! ```no_run
//! use pkgdata::Loader;
//!
//! let load_data = Loader::new("mypkg")?;
//! let config = load_data.get(&["defaults", "config.toml"])?;
//! println!("{}", config.display());
//! # Ok::<(), pkgdata::Error>(())
//! ```

pub use cache::{CleanupReport, ExtractionCache};
pub use config::Config;
pub use error::{Error, Result};
pub use loader::{Anchor, Loader};
pub use materialize::{Materialized, TempSettings, materialize};
pub use provider::{Child, DirProvider, EntryKind, Provider, ZipProvider};
pub use resolver::{PackageResolver, PairResolver, SearchPath, open_root, resolve_package};
pub use resource::{Resource, ResourceId};

pub mod config;
pub mod provider;

mod cache;
mod error;
mod loader;
mod materialize;
mod resolver;
mod resource;
