//! Zip archive indexing and sanitized extraction for packaged resources.
//!
//! # Architecture
//!
//! - `detect.rs` - Format detection by magic bytes
//! - `sanitize.rs` - Relative path normalization and zip-slip prevention
//! - `index.rs` - Directory tree of an archive, implied directories included
//! - `archive.rs` - Reading entries and extracting files or whole subtrees

pub use archive::{Archive, ExtractReport};
pub use detect::{ArchiveFormat, detect_format, detect_path};
pub use error::{Error, Result};
pub use index::{ArchiveIndex, EntryKind, IndexEntry};
pub use sanitize::{normalize_relative, sanitize_path};

mod archive;
mod detect;
mod error;
mod index;
mod sanitize;
