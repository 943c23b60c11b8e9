use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Archive formats recognised by their magic bytes.
///
/// Only [`ArchiveFormat::Zip`] can be indexed; the rest are detected so that
/// callers get a precise "unsupported" error instead of a corrupt-archive one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
    TarZstd,
    TarXz,
    Tar,
}

impl ArchiveFormat {
    pub fn is_supported(self) -> bool {
        matches!(self, Self::Zip)
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Zip => "zip",
            Self::TarGz => "tar.gz",
            Self::TarZstd => "tar.zst",
            Self::TarXz => "tar.xz",
            Self::Tar => "tar",
        };
        f.write_str(name)
    }
}

pub fn detect_format(data: &[u8]) -> Option<ArchiveFormat> {
    match data {
        [0x50, 0x4B, 0x03, 0x04, ..] | [0x50, 0x4B, 0x05, 0x06, ..] => Some(ArchiveFormat::Zip),
        [0x1F, 0x8B, ..] => Some(ArchiveFormat::TarGz),
        [0x28, 0xB5, 0x2F, 0xFD, ..] => Some(ArchiveFormat::TarZstd),
        [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00, ..] => Some(ArchiveFormat::TarXz),
        _ if is_tar_header(data) => Some(ArchiveFormat::Tar),
        _ => None,
    }
}

fn is_tar_header(data: &[u8]) -> bool {
    data.len() >= 263 && data[257..263] == *b"ustar\0"
}

/// Sniff the format of the file at `path`.
///
/// Files shorter than a header are reported as `None` rather than an error.
pub fn detect_path(path: &Path) -> io::Result<Option<ArchiveFormat>> {
    let mut header = Vec::with_capacity(512);
    File::open(path)?.take(512).read_to_end(&mut header)?;
    Ok(detect_format(&header))
}
