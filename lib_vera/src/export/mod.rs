pub mod descriptor;
pub mod writer;

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, error};
use thiserror::Error;

use crate::codec::{GeometryError, PackError, PaletteError};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Pixel packing failed: {0}")]
    Pack(#[from] PackError),
    #[error("Palette encoding failed: {0}")]
    Palette(#[from] PaletteError),
    #[error("Invalid geometry: {0}")]
    Geometry(#[from] GeometryError),
    #[error("Pixel #{position} uses index {index}, which does not fit {bits} bits per pixel")]
    IndexOutOfRange { position: usize, index: u8, bits: u8 },
    #[error("Pixel #{position} uses index {index}, but the palette has {palette_size} entries")]
    UnmappedIndex {
        position: usize,
        index: u8,
        palette_size: usize,
    },
    #[error("Failed to write {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("Failed to render bitmap {}: {source}", .path.display())]
    Render {
        path: PathBuf,
        source: ::image::ImageError,
    },
}

impl ExportError {
    /// The file the failure concerns, for errors tied to one artifact.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ExportError::Io { path, .. } | ExportError::Render { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// `base` with `.suffix` appended to the whole file name.
pub fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = base.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Writes one fully assembled artifact. The handle is closed when this returns.
pub(crate) fn write_artifact(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let io_error = |source: io::Error| {
        error!("Failed to write {}: {}", path.display(), source);
        ExportError::Io {
            path: path.to_path_buf(),
            source,
        }
    };

    let mut file = File::create(path).map_err(io_error)?;
    file.write_all(bytes).map_err(io_error)?;
    file.flush().map_err(io_error)?;
    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
