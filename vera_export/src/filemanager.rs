use image::ImageError;
use lib_vera::codec::PackError;
use lib_vera::image::SourceError;
use lib_vera::{ExportError, RasterImage};
use log::{debug, info};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::settings::Settings;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),

    #[error("Unsupported image: {0}")]
    SourceError(#[from] SourceError),

    #[error("Invalid export options: {0}")]
    OptionsError(#[from] PackError),

    #[error("Settings file error: {0}")]
    SettingsError(#[from] bincode::Error),

    #[error("{0}")]
    ExportError(#[from] ExportError),
}

/// Loads any image the `image` crate reads and indexes it by exact color.
pub fn open_image(path: &Path) -> Result<RasterImage, HostError> {
    let rgba = image::open(path)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    debug!("Opened {} ({}x{})", path.display(), width, height);

    let raster = RasterImage::from_rgba(width, height, rgba.as_raw())?;
    info!(
        "Loaded {} with {} colors",
        path.display(),
        raster.palette_size()
    );
    Ok(raster)
}

/// Last used settings, or the defaults when none were saved yet.
pub fn load_settings(path: &Path) -> Result<Settings, HostError> {
    match fs::read(path) {
        Ok(bytes) => Ok(bincode::deserialize(&bytes)?),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!("No saved settings at {}", path.display());
            Ok(Settings::default())
        }
        Err(err) => Err(err.into()),
    }
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<(), HostError> {
    let bytes = bincode::serialize(settings)?;
    fs::write(path, bytes)?;
    debug!("Saved settings to {}", path.display());
    Ok(())
}
