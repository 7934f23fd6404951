use std::collections::HashMap;

use log::{debug, error};
use thiserror::Error;

use super::format::RasterImage;
use crate::codec::palette::Rgb;
use crate::constants::MAX_PALETTE_ENTRIES;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SourceError {
    #[error("Invalid pixel data length: expected {expected} bytes, got {actual}")]
    InvalidPixelDataLength { expected: usize, actual: usize },
    #[error("Palette overflow: maximum 256 colors supported, attempted to add color #{0}")]
    PaletteOverflow(usize),
}

/// What the exporter needs from a host image.
pub trait IndexedSource {
    /// Get the dimensions of the image (width, height)
    fn dimensions(&self) -> (u32, u32);

    /// Palette indices, row-major, one byte per pixel
    fn indices(&self) -> &[u8];

    /// The color map backing the indices, if the host has one
    fn palette(&self) -> Option<&[Rgb]>;

    fn to_raster(&self) -> RasterImage {
        let (width, height) = self.dimensions();
        RasterImage::new(
            width,
            height,
            self.indices().to_vec(),
            self.palette().map(<[Rgb]>::to_vec),
        )
    }
}

impl IndexedSource for RasterImage {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn indices(&self) -> &[u8] {
        &self.pixels
    }

    fn palette(&self) -> Option<&[Rgb]> {
        self.palette.as_deref()
    }

    fn to_raster(&self) -> RasterImage {
        self.clone()
    }
}

impl RasterImage {
    /// Indexes an RGBA buffer by exact color, in first-seen order.
    ///
    /// Alpha is dropped. This does not quantize: more than 256 distinct
    /// colors is an error.
    ///
    /// # Errors
    /// - `InvalidPixelDataLength` if `rgba.len() != width * height * 4`
    /// - `PaletteOverflow` if more than 256 unique colors are found
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Self, SourceError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            error!(
                "RGBA buffer holds {} bytes, {}x{} needs {}",
                rgba.len(),
                width,
                height,
                expected
            );
            return Err(SourceError::InvalidPixelDataLength {
                expected,
                actual: rgba.len(),
            });
        }

        let mut unique_colors = HashMap::new();
        let mut palette = Vec::new();
        let mut pixels = Vec::with_capacity(rgba.len() / 4);

        for pixel in rgba.chunks_exact(4) {
            let color = Rgb::new(pixel[0], pixel[1], pixel[2]);

            if let Some(&index) = unique_colors.get(&color) {
                pixels.push(index);
            } else {
                if palette.len() >= MAX_PALETTE_ENTRIES {
                    error!("Image uses more than {} colors", MAX_PALETTE_ENTRIES);
                    return Err(SourceError::PaletteOverflow(palette.len() + 1));
                }

                let index = palette.len() as u8;
                palette.push(color);
                unique_colors.insert(color, index);
                pixels.push(index);
            }
        }
        debug!(
            "Indexed {}x{} image with {} colors",
            width,
            height,
            palette.len()
        );

        Ok(Self::new(width, height, pixels, Some(palette)))
    }
}
