use log::{debug, error};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::TILE_SIZES;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GeometryError {
    #[error("Image {width}x{height} does not divide into {tile_width}x{tile_height} tiles")]
    NonIntegerTiling {
        width: u32,
        height: u32,
        tile_width: u32,
        tile_height: u32,
    },
    #[error("Unsupported tile size {0}: expected one of 8, 16, 32, 64")]
    UnsupportedTileSize(u32),
}

/// Tile layout of one image, derived from its size and the tile size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGeometry {
    pub tile_width: u32,
    pub tile_height: u32,
    pub tiles_x: u32,
    pub tiles_y: u32,
    pub tile_count: u32,
    pub columns: u32,
}

impl TileGeometry {
    pub fn image_width(&self) -> u32 {
        self.tiles_x * self.tile_width
    }

    pub fn image_height(&self) -> u32 {
        self.tiles_y * self.tile_height
    }

    pub fn pixels_per_tile(&self) -> usize {
        self.tile_width as usize * self.tile_height as usize
    }

    pub fn pixel_count(&self) -> usize {
        self.tile_count as usize * self.pixels_per_tile()
    }
}

pub fn validate_tile_size(size: u32) -> Result<u32, GeometryError> {
    if TILE_SIZES.contains(&size) {
        Ok(size)
    } else {
        Err(GeometryError::UnsupportedTileSize(size))
    }
}

/// Plans the tile layout for an image.
///
/// # Errors
/// - `UnsupportedTileSize` if a tile dimension is not 8, 16, 32 or 64
/// - `NonIntegerTiling` if the image is not a whole number of tiles on either axis
pub fn plan(
    width: u32,
    height: u32,
    tile_width: u32,
    tile_height: u32,
) -> Result<TileGeometry, GeometryError> {
    validate_tile_size(tile_width)?;
    validate_tile_size(tile_height)?;

    if width % tile_width != 0 || height % tile_height != 0 {
        error!(
            "Image {}x{} is not aligned to {}x{} tiles",
            width, height, tile_width, tile_height
        );
        return Err(GeometryError::NonIntegerTiling {
            width,
            height,
            tile_width,
            tile_height,
        });
    }

    let tiles_x = width / tile_width;
    let tiles_y = height / tile_height;
    let geometry = TileGeometry {
        tile_width,
        tile_height,
        tiles_x,
        tiles_y,
        tile_count: tiles_x * tiles_y,
        columns: tiles_x,
    };
    debug!("Planned tile geometry: {:?}", geometry);

    Ok(geometry)
}
