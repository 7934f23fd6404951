use log::{debug, error};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::geometry::{self, GeometryError, TileGeometry};
use crate::constants::{FILE_HEADER, HEADER_SIZE};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PackError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),
    #[error("Invalid geometry: {width}x{height} image needs {expected} pixels, got {actual}")]
    PixelCountMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("Unsupported bit depth {0}: expected 1, 2, 4 or 8")]
    UnsupportedDepth(u8),
}

/// Bits spent on one palette index in the packed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BitDepth {
    One,
    Two,
    Four,
    Eight,
}

impl BitDepth {
    pub const ALL: [BitDepth; 4] = [BitDepth::One, BitDepth::Two, BitDepth::Four, BitDepth::Eight];

    pub fn bits(self) -> u8 {
        match self {
            BitDepth::One => 1,
            BitDepth::Two => 2,
            BitDepth::Four => 4,
            BitDepth::Eight => 8,
        }
    }

    /// Largest index value that fits the depth.
    pub fn max_index(self) -> u8 {
        ((1u16 << self.bits()) - 1) as u8
    }

    /// Body length for `pixel_count` pixels, rounded up to a whole byte.
    pub fn packed_len(self, pixel_count: usize) -> usize {
        (pixel_count * self.bits() as usize).div_ceil(8)
    }
}

impl TryFrom<u8> for BitDepth {
    type Error = PackError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            1 => Ok(BitDepth::One),
            2 => Ok(BitDepth::Two),
            4 => Ok(BitDepth::Four),
            8 => Ok(BitDepth::Eight),
            other => Err(PackError::UnsupportedDepth(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Traversal {
    /// All pixels of a tile are contiguous; tiles follow each other row by row.
    TileMajor,
    /// Plain scanlines, used for full-bitmap output.
    RasterMajor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackOptions {
    pub bit_depth: BitDepth,
    pub tile_width: u32,
    pub tile_height: u32,
    pub traversal: Traversal,
}

impl PackOptions {
    pub fn new(
        bits_per_pixel: u8,
        tile_width: u32,
        tile_height: u32,
        traversal: Traversal,
    ) -> Result<Self, PackError> {
        let bit_depth = BitDepth::try_from(bits_per_pixel)?;
        geometry::validate_tile_size(tile_width)?;
        geometry::validate_tile_size(tile_height)?;

        Ok(Self {
            bit_depth,
            tile_width,
            tile_height,
            traversal,
        })
    }
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            bit_depth: BitDepth::Four,
            tile_width: 8,
            tile_height: 8,
            traversal: Traversal::TileMajor,
        }
    }
}

/// Packed pixel data; the file header is added by [`PackedBuffer::to_bytes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedBuffer {
    pub bit_depth: BitDepth,
    pub pixel_count: usize,
    pub body: Vec<u8>,
}

impl PackedBuffer {
    pub fn len(&self) -> usize {
        HEADER_SIZE + self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.len());
        bytes.extend_from_slice(&FILE_HEADER);
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

/// MSB-first accumulator for sub-byte indices.
///
/// Values are not masked: bits above the depth leak into the neighbouring
/// slots of the same byte.
struct BitWriter {
    depth: u8,
    out: Vec<u8>,
    current: u8,
    filled: u8,
}

impl BitWriter {
    fn with_capacity(depth: BitDepth, bytes: usize) -> Self {
        Self {
            depth: depth.bits(),
            out: Vec::with_capacity(bytes),
            current: 0,
            filled: 0,
        }
    }

    fn push(&mut self, value: u8) {
        if self.depth == 8 {
            self.out.push(value);
            return;
        }

        let shift = 8 - self.depth - self.filled;
        self.current |= value << shift;
        self.filled += self.depth;

        if self.filled == 8 {
            self.out.push(self.current);
            self.current = 0;
            self.filled = 0;
        }
    }

    fn finish(mut self) -> Vec<u8> {
        // Unused low bits of a trailing partial byte stay zero.
        if self.filled > 0 {
            self.out.push(self.current);
        }
        self.out
    }
}

/// Packs an already ordered index sequence at the given depth.
pub fn pack_sequence<I>(sequence: I, bit_depth: BitDepth) -> PackedBuffer
where
    I: IntoIterator<Item = u8>,
    I::IntoIter: ExactSizeIterator,
{
    let sequence = sequence.into_iter();
    let pixel_count = sequence.len();
    let mut writer = BitWriter::with_capacity(bit_depth, bit_depth.packed_len(pixel_count));

    for value in sequence {
        writer.push(value);
    }

    let body = writer.finish();
    debug_assert_eq!(body.len(), bit_depth.packed_len(pixel_count));

    PackedBuffer {
        bit_depth,
        pixel_count,
        body,
    }
}

/// Raster indices in tile-major order: tile rows, tile columns, then the
/// rows and columns inside each tile.
pub fn tile_order(width: u32, geometry: &TileGeometry) -> impl Iterator<Item = usize> + '_ {
    let width = width as usize;
    let tile_width = geometry.tile_width as usize;
    let tile_height = geometry.tile_height as usize;

    (0..geometry.tiles_y as usize).flat_map(move |ty| {
        (0..geometry.tiles_x as usize).flat_map(move |tx| {
            (0..tile_height).flat_map(move |ly| {
                let row_start = (ty * tile_height + ly) * width + tx * tile_width;
                row_start..row_start + tile_width
            })
        })
    })
}

/// The index sequence `pack` feeds to the bit packer.
pub fn traversal_order(
    pixels: &[u8],
    width: u32,
    height: u32,
    options: &PackOptions,
) -> Result<Vec<u8>, PackError> {
    check_pixel_count(pixels, width, height)?;

    match options.traversal {
        Traversal::RasterMajor => Ok(pixels.to_vec()),
        Traversal::TileMajor => {
            let geometry = geometry::plan(width, height, options.tile_width, options.tile_height)?;
            Ok(tile_order(width, &geometry).map(|i| pixels[i]).collect())
        }
    }
}

/// Packs a raster in the order `options.traversal` asks for.
///
/// # Errors
/// - `PixelCountMismatch` if `pixels.len() != width * height`
/// - `InvalidGeometry` if tile-major traversal is requested for an image that
///   is not a whole number of tiles
pub fn pack(
    pixels: &[u8],
    width: u32,
    height: u32,
    options: &PackOptions,
) -> Result<PackedBuffer, PackError> {
    match options.traversal {
        Traversal::RasterMajor => pack_raster(pixels, width, height, options.bit_depth),
        Traversal::TileMajor => {
            check_pixel_count(pixels, width, height)?;
            let geometry = geometry::plan(width, height, options.tile_width, options.tile_height)?;
            pack_tiles(pixels, &geometry, options.bit_depth)
        }
    }
}

pub fn pack_raster(
    pixels: &[u8],
    width: u32,
    height: u32,
    bit_depth: BitDepth,
) -> Result<PackedBuffer, PackError> {
    check_pixel_count(pixels, width, height)?;

    let packed = pack_sequence(pixels.iter().copied(), bit_depth);
    debug!(
        "Packed {}x{} bitmap at {} bpp into {} bytes",
        width,
        height,
        bit_depth.bits(),
        packed.body.len()
    );
    Ok(packed)
}

/// Packs a raster tile by tile using a geometry planned by the caller, so the
/// same geometry can also describe the output elsewhere.
pub fn pack_tiles(
    pixels: &[u8],
    geometry: &TileGeometry,
    bit_depth: BitDepth,
) -> Result<PackedBuffer, PackError> {
    let width = geometry.image_width();
    check_len(pixels, width, geometry.image_height(), geometry.pixel_count())?;

    let ordered: Vec<u8> = tile_order(width, geometry).map(|i| pixels[i]).collect();
    let packed = pack_sequence(ordered, bit_depth);
    debug!(
        "Packed {} tiles of {}x{} at {} bpp into {} bytes",
        geometry.tile_count,
        geometry.tile_width,
        geometry.tile_height,
        bit_depth.bits(),
        packed.body.len()
    );
    Ok(packed)
}

fn check_pixel_count(pixels: &[u8], width: u32, height: u32) -> Result<(), PackError> {
    check_len(pixels, width, height, width as usize * height as usize)
}

fn check_len(pixels: &[u8], width: u32, height: u32, expected: usize) -> Result<(), PackError> {
    if pixels.len() != expected {
        error!(
            "Pixel buffer holds {} indices, {}x{} needs {}",
            pixels.len(),
            width,
            height,
            expected
        );
        return Err(PackError::PixelCountMismatch {
            width,
            height,
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}
