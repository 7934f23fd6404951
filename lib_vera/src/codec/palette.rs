use log::{debug, error};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{FILE_HEADER, HEADER_SIZE, MAX_PALETTE_ENTRIES, PALETTE_ENTRY_SIZE};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PaletteError {
    #[error("Cannot rotate an empty palette")]
    EmptyPalette,
    #[error("Palette has {0} entries, the chip holds at most 256")]
    PaletteTooLarge(usize),
    #[error("Palette bank size must be non-zero")]
    ZeroBankSize,
}

/// One 24-bit color map entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// The chip's 12-bit color register layout: `[G:B, 0:R]`, top nibbles only.
    pub fn to_packed(self) -> [u8; PALETTE_ENTRY_SIZE] {
        [(self.g & 0xF0) | (self.b >> 4), self.r >> 4]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(color: Rgb) -> Self {
        [color.r, color.g, color.b]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedPalette {
    pub entries: Vec<[u8; PALETTE_ENTRY_SIZE]>,
}

impl PackedPalette {
    pub fn len(&self) -> usize {
        HEADER_SIZE + self.entries.len() * PALETTE_ENTRY_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.len());
        bytes.extend_from_slice(&FILE_HEADER);
        for entry in &self.entries {
            bytes.extend_from_slice(entry);
        }
        bytes
    }
}

/// Reduces a 24-bit color table to packed 12-bit entries, keeping the order.
///
/// # Errors
/// - `PaletteTooLarge` if the table has more than 256 entries
pub fn pack_palette(entries: &[Rgb]) -> Result<PackedPalette, PaletteError> {
    if entries.len() > MAX_PALETTE_ENTRIES {
        error!(
            "Palette size {} exceeds the maximum allowed limit of {} colors",
            entries.len(),
            MAX_PALETTE_ENTRIES
        );
        return Err(PaletteError::PaletteTooLarge(entries.len()));
    }

    let packed = PackedPalette {
        entries: entries.iter().map(|color| color.to_packed()).collect(),
    };
    debug!("Packed {} palette entries", packed.entries.len());
    Ok(packed)
}

/// Cyclic rotation: `result[i] = entries[(i + offset) % len]`.
///
/// # Errors
/// - `EmptyPalette` if `entries` is empty
pub fn rotate_palette(entries: &[Rgb], offset: usize) -> Result<Vec<Rgb>, PaletteError> {
    if entries.is_empty() {
        error!("Palette rotation requested on an empty palette");
        return Err(PaletteError::EmptyPalette);
    }

    let mut rotated = entries.to_vec();
    rotated.rotate_left(offset % entries.len());
    Ok(rotated)
}

/// Rotation offsets that put each bank of `bank_size` entries at index 0.
pub fn bank_offsets(bank_size: usize, bank_count: usize) -> Result<Vec<usize>, PaletteError> {
    if bank_size == 0 {
        return Err(PaletteError::ZeroBankSize);
    }
    Ok((0..bank_count).map(|bank| bank * bank_size).collect())
}
