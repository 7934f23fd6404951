/// Every binary asset starts with this placeholder (the loader's address word).
pub const FILE_HEADER: [u8; 2] = [0x00, 0x00];
pub const HEADER_SIZE: usize = FILE_HEADER.len();

pub const PALETTE_EXT: &str = "PAL";
pub const DESCRIPTOR_EXT: &str = "tsx";
pub const BITMAP_EXT: &str = "png";

/// Largest color map the chip's palette RAM can hold.
pub const MAX_PALETTE_ENTRIES: usize = 256;
pub const PALETTE_ENTRY_SIZE: usize = 2;

pub const DEFAULT_BANK_SIZE: usize = 16;
pub const DEFAULT_BANK_COUNT: usize = 16;

pub const TRANSPARENT_COLOR: &str = "000000";

pub const TILE_SIZES: [u32; 4] = [8, 16, 32, 64];
