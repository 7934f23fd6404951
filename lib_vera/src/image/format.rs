use crate::codec::palette::Rgb;

/// An indexed raster handed over by the host: one byte per pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub palette: Option<Vec<Rgb>>,
}

impl RasterImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>, palette: Option<Vec<Rgb>>) -> Self {
        Self {
            width,
            height,
            pixels,
            palette,
        }
    }

    pub fn palette_size(&self) -> usize {
        self.palette.as_ref().map_or(0, Vec::len)
    }

    /// First pixel that does not address an entry of the palette, if any.
    pub fn first_unmapped_index(&self) -> Option<(usize, u8)> {
        let palette = self.palette.as_ref()?;
        self.pixels
            .iter()
            .position(|&index| index as usize >= palette.len())
            .map(|position| (position, self.pixels[position]))
    }
}
