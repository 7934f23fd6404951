use std::io::Cursor;

use ::image::error::{ImageFormatHint, UnsupportedError};
use ::image::{ImageError, ImageFormat, ImageResult, Rgb as RgbPixel, RgbImage};
use log::debug;

use super::format::RasterImage;
use crate::codec::palette::Rgb;

/// Expands the index raster through `palette`. Indices past the end of the
/// palette render as black, the descriptor's transparent color.
pub fn render_bitmap(image: &RasterImage, palette: &[Rgb]) -> RgbImage {
    let width = image.width;
    RgbImage::from_fn(image.width, image.height, |x, y| {
        let index = image.pixels[(y * width + x) as usize] as usize;
        let color = palette.get(index).copied().unwrap_or_default();
        RgbPixel(color.into())
    })
}

/// Image format for a bitmap file extension such as `png` or `bmp`.
pub fn bitmap_format(extension: &str) -> ImageResult<ImageFormat> {
    ImageFormat::from_extension(extension).ok_or_else(|| {
        ImageError::Unsupported(UnsupportedError::from(ImageFormatHint::Name(
            extension.to_string(),
        )))
    })
}

/// File contents of a [`render_bitmap`] result in `format`.
pub fn encode_bitmap(bitmap: &RgbImage, format: ImageFormat) -> ImageResult<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    bitmap.write_to(&mut cursor, format)?;
    let bytes = cursor.into_inner();
    debug!(
        "Encoded {}x{} bitmap as {:?} ({} bytes)",
        bitmap.width(),
        bitmap.height(),
        format,
        bytes.len()
    );
    Ok(bytes)
}
