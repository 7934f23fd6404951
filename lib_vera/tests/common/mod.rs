#![allow(dead_code)]

use lib_vera::{RasterImage, Rgb};

/// `len` gray levels, darkest first.
pub fn gray_palette(len: usize) -> Vec<Rgb> {
    (0..len)
        .map(|i| {
            let level = (i * 255 / len.max(1)) as u8;
            Rgb::new(level, level, level)
        })
        .collect()
}

/// A `width` x `height` image whose pixel at (x, y) is `(x + y) % modulo`.
pub fn diagonal(width: u32, height: u32, modulo: u8) -> Vec<u8> {
    (0..height)
        .flat_map(|y| (0..width).map(move |x| ((x + y) % modulo as u32) as u8))
        .collect()
}

/// Each pixel holds the number of the 8x8 tile it belongs to.
pub fn tile_numbers(width: u32, height: u32, tile: u32) -> Vec<u8> {
    let columns = width / tile;
    (0..height)
        .flat_map(|y| (0..width).map(move |x| ((y / tile) * columns + x / tile) as u8))
        .collect()
}

pub fn sample_image(width: u32, height: u32) -> RasterImage {
    RasterImage::new(
        width,
        height,
        diagonal(width, height, 16),
        Some(gray_palette(256)),
    )
}
