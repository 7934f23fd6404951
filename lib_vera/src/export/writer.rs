use std::path::{Path, PathBuf};

use ::image::ImageFormat;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use super::descriptor::{write_descriptor, TilesetDescriptor};
use super::{with_suffix, write_artifact, ExportError};
use crate::codec::geometry::{self, TileGeometry};
use crate::codec::packer::{self, BitDepth, PackOptions, Traversal};
use crate::codec::palette::{self, Rgb};
use crate::constants::{
    BITMAP_EXT, DEFAULT_BANK_COUNT, DEFAULT_BANK_SIZE, DESCRIPTOR_EXT, PALETTE_EXT,
    TRANSPARENT_COLOR,
};
use crate::image::render::{bitmap_format, encode_bitmap, render_bitmap};
use crate::image::{IndexedSource, RasterImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExportMode {
    /// Tile-major binary, one tile after another.
    #[default]
    TileSheet,
    /// Raster-major binary of the whole image.
    Bitmap,
}

impl ExportMode {
    pub fn traversal(self) -> Traversal {
        match self {
            ExportMode::TileSheet => Traversal::TileMajor,
            ExportMode::Bitmap => Traversal::RasterMajor,
        }
    }
}

/// Which artifacts one export produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPlan {
    pub mode: ExportMode,
    pub emit_binary: bool,
    pub emit_palette: bool,
    pub emit_descriptor: bool,
}

impl Default for ExportPlan {
    fn default() -> Self {
        Self {
            mode: ExportMode::TileSheet,
            emit_binary: true,
            emit_palette: true,
            emit_descriptor: false,
        }
    }
}

/// Settings that outlive a single export; persisted by the host, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    pub bank_size: usize,
    pub bank_count: usize,
    pub transparent: String,
    pub bitmap_extension: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            bank_size: DEFAULT_BANK_SIZE,
            bank_count: DEFAULT_BANK_COUNT,
            transparent: TRANSPARENT_COLOR.to_string(),
            bitmap_extension: BITMAP_EXT.to_string(),
        }
    }
}

/// Files written by one export, in write order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub written: Vec<PathBuf>,
    pub geometry: Option<TileGeometry>,
}

impl ExportReport {
    fn record(&mut self, path: PathBuf) {
        self.written.push(path);
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssetWriter {
    config: ExportConfig,
}

impl AssetWriter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// [`AssetWriter::export`] for any host image.
    pub fn export_source(
        &self,
        source: &dyn IndexedSource,
        options: &PackOptions,
        plan: &ExportPlan,
        base_path: &Path,
    ) -> Result<ExportReport, ExportError> {
        self.export(&source.to_raster(), options, plan, base_path)
    }

    /// Encodes `image` and writes every artifact `plan` asks for next to
    /// `base_path`.
    ///
    /// The first failure stops the export; files already written stay on disk.
    pub fn export(
        &self,
        image: &RasterImage,
        options: &PackOptions,
        plan: &ExportPlan,
        base_path: &Path,
    ) -> Result<ExportReport, ExportError> {
        info!(
            "Exporting {}x{} image to {} ({:?}, {} bpp)",
            image.width,
            image.height,
            base_path.display(),
            plan.mode,
            options.bit_depth.bits()
        );
        if options.traversal != plan.mode.traversal() {
            debug!(
                "Export mode {:?} overrides {:?} traversal",
                plan.mode, options.traversal
            );
        }

        check_indices(image, options.bit_depth)?;

        let format = if plan.emit_descriptor {
            Some(self.bitmap_format(base_path)?)
        } else {
            None
        };

        let mut report = ExportReport::default();

        // Planned once; the tile binary and the descriptors share it.
        let geometry = if plan.mode == ExportMode::TileSheet || plan.emit_descriptor {
            Some(geometry::plan(
                image.width,
                image.height,
                options.tile_width,
                options.tile_height,
            )?)
        } else {
            None
        };
        report.geometry = geometry;

        let packed = match (plan.mode, geometry.as_ref()) {
            (ExportMode::TileSheet, Some(geometry)) => {
                packer::pack_tiles(&image.pixels, geometry, options.bit_depth)?
            }
            _ => packer::pack_raster(&image.pixels, image.width, image.height, options.bit_depth)?,
        };
        if plan.emit_binary {
            write_artifact(base_path, &packed.to_bytes())?;
            info!(
                "Wrote {} ({} bytes, {} pixels)",
                base_path.display(),
                packed.len(),
                packed.pixel_count
            );
            report.record(base_path.to_path_buf());
        }

        if plan.emit_palette {
            match image.palette.as_deref() {
                Some(entries) => {
                    let path = with_suffix(base_path, PALETTE_EXT);
                    self.write_palette(&path, entries)?;
                    report.record(path);
                }
                None => warn!("No color map present, skipping palette output"),
            }
        }

        if let (Some(format), Some(geometry)) = (format, geometry) {
            if options.bit_depth == BitDepth::Four {
                self.write_banks(image, &geometry, format, plan, base_path, &mut report)?;
            } else {
                self.write_single_tileset(image, &geometry, format, base_path, &mut report)?;
            }
        }

        info!(
            "Export to {} finished, {} files written",
            base_path.display(),
            report.written.len()
        );
        Ok(report)
    }

    fn bitmap_format(&self, base_path: &Path) -> Result<ImageFormat, ExportError> {
        let extension = self.config.bitmap_extension.as_str();
        bitmap_format(extension).map_err(|source| {
            error!("No bitmap encoder for extension {:?}", extension);
            ExportError::Render {
                path: with_suffix(base_path, extension),
                source,
            }
        })
    }

    fn write_palette(&self, path: &Path, entries: &[Rgb]) -> Result<(), ExportError> {
        let packed = palette::pack_palette(entries)?;
        write_artifact(path, &packed.to_bytes())?;
        info!(
            "Wrote palette {} ({} entries)",
            path.display(),
            packed.entries.len()
        );
        Ok(())
    }

    fn write_bitmap(
        &self,
        image: &RasterImage,
        bitmap_path: &Path,
        format: ImageFormat,
        entries: Option<&[Rgb]>,
        report: &mut ExportReport,
    ) -> Result<(), ExportError> {
        let Some(entries) = entries else {
            warn!(
                "No color map present, {} is not rendered",
                bitmap_path.display()
            );
            return Ok(());
        };

        let bitmap = render_bitmap(image, entries);
        let bytes = encode_bitmap(&bitmap, format).map_err(|source| {
            error!("Failed to render {}: {}", bitmap_path.display(), source);
            ExportError::Render {
                path: bitmap_path.to_path_buf(),
                source,
            }
        })?;
        write_artifact(bitmap_path, &bytes)?;
        report.record(bitmap_path.to_path_buf());
        Ok(())
    }

    fn write_tileset(
        &self,
        geometry: &TileGeometry,
        descriptor_path: &Path,
        bitmap_path: &Path,
        report: &mut ExportReport,
    ) -> Result<(), ExportError> {
        let descriptor = TilesetDescriptor::new(
            file_stem(descriptor_path),
            geometry,
            geometry.image_width(),
            geometry.image_height(),
            file_name(bitmap_path),
        )
        .with_transparent(self.config.transparent.as_str());
        write_descriptor(descriptor_path, &descriptor)?;
        report.record(descriptor_path.to_path_buf());
        Ok(())
    }

    fn write_single_tileset(
        &self,
        image: &RasterImage,
        geometry: &TileGeometry,
        format: ImageFormat,
        base_path: &Path,
        report: &mut ExportReport,
    ) -> Result<(), ExportError> {
        let descriptor_path = with_suffix(base_path, DESCRIPTOR_EXT);
        let bitmap_path = with_suffix(base_path, &self.config.bitmap_extension);
        self.write_bitmap(image, &bitmap_path, format, image.palette.as_deref(), report)?;
        self.write_tileset(geometry, &descriptor_path, &bitmap_path, report)
    }

    /// One bitmap and descriptor per palette bank, bank 0 first.
    fn write_banks(
        &self,
        image: &RasterImage,
        geometry: &TileGeometry,
        format: ImageFormat,
        plan: &ExportPlan,
        base_path: &Path,
        report: &mut ExportReport,
    ) -> Result<(), ExportError> {
        let entries = image.palette.as_deref().unwrap_or_default();
        let offsets = palette::bank_offsets(self.config.bank_size, self.config.bank_count)?;
        debug!(
            "Writing {} palette banks of {} entries",
            offsets.len(),
            self.config.bank_size
        );

        for (bank, offset) in offsets.into_iter().enumerate() {
            let rotated = palette::rotate_palette(entries, offset)?;

            if plan.emit_palette {
                let palette_path = with_suffix(base_path, &format!("{}.{}", bank, PALETTE_EXT));
                self.write_palette(&palette_path, &rotated)?;
                report.record(palette_path);
            }

            let descriptor_path = with_suffix(base_path, &format!("{}.{}", bank, DESCRIPTOR_EXT));
            let bitmap_path = with_suffix(
                base_path,
                &format!("{}.{}", bank, self.config.bitmap_extension),
            );
            self.write_bitmap(image, &bitmap_path, format, Some(&rotated), report)?;
            self.write_tileset(geometry, &descriptor_path, &bitmap_path, report)?;
        }
        Ok(())
    }
}

/// Rejects indices the packer would silently corrupt.
fn check_indices(image: &RasterImage, bit_depth: BitDepth) -> Result<(), ExportError> {
    let max_index = bit_depth.max_index();
    if let Some(position) = image.pixels.iter().position(|&index| index > max_index) {
        let index = image.pixels[position];
        error!(
            "Pixel #{} uses index {}, more than {} bpp can hold",
            position,
            index,
            bit_depth.bits()
        );
        return Err(ExportError::IndexOutOfRange {
            position,
            index,
            bits: bit_depth.bits(),
        });
    }

    if let Some((position, index)) = image.first_unmapped_index() {
        error!(
            "Pixel #{} uses index {} outside the {}-entry palette",
            position,
            index,
            image.palette_size()
        );
        return Err(ExportError::UnmappedIndex {
            position,
            index,
            palette_size: image.palette_size(),
        });
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
