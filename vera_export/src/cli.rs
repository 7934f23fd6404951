use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use lib_vera::{BitDepth, ExportMode, PackOptions};

use crate::filemanager::HostError;
use crate::settings::Settings;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Tile-major tile sheet
    Tiles,
    /// Raster-major full bitmap
    Bitmap,
}

impl From<ModeArg> for ExportMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Tiles => ExportMode::TileSheet,
            ModeArg::Bitmap => ExportMode::Bitmap,
        }
    }
}

/// Options left out fall back to the saved settings, then to the defaults.
#[derive(Parser, Debug)]
#[command(name = "vera-export")]
#[command(about = "Export indexed images as VERA tile/bitmap, palette and tileset files", long_about = None)]
pub struct Cli {
    /// Image to export
    pub input: PathBuf,

    /// Base path of the outputs (defaults to the input with a .bin extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Bits per pixel: 1, 2, 4 or 8
    #[arg(short, long)]
    pub depth: Option<u8>,

    /// Tile width: 8, 16, 32 or 64
    #[arg(long)]
    pub tile_width: Option<u32>,

    /// Tile height: 8, 16, 32 or 64
    #[arg(long)]
    pub tile_height: Option<u32>,

    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Write the packed tile/bitmap binary
    #[arg(long, value_name = "BOOL")]
    pub binary: Option<bool>,

    /// Write the .PAL palette
    #[arg(long, value_name = "BOOL")]
    pub palette: Option<bool>,

    /// Write .tsx tileset descriptors (one per palette bank at 4 bpp)
    #[arg(long, value_name = "BOOL")]
    pub descriptor: Option<bool>,

    /// Entries per palette bank for banked descriptors
    #[arg(long)]
    pub bank_size: Option<usize>,

    /// Load last used options from this file and save the final ones back
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Write log records to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.input.with_extension("bin"))
    }

    /// Layers the command line over `saved`.
    pub fn apply(&self, saved: Settings) -> Result<Settings, HostError> {
        let mut settings = saved;

        let bit_depth = match self.depth {
            Some(bits) => BitDepth::try_from(bits)?,
            None => settings.options.bit_depth,
        };
        let mode: ExportMode = self.mode.map_or(settings.plan.mode, ExportMode::from);

        settings.options = PackOptions::new(
            bit_depth.bits(),
            self.tile_width.unwrap_or(settings.options.tile_width),
            self.tile_height.unwrap_or(settings.options.tile_height),
            mode.traversal(),
        )?;
        settings.plan.mode = mode;

        if let Some(binary) = self.binary {
            settings.plan.emit_binary = binary;
        }
        if let Some(palette) = self.palette {
            settings.plan.emit_palette = palette;
        }
        if let Some(descriptor) = self.descriptor {
            settings.plan.emit_descriptor = descriptor;
        }
        if let Some(bank_size) = self.bank_size {
            settings.config.bank_size = bank_size;
        }

        Ok(settings)
    }
}
