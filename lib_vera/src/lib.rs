pub mod codec;
pub mod constants;
pub mod export;
pub mod image;

use log::*;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

pub use crate::codec::geometry::{plan, TileGeometry};
pub use crate::codec::packer::{pack, BitDepth, PackOptions, PackedBuffer, Traversal};
pub use crate::codec::palette::{pack_palette, rotate_palette, PackedPalette, Rgb};
pub use crate::export::writer::{AssetWriter, ExportConfig, ExportMode, ExportPlan, ExportReport};
pub use crate::export::ExportError;
pub use crate::image::{IndexedSource, RasterImage};

/// Sets up `env_logger` for the library's records.
///
/// With `Some(path)` records go to that file, otherwise to stderr.
/// `RUST_LOG` still overrides the default `lib_vera=info` filter.
pub fn init_logging(log_file: Option<&Path>) -> io::Result<()> {
    let mut builder = env_logger::Builder::new();
    builder
        .filter(None, LevelFilter::Warn)
        .filter(Some("lib_vera"), LevelFilter::Info);

    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }

    if let Some(path) = log_file {
        let target = Box::new(File::create(path)?);
        builder.target(env_logger::Target::Pipe(target));
    }

    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}:{}] {}",
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .try_init()
        .map_err(|err| io::Error::new(io::ErrorKind::AlreadyExists, err))
}
