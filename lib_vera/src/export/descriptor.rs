use std::path::Path;

use log::info;

use super::{write_artifact, ExportError};
use crate::codec::geometry::TileGeometry;
use crate::constants::TRANSPARENT_COLOR;

/// A tileset document for the level editor, pointing at one external bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilesetDescriptor {
    pub name: String,
    pub tile_width: u32,
    pub tile_height: u32,
    pub tile_count: u32,
    pub columns: u32,
    pub source: String,
    pub transparent: String,
    pub image_width: u32,
    pub image_height: u32,
}

impl TilesetDescriptor {
    pub fn new(
        name: impl Into<String>,
        geometry: &TileGeometry,
        image_width: u32,
        image_height: u32,
        source: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            tile_width: geometry.tile_width,
            tile_height: geometry.tile_height,
            tile_count: geometry.tile_count,
            columns: geometry.columns,
            source: source.into(),
            transparent: TRANSPARENT_COLOR.to_string(),
            image_width,
            image_height,
        }
    }

    pub fn with_transparent(mut self, transparent: impl Into<String>) -> Self {
        self.transparent = transparent.into();
        self
    }

    pub fn to_xml(&self) -> String {
        format!(
            concat!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
                "<tileset name=\"{}\" tilewidth=\"{}\" tileheight=\"{}\" ",
                "tilecount=\"{}\" columns=\"{}\">\n",
                " <image source=\"{}\" trans=\"{}\" width=\"{}\" height=\"{}\"/>\n",
                "</tileset>\n",
            ),
            escape_attribute(&self.name),
            self.tile_width,
            self.tile_height,
            self.tile_count,
            self.columns,
            escape_attribute(&self.source),
            escape_attribute(&self.transparent),
            self.image_width,
            self.image_height
        )
    }
}

/// Writes `descriptor` as UTF-8 XML to `path`.
pub fn write_descriptor(path: &Path, descriptor: &TilesetDescriptor) -> Result<(), ExportError> {
    write_artifact(path, descriptor.to_xml().as_bytes())?;
    info!(
        "Wrote tileset descriptor {} ({} tiles)",
        path.display(),
        descriptor.tile_count
    );
    Ok(())
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}
