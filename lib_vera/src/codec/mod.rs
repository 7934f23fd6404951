pub mod geometry;
pub mod packer;
pub mod palette;

pub use geometry::GeometryError;
pub use packer::PackError;
pub use palette::PaletteError;
