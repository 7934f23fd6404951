pub mod format;
pub mod render;
pub mod source;

pub use format::RasterImage;
pub use render::render_bitmap;
pub use source::{IndexedSource, SourceError};
