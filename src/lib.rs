//! Turn an image into blocky pixel art: downsample it into coarse blocks,
//! redraw it at full resolution with hard edges, and optionally overlay a
//! counting grid whose step can be bound to the block size.

mod params;
mod pixelizer;
mod render;

pub mod export;
pub mod grid;

pub use params::{parse_hex_color, RenderParameters};
pub use pixelizer::block::BlockPixelizer;
pub use pixelizer::{intermediate_dimensions, Pixelizer};
pub use render::{output_dimensions, render, EMPTY_SURFACE_HEIGHT, EMPTY_SURFACE_WIDTH};

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("invalid color {0:?}: expected a hex color like #rrggbb")]
    InvalidColor(String),
    #[error("export failed: {0}; re-load the source image and try again")]
    Export(String),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
