use image::{imageops, DynamicImage, RgbaImage};

use crate::grid;
use crate::params::RenderParameters;
use crate::pixelizer::{block::BlockPixelizer, Pixelizer};

/// Size of the surface rendered while no image is loaded.
pub const EMPTY_SURFACE_WIDTH: u32 = 300;
pub const EMPTY_SURFACE_HEIGHT: u32 = 150;

/// Output buffer dimensions: the source dimensions scaled by the export
/// factor, floored, clamped to at least 1x1.
pub fn output_dimensions(width: u32, height: u32, scale: f32) -> (u32, u32) {
    (
        ((width as f32 * scale).floor() as u32).max(1),
        ((height as f32 * scale).floor() as u32).max(1),
    )
}

/// Run the full pipeline on a fresh buffer: background fill, block
/// pixelization, grid overlay. Every call recomputes everything from the
/// original source; nothing is carried over between calls.
///
/// With no source image, only the background fill happens, on a surface
/// of the default empty size. That is the "no image loaded" state, not an
/// error.
pub fn render(source: Option<&DynamicImage>, params: &RenderParameters) -> RgbaImage {
    let Some(img) = source else {
        return RgbaImage::from_pixel(
            EMPTY_SURFACE_WIDTH,
            EMPTY_SURFACE_HEIGHT,
            params.background_color(),
        );
    };

    let (out_width, out_height) = output_dimensions(img.width(), img.height(), params.scale());
    let mut output = RgbaImage::from_pixel(out_width, out_height, params.background_color());

    if img.width() > 0 && img.height() > 0 {
        let pixelized = BlockPixelizer.pixelize(img, params.block_size(), out_width, out_height);
        imageops::overlay(&mut output, &pixelized, 0, 0);
    }

    grid::overlay(&mut output, params);
    output
}
