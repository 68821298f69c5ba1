use image::{imageops::FilterType, DynamicImage, RgbaImage};
use log::debug;

use super::{intermediate_dimensions, Pixelizer};

/// Two-pass block pixelizer: shrink the source so that each block becomes
/// a single pixel, then stretch the result back up without smoothing.
pub struct BlockPixelizer;

impl Pixelizer for BlockPixelizer {
    fn pixelize(
        &self,
        img: &DynamicImage,
        block_size: u32,
        out_width: u32,
        out_height: u32,
    ) -> RgbaImage {
        let out_width = out_width.max(1);
        let out_height = out_height.max(1);
        if img.width() == 0 || img.height() == 0 {
            // Resampling an empty source is undefined; hand back a blank buffer.
            return RgbaImage::new(out_width, out_height);
        }

        let (small_w, small_h) = intermediate_dimensions(img.width(), img.height(), block_size);
        debug!(
            "pixelize {}x{} -> {}x{} blocks -> {}x{} output",
            img.width(),
            img.height(),
            small_w,
            small_h,
            out_width,
            out_height
        );

        // The smoothed downscale is what picks the representative color of
        // each block; the nearest-neighbor upscale keeps the edges hard.
        let small = img.resize_exact(small_w, small_h, FilterType::Triangle);
        small
            .resize_exact(out_width, out_height, FilterType::Nearest)
            .to_rgba8()
    }
}
