use image::{DynamicImage, RgbaImage};

/// Dimensions of the downsampled buffer whose pixels become the flat
/// blocks of the output: the source dimensions divided by the block size,
/// clamped to at least 1x1.
pub fn intermediate_dimensions(width: u32, height: u32, block_size: u32) -> (u32, u32) {
    let block = block_size.max(1);
    ((width / block).max(1), (height / block).max(1))
}

pub trait Pixelizer {
    fn pixelize(
        &self,
        img: &DynamicImage,
        block_size: u32,
        out_width: u32,
        out_height: u32,
    ) -> RgbaImage;
}

pub mod block;
