use image::{Pixel, Rgba, RgbaImage};

use crate::params::RenderParameters;

/// Grid spacing in output space. The raw step is defined pre-scale and
/// has to follow the export scale, otherwise the lines drift off the
/// block edges.
pub fn effective_step(grid_step: u32, scale: f32) -> u32 {
    ((grid_step as f32 * scale).floor() as u32).max(1)
}

/// Line positions along one axis: every multiple of `step` from 0 up to
/// and including `extent`. The line sitting on the far edge is clipped by
/// the buffer, but it still counts: `extent / step + 1` positions.
pub fn line_positions(extent: u32, step: u32) -> impl Iterator<Item = u32> {
    (0..=extent).step_by(step.max(1) as usize)
}

/// Draw the grid over an already pixelized buffer, in place. Does nothing
/// unless the grid is enabled.
///
/// Lines are one pixel wide and centered at half-pixel offsets, so a line
/// at position `x` covers exactly the pixel column `x`. Opacity is
/// clamped to [0, 1] here, at draw time, and applied uniformly to the
/// whole pass through alpha blending.
pub fn overlay(buffer: &mut RgbaImage, params: &RenderParameters) {
    if !params.grid_enabled() {
        return;
    }

    let (width, height) = buffer.dimensions();
    let step = effective_step(params.grid_step(), params.scale());
    let alpha = (params.grid_opacity().clamp(0.0, 1.0) * 255.0).round() as u8;
    if alpha == 0 {
        return;
    }
    let Rgba([r, g, b, _]) = params.grid_color();
    let color = Rgba([r, g, b, alpha]);

    for x in line_positions(width, step) {
        if x >= width {
            continue;
        }
        for y in 0..height {
            buffer.get_pixel_mut(x, y).blend(&color);
        }
    }
    for y in line_positions(height, step) {
        if y >= height {
            continue;
        }
        for x in 0..width {
            buffer.get_pixel_mut(x, y).blend(&color);
        }
    }
}

#[cfg(test)]
mod tests {
    use image::{Pixel, Rgba, RgbaImage};

    use super::*;
    use crate::params::RenderParameters;

    fn gray_buffer(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([128, 128, 128, 255]))
    }

    fn grid_params() -> RenderParameters {
        let mut params = RenderParameters::new();
        params.set_bind_grid_to_block(false);
        params
    }

    #[test]
    fn counts_one_line_per_step_plus_the_origin() {
        assert_eq!(line_positions(100, 10).count(), 11);
        assert_eq!(line_positions(105, 10).count(), 11);
        assert_eq!(line_positions(9, 10).count(), 1);
        assert_eq!(line_positions(0, 10).count(), 1);
    }

    #[test]
    fn step_scales_with_the_output() {
        assert_eq!(effective_step(10, 1.0), 10);
        assert_eq!(effective_step(10, 2.0), 20);
        assert_eq!(effective_step(10, 0.25), 2);
        // never collapses below a single pixel
        assert_eq!(effective_step(10, 0.01), 1);
        assert_eq!(effective_step(3, 0.0), 1);
    }

    #[test]
    fn draws_lines_on_step_columns_and_rows() {
        let mut buffer = gray_buffer(20, 20);
        let mut params = grid_params();
        params.set_grid_step(5);
        params.set_grid_opacity(1.0);
        overlay(&mut buffer, &params);

        // full opacity: line pixels take the grid color exactly
        assert_eq!(*buffer.get_pixel(0, 3), Rgba([0, 0, 0, 255]));
        assert_eq!(*buffer.get_pixel(5, 3), Rgba([0, 0, 0, 255]));
        assert_eq!(*buffer.get_pixel(3, 10), Rgba([0, 0, 0, 255]));
        // off-grid pixels keep the base color
        assert_eq!(*buffer.get_pixel(3, 3), Rgba([128, 128, 128, 255]));
    }

    #[test]
    fn disabled_grid_leaves_the_buffer_untouched() {
        let mut buffer = gray_buffer(16, 16);
        let untouched = buffer.clone();
        let mut params = grid_params();
        params.set_grid_enabled(false);
        params.set_grid_step(4);
        params.set_grid_opacity(1.0);
        overlay(&mut buffer, &params);
        assert_eq!(buffer.as_raw(), untouched.as_raw());
    }

    #[test]
    fn zero_opacity_draws_nothing() {
        let mut buffer = gray_buffer(16, 16);
        let untouched = buffer.clone();
        let mut params = grid_params();
        params.set_grid_opacity(0.0);
        overlay(&mut buffer, &params);
        assert_eq!(buffer.as_raw(), untouched.as_raw());
    }

    #[test]
    fn out_of_range_opacity_clamps_at_draw_time() {
        let mut over = gray_buffer(8, 8);
        let mut params = grid_params();
        params.set_grid_step(4);
        params.set_grid_opacity(3.5);
        overlay(&mut over, &params);

        let mut full = gray_buffer(8, 8);
        params.set_grid_opacity(1.0);
        overlay(&mut full, &params);

        assert_eq!(over.as_raw(), full.as_raw());
    }

    #[test]
    fn partial_opacity_blends_instead_of_overwriting() {
        let mut buffer = gray_buffer(8, 8);
        let mut params = grid_params();
        params.set_grid_step(4);
        params.set_grid_opacity(0.5);
        overlay(&mut buffer, &params);

        let mut expected = Rgba([128, 128, 128, 255]);
        expected.blend(&Rgba([0, 0, 0, 128]));
        assert_eq!(*buffer.get_pixel(0, 1), expected);
        // untouched between the lines
        assert_eq!(*buffer.get_pixel(2, 1), Rgba([128, 128, 128, 255]));
    }

    #[test]
    fn edge_line_is_clipped_not_wrapped() {
        // width 10, step 5: positions 0, 5, 10 -- the last one is off-buffer
        let mut buffer = gray_buffer(10, 10);
        let mut params = grid_params();
        params.set_grid_step(5);
        params.set_grid_opacity(1.0);
        overlay(&mut buffer, &params);
        assert_eq!(*buffer.get_pixel(9, 3), Rgba([128, 128, 128, 255]));
    }
}
