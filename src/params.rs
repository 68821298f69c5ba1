use image::Rgba;

use crate::{RenderError, RenderResult};

/// Everything a render pass needs besides the source image.
///
/// The fields are private so the grid-step binding cannot be broken from
/// the outside: while `bind_grid_to_block` is set, every block-size update
/// propagates to the grid step, and manual step edits are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParameters {
    block_size: u32,
    scale: f32,
    grid_enabled: bool,
    grid_step: u32,
    bind_grid_to_block: bool,
    grid_color: Rgba<u8>,
    grid_opacity: f32,
    background_color: Rgba<u8>,
}

impl Default for RenderParameters {
    fn default() -> Self {
        Self {
            block_size: 10,
            scale: 1.0,
            grid_enabled: true,
            grid_step: 10,
            bind_grid_to_block: true,
            grid_color: Rgba([0, 0, 0, 255]),
            grid_opacity: 0.5,
            background_color: Rgba([255, 255, 255, 255]),
        }
    }
}

impl RenderParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn grid_enabled(&self) -> bool {
        self.grid_enabled
    }

    pub fn grid_step(&self) -> u32 {
        self.grid_step
    }

    pub fn bind_grid_to_block(&self) -> bool {
        self.bind_grid_to_block
    }

    pub fn grid_color(&self) -> Rgba<u8> {
        self.grid_color
    }

    pub fn grid_opacity(&self) -> f32 {
        self.grid_opacity
    }

    pub fn background_color(&self) -> Rgba<u8> {
        self.background_color
    }

    /// Side length of one block, in source pixels. Clamped to >= 1.
    /// While the grid is bound, the grid step follows.
    pub fn set_block_size(&mut self, px: u32) {
        self.block_size = px.max(1);
        if self.bind_grid_to_block {
            self.grid_step = self.block_size;
        }
    }

    /// Multiplier applied to the native output dimensions. Values at or
    /// below zero are accepted; the render pass clamps the resulting
    /// dimensions to 1x1.
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    pub fn set_grid_enabled(&mut self, enabled: bool) {
        self.grid_enabled = enabled;
    }

    /// Grid spacing in pre-scale pixels, clamped to >= 1. Ignored while
    /// the step is bound to the block size.
    pub fn set_grid_step(&mut self, px: u32) {
        if !self.bind_grid_to_block {
            self.grid_step = px.max(1);
        }
    }

    /// Binding is one-directional: turning it on forces the grid step to
    /// the current block size, turning it off freezes the step at its
    /// current value.
    pub fn set_bind_grid_to_block(&mut self, bind: bool) {
        self.bind_grid_to_block = bind;
        if bind {
            self.grid_step = self.block_size;
        }
    }

    pub fn set_grid_color(&mut self, color: Rgba<u8>) {
        self.grid_color = color;
    }

    /// Stored as given; the overlay pass clamps to [0, 1] at draw time.
    pub fn set_grid_opacity(&mut self, opacity: f32) {
        self.grid_opacity = opacity;
    }

    pub fn set_background_color(&mut self, color: Rgba<u8>) {
        self.background_color = color;
    }
}

/// Parse a `#rrggbb` hex color (the leading `#` is optional) into an
/// opaque RGBA pixel.
pub fn parse_hex_color(s: &str) -> RenderResult<Rgba<u8>> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(RenderError::InvalidColor(s.to_string()));
    }
    let channel = |range| {
        u8::from_str_radix(&hex[range], 16).map_err(|_| RenderError::InvalidColor(s.to_string()))
    };
    Ok(Rgba([channel(0..2)?, channel(2..4)?, channel(4..6)?, 255]))
}
