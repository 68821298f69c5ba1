//! Serialization of the rendered buffer. Export never re-runs the
//! pipeline: it encodes exactly the buffer it is handed.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbaImage};
use log::debug;

use crate::{RenderError, RenderResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "jpg" | "jpeg" => Some(ExportFormat::Jpeg),
            _ => None,
        }
    }
}

/// Default name for an exported file: `pixelized_<blockSize>px.<ext>`.
pub fn export_filename(block_size: u32, format: ExportFormat) -> String {
    format!("pixelized_{}px.{}", block_size, format.extension())
}

/// Encode the rendered buffer into an in-memory byte stream.
///
/// JPEG has no alpha channel, so the buffer is flattened to RGB first;
/// the background fill already happened during rendering. A failing
/// encoder aborts the export with a descriptive error and produces no
/// bytes at all.
pub fn encode(buffer: &RgbaImage, format: ExportFormat) -> RenderResult<Vec<u8>> {
    if buffer.width() == 0 || buffer.height() == 0 {
        return Err(RenderError::Export(format!(
            "{} encoding: buffer has no pixels",
            format.mime_type()
        )));
    }

    let mut bytes = Cursor::new(Vec::new());
    let result = match format {
        ExportFormat::Png => buffer.write_to(&mut bytes, ImageFormat::Png),
        ExportFormat::Jpeg => DynamicImage::ImageRgba8(buffer.clone())
            .to_rgb8()
            .write_to(&mut bytes, ImageFormat::Jpeg),
    };
    result.map_err(|e| RenderError::Export(format!("{} encoding: {e}", format.mime_type())))?;

    let bytes = bytes.into_inner();
    debug!(
        "encoded {}x{} buffer as {} ({} bytes)",
        buffer.width(),
        buffer.height(),
        format.mime_type(),
        bytes.len()
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::RenderError;

    fn checker(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        })
    }

    #[test]
    fn filename_follows_the_convention() {
        assert_eq!(export_filename(10, ExportFormat::Png), "pixelized_10px.png");
        assert_eq!(export_filename(42, ExportFormat::Jpeg), "pixelized_42px.jpg");
    }

    #[test]
    fn extension_lookup_is_case_insensitive() {
        assert_eq!(ExportFormat::from_extension("PNG"), Some(ExportFormat::Png));
        assert_eq!(ExportFormat::from_extension("jpeg"), Some(ExportFormat::Jpeg));
        assert_eq!(ExportFormat::from_extension("jpg"), Some(ExportFormat::Jpeg));
        assert_eq!(ExportFormat::from_extension("webp"), None);
    }

    #[test]
    fn png_roundtrips_the_buffer() {
        let buffer = checker(12, 8);
        let bytes = encode(&buffer, ExportFormat::Png).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.to_rgba8().as_raw(), buffer.as_raw());
    }

    #[test]
    fn jpeg_encodes_despite_the_alpha_channel() {
        let buffer = checker(12, 8);
        let bytes = encode(&buffer, ExportFormat::Jpeg).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 12);
        assert_eq!(decoded.height(), 8);
    }

    #[test]
    fn unencodable_buffer_is_an_error_not_a_panic() {
        // encoders reject zero-sized images; the failure must surface as a
        // descriptive export error and leave no partial output behind
        let empty = RgbaImage::new(0, 0);
        let err = encode(&empty, ExportFormat::Png).unwrap_err();
        assert!(matches!(err, RenderError::Export(_)));
        assert!(err.to_string().contains("re-load the source image"));
    }
}
