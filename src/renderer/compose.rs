//! Text-over-background compositing.

use ab_glyph::{FontRef, PxScale};
use image::{DynamicImage, ImageFormat, Rgba};
use imageproc::drawing::draw_text_mut;
use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::OnceLock;
use thiserror::Error;

use crate::store::records::DynamicField;

/// Embedded overlay font, so output does not depend on host fonts.
static FONT_BYTES: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// Fixed overlay text size in pixels.
const FONT_SIZE: f32 = 20.0;

/// Overlay text color (opaque black).
const TEXT_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Errors produced while rendering an artifact.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Background bytes could not be decoded into an image.
    #[error("Failed to decode background image: {0}")]
    Decode(image::ImageError),

    /// The composited raster could not be encoded as PNG.
    #[error("Failed to encode PNG: {0}")]
    Encode(image::ImageError),

    /// The embedded font failed to parse. Build-time defect, not input-driven.
    #[error("Embedded font is invalid: {0}")]
    Font(String),
}

fn overlay_font() -> Result<&'static FontRef<'static>, RenderError> {
    static FONT: OnceLock<Option<FontRef<'static>>> = OnceLock::new();
    FONT.get_or_init(|| FontRef::try_from_slice(FONT_BYTES).ok())
        .as_ref()
        .ok_or_else(|| RenderError::Font("DejaVuSans.ttf did not parse".to_string()))
}

/// Composite field values onto a background image and encode as PNG.
///
/// For each field, in list order, the matching value (empty string when the
/// caller supplied none) is drawn anchored at the field's `(x, y)` in a fixed
/// font and size. The input buffer is never mutated, the output is always
/// PNG regardless of the background's format, and identical inputs produce
/// byte-identical output.
pub fn render(
    background_bytes: &[u8],
    fields: &[DynamicField],
    values: &BTreeMap<String, String>,
) -> Result<Vec<u8>, RenderError> {
    let background = image::load_from_memory(background_bytes).map_err(RenderError::Decode)?;
    let mut canvas = background.to_rgba8();

    let font = overlay_font()?;
    let scale = PxScale::from(FONT_SIZE);

    for field in fields {
        let value = values.get(&field.name).map(String::as_str).unwrap_or("");
        draw_text_mut(
            &mut canvas,
            TEXT_COLOR,
            field.x,
            field.y,
            scale,
            font,
            value,
        );
    }

    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(canvas)
        .write_to(&mut out, ImageFormat::Png)
        .map_err(RenderError::Encode)?;

    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn background_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([240, 240, 220, 255]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn field(name: &str, x: i32, y: i32) -> DynamicField {
        DynamicField {
            name: name.to_string(),
            x,
            y,
        }
    }

    #[test]
    fn deterministic_output() {
        let bg = background_png(300, 200);
        let fields = vec![field("Nama Lengkap", 100, 50)];
        let values: BTreeMap<_, _> =
            [("Nama Lengkap".to_string(), "Jane Doe".to_string())].into();

        let a = render(&bg, &fields, &values).unwrap();
        let b = render(&bg, &fields, &values).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn missing_value_renders_empty_string() {
        let bg = background_png(100, 60);
        let fields = vec![field("Nama", 10, 20)];
        let values = BTreeMap::new();

        let rendered = render(&bg, &fields, &values).unwrap();
        // No overlay pixels were drawn, so the raster equals a fieldless render.
        let blank = render(&bg, &[], &values).unwrap();
        assert_eq!(rendered, blank);
    }

    #[test]
    fn overlay_changes_pixels() {
        let bg = background_png(300, 100);
        let fields = vec![field("Name", 20, 30)];
        let values: BTreeMap<_, _> = [("Name".to_string(), "Alice".to_string())].into();

        let rendered = render(&bg, &fields, &values).unwrap();
        let blank = render(&bg, &[], &values).unwrap();
        assert_ne!(rendered, blank);
    }

    #[test]
    fn jpeg_background_produces_png() {
        let img = RgbaImage::from_pixel(80, 40, Rgba([200, 180, 160, 255]));
        let mut jpeg = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .to_rgb8()
            .write_to(&mut jpeg, ImageFormat::Jpeg)
            .unwrap();

        let rendered = render(jpeg.get_ref(), &[], &BTreeMap::new()).unwrap();
        assert_eq!(
            image::guess_format(&rendered).unwrap(),
            ImageFormat::Png
        );
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let result = render(b"not an image", &[], &BTreeMap::new());
        assert!(matches!(result, Err(RenderError::Decode(_))));
    }

    #[test]
    fn input_buffer_untouched() {
        let bg = background_png(50, 50);
        let copy = bg.clone();
        let _ = render(&bg, &[], &BTreeMap::new()).unwrap();
        assert_eq!(bg, copy);
    }
}
