//! Sequence-number watermarks.
//!
//! Each image gets a label `图N` (N counted from 1) near its top-left corner,
//! drawn over a half-transparent shadow offset one pixel down and right.

use ab_glyph::PxScale;
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, Blend};
use imageproc::rect::Rect;
use image::RgbaImage;

use crate::core::config::{WatermarkConfig, MAX_FONT_SIZE};
use crate::core::types::{CanonicalImage, Color};
use crate::pipeline::font::{bitmap_glyph, WatermarkFont};

/// Label stamped onto the image at 0-based `index`.
pub fn label_for(index: usize) -> String {
    format!("图{}", index + 1)
}

/// Stamp every image when the watermark is enabled.
///
/// When disabled the input vector is returned as is.
pub fn stamp_all(
    images: Vec<CanonicalImage>,
    config: &WatermarkConfig,
    font: &WatermarkFont,
) -> Vec<CanonicalImage> {
    if !config.enabled {
        return images;
    }

    log::debug!(
        "Stamping {} image(s) in {} with {:?}",
        images.len(),
        config.color,
        font
    );
    images
        .into_iter()
        .enumerate()
        .map(|(index, image)| stamp(image, index, config, font))
        .collect()
}

/// Stamp a single image with the label for `index`.
///
/// Sizes and offsets outside the drawable range are clamped first.
pub fn stamp(
    image: CanonicalImage,
    index: usize,
    config: &WatermarkConfig,
    font: &WatermarkFont,
) -> CanonicalImage {
    let mut config = config.clone();
    config.clamp_ranges();

    let label = label_for(index);
    let (x, y) = config.offset;
    let shadow = config.shadow_offset;

    let mut canvas = Blend(image.into_rgba());
    draw_label(
        &mut canvas,
        &label,
        (x.saturating_add(shadow), y.saturating_add(shadow)),
        config.color.shadow(),
        font,
        config.font_size,
    );
    draw_label(&mut canvas, &label, (x, y), config.color.text(), font, config.font_size);

    CanonicalImage::from_rgba(canvas.0)
}

fn draw_label(
    canvas: &mut Blend<RgbaImage>,
    text: &str,
    (x, y): (i32, i32),
    color: Color,
    font: &WatermarkFont,
    size: f32,
) {
    // Nothing of a label starting past the right or bottom edge is visible.
    let (width, height) = canvas.0.dimensions();
    if i64::from(x) >= i64::from(width) || i64::from(y) >= i64::from(height) {
        return;
    }

    match font {
        WatermarkFont::Outline { font, .. } => {
            draw_text_mut(canvas, color.to_rgba(), x, y, PxScale::from(size), font, text);
        }
        WatermarkFont::Bitmap => draw_bitmap_text(canvas, text, (x, y), color, size),
    }
}

fn draw_bitmap_text(
    canvas: &mut Blend<RgbaImage>,
    text: &str,
    (x, y): (i32, i32),
    color: Color,
    size: f32,
) {
    let scale = (size / 10.0).round().clamp(1.0, MAX_FONT_SIZE / 10.0) as i32;
    let advance = scale.saturating_mul(9);
    let pixel = color.to_rgba();
    let (width, height) = canvas.0.dimensions();
    let (width, height) = (i64::from(width), i64::from(height));

    for (n, ch) in text.chars().enumerate() {
        let origin_x = i64::from(x) + n as i64 * i64::from(advance);
        if origin_x >= width {
            break;
        }
        for (row, bits) in bitmap_glyph(ch).iter().enumerate() {
            let top = i64::from(y) + row as i64 * i64::from(scale);
            for col in 0..8 {
                if (bits >> col) & 1 == 0 {
                    continue;
                }
                let left = origin_x + col * i64::from(scale);
                let right = left + i64::from(scale);
                let bottom = top + i64::from(scale);
                if right <= 0 || bottom <= 0 || left >= width || top >= height {
                    continue;
                }
                // Inside the canvas now, so both fit in i32.
                let rect = Rect::at(left as i32, top as i32).of_size(scale as u32, scale as u32);
                draw_filled_rect_mut(canvas, rect, pixel);
            }
        }
    }
}
