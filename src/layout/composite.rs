//! Compositing: blend prepared images onto a transparent canvas.

use image::{Rgba, RgbaImage};
use serde::Serialize;

use super::plan::LayoutPlan;
use crate::core::error::UsageError;
use crate::core::types::{CanonicalImage, LayoutMode};

/// The spliced result and how it was produced.
#[derive(Debug, Clone, Serialize)]
pub struct CompositeImage {
    /// The blended pixels.
    #[serde(skip)]
    pub image: CanonicalImage,
    /// Mode the composite was laid out in.
    pub mode: LayoutMode,
    /// `None` when the single input was passed through untouched.
    pub plan: Option<LayoutPlan>,
}

impl CompositeImage {
    /// Composite dimensions (width, height).
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Source-over blend of `src` onto `dst`, non-premultiplied.
pub fn blend_over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let src_a = src[3] as f32 / 255.0;
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);

    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |i: usize| {
        let c = (src[i] as f32 * src_a + dst[i] as f32 * dst_a * (1.0 - src_a)) / out_a;
        c.round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(0),
        channel(1),
        channel(2),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

/// Blend every image onto a transparent canvas at its planned position.
///
/// `images[i]` goes to the placement whose `image_index` is `i`. Placements
/// that reference a missing image are skipped.
pub fn composite(images: &[CanonicalImage], plan: &LayoutPlan) -> CanonicalImage {
    let mut canvas = RgbaImage::new(plan.canvas_width, plan.canvas_height);

    for placement in &plan.placements {
        let Some(image) = images.get(placement.image_index) else {
            continue;
        };
        let src = image.as_rgba();

        for (sx, sy, pixel) in src.enumerate_pixels() {
            let cx = placement.x + sx;
            let cy = placement.y + sy;
            if cx >= canvas.width() || cy >= canvas.height() {
                continue;
            }
            // Fully transparent sources leave the canvas as is.
            if pixel[3] == 0 {
                continue;
            }
            let blended = blend_over(*canvas.get_pixel(cx, cy), *pixel);
            canvas.put_pixel(cx, cy, blended);
        }
    }

    CanonicalImage::from_rgba(canvas)
}

/// Lay out and composite `images` under `mode`.
///
/// A single image in two-column mode is returned as is, without a plan.
pub fn splice(images: Vec<CanonicalImage>, mode: LayoutMode) -> Result<CompositeImage, UsageError> {
    if images.is_empty() {
        return Err(UsageError::NoImages);
    }

    if mode == LayoutMode::TwoColumnFlow && images.len() == 1 {
        log::debug!("Single image in {} mode, passing through", mode);
        let image = images.into_iter().next().ok_or(UsageError::NoImages)?;
        return Ok(CompositeImage {
            image,
            mode,
            plan: None,
        });
    }

    let sizes: Vec<(u32, u32)> = images.iter().map(|i| i.dimensions()).collect();
    let plan = LayoutPlan::compute(mode, &sizes)?;

    debug_assert!(plan.fits_canvas(&sizes), "placement outside canvas: {:?}", plan);
    debug_assert_eq!(plan.find_overlap(&sizes), None, "overlapping placements: {:?}", plan);

    log::debug!(
        "Compositing {} image(s) onto {}x{} canvas",
        images.len(),
        plan.canvas_width,
        plan.canvas_height
    );
    let image = composite(&images, &plan);

    Ok(CompositeImage {
        image,
        mode,
        plan: Some(plan),
    })
}
