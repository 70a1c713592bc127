//! Layout plans: canvas size and the top-left corner of every image.
//!
//! Plans are pure functions of the layout mode and the image sizes. Images
//! never overlap and every placement lies inside the canvas; the canvas is
//! the tight bounding box of all placed images.

use serde::{Deserialize, Serialize};

use crate::core::error::UsageError;
use crate::core::types::LayoutMode;

/// Where one image goes. Origin top-left, y grows downward.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Placement {
    /// Position of the image in the input order.
    pub image_index: usize,
    /// Left edge on the canvas.
    pub x: u32,
    /// Top edge on the canvas.
    pub y: u32,
}

/// Result of a layout computation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayoutPlan {
    /// Canvas width in pixels.
    pub canvas_width: u32,
    /// Canvas height in pixels.
    pub canvas_height: u32,
    /// One entry per input image, in input order.
    pub placements: Vec<Placement>,
}

fn checked_canvas(width: u64, height: u64) -> Result<(u32, u32), UsageError> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(UsageError::CanvasTooLarge { width, height }),
    }
}

impl LayoutPlan {
    /// Compute the plan for `sizes` (width, height) under `mode`.
    pub fn compute(mode: LayoutMode, sizes: &[(u32, u32)]) -> Result<Self, UsageError> {
        if sizes.is_empty() {
            return Err(UsageError::NoImages);
        }

        match mode {
            LayoutMode::Horizontal => Self::horizontal(sizes),
            LayoutMode::Vertical => Self::vertical(sizes),
            LayoutMode::TwoColumnFlow => Self::two_column_flow(sizes),
        }
    }

    fn horizontal(sizes: &[(u32, u32)]) -> Result<Self, UsageError> {
        let total_width: u64 = sizes.iter().map(|&(w, _)| w as u64).sum();
        let max_height = sizes.iter().map(|&(_, h)| h).max().unwrap_or(0);
        let (canvas_width, canvas_height) = checked_canvas(total_width, max_height as u64)?;

        let mut x = 0u32;
        let placements = sizes
            .iter()
            .enumerate()
            .map(|(image_index, &(w, h))| {
                let placement = Placement {
                    image_index,
                    x,
                    y: (canvas_height - h) / 2,
                };
                x += w;
                placement
            })
            .collect();

        Ok(Self {
            canvas_width,
            canvas_height,
            placements,
        })
    }

    fn vertical(sizes: &[(u32, u32)]) -> Result<Self, UsageError> {
        let max_width = sizes.iter().map(|&(w, _)| w).max().unwrap_or(0);
        let total_height: u64 = sizes.iter().map(|&(_, h)| h as u64).sum();
        let (canvas_width, canvas_height) = checked_canvas(max_width as u64, total_height)?;

        let mut y = 0u32;
        let placements = sizes
            .iter()
            .enumerate()
            .map(|(image_index, &(w, h))| {
                let placement = Placement {
                    image_index,
                    x: (canvas_width - w) / 2,
                    y,
                };
                y += h;
                placement
            })
            .collect();

        Ok(Self {
            canvas_width,
            canvas_height,
            placements,
        })
    }

    // Rows are packed flush left and top-aligned, unlike the centered strips.
    fn two_column_flow(sizes: &[(u32, u32)]) -> Result<Self, UsageError> {
        let rows = Self::rows(sizes.len());
        let row_width = |row: &std::ops::Range<usize>| -> u64 {
            sizes[row.clone()].iter().map(|&(w, _)| w as u64).sum()
        };
        let row_height = |row: &std::ops::Range<usize>| -> u32 {
            sizes[row.clone()].iter().map(|&(_, h)| h).max().unwrap_or(0)
        };

        let max_width = rows.iter().map(row_width).max().unwrap_or(0);
        let total_height: u64 = rows.iter().map(|r| row_height(r) as u64).sum();
        let (canvas_width, canvas_height) = checked_canvas(max_width, total_height)?;

        let mut placements = Vec::with_capacity(sizes.len());
        let mut y = 0u32;
        for row in &rows {
            let mut x = 0u32;
            for image_index in row.clone() {
                placements.push(Placement { image_index, x, y });
                x += sizes[image_index].0;
            }
            y += row_height(row);
        }

        Ok(Self {
            canvas_width,
            canvas_height,
            placements,
        })
    }

    /// Index ranges of the two-column rows for `count` images: row k holds
    /// images 2k and 2k+1 when present.
    pub fn rows(count: usize) -> Vec<std::ops::Range<usize>> {
        (0..count)
            .step_by(2)
            .map(|start| start..(start + 2).min(count))
            .collect()
    }

    /// True when every placed image lies inside the canvas.
    pub fn fits_canvas(&self, sizes: &[(u32, u32)]) -> bool {
        self.placements.iter().all(|p| {
            sizes.get(p.image_index).is_some_and(|&(w, h)| {
                p.x as u64 + w as u64 <= self.canvas_width as u64
                    && p.y as u64 + h as u64 <= self.canvas_height as u64
            })
        })
    }

    /// First pair of images whose rectangles intersect, if any.
    pub fn find_overlap(&self, sizes: &[(u32, u32)]) -> Option<(usize, usize)> {
        let rect = |p: &Placement| {
            let (w, h) = sizes.get(p.image_index).copied().unwrap_or((0, 0));
            (p.x as u64, p.y as u64, p.x as u64 + w as u64, p.y as u64 + h as u64)
        };

        for (i, a) in self.placements.iter().enumerate() {
            let (ax0, ay0, ax1, ay1) = rect(a);
            for b in &self.placements[i + 1..] {
                let (bx0, by0, bx1, by1) = rect(b);
                if ax0 < bx1 && bx0 < ax1 && ay0 < by1 && by0 < ay1 {
                    return Some((a.image_index, b.image_index));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(image_index: usize, x: u32, y: u32) -> Placement {
        Placement { image_index, x, y }
    }

    #[test]
    fn test_empty_input_is_usage_error() {
        for mode in LayoutMode::ALL {
            assert_eq!(LayoutPlan::compute(mode, &[]), Err(UsageError::NoImages));
        }
    }

    #[test]
    fn test_horizontal_two_images() {
        let plan = LayoutPlan::compute(LayoutMode::Horizontal, &[(100, 50), (100, 50)]).unwrap();
        assert_eq!((plan.canvas_width, plan.canvas_height), (200, 50));
        assert_eq!(plan.placements, vec![at(0, 0, 0), at(1, 100, 0)]);
    }

    #[test]
    fn test_horizontal_centers_vertically() {
        let plan = LayoutPlan::compute(LayoutMode::Horizontal, &[(10, 11), (5, 4)]).unwrap();
        assert_eq!((plan.canvas_width, plan.canvas_height), (15, 11));
        // (11 - 4) / 2 floors to 3
        assert_eq!(plan.placements[1], at(1, 10, 3));
    }

    #[test]
    fn test_vertical_two_images() {
        let plan = LayoutPlan::compute(LayoutMode::Vertical, &[(100, 50), (100, 50)]).unwrap();
        assert_eq!((plan.canvas_width, plan.canvas_height), (100, 100));
        assert_eq!(plan.placements, vec![at(0, 0, 0), at(1, 0, 50)]);
    }

    #[test]
    fn test_vertical_centers_horizontally() {
        let plan = LayoutPlan::compute(LayoutMode::Vertical, &[(30, 5), (7, 5)]).unwrap();
        assert_eq!(plan.placements[1], at(1, 11, 5));
    }

    #[test]
    fn test_two_column_three_images() {
        let plan =
            LayoutPlan::compute(LayoutMode::TwoColumnFlow, &[(100, 50), (100, 50), (100, 50)])
                .unwrap();
        assert_eq!((plan.canvas_width, plan.canvas_height), (200, 100));
        assert_eq!(plan.placements, vec![at(0, 0, 0), at(1, 100, 0), at(2, 0, 50)]);
    }

    #[test]
    fn test_two_column_rows_are_top_aligned_and_flush_left() {
        let sizes = [(40, 10), (20, 30), (80, 5)];
        let plan = LayoutPlan::compute(LayoutMode::TwoColumnFlow, &sizes).unwrap();
        assert_eq!((plan.canvas_width, plan.canvas_height), (80, 35));
        assert_eq!(plan.placements, vec![at(0, 0, 0), at(1, 40, 0), at(2, 0, 30)]);
    }

    #[test]
    fn test_rows() {
        assert_eq!(LayoutPlan::rows(1), vec![0..1]);
        assert_eq!(LayoutPlan::rows(4), vec![0..2, 2..4]);
        assert_eq!(LayoutPlan::rows(5), vec![0..2, 2..4, 4..5]);
    }

    #[test]
    fn test_canvas_too_large() {
        let sizes = [(u32::MAX, 1), (u32::MAX, 1)];
        assert!(matches!(
            LayoutPlan::compute(LayoutMode::Horizontal, &sizes),
            Err(UsageError::CanvasTooLarge { .. })
        ));
    }

    #[test]
    fn test_find_overlap_detects_collisions() {
        let plan = LayoutPlan {
            canvas_width: 20,
            canvas_height: 10,
            placements: vec![at(0, 0, 0), at(1, 5, 0)],
        };
        assert_eq!(plan.find_overlap(&[(10, 10), (10, 10)]), Some((0, 1)));
        assert!(plan.fits_canvas(&[(10, 10), (10, 10)]));
        assert!(!plan.fits_canvas(&[(10, 10), (16, 10)]));
    }

    fn sizes_strategy() -> impl Strategy<Value = Vec<(u32, u32)>> {
        prop::collection::vec((1u32..400, 1u32..400), 1..12)
    }

    proptest! {
        #[test]
        fn prop_horizontal_is_sum_by_max(sizes in sizes_strategy()) {
            let plan = LayoutPlan::compute(LayoutMode::Horizontal, &sizes).unwrap();
            prop_assert_eq!(plan.canvas_width, sizes.iter().map(|s| s.0).sum::<u32>());
            prop_assert_eq!(plan.canvas_height, sizes.iter().map(|s| s.1).max().unwrap());
        }

        #[test]
        fn prop_vertical_is_max_by_sum(sizes in sizes_strategy()) {
            let plan = LayoutPlan::compute(LayoutMode::Vertical, &sizes).unwrap();
            prop_assert_eq!(plan.canvas_width, sizes.iter().map(|s| s.0).max().unwrap());
            prop_assert_eq!(plan.canvas_height, sizes.iter().map(|s| s.1).sum::<u32>());
        }

        #[test]
        fn prop_two_column_rows(sizes in sizes_strategy()) {
            let plan = LayoutPlan::compute(LayoutMode::TwoColumnFlow, &sizes).unwrap();
            let expected_height: u32 = sizes
                .chunks(2)
                .map(|row| row.iter().map(|s| s.1).max().unwrap())
                .sum();
            let expected_width = sizes
                .chunks(2)
                .map(|row| row.iter().map(|s| s.0).sum::<u32>())
                .max()
                .unwrap();
            prop_assert_eq!(plan.canvas_height, expected_height);
            prop_assert_eq!(plan.canvas_width, expected_width);
        }

        #[test]
        fn prop_plans_are_valid(sizes in sizes_strategy()) {
            for mode in LayoutMode::ALL {
                let plan = LayoutPlan::compute(mode, &sizes).unwrap();
                let indices: Vec<usize> = plan.placements.iter().map(|p| p.image_index).collect();
                prop_assert_eq!(indices, (0..sizes.len()).collect::<Vec<_>>());
                prop_assert!(plan.fits_canvas(&sizes));
                prop_assert_eq!(plan.find_overlap(&sizes), None);
            }
        }
    }
}
