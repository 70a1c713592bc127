//! Layout and compositing engine.
//!
//! [`LayoutPlan`] decides canvas size and placements for a [`LayoutMode`];
//! [`composite`] blends the images onto a transparent canvas accordingly.
//!
//! [`LayoutMode`]: crate::core::types::LayoutMode

pub mod composite;
pub mod plan;

pub use composite::{blend_over, composite, splice, CompositeImage};
pub use plan::{LayoutPlan, Placement};
