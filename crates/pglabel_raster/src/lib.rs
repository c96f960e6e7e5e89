//! Raster side of PGLabel: image pyramids, viewport rendering and layer blending.
//!
//! Everything here works in original-image coordinates plus a display scale;
//! mapping screen positions to those coordinates is the caller's concern.

pub mod compositor;
pub mod error;
pub mod filter;
pub mod geometry;
pub mod layers;
pub mod pyramid;
pub mod render;

pub use compositor::blend;
pub use error::RasterError;
pub use filter::{FilterParams, FilterRenderer, GaussianBlurFilter, ImageFilter};
pub use geometry::{Point, Rect};
pub use layers::LayerRenderer;
pub use pyramid::{select_level, Downsample, Pyramid, DEFAULT_MIN_LEVEL_DIMENSION};
pub use render::{plan_region, render, Frame, RegionPlan, RenderRequest};
