//! Screen-space overlay primitives for blobs, the pending blob and the marquee.
//!
//! The renderer only produces the image raster; overlays are projected here
//! and drawn by whatever owns the surface.

use pglabel_raster::{Point, Rect};
use serde::{Deserialize, Serialize};

use crate::constants::MARQUEE_STROKE_WIDTH;
use crate::model::{Blob, BlobId, BlobStore};
use crate::zoom_math::Viewport;

/// How an overlay should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayStyle {
    /// Unselected blob
    Normal,
    /// Selected blob
    Selected,
    /// Blob being placed with the draw tool
    Pending,
    /// Rubber-band rectangle
    Marquee,
}

impl OverlayStyle {
    /// Outline color as RGB.
    pub fn color(&self) -> [u8; 3] {
        match self {
            OverlayStyle::Normal | OverlayStyle::Marquee => [0, 255, 0],
            OverlayStyle::Selected => [255, 0, 0],
            OverlayStyle::Pending => [255, 255, 0],
        }
    }
}

/// A shape to draw on top of the rendered frame, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Overlay {
    /// Circle inscribed in the box `top_left..bottom_right`.
    Circle {
        /// `None` for the pending blob
        id: Option<BlobId>,
        top_left: Point,
        bottom_right: Point,
        stroke_width: f32,
        style: OverlayStyle,
    },
    /// Axis-aligned rectangle outline.
    Rectangle {
        top_left: Point,
        bottom_right: Point,
        stroke_width: f32,
        style: OverlayStyle,
    },
}

impl Overlay {
    pub fn style(&self) -> OverlayStyle {
        match self {
            Overlay::Circle { style, .. } | Overlay::Rectangle { style, .. } => *style,
        }
    }
}

fn circle(
    viewport: &Viewport,
    id: Option<BlobId>,
    center: Point,
    radius: f32,
    stroke_width: f32,
    style: OverlayStyle,
) -> Overlay {
    let extent = Point::new(radius, radius);
    Overlay::Circle {
        id,
        top_left: viewport.to_screen(center - extent),
        bottom_right: viewport.to_screen(center + extent),
        stroke_width,
        style,
    }
}

/// Project one stored blob. The stroke scales with the zoom.
pub fn project_blob(blob: &Blob, selected: bool, thickness: f32, viewport: &Viewport) -> Overlay {
    let style = if selected {
        OverlayStyle::Selected
    } else {
        OverlayStyle::Normal
    };
    circle(
        viewport,
        Some(blob.id),
        blob.center,
        blob.radius,
        thickness * viewport.scale,
        style,
    )
}

/// Project every blob in the store, in creation order.
pub fn project_blobs(store: &BlobStore, viewport: &Viewport) -> Vec<Overlay> {
    store
        .iter()
        .map(|blob| project_blob(blob, store.is_selected(blob.id), store.thickness(), viewport))
        .collect()
}

/// Project the draw tool's pending blob. Its stroke does not scale.
pub fn project_pending(center: Point, radius: f32, thickness: f32, viewport: &Viewport) -> Overlay {
    circle(viewport, None, center, radius, thickness, OverlayStyle::Pending)
}

/// Project a marquee given in original-image coordinates.
pub fn project_marquee(rect: &Rect, viewport: &Viewport) -> Overlay {
    Overlay::Rectangle {
        top_left: viewport.to_screen(rect.top_left()),
        bottom_right: viewport.to_screen(rect.bottom_right()),
        stroke_width: MARQUEE_STROKE_WIDTH,
        style: OverlayStyle::Marquee,
    }
}
