//! Circular annotation ("blob") type and its geometric tests.

use pglabel_raster::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Unique identifier for a blob. Never reused within a store's lifetime.
pub type BlobId = u64;

/// A circular annotation in original-image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    pub id: BlobId,
    pub center: Point,
    pub radius: f32,
}

impl Blob {
    pub fn new(id: BlobId, center: Point, radius: f32) -> Self {
        Self { id, center, radius }
    }

    /// Axis-aligned bounding square (`center ± radius`).
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.center.x - self.radius,
            self.center.y - self.radius,
            2.0 * self.radius,
            2.0 * self.radius,
        )
    }

    /// Ring hit test with stroke-thickness tolerance.
    ///
    /// The point must lie inside the bounding square grown by half the
    /// stroke, and outside the square inscribed in the circle shrunk by half
    /// the stroke on at least one axis. This is an approximation of an
    /// annulus: corners of the bounding square count as hits.
    pub fn ring_contains(&self, point: Point, thickness: f32) -> bool {
        let half = thickness / 2.0;
        let d = point.axis_distance(&self.center);
        let outer = self.radius + half;
        let inner = self.radius / std::f32::consts::SQRT_2 - half;

        d.x <= outer && d.y <= outer && (d.x >= inner || d.y >= inner)
    }

    /// Whether the whole bounding square lies inside `rect`.
    pub fn is_inside(&self, rect: &Rect) -> bool {
        rect.contains_rect(&self.bounds())
    }
}
