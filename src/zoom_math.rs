//! Pan/zoom viewport mathematics.
//!
//! This module maps between screen coordinates and original-image
//! coordinates, extracted for testability and reusability.
//!
//! `offset` is the scaled screen-space position of original-image point
//! (0, 0), negated: a screen point `s` shows original point
//! `(s + offset) / scale`.

use pglabel_raster::{Point, RenderRequest};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_SCALE, DEFAULT_MIN_SCALE, DEFAULT_WHEEL_ZOOM_FACTOR};

/// Interactive zoom limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    /// Wheel zoom-out is ignored at or below this scale
    #[serde(default = "default_min_scale")]
    pub min_scale: f32,
    /// Wheel zoom-in is ignored at or above this scale
    #[serde(default = "default_max_scale")]
    pub max_scale: f32,
    /// Scale multiplier for one wheel notch
    #[serde(default = "default_wheel_factor")]
    pub wheel_factor: f32,
}

fn default_min_scale() -> f32 {
    DEFAULT_MIN_SCALE
}

fn default_max_scale() -> f32 {
    DEFAULT_MAX_SCALE
}

fn default_wheel_factor() -> f32 {
    DEFAULT_WHEEL_ZOOM_FACTOR
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min_scale: default_min_scale(),
            max_scale: default_max_scale(),
            wheel_factor: default_wheel_factor(),
        }
    }
}

/// Direction of one wheel notch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Classify a wheel delta (positive is zoom in). Zero yields `None`.
    pub fn from_wheel_delta(delta: f32) -> Option<Self> {
        if delta > 0.0 {
            Some(ZoomDirection::In)
        } else if delta < 0.0 {
            Some(ZoomDirection::Out)
        } else {
            None
        }
    }
}

/// Represents pan/zoom viewport state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub scale: f32,
    pub offset: Point,
}

impl Viewport {
    /// Create a new viewport with the given scale and offset.
    pub fn new(scale: f32, offset: Point) -> Self {
        Self { scale, offset }
    }

    /// Create an identity viewport (scale=1, no offset).
    pub fn identity() -> Self {
        Self::new(1.0, Point::ZERO)
    }

    /// Map a screen point to original-image coordinates.
    pub fn to_original(&self, screen: Point) -> Point {
        (screen + self.offset) / self.scale
    }

    /// Map an original-image point to screen coordinates.
    pub fn to_screen(&self, original: Point) -> Point {
        original * self.scale - self.offset
    }

    /// Zoom by `factor` keeping the original-image point under `cursor` fixed.
    ///
    /// Both the new scale and the new offset are computed here, so a render
    /// issued afterwards always sees a consistent pair.
    pub fn zoom_at(&self, factor: f32, cursor: Point) -> Viewport {
        let anchor = self.to_original(cursor);
        let scale = self.scale * factor;
        Viewport {
            scale,
            offset: anchor * scale - cursor,
        }
    }

    /// Apply one wheel notch at `cursor`.
    ///
    /// Returns `None` when the limits forbid zooming further in that direction.
    pub fn wheel_zoom(
        &self,
        direction: ZoomDirection,
        cursor: Point,
        limits: &ZoomLimits,
    ) -> Option<Viewport> {
        let factor = match direction {
            ZoomDirection::In if self.scale < limits.max_scale => limits.wheel_factor,
            ZoomDirection::Out if self.scale > limits.min_scale => 1.0 / limits.wheel_factor,
            _ => return None,
        };
        Some(self.zoom_at(factor, cursor))
    }

    /// Pan by a screen-space delta. Independent of scale.
    pub fn pan_by(&self, dx: f32, dy: f32) -> Viewport {
        Viewport {
            scale: self.scale,
            offset: self.offset - Point::new(dx, dy),
        }
    }

    /// Viewport showing the whole image centered on a surface.
    ///
    /// Returns the identity viewport for degenerate sizes.
    pub fn fit(image_size: (u32, u32), surface_size: (u32, u32), limits: &ZoomLimits) -> Viewport {
        let (iw, ih) = (image_size.0 as f32, image_size.1 as f32);
        let (sw, sh) = (surface_size.0 as f32, surface_size.1 as f32);
        if iw <= 0.0 || ih <= 0.0 || sw <= 0.0 || sh <= 0.0 {
            return Viewport::identity();
        }

        let scale = (sw / iw)
            .min(sh / ih)
            .clamp(limits.min_scale, limits.max_scale);
        let margin = Point::new((sw - iw * scale) / 2.0, (sh - ih * scale) / 2.0);
        Viewport {
            scale,
            offset: -margin,
        }
    }

    /// Visible original-image region of a surface of the given size.
    pub fn visible_region(&self, surface_width: u32, surface_height: u32) -> RenderRequest {
        let top_left = self.to_original(Point::ZERO);
        let bottom_right =
            self.to_original(Point::new(surface_width as f32, surface_height as f32));
        RenderRequest::new(top_left, bottom_right, self.scale)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON * a.abs().max(b.abs()).max(1.0)
    }

    fn approx_point(a: Point, b: Point) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
    }

    #[test]
    fn test_identity_viewport() {
        let v = Viewport::identity();
        assert_eq!(v.scale, 1.0);
        assert_eq!(v.offset, Point::ZERO);
        assert_eq!(v.to_original(Point::new(3.0, 4.0)), Point::new(3.0, 4.0));
    }

    #[test]
    fn test_mapping_formulas() {
        let v = Viewport::new(2.0, Point::new(10.0, -20.0));
        assert_eq!(v.to_original(Point::new(30.0, 40.0)), Point::new(20.0, 10.0));
        assert_eq!(v.to_screen(Point::new(20.0, 10.0)), Point::new(30.0, 40.0));
    }

    #[test]
    fn test_round_trip_law() {
        let viewports = [
            Viewport::new(1.0, Point::ZERO),
            Viewport::new(0.025, Point::new(-13.5, 250.0)),
            Viewport::new(0.2, Point::new(100.0, 100.0)),
            Viewport::new(3.7, Point::new(-900.25, 41.0)),
            Viewport::new(16.0, Point::new(5000.0, -7000.0)),
        ];
        let points = [
            Point::ZERO,
            Point::new(1.5, -2.25),
            Point::new(4095.0, 4095.0),
            Point::new(-300.0, 812.5),
        ];

        for v in &viewports {
            for &p in &points {
                assert!(approx_point(v.to_original(v.to_screen(p)), p), "{:?} {:?}", v, p);
                assert!(approx_point(v.to_screen(v.to_original(p)), p), "{:?} {:?}", v, p);
            }
        }
    }

    #[test]
    fn test_zoom_at_preserves_cursor_point() {
        let v = Viewport::new(1.0, Point::new(50.0, 30.0));
        for cursor in [Point::new(150.0, 120.0), Point::ZERO, Point::new(-20.0, 640.0)] {
            for factor in [2.0, 0.5, 1.25, 8.0] {
                let before = v.to_original(cursor);
                let zoomed = v.zoom_at(factor, cursor);
                let after = zoomed.to_original(cursor);
                assert!(approx_point(before, after), "{:?} vs {:?}", before, after);
                assert!(approx_eq(zoomed.scale, v.scale * factor));
            }
        }
    }

    #[test]
    fn test_zoom_at_origin_with_zero_offset_keeps_offset() {
        let v = Viewport::identity().zoom_at(2.0, Point::ZERO);
        assert_eq!(v.scale, 2.0);
        assert_eq!(v.offset, Point::ZERO);
    }

    #[test]
    fn test_wheel_zoom_respects_limits() {
        let limits = ZoomLimits::default();
        let cursor = Point::new(10.0, 10.0);

        let at_max = Viewport::new(16.0, Point::ZERO);
        assert!(at_max.wheel_zoom(ZoomDirection::In, cursor, &limits).is_none());
        assert!(at_max.wheel_zoom(ZoomDirection::Out, cursor, &limits).is_some());

        let at_min = Viewport::new(0.025, Point::ZERO);
        assert!(at_min.wheel_zoom(ZoomDirection::Out, cursor, &limits).is_none());

        let zoomed = Viewport::identity()
            .wheel_zoom(ZoomDirection::In, cursor, &limits)
            .unwrap();
        assert_eq!(zoomed.scale, 2.0);
        let zoomed = zoomed
            .wheel_zoom(ZoomDirection::Out, cursor, &limits)
            .unwrap();
        assert_eq!(zoomed.scale, 1.0);
    }

    #[test]
    fn test_zoom_direction_from_delta() {
        assert_eq!(ZoomDirection::from_wheel_delta(120.0), Some(ZoomDirection::In));
        assert_eq!(ZoomDirection::from_wheel_delta(-1.0), Some(ZoomDirection::Out));
        assert_eq!(ZoomDirection::from_wheel_delta(0.0), None);
    }

    #[test]
    fn test_pan_by_is_screen_space() {
        let v = Viewport::new(4.0, Point::new(10.0, 20.0));
        let panned = v.pan_by(5.0, -10.0);

        assert_eq!(panned.scale, 4.0);
        assert_eq!(panned.offset, Point::new(5.0, 30.0));

        // Content under the pointer moves with it by exactly the delta on screen.
        let p = Point::new(100.0, 100.0);
        let moved = panned.to_screen(v.to_original(p));
        assert!(approx_point(moved, Point::new(105.0, 90.0)));
    }

    #[test]
    fn test_fit_centers_image() {
        let limits = ZoomLimits::default();
        let v = Viewport::fit((4000, 2000), (800, 600), &limits);
        assert!(approx_eq(v.scale, 0.2));

        let top_left = v.to_screen(Point::ZERO);
        let bottom_right = v.to_screen(Point::new(4000.0, 2000.0));
        assert!(approx_point(top_left, Point::new(0.0, 100.0)));
        assert!(approx_point(bottom_right, Point::new(800.0, 500.0)));
    }

    #[test]
    fn test_fit_degenerate_is_identity() {
        let v = Viewport::fit((0, 10), (800, 600), &ZoomLimits::default());
        assert_eq!(v, Viewport::identity());
    }

    #[test]
    fn test_visible_region() {
        let v = Viewport::new(0.5, Point::new(-100.0, 50.0));
        let region = v.visible_region(800, 600);
        assert_eq!(region.top_left, Point::new(-200.0, 100.0));
        assert_eq!(region.bottom_right, Point::new(1400.0, 1300.0));
        assert_eq!(region.scale, 0.5);
    }
}
