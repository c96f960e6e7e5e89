//! Viewport rendering: level selection, clipping and resampling.
//!
//! A render request describes the visible region in original-image
//! coordinates. The region is mapped onto the pyramid level chosen for the
//! display scale, clamped to that level's bounds, cropped and resampled to the
//! final on-screen size. Work per frame is proportional to the number of
//! displayed pixels, not to the source resolution.

use crate::geometry::Point;
use crate::pyramid::Pyramid;
use image::imageops::{self, FilterType};
use image::RgbImage;

/// Visible region of the original image plus the display scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    /// Top-left corner of the visible area, in original-image coordinates
    pub top_left: Point,
    /// Bottom-right corner of the visible area, in original-image coordinates
    pub bottom_right: Point,
    /// Screen pixels per original-image pixel
    pub scale: f32,
}

impl RenderRequest {
    pub fn new(top_left: Point, bottom_right: Point, scale: f32) -> Self {
        Self {
            top_left,
            bottom_right,
            scale,
        }
    }
}

/// Where and how a request reads from a pyramid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionPlan {
    /// Pyramid level read from
    pub level: usize,
    /// Scale applied to the level's pixels (`scale * 2^level`)
    pub effective_scale: f32,
    /// Integer crop box within the level: x, y, width, height
    pub crop: (u32, u32, u32, u32),
    /// Output raster size in screen pixels
    pub output_size: (u32, u32),
    /// Screen-space offset of the output raster's top-left corner
    pub shift: Point,
}

/// A ready-to-display raster anchored at `shift` on the render surface.
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: RgbImage,
    pub shift: Point,
    /// Pyramid level the frame was read from
    pub level: usize,
}

/// Plan the crop and output size for a request.
///
/// Returns `None` when the clipped region is smaller than one output pixel
/// (the request lies outside the image, or the scale is degenerate). Parts
/// of the request outside the image are clipped silently; the clipped amount
/// is reported through [`RegionPlan::shift`].
pub fn plan_region(request: &RenderRequest, pyramid: &Pyramid) -> Option<RegionPlan> {
    if !(request.scale.is_finite() && request.scale > 0.0) {
        log::debug!("Skipping render for invalid scale {}", request.scale);
        return None;
    }

    let level = pyramid.select_level(request.scale);
    let image = pyramid.level(level)?;
    let (level_width, level_height) = image.dimensions();

    let factor = 2f32.powi(level as i32);
    let effective_scale = request.scale * factor;

    let top_left = request.top_left / factor;
    let bottom_right = request.bottom_right / factor;

    let clamped_top_left = Point::new(top_left.x.max(0.0), top_left.y.max(0.0));
    let clamped_bottom_right = Point::new(
        bottom_right.x.min(level_width as f32),
        bottom_right.y.min(level_height as f32),
    );

    let shift = (clamped_top_left - top_left) * effective_scale;

    let output_width = (clamped_bottom_right.x - clamped_top_left.x) * effective_scale;
    let output_height = (clamped_bottom_right.y - clamped_top_left.y) * effective_scale;
    if !(output_width >= 1.0 && output_height >= 1.0) {
        log::trace!(
            "Region {:?}..{:?} clips to less than a pixel at level {}",
            request.top_left,
            request.bottom_right,
            level
        );
        return None;
    }

    let crop_x = (clamped_top_left.x as u32).min(level_width - 1);
    let crop_y = (clamped_top_left.y as u32).min(level_height - 1);
    let crop_width = (clamped_bottom_right.x as u32)
        .saturating_sub(crop_x)
        .clamp(1, level_width - crop_x);
    let crop_height = (clamped_bottom_right.y as u32)
        .saturating_sub(crop_y)
        .clamp(1, level_height - crop_y);

    Some(RegionPlan {
        level,
        effective_scale,
        crop: (crop_x, crop_y, crop_width, crop_height),
        output_size: (output_width as u32, output_height as u32),
        shift,
    })
}

/// Crop and resample one pyramid according to a plan.
///
/// Returns `None` if the pyramid lacks the planned level.
pub fn render_plan(pyramid: &Pyramid, plan: &RegionPlan) -> Option<RgbImage> {
    let image = pyramid.level(plan.level)?;
    let (x, y, width, height) = plan.crop;
    let cropped = imageops::crop_imm(image, x, y, width, height).to_image();

    let (out_width, out_height) = plan.output_size;
    if (out_width, out_height) == (width, height) {
        return Some(cropped);
    }
    Some(imageops::resize(
        &cropped,
        out_width,
        out_height,
        FilterType::Triangle,
    ))
}

/// Render a single pyramid for a request.
pub fn render(request: &RenderRequest, pyramid: &Pyramid) -> Option<Frame> {
    let plan = plan_region(request, pyramid)?;
    let image = render_plan(pyramid, &plan)?;
    Some(Frame {
        image,
        shift: plan.shift,
        level: plan.level,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pyramid::Downsample;
    use image::Rgb;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn solid_pyramid(width: u32, height: u32) -> Pyramid {
        let image = RgbImage::from_pixel(width, height, Rgb([10, 20, 30]));
        Pyramid::build_with(image, 512, Downsample::Nearest).unwrap()
    }

    #[test]
    fn test_full_view_at_unit_scale() {
        let pyramid = solid_pyramid(400, 300);
        let request = RenderRequest::new(Point::ZERO, Point::new(400.0, 300.0), 1.0);
        let plan = plan_region(&request, &pyramid).unwrap();

        assert_eq!(plan.level, 0);
        assert_eq!(plan.crop, (0, 0, 400, 300));
        assert_eq!(plan.output_size, (400, 300));
        assert_eq!(plan.shift, Point::ZERO);
    }

    #[test]
    fn test_magnified_view_reads_level_zero() {
        let pyramid = solid_pyramid(1024, 1024);
        let request = RenderRequest::new(Point::new(100.0, 100.0), Point::new(150.0, 125.0), 4.0);
        let plan = plan_region(&request, &pyramid).unwrap();

        assert_eq!(plan.level, 0);
        assert_eq!(plan.crop, (100, 100, 50, 25));
        assert_eq!(plan.output_size, (200, 100));
    }

    #[test]
    fn test_zoomed_out_view_reads_coarser_level() {
        let pyramid = solid_pyramid(2048, 2048);
        assert_eq!(pyramid.len(), 3);

        let request = RenderRequest::new(Point::ZERO, Point::new(2048.0, 2048.0), 0.25);
        let plan = plan_region(&request, &pyramid).unwrap();

        assert_eq!(plan.level, 2);
        assert!(approx_eq(plan.effective_scale, 1.0));
        assert_eq!(plan.crop, (0, 0, 512, 512));
        assert_eq!(plan.output_size, (512, 512));
    }

    #[test]
    fn test_partially_offscreen_request_is_clamped_and_shifted() {
        let pyramid = solid_pyramid(400, 300);
        // Viewport starts 50 image pixels left of and 20 above the image.
        let request = RenderRequest::new(Point::new(-50.0, -20.0), Point::new(150.0, 80.0), 2.0);
        let plan = plan_region(&request, &pyramid).unwrap();

        assert_eq!(plan.crop, (0, 0, 150, 80));
        assert_eq!(plan.output_size, (300, 160));
        assert!(approx_eq(plan.shift.x, 100.0));
        assert!(approx_eq(plan.shift.y, 40.0));
    }

    #[test]
    fn test_request_beyond_bottom_right_is_clamped() {
        let pyramid = solid_pyramid(400, 300);
        let request = RenderRequest::new(Point::new(350.0, 250.0), Point::new(500.0, 400.0), 1.0);
        let plan = plan_region(&request, &pyramid).unwrap();

        assert_eq!(plan.crop, (350, 250, 50, 50));
        assert_eq!(plan.output_size, (50, 50));
        assert_eq!(plan.shift, Point::ZERO);
    }

    #[test]
    fn test_request_outside_image_renders_nothing() {
        let pyramid = solid_pyramid(400, 300);
        let request = RenderRequest::new(Point::new(500.0, 0.0), Point::new(600.0, 100.0), 1.0);
        assert!(plan_region(&request, &pyramid).is_none());
        assert!(render(&request, &pyramid).is_none());
    }

    #[test]
    fn test_sub_pixel_output_renders_nothing() {
        let pyramid = solid_pyramid(400, 300);
        let request = RenderRequest::new(Point::new(10.0, 10.0), Point::new(10.5, 200.0), 1.0);
        assert!(plan_region(&request, &pyramid).is_none());
    }

    #[test]
    fn test_invalid_scale_renders_nothing() {
        let pyramid = solid_pyramid(400, 300);
        let request = RenderRequest::new(Point::ZERO, Point::new(100.0, 100.0), 0.0);
        assert!(plan_region(&request, &pyramid).is_none());
    }

    #[test]
    fn test_render_produces_output_size() {
        let pyramid = solid_pyramid(400, 300);
        let request = RenderRequest::new(Point::new(-10.0, 0.0), Point::new(90.0, 50.0), 3.0);
        let frame = render(&request, &pyramid).unwrap();

        assert_eq!(frame.image.dimensions(), (270, 150));
        assert!(approx_eq(frame.shift.x, 30.0));
        assert_eq!(frame.image.get_pixel(5, 5), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_render_reads_requested_region() {
        // Left half red, right half blue.
        let image = RgbImage::from_fn(200, 100, |x, _| {
            if x < 100 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });
        let pyramid = Pyramid::build(image).unwrap();
        let request = RenderRequest::new(Point::new(120.0, 0.0), Point::new(180.0, 60.0), 1.0);
        let frame = render(&request, &pyramid).unwrap();

        assert_eq!(frame.image.dimensions(), (60, 60));
        assert_eq!(frame.image.get_pixel(30, 30), &Rgb([0, 0, 255]));
    }
}
