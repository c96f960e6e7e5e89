//! Foreground/background layer stack rendered through one viewport.

use crate::compositor::blend;
use crate::error::RasterError;
use crate::pyramid::{Downsample, Pyramid, DEFAULT_MIN_LEVEL_DIMENSION};
use crate::render::{plan_region, render_plan, Frame, RenderRequest};
use image::imageops::{self, FilterType};
use image::RgbImage;

/// Renders a required foreground pyramid blended over an optional background.
#[derive(Debug, Clone)]
pub struct LayerRenderer {
    foreground: Option<Pyramid>,
    background: Option<Pyramid>,
    opacity: f32,
    min_level_dimension: u32,
}

impl Default for LayerRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_LEVEL_DIMENSION)
    }
}

impl LayerRenderer {
    /// Create an empty renderer whose pyramids stop at `min_level_dimension`.
    pub fn new(min_level_dimension: u32) -> Self {
        Self {
            foreground: None,
            background: None,
            opacity: 1.0,
            min_level_dimension,
        }
    }

    /// Replace the foreground. Any background layer is dropped.
    pub fn load_foreground(&mut self, image: RgbImage) -> Result<(), RasterError> {
        let pyramid = Pyramid::build_with(image, self.min_level_dimension, Downsample::Linear)?;
        log::info!(
            "Loaded foreground {}x{} ({} levels)",
            pyramid.dimensions().0,
            pyramid.dimensions().1,
            pyramid.len()
        );
        self.foreground = Some(pyramid);
        self.background = None;
        Ok(())
    }

    /// Replace the background layer.
    ///
    /// A background whose size differs from the foreground is resampled once
    /// to the foreground's full resolution. Returns `Ok(false)` without
    /// loading anything when no foreground exists yet.
    pub fn load_background(&mut self, image: RgbImage) -> Result<bool, RasterError> {
        let Some(foreground) = &self.foreground else {
            log::warn!("Load the foreground before the background");
            return Ok(false);
        };

        if image.width() == 0 || image.height() == 0 {
            return Err(RasterError::EmptyImage {
                width: image.width(),
                height: image.height(),
            });
        }

        let (width, height) = foreground.dimensions();
        let image = if image.dimensions() != (width, height) {
            log::warn!(
                "Background {:?} differs from foreground {:?}, resizing background",
                image.dimensions(),
                (width, height)
            );
            imageops::resize(&image, width, height, FilterType::Triangle)
        } else {
            image
        };

        self.background = Some(Pyramid::build_with(
            image,
            self.min_level_dimension,
            Downsample::Linear,
        )?);
        Ok(true)
    }

    /// Drop the background layer.
    pub fn clear_background(&mut self) {
        self.background = None;
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn has_foreground(&self) -> bool {
        self.foreground.is_some()
    }

    pub fn has_background(&self) -> bool {
        self.background.is_some()
    }

    pub fn foreground(&self) -> Option<&Pyramid> {
        self.foreground.as_ref()
    }

    pub fn background(&self) -> Option<&Pyramid> {
        self.background.as_ref()
    }

    /// Render both layers through the same region plan and blend them.
    pub fn render(&self, request: &RenderRequest) -> Option<Frame> {
        let Some(foreground) = &self.foreground else {
            log::warn!("Render requested before a foreground image was loaded");
            return None;
        };

        let plan = plan_region(request, foreground)?;
        let fg = render_plan(foreground, &plan)?;
        let bg = self
            .background
            .as_ref()
            .and_then(|pyramid| render_plan(pyramid, &plan));

        let image = blend(Some(&fg), bg.as_ref(), self.opacity)?;
        Some(Frame {
            image,
            shift: plan.shift,
            level: plan.level,
        })
    }
}
