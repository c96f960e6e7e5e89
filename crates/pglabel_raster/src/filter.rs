//! Filtered preview layer with lazy pyramid rebuilds.
//!
//! The filter itself is an external collaborator behind [`ImageFilter`].
//! Parameter changes only mark the cached pyramid stale; the (possibly
//! expensive) filter runs on the next read.

use crate::error::RasterError;
use crate::pyramid::{Downsample, Pyramid, DEFAULT_MIN_LEVEL_DIMENSION};
use crate::render::{render, Frame, RenderRequest};
use image::imageops;
use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

/// Edge-preserving filter parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterParams {
    /// Pixel neighbourhood diameter
    pub diameter: i32,
    /// Colour-space sigma
    pub sigma_color: i32,
    /// Coordinate-space sigma
    pub sigma_space: i32,
}

/// A same-size raster filter.
pub trait ImageFilter {
    /// Filter `image`, returning a raster of identical dimensions.
    fn apply(&self, image: &RgbImage, params: &FilterParams) -> RgbImage;
}

/// Gaussian smoothing over the `diameter` neighbourhood (sigma = diameter / 2).
///
/// Stands in for a bilateral filter; the sigmas are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct GaussianBlurFilter;

impl ImageFilter for GaussianBlurFilter {
    fn apply(&self, image: &RgbImage, params: &FilterParams) -> RgbImage {
        if params.diameter <= 0 {
            return image.clone();
        }
        imageops::blur(image, params.diameter as f32 / 2.0)
    }
}

/// Renders the filtered version of the source image.
pub struct FilterRenderer {
    filter: Box<dyn ImageFilter>,
    source: Option<RgbImage>,
    params: FilterParams,
    pyramid: Option<Pyramid>,
    stale: bool,
    min_level_dimension: u32,
}

impl Default for FilterRenderer {
    fn default() -> Self {
        Self::new(Box::new(GaussianBlurFilter), DEFAULT_MIN_LEVEL_DIMENSION)
    }
}

impl FilterRenderer {
    pub fn new(filter: Box<dyn ImageFilter>, min_level_dimension: u32) -> Self {
        Self {
            filter,
            source: None,
            params: FilterParams::default(),
            pyramid: None,
            stale: false,
            min_level_dimension,
        }
    }

    /// Bind a new source image. The filter runs on the next read.
    pub fn bind_image(&mut self, image: RgbImage) {
        self.source = Some(image);
        self.pyramid = None;
        self.stale = true;
    }

    pub fn has_image(&self) -> bool {
        self.source.is_some()
    }

    pub fn params(&self) -> FilterParams {
        self.params
    }

    /// Update the filter parameters. Returns `true` if they changed.
    pub fn set_params(&mut self, params: FilterParams) -> bool {
        if params == self.params {
            return false;
        }
        log::debug!("Filter parameters changed: {:?}", params);
        self.params = params;
        self.stale = true;
        true
    }

    /// Whether the next read will re-run the filter.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Render the filtered image for a request.
    pub fn render(&mut self, request: &RenderRequest) -> Option<Frame> {
        let pyramid = self.current_pyramid()?;
        render(request, pyramid)
    }

    /// Grayscale of the filtered full-resolution image.
    pub fn filtered_gray(&mut self) -> Option<GrayImage> {
        let pyramid = self.current_pyramid()?;
        Some(imageops::grayscale(pyramid.base()))
    }

    fn current_pyramid(&mut self) -> Option<&Pyramid> {
        let Some(source) = &self.source else {
            log::warn!("Bind an image before rendering the filtered view");
            return None;
        };

        if self.stale || self.pyramid.is_none() {
            match self.rebuild(source) {
                Ok(pyramid) => self.pyramid = Some(pyramid),
                Err(e) => {
                    log::error!("Failed to build filtered pyramid: {}", e);
                    self.pyramid = None;
                }
            }
            self.stale = false;
        }
        self.pyramid.as_ref()
    }

    fn rebuild(&self, source: &RgbImage) -> Result<Pyramid, RasterError> {
        log::info!("Applying filter {:?}", self.params);
        let filtered = self.filter.apply(source, &self.params);
        Pyramid::build_with(filtered, self.min_level_dimension, Downsample::Nearest)
    }
}
