//! Multi-resolution image pyramid and level-of-detail selection.
//!
//! Level 0 is the full-resolution source. Every further level halves the
//! previous one in both dimensions (`round(n / 2)`), and halving continues
//! while the last produced level is still larger than the configured limit
//! in either dimension. Levels are built once per image load and never
//! mutated afterwards.

use crate::error::RasterError;
use image::imageops::{self, FilterType};
use image::RgbImage;

/// Levels stop being produced once both dimensions are at or below this size.
pub const DEFAULT_MIN_LEVEL_DIMENSION: u32 = 512;

/// Resampling used when producing the next level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Downsample {
    /// Bilinear averaging (used for the displayed layers)
    #[default]
    Linear,
    /// Pixel decimation (used for the filtered preview)
    Nearest,
}

impl Downsample {
    fn filter_type(self) -> FilterType {
        match self {
            Downsample::Linear => FilterType::Triangle,
            Downsample::Nearest => FilterType::Nearest,
        }
    }
}

/// An ordered sequence of progressively halved rasters.
#[derive(Debug, Clone)]
pub struct Pyramid {
    levels: Vec<RgbImage>,
}

impl Pyramid {
    /// Build a pyramid with the default level limit and bilinear downsampling.
    pub fn build(image: RgbImage) -> Result<Self, RasterError> {
        Self::build_with(image, DEFAULT_MIN_LEVEL_DIMENSION, Downsample::Linear)
    }

    /// Build a pyramid from a full-resolution image.
    ///
    /// # Arguments
    /// * `image` - Level 0, taken by value and kept as-is
    /// * `min_dimension` - Halving stops once both dimensions are `<= min_dimension`
    /// * `downsample` - Resampling filter for the 2× reduction
    pub fn build_with(
        image: RgbImage,
        min_dimension: u32,
        downsample: Downsample,
    ) -> Result<Self, RasterError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(RasterError::EmptyImage { width, height });
        }

        // A limit of 0 could never be reached since halving 1 yields 1.
        let min_dimension = min_dimension.max(1);
        let filter = downsample.filter_type();

        let mut levels = vec![image];
        while let Some(last) = levels.last() {
            let (w, h) = last.dimensions();
            if w <= min_dimension && h <= min_dimension {
                break;
            }
            let next = imageops::resize(last, half(w), half(h), filter);
            levels.push(next);
        }

        log::debug!(
            "Built {}-level pyramid for {}x{} image (limit {})",
            levels.len(),
            width,
            height,
            min_dimension
        );

        Ok(Self { levels })
    }

    /// Number of levels (always at least 1).
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// A pyramid always holds its full-resolution level.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Get the raster at a given level.
    pub fn level(&self, index: usize) -> Option<&RgbImage> {
        self.levels.get(index)
    }

    /// Iterate over all levels from full resolution to coarsest.
    pub fn levels(&self) -> impl Iterator<Item = &RgbImage> {
        self.levels.iter()
    }

    /// Full-resolution level.
    pub fn base(&self) -> &RgbImage {
        &self.levels[0]
    }

    /// Dimensions of the full-resolution level.
    pub fn dimensions(&self) -> (u32, u32) {
        self.base().dimensions()
    }

    /// Level to read from when displaying at `scale`.
    pub fn select_level(&self, scale: f32) -> usize {
        select_level(scale, self.levels.len())
    }
}

/// Halve a dimension, rounding half up (`round(n / 2)`).
pub fn half(dimension: u32) -> u32 {
    dimension.div_ceil(2)
}

/// Choose the pyramid level for a display scale.
///
/// Magnified or 1:1 views read level 0. Zoomed-out views read level
/// `floor(-log2(scale))`, clamped to the coarsest level available.
pub fn select_level(scale: f32, level_count: usize) -> usize {
    if scale >= 1.0 || level_count == 0 {
        return 0;
    }
    let level = (-scale.log2()).floor() as usize;
    level.min(level_count - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        })
    }

    fn level_sizes(pyramid: &Pyramid) -> Vec<(u32, u32)> {
        pyramid.levels().map(|l| l.dimensions()).collect()
    }

    #[test]
    fn test_rejects_empty_image() {
        let result = Pyramid::build(RgbImage::new(0, 10));
        assert!(matches!(
            result,
            Err(RasterError::EmptyImage {
                width: 0,
                height: 10
            })
        ));
    }

    #[test]
    fn test_small_image_has_single_level() {
        let pyramid = Pyramid::build(gradient(300, 200)).unwrap();
        assert_eq!(pyramid.len(), 1);
        assert_eq!(pyramid.dimensions(), (300, 200));
    }

    #[test]
    fn test_square_power_of_two_levels() {
        let pyramid =
            Pyramid::build_with(gradient(4096, 4096), 512, Downsample::Nearest).unwrap();
        assert_eq!(
            level_sizes(&pyramid),
            vec![(4096, 4096), (2048, 2048), (1024, 1024), (512, 512)]
        );
    }

    #[test]
    fn test_odd_dimensions_round_half_up() {
        let pyramid = Pyramid::build_with(gradient(1025, 999), 256, Downsample::Linear).unwrap();
        let sizes = level_sizes(&pyramid);
        for pair in sizes.windows(2) {
            let ((w0, h0), (w1, h1)) = (pair[0], pair[1]);
            assert_eq!(w1, (w0 as f32 / 2.0).round() as u32);
            assert_eq!(h1, (h0 as f32 / 2.0).round() as u32);
        }
        assert_eq!(sizes, vec![(1025, 999), (513, 500), (257, 250), (129, 125)]);
    }

    #[test]
    fn test_halving_continues_while_either_dimension_is_large() {
        let pyramid = Pyramid::build_with(gradient(2000, 100), 512, Downsample::Nearest).unwrap();
        let sizes = level_sizes(&pyramid);
        assert_eq!(sizes, vec![(2000, 100), (1000, 50), (500, 25)]);

        let (last_w, last_h) = *sizes.last().unwrap();
        assert!(last_w <= 512 && last_h <= 512);
        for &(w, h) in &sizes[..sizes.len() - 1] {
            assert!(w > 512 || h > 512);
        }
    }

    #[test]
    fn test_linear_downsample_averages() {
        // Alternating black/white columns average to grey.
        let image = RgbImage::from_fn(8, 2, |x, _| {
            if x % 2 == 0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let pyramid = Pyramid::build_with(image, 4, Downsample::Linear).unwrap();
        let level1 = pyramid.level(1).unwrap();
        assert_eq!(level1.dimensions(), (4, 1));
        let value = level1.get_pixel(1, 0)[0];
        assert!((100..=155).contains(&value), "got {}", value);
    }

    #[test]
    fn test_select_level() {
        assert_eq!(select_level(1.0, 4), 0);
        assert_eq!(select_level(2.0, 4), 0);
        assert_eq!(select_level(0.5, 4), 1);
        assert_eq!(select_level(0.25, 4), 2);
        assert_eq!(select_level(0.2, 4), 2);
        assert_eq!(select_level(0.75, 4), 0);
    }

    #[test]
    fn test_select_level_clamps_to_coarsest() {
        assert_eq!(select_level(0.025, 4), 3);
        assert_eq!(select_level(0.25, 2), 1);
        assert_eq!(select_level(0.1, 1), 0);
    }
}
