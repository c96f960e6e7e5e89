//! Two-layer opacity blending.

use image::RgbImage;

/// Blend a foreground raster over an optional background raster.
///
/// * Foreground only: every channel is multiplied by `opacity`, dimming the
///   image toward black (the output has no alpha channel).
/// * Both layers: `bg * (1 - opacity) + fg * opacity`.
///
/// Each channel is clamped to `0..=255` after blending, which is also what
/// keeps out-of-range opacities well defined. Without a foreground there is
/// nothing to show and `None` is returned.
pub fn blend(
    foreground: Option<&RgbImage>,
    background: Option<&RgbImage>,
    opacity: f32,
) -> Option<RgbImage> {
    let foreground = foreground?;
    let mut output = foreground.clone();

    match background {
        Some(background) if background.dimensions() == foreground.dimensions() => {
            let keep = 1.0 - opacity;
            for (out, bg) in output.iter_mut().zip(background.iter()) {
                *out = to_channel(f32::from(*bg) * keep + f32::from(*out) * opacity);
            }
        }
        Some(background) => {
            log::warn!(
                "Background render {:?} does not match foreground {:?}, blending foreground only",
                background.dimensions(),
                foreground.dimensions()
            );
            dim(&mut output, opacity);
        }
        None => dim(&mut output, opacity),
    }

    Some(output)
}

fn dim(image: &mut RgbImage, opacity: f32) {
    for value in image.iter_mut() {
        *value = to_channel(f32::from(*value) * opacity);
    }
}

fn to_channel(value: f32) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid(value: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(4, 3, Rgb(value))
    }

    #[test]
    fn test_no_foreground_no_output() {
        let bg = solid([1, 2, 3]);
        assert!(blend(None, Some(&bg), 0.5).is_none());
        assert!(blend(None, None, 0.5).is_none());
    }

    #[test]
    fn test_zero_opacity_yields_background() {
        let fg = solid([200, 100, 50]);
        let bg = solid([10, 20, 30]);
        let out = blend(Some(&fg), Some(&bg), 0.0).unwrap();
        assert_eq!(out, bg);
    }

    #[test]
    fn test_full_opacity_yields_foreground() {
        let fg = solid([200, 100, 50]);
        let bg = solid([10, 20, 30]);
        let out = blend(Some(&fg), Some(&bg), 1.0).unwrap();
        assert_eq!(out, fg);
    }

    #[test]
    fn test_half_opacity_is_mean() {
        let fg = solid([200, 100, 51]);
        let bg = solid([0, 50, 250]);
        let out = blend(Some(&fg), Some(&bg), 0.5).unwrap();
        let pixel = out.get_pixel(2, 1);
        for (c, expected) in [100u8, 75, 150].into_iter().enumerate() {
            assert!(pixel[c].abs_diff(expected) <= 1, "channel {}: {}", c, pixel[c]);
        }
    }

    #[test]
    fn test_foreground_only_dims_toward_black() {
        let fg = solid([200, 100, 50]);
        let out = blend(Some(&fg), None, 0.5).unwrap();
        assert_eq!(out.get_pixel(0, 0), &Rgb([100, 50, 25]));

        let black = blend(Some(&fg), None, 0.0).unwrap();
        assert_eq!(black.get_pixel(3, 2), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_out_of_range_opacity_is_clamped_per_channel() {
        let fg = solid([200, 100, 50]);
        let bg = solid([100, 100, 100]);

        // 2*fg - bg: 300 -> 255, 100, 0
        let over = blend(Some(&fg), Some(&bg), 2.0).unwrap();
        assert_eq!(over.get_pixel(0, 0), &Rgb([255, 100, 0]));

        // 2*bg - fg: 0, 100, 150
        let under = blend(Some(&fg), Some(&bg), -1.0).unwrap();
        assert_eq!(under.get_pixel(0, 0), &Rgb([0, 100, 150]));

        let bright = blend(Some(&fg), None, 3.0).unwrap();
        assert_eq!(bright.get_pixel(0, 0), &Rgb([255, 255, 150]));
    }

    #[test]
    fn test_mismatched_background_falls_back_to_foreground() {
        let fg = solid([200, 100, 50]);
        let bg = RgbImage::from_pixel(2, 2, Rgb([0, 0, 0]));
        let out = blend(Some(&fg), Some(&bg), 1.0).unwrap();
        assert_eq!(out, fg);
    }
}
