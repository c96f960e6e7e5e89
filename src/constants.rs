//! Global constants for the PGLabel application

/// Default annotation ring stroke thickness, in original-image pixels
pub const DEFAULT_STROKE_THICKNESS: f32 = 5.0;

/// Smallest scale a wheel zoom-out may start from
pub const DEFAULT_MIN_SCALE: f32 = 0.025;

/// Largest scale a wheel zoom-in may start from
pub const DEFAULT_MAX_SCALE: f32 = 16.0;

/// Scale multiplier for one wheel notch
pub const DEFAULT_WHEEL_ZOOM_FACTOR: f32 = 2.0;

/// Quiet period after the last resize before redrawing
pub const DEFAULT_RESIZE_DEBOUNCE_MS: u64 = 50;

/// Surfaces smaller than this (in either dimension) are not rendered yet
pub const MIN_SURFACE_SIZE: u32 = 2;

/// Default render surface size for headless rendering
pub const DEFAULT_SURFACE_WIDTH: u32 = 800;

/// Default render surface size for headless rendering
pub const DEFAULT_SURFACE_HEIGHT: u32 = 600;

/// Outline width of the marquee rectangle, in screen pixels
pub const MARQUEE_STROKE_WIDTH: f32 = 5.0;
