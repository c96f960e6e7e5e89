//! Error types for raster operations.

use thiserror::Error;

/// Errors that can occur while building rasters for display.
#[derive(Error, Debug)]
pub enum RasterError {
    /// A pyramid needs at least one pixel to start from
    #[error("Cannot build an image pyramid from an empty {width}x{height} image")]
    EmptyImage {
        /// Width of the rejected image
        width: u32,
        /// Height of the rejected image
        height: u32,
    },
}
