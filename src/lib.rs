//! PGLabel - blob annotation over large images
//!
//! Pan/zoom viewport, circular annotations with selection and drag editing,
//! and a headless renderer. The raster work (pyramids, region rendering,
//! blending) lives in the `pglabel_raster` crate.

pub mod cli;
pub mod config;
pub mod constants;
pub mod debounce;
pub mod detection;
pub mod error;
pub mod event;
pub mod interaction;
pub mod keybindings;
pub mod model;
pub mod overlay;
pub mod session;
pub mod zoom_math;

pub use error::AppError;
pub use session::{LoadError, Session};
