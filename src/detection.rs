//! Blob detection boundary.
//!
//! The detection algorithm is an external collaborator behind
//! [`BlobDetector`]. This module defines its parameter bundle and ingests the
//! candidates it returns into a [`BlobStore`].

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::model::{BlobId, BlobStore};

/// A toggleable `[min, max]` filter on one blob property.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeFilter {
    pub enabled: bool,
    pub min: f32,
    pub max: f32,
}

impl RangeFilter {
    pub const fn new(enabled: bool, min: f32, max: f32) -> Self {
        Self { enabled, min, max }
    }

    /// Whether `value` passes the filter. Disabled filters pass everything.
    pub fn accepts(&self, value: f32) -> bool {
        !self.enabled || (self.min..=self.max).contains(&value)
    }
}

/// Filter on blob intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorFilter {
    pub enabled: bool,
    /// Target intensity (0 dark blobs, 255 light blobs)
    pub value: u8,
}

/// Detector parameter bundle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    pub color: ColorFilter,
    /// Blob area in pixels
    pub area: RangeFilter,
    pub inertia: RangeFilter,
    pub circularity: RangeFilter,
    pub convexity: RangeFilter,
    /// Binarization thresholds
    pub min_threshold: u8,
    pub max_threshold: u8,
    /// Minimum distance between blob centers
    pub min_distance: f32,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            color: ColorFilter {
                enabled: true,
                value: 255,
            },
            area: RangeFilter::new(true, 100.0, 1000.0),
            inertia: RangeFilter::new(true, 0.001, 1.0),
            circularity: RangeFilter::new(true, 0.001, 1.0),
            convexity: RangeFilter::new(true, 0.001, 1.0),
            min_threshold: 0,
            max_threshold: 255,
            min_distance: 1.0,
        }
    }
}

/// A detected blob in original-image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlobCandidate {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

/// Blob detection algorithm.
pub trait BlobDetector {
    /// Detect blobs in a full-resolution grayscale image.
    fn detect(&self, image: &GrayImage, params: &DetectorParams) -> Vec<BlobCandidate>;
}

/// Add every candidate to `store`, skipping non-finite ones and those
/// without a positive radius.
///
/// Returns the ids of the added blobs.
pub fn ingest(store: &mut BlobStore, candidates: &[BlobCandidate]) -> Vec<BlobId> {
    let ids: Vec<BlobId> = candidates
        .iter()
        .filter(|c| {
            let valid =
                c.x.is_finite() && c.y.is_finite() && c.radius.is_finite() && c.radius > 0.0;
            if !valid {
                log::debug!("Skipping invalid detection {:?}", c);
            }
            valid
        })
        .map(|c| store.add(c.x, c.y, c.radius))
        .collect();
    log::info!("Ingested {} of {} detected blob(s)", ids.len(), candidates.len());
    ids
}
