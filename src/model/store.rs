//! Blob storage and selection.
//!
//! Blobs live in an id-keyed ordered map. Ids are handed out sequentially and
//! only grow, so map order is also insertion order, and a removed id never
//! comes back until the store is reset.

use std::collections::{BTreeMap, BTreeSet};

use pglabel_raster::{Point, Rect};

use super::blob::{Blob, BlobId};
use crate::constants::DEFAULT_STROKE_THICKNESS;

/// Storage for the blobs of the current image plus the selection set.
#[derive(Debug, Clone)]
pub struct BlobStore {
    blobs: BTreeMap<BlobId, Blob>,
    selected: BTreeSet<BlobId>,
    next_id: BlobId,
    /// Ring stroke thickness in original-image pixels.
    thickness: f32,
}

impl Default for BlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore {
    pub fn new() -> Self {
        Self {
            blobs: BTreeMap::new(),
            selected: BTreeSet::new(),
            next_id: 0,
            thickness: DEFAULT_STROKE_THICKNESS,
        }
    }

    /// Add a blob and return its ID.
    pub fn add(&mut self, x: f32, y: f32, radius: f32) -> BlobId {
        let id = self.next_id;
        self.next_id += 1;
        self.blobs.insert(id, Blob::new(id, Point::new(x, y), radius));
        id
    }

    pub fn get(&self, id: BlobId) -> Option<&Blob> {
        self.blobs.get(&id)
    }

    /// All live blobs in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Blob> {
        self.blobs.values()
    }

    /// Snapshot of all live blobs in creation order.
    pub fn list_all(&self) -> Vec<Blob> {
        self.blobs.values().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    /// The id the next added blob will receive.
    pub fn next_id(&self) -> BlobId {
        self.next_id
    }

    pub fn thickness(&self) -> f32 {
        self.thickness
    }

    pub fn set_thickness(&mut self, thickness: f32) {
        self.thickness = thickness;
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Select a live blob. Returns `false` for unknown ids.
    pub fn select(&mut self, id: BlobId) -> bool {
        if !self.blobs.contains_key(&id) {
            return false;
        }
        self.selected.insert(id);
        true
    }

    /// Remove a blob from the selection. Returns `true` if it was selected.
    pub fn deselect(&mut self, id: BlobId) -> bool {
        self.selected.remove(&id)
    }

    /// Flip a blob's selection. Returns the new selection state.
    pub fn toggle(&mut self, id: BlobId) -> bool {
        if self.selected.remove(&id) {
            false
        } else {
            self.select(id)
        }
    }

    pub fn is_selected(&self, id: BlobId) -> bool {
        self.selected.contains(&id)
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Selected ids in ascending order.
    pub fn selected_ids(&self) -> impl Iterator<Item = BlobId> + '_ {
        self.selected.iter().copied()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Select every blob whose bounding square lies entirely inside `rect`.
    ///
    /// Unless `additive`, the previous selection is replaced. Returns the
    /// number of blobs newly matched by the rectangle.
    pub fn select_within(&mut self, rect: &Rect, additive: bool) -> usize {
        if !additive {
            self.selected.clear();
        }
        let matched: Vec<BlobId> = self
            .blobs
            .values()
            .filter(|blob| blob.is_inside(rect))
            .map(|blob| blob.id)
            .collect();
        self.selected.extend(matched.iter().copied());
        matched.len()
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// First blob (in creation order) whose ring is under `point`.
    pub fn hit_test(&self, point: Point) -> Option<BlobId> {
        self.blobs
            .values()
            .find(|blob| blob.ring_contains(point, self.thickness))
            .map(|blob| blob.id)
    }

    /// Move every selected blob's center by `delta`.
    pub fn translate_selected(&mut self, delta: Point) {
        for id in &self.selected {
            if let Some(blob) = self.blobs.get_mut(id) {
                blob.center += delta;
            }
        }
    }

    /// Remove every selected blob and empty the selection.
    ///
    /// Returns the removed blobs in creation order.
    pub fn delete_selected(&mut self) -> Vec<Blob> {
        let snapshot: Vec<BlobId> = std::mem::take(&mut self.selected).into_iter().collect();
        let removed: Vec<Blob> = snapshot
            .into_iter()
            .filter_map(|id| self.blobs.remove(&id))
            .collect();
        if removed.is_empty() {
            log::debug!("No blob is currently selected");
        } else {
            log::debug!("Deleted {} selected blob(s)", removed.len());
        }
        removed
    }

    /// Clear blobs and selection and restart ids at 0.
    pub fn reset(&mut self) {
        self.blobs.clear();
        self.selected.clear();
        self.next_id = 0;
    }
}
