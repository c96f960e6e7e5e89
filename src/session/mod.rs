//! The annotation session: one image, its blobs and the viewport showing them.
//!
//! [`Session`] is the explicit context that ties the pieces together. Input
//! events go in through [`Session::handle_event`]; every state change that
//! affects the picture triggers a synchronous redraw whose result is kept in
//! [`Session::frame`] alongside the overlays from [`Session::overlays`].

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};
use std::time::Duration;

use image::DynamicImage;
use pglabel_raster::{
    FilterParams, FilterRenderer, Frame, ImageFilter, LayerRenderer, Point, RasterError,
    RenderRequest,
};
use serde::Serialize;
use thiserror::Error;
use web_time::Instant;

use crate::config::AppConfig;
use crate::constants::{DEFAULT_SURFACE_HEIGHT, DEFAULT_SURFACE_WIDTH, MIN_SURFACE_SIZE};
use crate::debounce::ResizeDebouncer;
use crate::detection::{ingest, BlobDetector, DetectorParams};
use crate::event::{InputEvent, Key, Modifiers, PointerButton};
use crate::interaction::{InteractionController, Tool};
use crate::keybindings::{Action, KeyBindings};
use crate::model::BlobStore;
use crate::overlay::{project_blobs, project_marquee, project_pending, Overlay};
use crate::zoom_math::{Viewport, ZoomDirection, ZoomLimits};

/// Errors that can occur when loading an image into a session.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file could not be read or decoded
    #[error("Failed to load image {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The decoded image cannot be displayed
    #[error(transparent)]
    Raster(#[from] RasterError),
}

/// Snapshot of the values a status bar shows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusReadout {
    pub scale: f32,
    pub total_blobs: usize,
    pub selected_blobs: usize,
    /// Integer original-image coordinate under the pointer
    pub pointer: Option<(i64, i64)>,
    pub filtered_view: bool,
}

/// Called with every render request the session issues.
pub type RenderCallback = Box<dyn FnMut(&RenderRequest)>;

/// Annotation session over one foreground image.
pub struct Session {
    layers: LayerRenderer,
    filter: FilterRenderer,
    store: BlobStore,
    controller: InteractionController,
    viewport: Viewport,
    limits: ZoomLimits,
    keybindings: KeyBindings,
    detector_params: DetectorParams,

    surface: (u32, u32),
    resize: ResizeDebouncer,
    redraw_pending: bool,
    frame: Option<Frame>,
    on_render: Option<RenderCallback>,

    /// Primary button held (drag vs. hover)
    primary_held: bool,
    /// Last pointer position of an active middle-button pan
    pan_anchor: Option<Point>,
    /// Original-image position under the pointer
    pointer: Option<Point>,

    filtered_view: bool,
    show_overlays: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}

impl Session {
    /// Create an empty session configured from `config`.
    pub fn new(config: &AppConfig) -> Self {
        Self::with_filter(config, Box::new(pglabel_raster::GaussianBlurFilter))
    }

    /// Create an empty session with a specific filter implementation.
    pub fn with_filter(config: &AppConfig, filter: Box<dyn ImageFilter>) -> Self {
        let min_level = config.pyramid.min_level_dimension;
        let mut filter = FilterRenderer::new(filter, min_level);
        filter.set_params(config.filter);

        let mut store = BlobStore::new();
        store.set_thickness(config.preferences.stroke_thickness);

        Self {
            layers: LayerRenderer::new(min_level),
            filter,
            store,
            controller: InteractionController::new(),
            viewport: Viewport::identity(),
            limits: config.viewport.zoom,
            keybindings: config.keybindings.clone(),
            detector_params: config.detector,
            surface: (DEFAULT_SURFACE_WIDTH, DEFAULT_SURFACE_HEIGHT),
            resize: ResizeDebouncer::new(Duration::from_millis(config.viewport.resize_debounce_ms)),
            redraw_pending: false,
            frame: None,
            on_render: None,
            primary_held: false,
            pan_anchor: None,
            pointer: None,
            filtered_view: false,
            show_overlays: config.preferences.show_annotations,
        }
    }

    /// Register the render-surface callback.
    pub fn on_render(&mut self, callback: impl FnMut(&RenderRequest) + 'static) {
        self.on_render = Some(Box::new(callback));
    }

    // ========================================================================
    // Images
    // ========================================================================

    /// Load a new foreground image.
    ///
    /// Drops the background, clears every blob, rebinds the filtered view and
    /// resets the viewport.
    pub fn load_foreground(&mut self, image: DynamicImage) -> Result<(), LoadError> {
        let rgb = image.to_rgb8();
        self.layers.load_foreground(rgb.clone())?;
        self.filter.bind_image(rgb);

        self.store.reset();
        self.controller.reset();
        self.viewport = Viewport::identity();
        self.frame = None;
        self.request_redraw();
        Ok(())
    }

    /// Decode an image file and load it as the foreground.
    pub fn load_foreground_path(&mut self, path: &Path) -> Result<(), LoadError> {
        let image = open_image(path)?;
        self.load_foreground(image)?;
        log::info!("Opened {:?}", path);
        Ok(())
    }

    /// Load the reference image blended under the foreground.
    ///
    /// Returns `Ok(false)` without loading when there is no foreground yet.
    pub fn load_background(&mut self, image: DynamicImage) -> Result<bool, LoadError> {
        let loaded = self.layers.load_background(image.to_rgb8())?;
        if loaded {
            self.request_redraw();
        }
        Ok(loaded)
    }

    /// Decode an image file and load it as the background.
    pub fn load_background_path(&mut self, path: &Path) -> Result<bool, LoadError> {
        if !self.has_image() {
            log::warn!("Load the foreground before the background");
            return Ok(false);
        }
        let image = open_image(path)?;
        self.load_background(image)
    }

    pub fn has_image(&self) -> bool {
        self.layers.has_foreground()
    }

    /// Full-resolution size of the foreground.
    pub fn image_size(&self) -> Option<(u32, u32)> {
        self.layers.foreground().map(|pyramid| pyramid.dimensions())
    }

    /// Number of pyramid levels of the foreground (0 without an image).
    pub fn level_count(&self) -> usize {
        self.layers.foreground().map_or(0, |pyramid| pyramid.len())
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Process one input event. Returns `true` if anything visible changed.
    pub fn handle_event(&mut self, event: InputEvent, now: Instant) -> bool {
        let changed = match event {
            InputEvent::Resized { width, height } => {
                self.resize.notify(width, height, now);
                false
            }
            _ if !self.has_image() => {
                log::trace!("Ignoring {:?}: no image loaded", event);
                false
            }
            InputEvent::PointerPressed {
                button,
                position,
                modifiers,
            } => self.pointer_pressed(button, position, modifiers),
            InputEvent::PointerReleased {
                button, modifiers, ..
            } => self.pointer_released(button, modifiers),
            InputEvent::PointerMoved { position, .. } => self.pointer_moved(position),
            InputEvent::Wheel { delta, position } => self.wheel(delta, position),
            // Actions redraw themselves.
            InputEvent::KeyPressed { key, modifiers } => return self.key_pressed(key, modifiers),
        };

        if changed {
            self.request_redraw();
        }
        changed
    }

    fn pointer_pressed(
        &mut self,
        button: PointerButton,
        position: Point,
        modifiers: Modifiers,
    ) -> bool {
        match button {
            PointerButton::Left => {
                self.primary_held = true;
                if self.filtered_view {
                    return false;
                }
                self.controller
                    .press(position, modifiers, &self.viewport, &mut self.store)
            }
            PointerButton::Right if !self.filtered_view => self.controller.cancel(),
            PointerButton::Middle => {
                self.pan_anchor = Some(position);
                false
            }
            PointerButton::Right | PointerButton::Other(_) => false,
        }
    }

    fn pointer_released(&mut self, button: PointerButton, modifiers: Modifiers) -> bool {
        match button {
            PointerButton::Left => {
                self.primary_held = false;
                if self.filtered_view {
                    return false;
                }
                self.controller.release(modifiers, &mut self.store)
            }
            PointerButton::Middle => {
                self.pan_anchor = None;
                false
            }
            PointerButton::Right | PointerButton::Other(_) => false,
        }
    }

    fn pointer_moved(&mut self, position: Point) -> bool {
        let mut changed = false;

        if let Some(last) = self.pan_anchor {
            let delta = position - last;
            self.viewport = self.viewport.pan_by(delta.x, delta.y);
            self.pan_anchor = Some(position);
            changed = true;
        }

        self.pointer = Some(self.viewport.to_original(position));

        if !self.filtered_view {
            changed |= if self.primary_held {
                self.controller
                    .drag(position, &self.viewport, &mut self.store)
            } else {
                self.controller.hover(position, &self.viewport)
            };
        }
        changed
    }

    fn wheel(&mut self, delta: f32, position: Point) -> bool {
        let Some(direction) = ZoomDirection::from_wheel_delta(delta) else {
            return false;
        };
        match self.viewport.wheel_zoom(direction, position, &self.limits) {
            Some(viewport) => {
                log::debug!("Zoom {:?} to {}", direction, viewport.scale);
                self.viewport = viewport;
                true
            }
            None => {
                log::debug!("Zoom limit reached at scale {}", self.viewport.scale);
                false
            }
        }
    }

    fn key_pressed(&mut self, key: Key, _modifiers: Modifiers) -> bool {
        let Some(action) = self.keybindings.action_for_key(key) else {
            return false;
        };
        log::debug!("Key {:?} -> {}", key, action.name());
        self.perform(action)
    }

    /// Run a bound action, redrawing as needed. Returns `true` if anything
    /// visible changed.
    pub fn perform(&mut self, action: Action) -> bool {
        match action {
            Action::CursorTool => self.switch_tool(Tool::Cursor),
            Action::DrawTool => self.switch_tool(Tool::Draw),
            Action::DeleteSelected => self.delete_selected() > 0,
            Action::ToggleOverlay => {
                self.toggle_overlays();
                true
            }
            Action::ToggleFilteredView => {
                self.toggle_filtered_view();
                true
            }
            Action::ResetView => {
                self.reset_view();
                true
            }
            Action::FitView => {
                self.fit_view();
                true
            }
        }
    }

    /// Delete every selected blob (cursor tool only). Returns how many were removed.
    pub fn delete_selected(&mut self) -> usize {
        let removed = self.controller.delete_selected(&mut self.store).len();
        if removed > 0 {
            log::info!("Deleted {} blob(s)", removed);
            self.request_redraw();
        }
        removed
    }

    // ========================================================================
    // Viewport
    // ========================================================================

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Replace the viewport and redraw.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.request_redraw();
    }

    /// Scale 1, no offset.
    pub fn reset_view(&mut self) {
        self.set_viewport(Viewport::identity());
    }

    /// Fit the whole foreground into the surface, centered.
    pub fn fit_view(&mut self) {
        let Some(size) = self.image_size() else {
            log::warn!("Load an image before fitting the view");
            return;
        };
        self.set_viewport(Viewport::fit(size, self.surface, &self.limits));
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.surface
    }

    /// Apply a surface size immediately, bypassing the resize debounce.
    pub fn set_surface_size(&mut self, width: u32, height: u32) {
        self.surface = (width, height);
        self.request_redraw();
    }

    /// Apply a debounced resize once it has settled. Returns `true` if it redrew.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.resize.poll(now) {
            Some((width, height)) => {
                log::debug!("Surface resized to {}x{}", width, height);
                self.surface = (width, height);
                self.request_redraw()
            }
            None if self.redraw_pending => self.redraw(),
            None => false,
        }
    }

    /// Whether a redraw is waiting for a usable surface size.
    pub fn redraw_pending(&self) -> bool {
        self.redraw_pending || self.resize.is_pending()
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    fn request_redraw(&mut self) -> bool {
        self.redraw_pending = true;
        self.redraw()
    }

    /// Render the visible region into [`Session::frame`].
    ///
    /// Surfaces smaller than the minimum size keep the redraw pending. When
    /// the renderer produces nothing the previous frame is kept.
    pub fn redraw(&mut self) -> bool {
        let (width, height) = self.surface;
        if width < MIN_SURFACE_SIZE || height < MIN_SURFACE_SIZE {
            log::trace!("Surface {}x{} too small, redraw deferred", width, height);
            self.redraw_pending = true;
            return false;
        }
        self.redraw_pending = false;

        if !self.has_image() {
            log::debug!("Nothing to render: no image loaded");
            return false;
        }

        let request = self.viewport.visible_region(width, height);
        if let Some(callback) = self.on_render.as_mut() {
            callback(&request);
        }

        let frame = if self.filtered_view {
            self.filter.render(&request)
        } else {
            self.layers.render(&request)
        };

        match frame {
            Some(frame) => {
                self.frame = Some(frame);
                true
            }
            None => false,
        }
    }

    /// Last rendered frame.
    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    /// Overlays to draw on top of the frame, in screen coordinates.
    ///
    /// Blobs are hidden in the filtered view and when overlays are toggled off.
    pub fn overlays(&self) -> Vec<Overlay> {
        if !self.has_image() {
            return Vec::new();
        }

        let mut overlays = if self.show_overlays && !self.filtered_view {
            project_blobs(&self.store, &self.viewport)
        } else {
            Vec::new()
        };

        if let Some((center, radius)) = self.controller.pending_blob() {
            overlays.push(project_pending(
                center,
                radius,
                self.store.thickness(),
                &self.viewport,
            ));
        }
        if let Some(rect) = self.controller.marquee() {
            overlays.push(project_marquee(&rect, &self.viewport));
        }
        overlays
    }

    pub fn status(&self) -> StatusReadout {
        StatusReadout {
            scale: self.viewport.scale,
            total_blobs: self.store.len(),
            selected_blobs: self.store.selected_count(),
            pointer: self.pointer.map(|p| (p.x as i64, p.y as i64)),
            filtered_view: self.filtered_view,
        }
    }

    // ========================================================================
    // Layers, filter and detection
    // ========================================================================

    pub fn set_opacity(&mut self, opacity: f32) {
        self.layers.set_opacity(opacity);
        if !self.filtered_view {
            self.request_redraw();
        }
    }

    pub fn opacity(&self) -> f32 {
        self.layers.opacity()
    }

    /// Switch between the layered view and the filtered view.
    ///
    /// Any half-finished gesture is dropped. Returns the new state.
    pub fn toggle_filtered_view(&mut self) -> bool {
        self.filtered_view = !self.filtered_view;
        self.controller.reset();
        self.primary_held = false;
        log::debug!("Filtered view {}", if self.filtered_view { "on" } else { "off" });
        self.request_redraw();
        self.filtered_view
    }

    pub fn is_filtered_view(&self) -> bool {
        self.filtered_view
    }

    /// Show or hide blob overlays. Returns the new state.
    pub fn toggle_overlays(&mut self) -> bool {
        self.show_overlays = !self.show_overlays;
        self.show_overlays
    }

    pub fn overlays_visible(&self) -> bool {
        self.show_overlays
    }

    /// Update the filter parameters. The filter re-runs on the next read.
    pub fn set_filter_params(&mut self, params: FilterParams) {
        if self.filter.set_params(params) && self.filtered_view {
            self.request_redraw();
        }
    }

    pub fn filter_params(&self) -> FilterParams {
        self.filter.params()
    }

    pub fn set_detector_params(&mut self, params: DetectorParams) {
        self.detector_params = params;
    }

    pub fn detector_params(&self) -> DetectorParams {
        self.detector_params
    }

    /// Replace all blobs with the detector's findings on the filtered image.
    ///
    /// Returns the number of blobs added, or `None` without an image.
    pub fn detect_blobs(&mut self, detector: &dyn BlobDetector) -> Option<usize> {
        if !self.has_image() {
            log::warn!("Load an image before detecting blobs");
            return None;
        }

        self.store.reset();
        self.controller.reset();
        let gray = self.filter.filtered_gray()?;
        let candidates = detector.detect(&gray, &self.detector_params);
        let added = ingest(&mut self.store, &candidates).len();
        self.request_redraw();
        Some(added)
    }

    // ========================================================================
    // Blobs
    // ========================================================================

    pub fn store(&self) -> &BlobStore {
        &self.store
    }

    /// Mutable access to the blobs, for bulk edits outside the pointer tools.
    pub fn store_mut(&mut self) -> &mut BlobStore {
        &mut self.store
    }

    pub fn tool(&self) -> Tool {
        self.controller.tool()
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.switch_tool(tool);
    }

    fn switch_tool(&mut self, tool: Tool) -> bool {
        let changed = self.controller.set_tool(tool);
        if changed {
            self.request_redraw();
        }
        changed
    }

    pub fn set_stroke_thickness(&mut self, thickness: f32) {
        self.store.set_thickness(thickness);
        self.request_redraw();
    }
}

fn open_image(path: &Path) -> Result<DynamicImage, LoadError> {
    image::open(path).map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })
}
