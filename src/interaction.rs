//! Pointer gesture state machine for the cursor and draw tools.
//!
//! The controller owns only gesture state. Blobs live in a
//! [`BlobStore`] and the pan/zoom state in a [`Viewport`]; both are passed in
//! by the caller on every event. All positions handed to the controller are
//! screen coordinates and are mapped to original-image space here.

use pglabel_raster::{Point, Rect};

use crate::event::Modifiers;
use crate::model::{BlobId, BlobStore};
use crate::zoom_math::Viewport;

/// Annotation tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Select, move and marquee-select blobs
    #[default]
    Cursor,
    /// Place new blobs with two clicks
    Draw,
}

impl Tool {
    /// Get the display name for this tool.
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Cursor => "Cursor",
            Tool::Draw => "Draw",
        }
    }
}

/// Draw-tool sub-state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DrawState {
    /// Waiting for the first click.
    #[default]
    Idle,
    /// Center placed, radius follows the pointer.
    PendingPlacement { center: Point, radius: f32 },
}

/// Cursor-tool gesture in progress (original-image coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum Gesture {
    #[default]
    Idle,
    /// Button down without a drag target; a drag turns this into a marquee.
    Pressed { anchor: Point },
    /// Moving the selection; deltas are taken from `last`.
    DragMove { last: Point },
    /// Rubber-band selection.
    Marquee { anchor: Point, current: Point },
}

/// Interaction state machine.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    tool: Tool,
    draw: DrawState,
    gesture: Gesture,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn draw_state(&self) -> DrawState {
        self.draw
    }

    /// Switch tools, cancelling any pending placement or gesture.
    ///
    /// Returns `true` if anything visible changed.
    pub fn set_tool(&mut self, tool: Tool) -> bool {
        let cancelled = self.cancel();
        let gesture_active = self.gesture != Gesture::Idle;
        self.gesture = Gesture::Idle;
        if self.tool == tool {
            return cancelled || gesture_active;
        }
        log::debug!("Switched to {} tool", tool.name());
        self.tool = tool;
        true
    }

    /// Right-click: drop a pending placement. Returns `true` if one existed.
    pub fn cancel(&mut self) -> bool {
        match self.draw {
            DrawState::PendingPlacement { .. } => {
                self.draw = DrawState::Idle;
                true
            }
            DrawState::Idle => false,
        }
    }

    /// Primary button pressed at `screen`.
    pub fn press(
        &mut self,
        screen: Point,
        modifiers: Modifiers,
        viewport: &Viewport,
        store: &mut BlobStore,
    ) -> bool {
        let position = viewport.to_original(screen);
        match self.tool {
            Tool::Cursor => {
                self.press_cursor(position, modifiers, store);
                true
            }
            Tool::Draw => self.press_draw(position, store),
        }
    }

    fn press_cursor(&mut self, position: Point, modifiers: Modifiers, store: &mut BlobStore) {
        self.gesture = Gesture::Pressed { anchor: position };

        match store.hit_test(position) {
            Some(id) if modifiers.accumulates() => {
                store.toggle(id);
            }
            Some(id) => {
                if !store.is_selected(id) {
                    store.clear_selection();
                    store.select(id);
                }
                self.gesture = Gesture::DragMove { last: position };
            }
            None if !modifiers.accumulates() => store.clear_selection(),
            None => {}
        }
    }

    fn press_draw(&mut self, position: Point, store: &mut BlobStore) -> bool {
        match self.draw {
            DrawState::Idle => {
                self.draw = DrawState::PendingPlacement {
                    center: position,
                    radius: 0.0,
                };
                false
            }
            DrawState::PendingPlacement { center, radius } => {
                self.draw = DrawState::Idle;
                if radius > 0.0 {
                    let id = store.add(center.x, center.y, radius);
                    log::debug!("Placed blob {} at {:?} r={}", id, center, radius);
                }
                true
            }
        }
    }

    /// Pointer moved with the primary button held.
    pub fn drag(&mut self, screen: Point, viewport: &Viewport, store: &mut BlobStore) -> bool {
        let position = viewport.to_original(screen);
        if self.tool == Tool::Draw {
            return self.update_radius(position);
        }

        match self.gesture {
            Gesture::Idle => false,
            Gesture::DragMove { last } => {
                store.translate_selected(position - last);
                self.gesture = Gesture::DragMove { last: position };
                true
            }
            Gesture::Pressed { anchor } | Gesture::Marquee { anchor, .. } => {
                self.gesture = Gesture::Marquee {
                    anchor,
                    current: position,
                };
                true
            }
        }
    }

    /// Pointer moved with no button held.
    pub fn hover(&mut self, screen: Point, viewport: &Viewport) -> bool {
        self.update_radius(viewport.to_original(screen))
    }

    fn update_radius(&mut self, position: Point) -> bool {
        match &mut self.draw {
            DrawState::PendingPlacement { center, radius } => {
                *radius = center.distance_to(&position);
                true
            }
            DrawState::Idle => false,
        }
    }

    /// Primary button released.
    ///
    /// A marquee selects the blobs inside it; the modifier state at release
    /// decides whether the selection is extended or replaced.
    pub fn release(&mut self, modifiers: Modifiers, store: &mut BlobStore) -> bool {
        match std::mem::take(&mut self.gesture) {
            Gesture::Marquee { anchor, current } => {
                let rect = Rect::from_corners(anchor, current);
                let matched = store.select_within(&rect, modifiers.accumulates());
                log::debug!("Marquee matched {} blob(s)", matched);
                true
            }
            Gesture::DragMove { .. } | Gesture::Pressed { .. } | Gesture::Idle => false,
        }
    }

    /// Delete the selection. Ignored while the draw tool is active.
    pub fn delete_selected(&mut self, store: &mut BlobStore) -> Vec<BlobId> {
        if self.tool == Tool::Draw {
            return Vec::new();
        }
        store.delete_selected().into_iter().map(|b| b.id).collect()
    }

    /// Current marquee rectangle in original-image coordinates.
    pub fn marquee(&self) -> Option<Rect> {
        match self.gesture {
            Gesture::Marquee { anchor, current } => Some(Rect::from_corners(anchor, current)),
            _ => None,
        }
    }

    /// Blob awaiting its second click, if its radius is non-zero.
    pub fn pending_blob(&self) -> Option<(Point, f32)> {
        match self.draw {
            DrawState::PendingPlacement { center, radius } if radius > 0.0 => {
                Some((center, radius))
            }
            _ => None,
        }
    }

    /// Whether a selection move is in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::DragMove { .. })
    }

    /// Drop every in-flight gesture and pending placement.
    pub fn reset(&mut self) {
        self.draw = DrawState::Idle;
        self.gesture = Gesture::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn setup() -> (InteractionController, Viewport, BlobStore) {
        let mut store = BlobStore::new();
        store.add(100.0, 100.0, 20.0); // 0
        store.add(300.0, 100.0, 20.0); // 1
        store.add(500.0, 500.0, 30.0); // 2
        (InteractionController::new(), Viewport::identity(), store)
    }

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_click_ring_selects_only_it() {
        let (mut ctl, vp, mut store) = setup();
        store.select(1);

        ctl.press(p(120.0, 100.0), Modifiers::NONE, &vp, &mut store);

        assert!(store.is_selected(0));
        assert!(!store.is_selected(1));
        assert!(ctl.is_dragging());
        assert!(!ctl.release(Modifiers::NONE, &mut store));
    }

    #[test]
    fn test_press_on_selected_ring_keeps_group_and_drags() {
        let (mut ctl, vp, mut store) = setup();
        store.select(0);
        store.select(1);

        ctl.press(p(120.0, 100.0), Modifiers::NONE, &vp, &mut store);
        assert_eq!(store.selected_count(), 2);
        assert!(ctl.is_dragging());

        ctl.drag(p(125.0, 110.0), &vp, &mut store);
        ctl.drag(p(130.0, 90.0), &vp, &mut store);
        ctl.release(Modifiers::NONE, &mut store);

        assert_eq!(store.get(0).unwrap().center, p(110.0, 90.0));
        assert_eq!(store.get(1).unwrap().center, p(310.0, 90.0));
        assert_eq!(store.get(2).unwrap().center, p(500.0, 500.0));
    }

    #[test]
    fn test_drag_delta_uses_original_coordinates() {
        let (mut ctl, _, mut store) = setup();
        let vp = Viewport::new(2.0, Point::ZERO);

        // Blob 0's ring at (120, 100) is at screen (240, 200).
        ctl.press(p(240.0, 200.0), Modifiers::NONE, &vp, &mut store);
        ctl.drag(p(260.0, 200.0), &vp, &mut store);

        assert_eq!(store.get(0).unwrap().center, p(110.0, 100.0));
    }

    #[test]
    fn test_modifier_click_toggles_without_drag() {
        let (mut ctl, vp, mut store) = setup();
        store.select(1);

        ctl.press(p(120.0, 100.0), Modifiers::CTRL, &vp, &mut store);
        assert!(store.is_selected(0) && store.is_selected(1));
        assert!(!ctl.is_dragging());

        ctl.release(Modifiers::CTRL, &mut store);
        ctl.press(p(120.0, 100.0), Modifiers::CTRL, &vp, &mut store);
        assert!(!store.is_selected(0));
        assert!(store.is_selected(1));
    }

    #[test]
    fn test_background_click_clears_unless_modifier() {
        let (mut ctl, vp, mut store) = setup();
        store.select(0);

        ctl.press(p(900.0, 900.0), Modifiers::CTRL, &vp, &mut store);
        ctl.release(Modifiers::CTRL, &mut store);
        assert_eq!(store.selected_count(), 1);

        ctl.press(p(900.0, 900.0), Modifiers::NONE, &vp, &mut store);
        assert!(!ctl.release(Modifiers::NONE, &mut store));
        assert_eq!(store.selected_count(), 0);
    }

    #[test]
    fn test_marquee_selects_fully_contained() {
        let (mut ctl, vp, mut store) = setup();

        ctl.press(p(350.0, 0.0), Modifiers::NONE, &vp, &mut store);
        ctl.drag(p(200.0, 150.0), &vp, &mut store);
        ctl.drag(p(50.0, 200.0), &vp, &mut store);
        assert_eq!(
            ctl.marquee(),
            Some(Rect::from_corners(p(50.0, 0.0), p(350.0, 200.0)))
        );

        assert!(ctl.release(Modifiers::NONE, &mut store));
        assert!(ctl.marquee().is_none());
        assert!(store.is_selected(0));
        assert!(store.is_selected(1));
        assert!(!store.is_selected(2));
    }

    #[test]
    fn test_marquee_excludes_boundary_crossing() {
        let (mut ctl, vp, mut store) = setup();

        ctl.press(p(0.0, 0.0), Modifiers::NONE, &vp, &mut store);
        ctl.drag(p(310.0, 200.0), &vp, &mut store);
        ctl.release(Modifiers::NONE, &mut store);

        assert!(store.is_selected(0));
        assert!(!store.is_selected(1));
    }

    #[test]
    fn test_marquee_additive_with_modifier_at_release() {
        let (mut ctl, vp, mut store) = setup();
        store.select(2);

        ctl.press(p(0.0, 0.0), Modifiers::NONE, &vp, &mut store);
        // Background press without modifier already cleared the selection.
        assert_eq!(store.selected_count(), 0);
        store.select(2);
        ctl.drag(p(150.0, 150.0), &vp, &mut store);
        ctl.release(Modifiers::CTRL, &mut store);

        assert!(store.is_selected(0));
        assert!(store.is_selected(2));
    }

    #[test]
    fn test_marquee_replaces_without_modifier() {
        let (mut ctl, vp, mut store) = setup();

        ctl.press(p(250.0, 250.0), Modifiers::CTRL, &vp, &mut store);
        store.select(2);
        ctl.drag(p(0.0, 0.0), &vp, &mut store);
        ctl.release(Modifiers::NONE, &mut store);

        assert!(!store.is_selected(2));
        assert!(store.is_selected(0));
    }

    #[test]
    fn test_release_without_drag_is_noop() {
        let (mut ctl, vp, mut store) = setup();
        ctl.press(p(900.0, 900.0), Modifiers::NONE, &vp, &mut store);
        assert!(!ctl.release(Modifiers::NONE, &mut store));
        assert!(!ctl.release(Modifiers::NONE, &mut store));
    }

    #[test]
    fn test_draw_two_clicks_commit() {
        let (mut ctl, vp, mut store) = setup();
        ctl.set_tool(Tool::Draw);

        ctl.press(p(50.0, 50.0), Modifiers::NONE, &vp, &mut store);
        assert!(ctl.hover(p(53.0, 54.0), &vp));
        let (center, radius) = ctl.pending_blob().unwrap();
        assert_eq!(center, p(50.0, 50.0));
        assert!(approx_eq(radius, 5.0));

        ctl.press(p(53.0, 54.0), Modifiers::NONE, &vp, &mut store);
        assert_eq!(ctl.draw_state(), DrawState::Idle);
        let blob = store.get(3).unwrap();
        assert_eq!(blob.center, p(50.0, 50.0));
        assert!(approx_eq(blob.radius, 5.0));
    }

    #[test]
    fn test_draw_radius_in_original_units() {
        let (mut ctl, _, mut store) = setup();
        let vp = Viewport::new(0.5, Point::new(10.0, 10.0));
        ctl.set_tool(Tool::Draw);

        ctl.press(p(0.0, 0.0), Modifiers::NONE, &vp, &mut store);
        ctl.hover(p(30.0, 40.0), &vp);

        let (center, radius) = ctl.pending_blob().unwrap();
        assert_eq!(center, p(20.0, 20.0));
        assert!(approx_eq(radius, 100.0));
    }

    #[test]
    fn test_draw_zero_radius_commits_nothing() {
        let (mut ctl, vp, mut store) = setup();
        ctl.set_tool(Tool::Draw);

        ctl.press(p(50.0, 50.0), Modifiers::NONE, &vp, &mut store);
        assert!(ctl.pending_blob().is_none());
        ctl.press(p(50.0, 50.0), Modifiers::NONE, &vp, &mut store);

        assert_eq!(store.len(), 3);
        assert_eq!(ctl.draw_state(), DrawState::Idle);
    }

    #[test]
    fn test_draw_cancel_and_tool_switch() {
        let (mut ctl, vp, mut store) = setup();
        ctl.set_tool(Tool::Draw);

        ctl.press(p(50.0, 50.0), Modifiers::NONE, &vp, &mut store);
        ctl.hover(p(60.0, 50.0), &vp);
        assert!(ctl.cancel());
        assert!(!ctl.cancel());
        assert_eq!(store.len(), 3);

        ctl.press(p(50.0, 50.0), Modifiers::NONE, &vp, &mut store);
        ctl.hover(p(60.0, 50.0), &vp);
        assert!(ctl.set_tool(Tool::Cursor));
        assert_eq!(ctl.draw_state(), DrawState::Idle);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_draw_tool_ignores_selection_gestures() {
        let (mut ctl, vp, mut store) = setup();
        store.select(0);
        ctl.set_tool(Tool::Draw);

        ctl.press(p(120.0, 100.0), Modifiers::NONE, &vp, &mut store);
        ctl.drag(p(200.0, 100.0), &vp, &mut store);
        ctl.release(Modifiers::NONE, &mut store);

        assert!(store.is_selected(0));
        assert_eq!(store.get(0).unwrap().center, p(100.0, 100.0));
        assert!(ctl.marquee().is_none());
    }

    #[test]
    fn test_delete_only_in_cursor_tool() {
        let (mut ctl, _, mut store) = setup();
        store.select(1);

        ctl.set_tool(Tool::Draw);
        assert!(ctl.delete_selected(&mut store).is_empty());
        assert_eq!(store.len(), 3);

        ctl.set_tool(Tool::Cursor);
        assert_eq!(ctl.delete_selected(&mut store), vec![1]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_hover_in_cursor_tool_changes_nothing() {
        let (mut ctl, vp, _) = setup();
        assert!(!ctl.hover(p(10.0, 10.0), &vp));
    }
}
