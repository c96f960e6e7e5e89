//! Customizable keybindings.
//!
//! Maps keys to viewport actions. Bindings are loaded from the `keybindings`
//! section of the config file.

use serde::{Deserialize, Serialize};

use crate::event::Key;

/// Actions that can be bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Switch to the cursor (select/move) tool
    CursorTool,
    /// Switch to the draw tool
    DrawTool,
    /// Delete every selected blob
    DeleteSelected,
    /// Show or hide blob overlays
    ToggleOverlay,
    /// Switch between the layered and the filtered view
    ToggleFilteredView,
    /// Scale 1, no offset
    ResetView,
    /// Fit the whole image into the surface
    FitView,
}

impl Action {
    /// Get all actions in display order.
    pub fn all() -> &'static [Action] {
        &[
            Action::CursorTool,
            Action::DrawTool,
            Action::DeleteSelected,
            Action::ToggleOverlay,
            Action::ToggleFilteredView,
            Action::ResetView,
            Action::FitView,
        ]
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Action::CursorTool => "Cursor tool",
            Action::DrawTool => "Draw tool",
            Action::DeleteSelected => "Delete selected",
            Action::ToggleOverlay => "Toggle overlay",
            Action::ToggleFilteredView => "Toggle filtered view",
            Action::ResetView => "Reset view",
            Action::FitView => "Fit view",
        }
    }
}

/// Keybinding configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub cursor_tool: Key,
    pub draw_tool: Key,
    pub delete_selected: Key,
    pub toggle_overlay: Key,
    pub toggle_filtered_view: Key,
    pub reset_view: Key,
    pub fit_view: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            cursor_tool: Key::Char('s'),
            draw_tool: Key::Char('d'),
            delete_selected: Key::Delete,
            toggle_overlay: Key::Char('h'),
            toggle_filtered_view: Key::Char('f'),
            reset_view: Key::Char('r'),
            fit_view: Key::Home,
        }
    }
}

impl KeyBindings {
    /// Create new keybindings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the action that corresponds to a key press, if any.
    pub fn action_for_key(&self, key: Key) -> Option<Action> {
        let key = key.normalized();
        Action::all()
            .iter()
            .copied()
            .find(|action| self.key_for(*action).normalized() == key)
    }

    /// Get the key bound to an action.
    pub fn key_for(&self, action: Action) -> Key {
        match action {
            Action::CursorTool => self.cursor_tool,
            Action::DrawTool => self.draw_tool,
            Action::DeleteSelected => self.delete_selected,
            Action::ToggleOverlay => self.toggle_overlay,
            Action::ToggleFilteredView => self.toggle_filtered_view,
            Action::ResetView => self.reset_view,
            Action::FitView => self.fit_view,
        }
    }

    /// Rebind an action.
    pub fn set_key(&mut self, action: Action, key: Key) {
        let slot = match action {
            Action::CursorTool => &mut self.cursor_tool,
            Action::DrawTool => &mut self.draw_tool,
            Action::DeleteSelected => &mut self.delete_selected,
            Action::ToggleOverlay => &mut self.toggle_overlay,
            Action::ToggleFilteredView => &mut self.toggle_filtered_view,
            Action::ResetView => &mut self.reset_view,
            Action::FitView => &mut self.fit_view,
        };
        *slot = key;
    }

    /// Check if a key is already used by another action.
    /// Returns the conflicting action, if any.
    pub fn key_conflict(&self, key: Key, exclude: Option<Action>) -> Option<Action> {
        let key = key.normalized();
        Action::all()
            .iter()
            .copied()
            .filter(|action| Some(*action) != exclude)
            .find(|action| self.key_for(*action).normalized() == key)
    }
}
