use std::collections::HashSet;

use glam::Vec2;

use super::types::{Modifiers, MouseButton};

/// Pointer state a host keeps between platform events.
///
/// Window systems report button transitions without a position, so the last
/// cursor position and held buttons are tracked here.
#[derive(Debug, Default)]
pub struct PointerTracker {
    /// Current modifier state.
    pub modifiers: Modifiers,

    /// Cursor position in logical pixels, `None` while outside the canvas.
    pub position: Option<Vec2>,

    /// Currently held mouse buttons.
    pub buttons_down: HashSet<MouseButton>,
}

impl PointerTracker {
    /// Records a press. Returns `false` for a repeated press.
    pub fn press(&mut self, button: MouseButton) -> bool {
        self.buttons_down.insert(button)
    }

    /// Records a release. Returns `false` if the button was not held.
    pub fn release(&mut self, button: MouseButton) -> bool {
        self.buttons_down.remove(&button)
    }

    /// Drops position and held buttons, e.g. on focus loss or when the
    /// cursor leaves the canvas mid-press.
    pub fn reset(&mut self) {
        self.position = None;
        self.buttons_down.clear();
    }

    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }
}
