use ::winit::dpi::PhysicalPosition;
use ::winit::event::{ElementState, MouseButton as WinitMouseButton, WindowEvent};
use ::winit::keyboard::ModifiersState;
use glam::Vec2;

use crate::input::{
    MapPointerEvent, Modifiers, MouseButton, PointerKind, PointerTracker, SourceEvent,
};

/// Translates a winit `WindowEvent` into a host-native pointer event.
///
/// A click is a press and release of the primary button while the cursor is
/// over the canvas. Returns `None` for events that only update `tracker` or
/// that are not pointer interactions.
pub fn translate_window_event(
    scale_factor: f64,
    tracker: &mut PointerTracker,
    event: &WindowEvent,
) -> Option<(PointerKind, MapPointerEvent)> {
    match event {
        WindowEvent::ModifiersChanged(m) => {
            // winit 0.30: ModifiersChanged carries a wrapper with `.state()`.
            tracker.modifiers = map_modifiers(m.state());
            None
        }

        WindowEvent::Focused(false) => {
            tracker.buttons_down.clear();
            None
        }

        WindowEvent::CursorMoved { position, .. } => {
            let point = to_logical(scale_factor, *position);
            tracker.position = Some(point);
            Some(pointer_event(tracker, PointerKind::Move, point, None))
        }

        WindowEvent::CursorLeft { .. } => {
            let point = tracker.position.unwrap_or(Vec2::ZERO);
            let ev = pointer_event(tracker, PointerKind::Leave, point, None);
            tracker.reset();
            Some(ev)
        }

        WindowEvent::MouseInput { state, button, .. } => {
            let button = map_mouse_button(*button);
            match state {
                ElementState::Pressed => {
                    tracker.press(button);
                    None
                }
                ElementState::Released => {
                    let was_down = tracker.release(button);
                    if !was_down || button != MouseButton::Left {
                        return None;
                    }
                    // winit 0.30 does not expose cursor query; use tracked position.
                    let point = tracker.position?;
                    Some(pointer_event(tracker, PointerKind::Click, point, Some(button)))
                }
            }
        }

        _ => None,
    }
}

fn pointer_event(
    tracker: &PointerTracker,
    kind: PointerKind,
    point: Vec2,
    button: Option<MouseButton>,
) -> (PointerKind, MapPointerEvent) {
    let original = SourceEvent {
        kind,
        button,
        modifiers: tracker.modifiers,
    };
    (kind, MapPointerEvent { point, original })
}

fn to_logical(scale_factor: f64, pos: PhysicalPosition<f64>) -> Vec2 {
    let logical = pos.to_logical::<f64>(scale_factor);
    Vec2::new(logical.x as f32, logical.y as f32)
}

fn map_modifiers(m: ModifiersState) -> Modifiers {
    Modifiers {
        shift: m.shift_key(),
        ctrl: m.control_key(),
        alt: m.alt_key(),
        meta: m.super_key(),
    }
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}
