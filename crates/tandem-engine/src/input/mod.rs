//! Pointer input shared by both renderers.
//!
//! Public types do not expose winit. Hosts translate their platform events
//! into [`MapPointerEvent`]s (see `platform::winit` for a window-backed host);
//! a hosted scene renderer consumes the normalized [`PointerEvent`] shape.

pub mod platform;

mod tracker;
mod types;

pub use tracker::PointerTracker;
pub use types::{
    MapPointerEvent,
    Modifiers,
    MouseButton,
    PointerEvent,
    PointerKind,
    RawPointerEvent,
    SourceEvent,
};
