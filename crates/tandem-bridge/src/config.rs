use std::fmt;

use crate::host::LayerNode;

/// Predicate the scene renderer calls for every layer it is about to draw
/// or pick.
pub type LayerFilter = Box<dyn Fn(&dyn LayerNode) -> bool>;

/// Hook the scene renderer calls instead of scheduling its own frame.
pub type RenderHook = Box<dyn Fn()>;

/// Bridge-wide settings, fixed when the [`InstanceManager`] is built.
///
/// [`InstanceManager`]: crate::InstanceManager
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Render at device pixel resolution rather than logical pixels.
    pub use_device_pixels: bool,

    /// Reason string passed to every single-layer draw pass.
    pub draw_reason: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            use_device_pixels: true,
            draw_reason: "host-repaint".to_string(),
        }
    }
}

/// Canvas dimension requested from the scene renderer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SurfaceSize {
    /// Track the full host canvas.
    Full,
    Pixels(u32),
}

/// Construction parameters handed to a [`RendererFactory`].
///
/// The scene renderer must keep `layer_filter` for its whole life and consult
/// it on every draw and pick pass, and must call `custom_render` instead of
/// driving its own render loop.
///
/// [`RendererFactory`]: crate::RendererFactory
pub struct RendererConfig {
    pub width: SurfaceSize,
    pub height: SurfaceSize,
    /// Whether the renderer runs its own input controller. Always `false`
    /// here: pointer input is proxied through the event bridge.
    pub controller: bool,
    pub use_device_pixels: bool,
    pub layer_filter: LayerFilter,
    pub custom_render: RenderHook,
}

impl fmt::Debug for RendererConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererConfig")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("controller", &self.controller)
            .field("use_device_pixels", &self.use_device_pixels)
            .finish_non_exhaustive()
    }
}
