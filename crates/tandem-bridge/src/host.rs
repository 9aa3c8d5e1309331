//! Contracts of the two renderers the bridge sits between.
//!
//! Neither renderer is implemented here. The host map renderer is seen
//! through [`HostMap`] and calls into [`CustomLayer`]s; the scene renderer is
//! seen through [`SceneRenderer`] and built by a [`RendererFactory`].

use std::rc::Rc;

use glam::Mat4;
use tandem_engine::camera::CameraSnapshot;
use tandem_engine::device::{ContextId, GpuContext};
use tandem_engine::input::{PointerEvent, PointerKind, RawPointerEvent};

use crate::config::RendererConfig;
use crate::descriptor::ConcreteLayer;
use crate::error::Result;
use crate::props::SharedProps;
use crate::view_state::ViewState;

/// Pointer subscription callback.
pub type PointerHandler = Box<dyn FnMut(&RawPointerEvent)>;

/// Callback run once when the host map is torn down.
pub type RemoveHook = Box<dyn FnOnce()>;

/// Services the host map renderer offers to injected layers.
///
/// All calls happen on the host's thread, synchronously.
pub trait HostMap {
    /// Identity of the GPU context this map draws with.
    fn context_id(&self) -> ContextId;

    /// Current camera.
    fn camera(&self) -> CameraSnapshot;

    /// Asks the host to schedule a new frame.
    fn trigger_repaint(&self);

    /// Registers a hook for the host's removal event.
    fn on_remove(&self, hook: RemoveHook);

    /// Subscribes to the host's native pointer events
    /// (`click`, `mousemove`, `mouseleave`).
    fn on_pointer(&self, kind: PointerKind, handler: PointerHandler);
}

/// A pre-existing scene renderer that injected layers may be nested under.
pub trait ParentRenderer {
    fn shared_props(&self) -> SharedProps;

    /// Subscribes to the parent's event manager. Events arrive normalized.
    fn on_pointer(&self, kind: PointerKind, handler: PointerHandler);
}

/// A layer as seen by the draw filter: an id plus the layer it was generated
/// from, if any.
pub trait LayerNode {
    fn id(&self) -> &str;

    fn parent(&self) -> Option<&dyn LayerNode> {
        None
    }
}

/// Partial property update for a scene renderer. `None` leaves a property
/// unchanged.
#[derive(Debug, Default)]
pub struct RendererProps {
    pub layers: Option<Vec<Box<dyn ConcreteLayer>>>,
    pub view_state: Option<ViewState>,
    pub shared: Option<SharedProps>,
}

impl RendererProps {
    pub fn layers(layers: Vec<Box<dyn ConcreteLayer>>) -> Self {
        Self {
            layers: Some(layers),
            ..Self::default()
        }
    }

    pub fn view_state(view_state: ViewState) -> Self {
        Self {
            view_state: Some(view_state),
            ..Self::default()
        }
    }

    pub fn shared(shared: SharedProps) -> Self {
        Self {
            shared: Some(shared),
            ..Self::default()
        }
    }
}

/// The scene-graph renderer being hosted.
///
/// It reconciles layer lists by id on its own; the bridge always submits the
/// complete list.
pub trait SceneRenderer {
    fn set_props(&mut self, props: RendererProps) -> anyhow::Result<()>;

    /// Viewport height in pixels, `0.0` before the first layout.
    fn viewport_height(&self) -> f32;

    /// Runs one draw pass over every layer the filter accepts.
    fn draw_layers(&mut self, reason: &str) -> anyhow::Result<()>;

    fn clear_redraw_flags(&mut self);

    fn on_click(&mut self, event: &PointerEvent);
    fn on_pointer_move(&mut self, event: &PointerEvent);
    fn on_pointer_leave(&mut self, event: &PointerEvent);

    /// Releases every GPU resource. No other method is called afterwards.
    fn finalize(&mut self);
}

/// Builds the scene renderer for a GPU context.
pub trait RendererFactory<G: ?Sized = GpuContext> {
    fn create(&self, gpu: &G, config: RendererConfig) -> anyhow::Result<Box<dyn SceneRenderer>>;
}

impl<G, F> RendererFactory<G> for F
where
    G: ?Sized,
    F: Fn(&G, RendererConfig) -> anyhow::Result<Box<dyn SceneRenderer>>,
{
    fn create(&self, gpu: &G, config: RendererConfig) -> anyhow::Result<Box<dyn SceneRenderer>> {
        self(gpu, config)
    }
}

/// How a custom layer shares the host's depth buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RenderingMode {
    TwoD,
    ThreeD,
}

/// The host map's custom-layer extension point.
///
/// The host calls these sequentially: every `on_add`/`on_remove` of a frame
/// completes before that frame's first `render`.
pub trait CustomLayer<G: ?Sized = GpuContext> {
    fn id(&self) -> &str;

    fn rendering_mode(&self) -> RenderingMode {
        RenderingMode::ThreeD
    }

    fn on_add(&mut self, host: Rc<dyn HostMap>, gpu: &G) -> Result<()>;

    fn on_remove(&mut self) -> Result<()>;

    /// Called before the host starts its main pass.
    fn prerender(&mut self, _gpu: &G, _matrix: &Mat4) -> Result<()> {
        Ok(())
    }

    fn render(&mut self, gpu: &G, matrix: &Mat4) -> Result<()>;
}
