//! Tandem bridge: a scene-graph renderer's layers drawn inside a host map.
//!
//! The host map renderer owns the canvas, the camera and the frame clock, and
//! calls back into injected custom layers one at a time. This crate turns each
//! of those callbacks into a constrained draw pass of a single shared scene
//! renderer:
//!
//! - [`InstanceManager`] keeps exactly one [`RendererInstance`] per GPU context
//! - [`registry`] rebuilds the renderer's layer list whenever layers attach,
//!   detach or change
//! - [`filter`] restricts each pass to one named layer (or to all of them while
//!   picking)
//! - [`view_state`] derives the renderer camera from the host camera
//! - [`events`] forwards pointer events from the host (and from a parent scene
//!   renderer, when nested) into the renderer's hit-testing
//! - [`MapLayer`] is the facade the host's extension point invokes
//!
//! ```rust,ignore
//! let manager = InstanceManager::new(|gpu: &GpuContext, config| {
//!     Ok(Box::new(MyScene::new(gpu, config)?) as Box<dyn SceneRenderer>)
//! });
//! let mut layer = MapLayer::new(
//!     &manager,
//!     LayerOptions::new(scatterplot).id("pois").prop("radius", 30),
//! )?;
//! layer.on_add(host, &gpu)?;
//! // every host frame:
//! layer.render(&gpu, &matrix)?;
//! ```

pub mod config;
pub mod descriptor;
pub mod error;
pub mod events;
pub mod filter;
pub mod host;
pub mod instance;
pub mod layer;
pub mod props;
pub mod registry;
pub mod view_state;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{BridgeConfig, LayerFilter, RenderHook, RendererConfig, SurfaceSize};
pub use descriptor::{ConcreteLayer, LayerDescriptor, LayerOptions, LayerType};
pub use error::{BridgeError, Result};
pub use filter::{ActiveFilter, FilterState};
pub use host::{
    CustomLayer, HostMap, LayerNode, ParentRenderer, PointerHandler, RemoveHook, RendererFactory,
    RendererProps, RenderingMode, SceneRenderer,
};
pub use instance::{InstanceManager, RendererInstance};
pub use layer::{LayerPhase, LayerState, LayerStateHandle, MapLayer};
pub use props::{LayerProps, PickCallback, PickInfo, SharedProps};
pub use view_state::ViewState;

pub use tandem_engine::device::{ContextId, GpuContext};
