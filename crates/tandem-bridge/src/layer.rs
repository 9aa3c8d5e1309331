//! The custom layer the host map sees for each injected scene layer.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use glam::Mat4;
use tandem_engine::device::GpuContext;

use crate::descriptor::{LayerDescriptor, LayerOptions};
use crate::error::{BridgeError, Result};
use crate::host::{CustomLayer, HostMap, ParentRenderer, RenderingMode};
use crate::instance::{InstanceManager, RendererInstance};
use crate::props::LayerProps;
use crate::registry;

/// Lifecycle phase of a [`MapLayer`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum LayerPhase {
    #[default]
    Detached,
    Attached,
    /// Inside `render`.
    Drawing,
}

/// Attachment and render state of a layer, handed over when the host replaces
/// one facade with another for the same id.
#[derive(Debug, Default)]
pub struct LayerState {
    pub phase: LayerPhase,
    pub instance: Option<Rc<RendererInstance>>,
    pub frames_drawn: u64,
    pub last_matrix: Option<Mat4>,
}

pub type LayerStateHandle = Rc<RefCell<LayerState>>;

/// Proxies the host's custom-layer callbacks to the shared scene renderer.
pub struct MapLayer<G: ?Sized = GpuContext> {
    descriptor: Rc<LayerDescriptor>,
    state: LayerStateHandle,
    parent: Option<Rc<dyn ParentRenderer>>,
    manager: InstanceManager<G>,
}

impl<G: ?Sized + 'static> MapLayer<G> {
    /// Fails with [`BridgeError::MissingId`] when `options` carries no id.
    pub fn new(manager: &InstanceManager<G>, options: LayerOptions) -> Result<Self> {
        let descriptor = Rc::new(options.into_descriptor()?);
        Ok(Self {
            descriptor,
            state: LayerStateHandle::default(),
            parent: None,
            manager: manager.clone(),
        })
    }

    /// Nests this layer under an existing scene renderer: its shared props are
    /// copied before every draw and its pointer events are forwarded too.
    pub fn with_parent(mut self, parent: Rc<dyn ParentRenderer>) -> Self {
        self.parent = Some(parent);
        self
    }

    #[inline]
    pub fn id(&self) -> &str {
        self.descriptor.id()
    }

    #[inline]
    pub fn before_id(&self) -> Option<&str> {
        self.descriptor.before_id()
    }

    pub fn descriptor(&self) -> &Rc<LayerDescriptor> {
        &self.descriptor
    }

    pub fn phase(&self) -> LayerPhase {
        self.state.borrow().phase
    }

    pub fn frames_drawn(&self) -> u64 {
        self.state.borrow().frames_drawn
    }

    /// Projection matrix of the last successful draw.
    pub fn last_matrix(&self) -> Option<Mat4> {
        self.state.borrow().last_matrix
    }

    pub fn instance(&self) -> Option<Rc<RendererInstance>> {
        self.state.borrow().instance.clone()
    }

    pub fn state_handle(&self) -> &LayerStateHandle {
        &self.state
    }

    fn attached_instance(&self) -> Result<Rc<RendererInstance>> {
        self.instance().ok_or_else(|| BridgeError::NotAttached {
            id: self.id().to_owned(),
        })
    }

    /// Called when the host replaces `old` with `self` for the same layer id.
    ///
    /// `self` adopts the old facade's state and its descriptor takes the old
    /// descriptor's place in the registry.
    pub fn on_update(&mut self, old: &MapLayer<G>) -> Result<()> {
        if old.id() != self.id() {
            return Err(BridgeError::IdMismatch {
                old: old.id().to_owned(),
                new: self.id().to_owned(),
            });
        }
        self.state = Rc::clone(&old.state);
        let instance = self.attached_instance()?;
        log::debug!("{}: updating layer `{}`", instance.context_id(), self.id());
        registry::replace(&instance, &old.descriptor, &self.descriptor)
    }

    /// Merges `update` into this layer's properties. The id never changes.
    ///
    /// While attached the renderer's layer list is rebuilt immediately, and
    /// the merge is undone if that fails. Otherwise the merged properties take
    /// effect on the next `on_add`.
    pub fn set_props(&self, update: LayerProps) -> Result<()> {
        let previous = self.descriptor.props().clone();
        for key in self.descriptor.merge_props(update) {
            log::warn!("layer `{}`: ignoring reserved property `{key}`", self.id());
        }
        let Some(instance) = self.instance() else {
            return Ok(());
        };
        registry::replace(&instance, &self.descriptor, &self.descriptor)
            .inspect_err(|_| self.descriptor.restore_props(previous))
    }
}

impl<G: ?Sized + 'static> CustomLayer<G> for MapLayer<G> {
    fn id(&self) -> &str {
        self.descriptor.id()
    }

    fn rendering_mode(&self) -> RenderingMode {
        RenderingMode::ThreeD
    }

    fn on_add(&mut self, host: Rc<dyn HostMap>, gpu: &G) -> Result<()> {
        let instance = self.manager.get_or_create(&host, gpu, self.parent.as_ref())?;
        log::debug!("{}: adding layer `{}`", instance.context_id(), self.id());
        registry::add(&instance, &self.descriptor)?;

        let mut state = self.state.borrow_mut();
        state.instance = Some(instance);
        state.phase = LayerPhase::Attached;
        Ok(())
    }

    /// Detaches even when the renderer is already gone; the error is still
    /// reported.
    fn on_remove(&mut self) -> Result<()> {
        let instance = {
            let mut state = self.state.borrow_mut();
            state.phase = LayerPhase::Detached;
            state.instance.take()
        };
        let Some(instance) = instance else {
            return Err(BridgeError::NotAttached {
                id: self.id().to_owned(),
            });
        };
        log::debug!("{}: removing layer `{}`", instance.context_id(), self.id());
        registry::remove(&instance, &self.descriptor)
    }

    /// Draws this layer, and only this layer, into the host's current pass.
    fn render(&mut self, _gpu: &G, matrix: &Mat4) -> Result<()> {
        let instance = self.attached_instance()?;
        instance.ensure_live()?;

        self.state.borrow_mut().phase = LayerPhase::Drawing;
        let result = instance
            .sync_view_state()
            .and_then(|_| instance.draw_layer(self.id(), self.parent.as_deref()));

        let mut state = self.state.borrow_mut();
        state.phase = LayerPhase::Attached;
        if result.is_ok() {
            state.frames_drawn += 1;
            state.last_matrix = Some(*matrix);
        }
        result
    }
}

impl<G: ?Sized> fmt::Debug for MapLayer<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapLayer")
            .field("descriptor", &self.descriptor)
            .field("state", &self.state.borrow())
            .field("nested", &self.parent.is_some())
            .finish()
    }
}
