//! One scene renderer per GPU context.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tandem_engine::device::{ContextId, GpuContext};

use crate::config::{BridgeConfig, RendererConfig, SurfaceSize};
use crate::descriptor::ConcreteLayer;
use crate::error::{BridgeError, Result};
use crate::events;
use crate::filter::{ActiveFilter, FilterState};
use crate::host::{HostMap, ParentRenderer, RendererFactory, RendererProps, SceneRenderer};
use crate::props::SharedProps;
use crate::registry::LayerSet;
use crate::view_state::{ViewState, compute_view_state};

/// A scene renderer bound to one host map's GPU context, plus everything the
/// bridge keeps about it.
pub struct RendererInstance {
    context: ContextId,
    host: Weak<dyn HostMap>,
    renderer: RefCell<Option<Box<dyn SceneRenderer>>>,
    pub(crate) layers: RefCell<LayerSet>,
    filter: FilterState,
    shared: RefCell<SharedProps>,
    draw_reason: String,
    finalized: Cell<bool>,
    // set when teardown arrived while the renderer was borrowed
    release_pending: Cell<bool>,
    // set when a layer list change arrived while the renderer was borrowed
    layers_pending: Cell<bool>,
}

impl RendererInstance {
    fn new(
        context: ContextId,
        host: Weak<dyn HostMap>,
        renderer: Box<dyn SceneRenderer>,
        filter: FilterState,
        draw_reason: String,
    ) -> Self {
        Self {
            context,
            host,
            renderer: RefCell::new(Some(renderer)),
            layers: RefCell::new(LayerSet::new()),
            filter,
            shared: RefCell::new(SharedProps::default()),
            draw_reason,
            finalized: Cell::new(false),
            release_pending: Cell::new(false),
            layers_pending: Cell::new(false),
        }
    }

    #[inline]
    pub fn context_id(&self) -> ContextId {
        self.context
    }

    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.finalized.get()
    }

    /// Fails with [`BridgeError::Finalized`] once the host has been torn down.
    pub fn ensure_live(&self) -> Result<()> {
        if self.finalized.get() {
            return Err(self.finalized_error());
        }
        Ok(())
    }

    fn finalized_error(&self) -> BridgeError {
        BridgeError::Finalized {
            context: self.context,
        }
    }

    pub fn active_filter(&self) -> ActiveFilter {
        self.filter.get()
    }

    pub(crate) fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Properties last forwarded from a parent renderer.
    pub fn shared_props(&self) -> SharedProps {
        self.shared.borrow().clone()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.borrow().len()
    }

    /// Registered layer ids, in submission order.
    pub fn layer_ids(&self) -> Vec<String> {
        self.layers.borrow().iter().map(|d| d.id().to_owned()).collect()
    }

    /// Runs `f` against the scene renderer.
    ///
    /// Fails with [`BridgeError::Reentrant`] if the renderer is already in use
    /// further up the stack, e.g. from a pick callback. Layer list changes
    /// made meanwhile are submitted once the outermost call returns.
    pub fn with_renderer<T>(
        &self,
        f: impl FnOnce(&mut dyn SceneRenderer) -> anyhow::Result<T>,
    ) -> Result<T> {
        self.ensure_live()?;
        let result = {
            let mut slot = self
                .renderer
                .try_borrow_mut()
                .map_err(|_| BridgeError::Reentrant {
                    context: self.context,
                })?;
            let renderer = slot
                .as_deref_mut()
                .ok_or_else(|| self.finalized_error())?;
            f(renderer).map_err(BridgeError::Renderer)
        };
        if self.release_pending.get() {
            self.release_renderer();
        } else if self.layers_pending.get() {
            self.flush_layers();
        }
        result
    }

    /// Submits the complete layer list, or queues the submission when the
    /// renderer is busy further up the stack.
    pub(crate) fn submit_layers(&self, layers: Vec<Box<dyn ConcreteLayer>>) -> Result<()> {
        match self.with_renderer(|renderer| renderer.set_props(RendererProps::layers(layers))) {
            Err(BridgeError::Reentrant { .. }) => {
                log::debug!("{}: renderer busy, queueing layer submission", self.context);
                self.layers_pending.set(true);
                Ok(())
            }
            other => other,
        }
    }

    fn flush_layers(&self) {
        self.layers_pending.set(false);
        if self.finalized.get() {
            return;
        }
        let layers = self.layers.borrow().materialize();
        if let Err(err) = layers.and_then(|layers| self.submit_layers(layers)) {
            log::warn!("{}: queued layer submission failed: {err}", self.context);
        }
    }

    /// Pushes the host's current camera into the scene renderer.
    pub fn sync_view_state(&self) -> Result<ViewState> {
        self.ensure_live()?;
        let host = self.host.upgrade().ok_or_else(|| self.finalized_error())?;
        let camera = host.camera();

        self.with_renderer(|renderer| {
            let view_state = compute_view_state(&camera, renderer.viewport_height());
            renderer.set_props(RendererProps::view_state(view_state))?;
            Ok(view_state)
        })
    }

    /// One draw pass restricted to `layer_id` and the layers generated from it.
    pub fn draw_layer(&self, layer_id: &str, parent: Option<&dyn ParentRenderer>) -> Result<()> {
        self.ensure_live()?;
        let shared = parent.map(|p| p.shared_props());
        if let Some(shared) = &shared {
            *self.shared.borrow_mut() = shared.clone();
        }

        self.filter.set(ActiveFilter::Layer(layer_id.to_owned()));
        log::trace!("{}: drawing `{layer_id}`", self.context);

        let reason = self.draw_reason.as_str();
        self.with_renderer(|renderer| {
            if let Some(shared) = shared {
                renderer.set_props(RendererProps::shared(shared))?;
            }
            renderer.draw_layers(reason)?;
            renderer.clear_redraw_flags();
            Ok(())
        })
    }

    /// Releases the scene renderer and drops every descriptor. Idempotent.
    pub fn finalize(&self) {
        if self.finalized.replace(true) {
            return;
        }
        log::debug!("{}: finalizing scene renderer", self.context);

        match self.layers.try_borrow_mut() {
            Ok(mut layers) => layers.clear(),
            Err(_) => log::warn!("{}: layer set busy during teardown", self.context),
        }
        self.filter.set(ActiveFilter::Nothing);
        self.layers_pending.set(false);
        self.release_renderer();
    }

    fn release_renderer(&self) {
        let renderer = match self.renderer.try_borrow_mut() {
            Ok(mut slot) => slot.take(),
            Err(_) => {
                log::debug!("{}: renderer busy, deferring release", self.context);
                self.release_pending.set(true);
                return;
            }
        };
        self.release_pending.set(false);
        if let Some(mut renderer) = renderer {
            renderer.finalize();
        }
    }
}

impl fmt::Debug for RendererInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererInstance")
            .field("context", &self.context)
            .field("layers", &self.layers.borrow().len())
            .field("filter", &self.filter.get())
            .field("finalized", &self.finalized.get())
            .finish_non_exhaustive()
    }
}

/// Lazily creates and tears down [`RendererInstance`]s, at most one per
/// context id.
///
/// Cloning is cheap; clones share the same table.
pub struct InstanceManager<G: ?Sized = GpuContext> {
    factory: Rc<dyn RendererFactory<G>>,
    instances: Rc<RefCell<HashMap<ContextId, Rc<RendererInstance>>>>,
    config: Rc<BridgeConfig>,
}

impl<G: ?Sized> Clone for InstanceManager<G> {
    fn clone(&self) -> Self {
        Self {
            factory: Rc::clone(&self.factory),
            instances: Rc::clone(&self.instances),
            config: Rc::clone(&self.config),
        }
    }
}

impl<G: ?Sized + 'static> InstanceManager<G> {
    pub fn new(factory: impl RendererFactory<G> + 'static) -> Self {
        Self::with_config(factory, BridgeConfig::default())
    }

    pub fn with_config(factory: impl RendererFactory<G> + 'static, config: BridgeConfig) -> Self {
        Self {
            factory: Rc::new(factory),
            instances: Rc::new(RefCell::new(HashMap::new())),
            config: Rc::new(config),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Returns the instance for `host`'s context, creating it on first use.
    ///
    /// `parent` only matters on creation: it decides whether the instance also
    /// listens to the parent renderer's pointer events.
    pub fn get_or_create(
        &self,
        host: &Rc<dyn HostMap>,
        gpu: &G,
        parent: Option<&Rc<dyn ParentRenderer>>,
    ) -> Result<Rc<RendererInstance>> {
        let context = host.context_id();
        if let Some(existing) = self.instance_for(context) {
            if !existing.is_finalized() {
                return Ok(existing);
            }
            log::debug!("{context}: replacing finalized scene renderer");
            self.instances.borrow_mut().remove(&context);
        }

        let filter = FilterState::new();
        let repaint_host = Rc::downgrade(host);
        let config = RendererConfig {
            width: SurfaceSize::Full,
            height: SurfaceSize::Full,
            controller: false,
            use_device_pixels: self.config.use_device_pixels,
            layer_filter: filter.predicate(),
            custom_render: Box::new(move || {
                if let Some(host) = repaint_host.upgrade() {
                    host.trigger_repaint();
                }
            }),
        };

        log::info!("{context}: creating scene renderer");
        let renderer = self.factory.create(gpu, config).map_err(BridgeError::Renderer)?;
        let instance = Rc::new(RendererInstance::new(
            context,
            Rc::downgrade(host),
            renderer,
            filter,
            self.config.draw_reason.clone(),
        ));
        self.instances.borrow_mut().insert(context, Rc::clone(&instance));

        let table = Rc::downgrade(&self.instances);
        let torn_down = Rc::downgrade(&instance);
        host.on_remove(Box::new(move || {
            let Some(instance) = torn_down.upgrade() else {
                return;
            };
            if let Some(table) = table.upgrade() {
                let mut table = table.borrow_mut();
                if table.get(&context).is_some_and(|i| Rc::ptr_eq(i, &instance)) {
                    table.remove(&context);
                }
            }
            instance.finalize();
        }));

        events::subscribe(&instance, host.as_ref(), parent.map(|p| &**p));
        Ok(instance)
    }

    /// The table entry for `context`, finalized or not.
    pub fn instance_for(&self, context: ContextId) -> Option<Rc<RendererInstance>> {
        self.instances.borrow().get(&context).cloned()
    }

    /// Number of contexts that currently have a renderer.
    pub fn live_instances(&self) -> usize {
        self.instances.borrow().len()
    }
}

impl<G: ?Sized> fmt::Debug for InstanceManager<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceManager")
            .field("instances", &self.instances.borrow().len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
