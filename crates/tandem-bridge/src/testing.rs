//! Recording doubles for the host map, the scene renderer and layer types.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::Vec2;
use tandem_engine::camera::{CameraSnapshot, LngLat};
use tandem_engine::device::ContextId;
use tandem_engine::input::{
    MapPointerEvent, PointerEvent, PointerKind, RawPointerEvent, SourceEvent,
};
use tandem_engine::logging::{LoggingConfig, init_logging};

use crate::config::{BridgeConfig, LayerFilter, RenderHook, RendererConfig, SurfaceSize};
use crate::descriptor::{ConcreteLayer, LayerDescriptor, LayerOptions, LayerType};
use crate::host::{
    HostMap, LayerNode, ParentRenderer, PointerHandler, RemoveHook, RendererProps, SceneRenderer,
};
use crate::instance::{InstanceManager, RendererInstance};
use crate::props::{LayerProps, SharedProps};
use crate::view_state::ViewState;

/// Bare layer node for filter tests.
pub struct Node<'a> {
    id: String,
    parent: Option<&'a dyn LayerNode>,
}

impl<'a> Node<'a> {
    pub fn root(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent: None,
        }
    }

    pub fn child(id: impl Into<String>, parent: &'a dyn LayerNode) -> Self {
        Self {
            id: id.into(),
            parent: Some(parent),
        }
    }
}

impl LayerNode for Node<'_> {
    fn id(&self) -> &str {
        &self.id
    }

    fn parent(&self) -> Option<&dyn LayerNode> {
        self.parent
    }
}

#[derive(Debug)]
pub struct MockLayer {
    id: String,
    type_name: String,
    props: LayerProps,
}

impl LayerNode for MockLayer {
    fn id(&self) -> &str {
        &self.id
    }
}

impl ConcreteLayer for MockLayer {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn props(&self) -> &LayerProps {
        &self.props
    }
}

pub struct MockLayerType {
    name: String,
    fail: bool,
}

impl MockLayerType {
    pub fn shared(name: &str) -> Rc<dyn LayerType> {
        Rc::new(Self {
            name: name.to_owned(),
            fail: false,
        })
    }

    /// A layer type whose constructor always fails.
    pub fn failing(name: &str) -> Rc<dyn LayerType> {
        Rc::new(Self {
            name: name.to_owned(),
            fail: true,
        })
    }
}

impl LayerType for MockLayerType {
    fn name(&self) -> &str {
        &self.name
    }

    fn build(&self, id: &str, props: &LayerProps) -> anyhow::Result<Box<dyn ConcreteLayer>> {
        if self.fail {
            anyhow::bail!("{} layers cannot be built", self.name);
        }
        Ok(Box::new(MockLayer {
            id: id.to_owned(),
            type_name: self.name.clone(),
            props: props.clone(),
        }))
    }
}

pub fn descriptor(id: &str) -> Rc<LayerDescriptor> {
    let descriptor = LayerOptions::new(MockLayerType::shared("scatterplot"))
        .id(id)
        .into_descriptor()
        .expect("valid options");
    Rc::new(descriptor)
}

#[derive(Debug, Copy, Clone)]
pub struct MockGpu;

pub struct MockHost {
    pub id: ContextId,
    camera: Cell<CameraSnapshot>,
    repaints: Cell<usize>,
    remove_hooks: RefCell<Vec<RemoveHook>>,
    handlers: RefCell<Vec<(PointerKind, PointerHandler)>>,
}

impl MockHost {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            id: ContextId::next(),
            camera: Cell::new(CameraSnapshot::new(LngLat::new(-122.4, 37.8), 11.0)),
            repaints: Cell::new(0),
            remove_hooks: RefCell::new(Vec::new()),
            handlers: RefCell::new(Vec::new()),
        })
    }

    pub fn as_dyn(self: &Rc<Self>) -> Rc<dyn HostMap> {
        Rc::clone(self) as Rc<dyn HostMap>
    }

    pub fn set_camera(&self, camera: CameraSnapshot) {
        self.camera.set(camera);
    }

    pub fn repaints(&self) -> usize {
        self.repaints.get()
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Delivers a native pointer event at `point`.
    pub fn emit_map(&self, kind: PointerKind, point: Vec2) {
        let event = RawPointerEvent::Map(MapPointerEvent {
            point,
            original: SourceEvent::new(kind),
        });
        for (k, handler) in self.handlers.borrow_mut().iter_mut() {
            if *k == kind {
                handler(&event);
            }
        }
    }

    /// Fires the removal event.
    pub fn remove(&self) {
        let hooks = std::mem::take(&mut *self.remove_hooks.borrow_mut());
        for hook in hooks {
            hook();
        }
    }
}

impl HostMap for MockHost {
    fn context_id(&self) -> ContextId {
        self.id
    }

    fn camera(&self) -> CameraSnapshot {
        self.camera.get()
    }

    fn trigger_repaint(&self) {
        self.repaints.set(self.repaints.get() + 1);
    }

    fn on_remove(&self, hook: RemoveHook) {
        self.remove_hooks.borrow_mut().push(hook);
    }

    fn on_pointer(&self, kind: PointerKind, handler: PointerHandler) {
        self.handlers.borrow_mut().push((kind, handler));
    }
}

#[derive(Default)]
pub struct MockParent {
    shared: RefCell<SharedProps>,
    handlers: RefCell<Vec<(PointerKind, PointerHandler)>>,
}

impl MockParent {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn as_dyn(self: &Rc<Self>) -> Rc<dyn ParentRenderer> {
        Rc::clone(self) as Rc<dyn ParentRenderer>
    }

    pub fn set_shared(&self, shared: SharedProps) {
        *self.shared.borrow_mut() = shared;
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    pub fn emit(&self, kind: PointerKind, event: PointerEvent) {
        let event = RawPointerEvent::Scene(event);
        for (k, handler) in self.handlers.borrow_mut().iter_mut() {
            if *k == kind {
                handler(&event);
            }
        }
    }
}

impl ParentRenderer for MockParent {
    fn shared_props(&self) -> SharedProps {
        self.shared.borrow().clone()
    }

    fn on_pointer(&self, kind: PointerKind, handler: PointerHandler) {
        self.handlers.borrow_mut().push((kind, handler));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub reason: String,
    /// Ids the filter accepted, each layer followed by its generated sublayer.
    pub accepted: Vec<String>,
}

/// Everything one mock scene renderer was asked to do.
#[derive(Default)]
pub struct RendererLog {
    pub width: Option<SurfaceSize>,
    pub height: Option<SurfaceSize>,
    pub controller: Option<bool>,
    pub use_device_pixels: Option<bool>,
    pub layer_filter: Option<LayerFilter>,
    pub custom_render: Option<RenderHook>,

    pub viewport_height: f32,
    pub layer_ids: Vec<String>,
    pub layer_props: Vec<(String, LayerProps)>,
    pub layer_submissions: usize,
    pub view_states: Vec<ViewState>,
    pub shared: Vec<SharedProps>,
    pub draws: Vec<DrawRecord>,
    pub redraw_clears: usize,
    pub clicks: Vec<PointerEvent>,
    pub moves: Vec<PointerEvent>,
    pub leaves: Vec<PointerEvent>,
    /// Whether the filter admitted an unrelated layer while each event was handled.
    pub picks_all: Vec<bool>,
    pub finalized: usize,
}

impl RendererLog {
    /// Calls the hook the renderer was given instead of its own render loop.
    pub fn request_render(&self) {
        if let Some(hook) = &self.custom_render {
            hook();
        }
    }

    /// Properties of the last submitted layer named `id`.
    pub fn last_props(&self, id: &str) -> LayerProps {
        self.layer_props
            .iter()
            .find(|(layer_id, _)| layer_id == id)
            .map(|(_, props)| props.clone())
            .unwrap_or_else(|| panic!("layer `{id}` was never submitted"))
    }

    fn accepts(&self, node: &dyn LayerNode) -> bool {
        self.layer_filter.as_ref().is_some_and(|filter| filter(node))
    }
}

struct MockRenderer {
    log: Rc<RefCell<RendererLog>>,
    layers: Vec<Box<dyn ConcreteLayer>>,
}

impl MockRenderer {
    fn record_event(
        &self,
        event: &PointerEvent,
        list: fn(&mut RendererLog) -> &mut Vec<PointerEvent>,
    ) {
        let mut log = self.log.borrow_mut();
        let all = log.accepts(&Node::root("unrelated-node"));
        log.picks_all.push(all);
        list(&mut *log).push(event.clone());
    }
}

impl SceneRenderer for MockRenderer {
    fn set_props(&mut self, props: RendererProps) -> anyhow::Result<()> {
        let mut log = self.log.borrow_mut();
        if let Some(layers) = props.layers {
            log.layer_submissions += 1;
            log.layer_ids = layers.iter().map(|l| l.id().to_owned()).collect();
            log.layer_props = layers
                .iter()
                .map(|l| (l.id().to_owned(), l.props().clone()))
                .collect();
            self.layers = layers;
        }
        if let Some(view_state) = props.view_state {
            log.view_states.push(view_state);
        }
        if let Some(shared) = props.shared {
            log.shared.push(shared);
        }
        Ok(())
    }

    fn viewport_height(&self) -> f32 {
        self.log.borrow().viewport_height
    }

    fn draw_layers(&mut self, reason: &str) -> anyhow::Result<()> {
        let mut log = self.log.borrow_mut();
        let mut accepted = Vec::new();
        for layer in &self.layers {
            let sublayer = Node::child(format!("{}-sublayer", layer.id()), &**layer);
            let nodes: [&dyn LayerNode; 2] = [&**layer, &sublayer];
            for node in nodes {
                if log.accepts(node) {
                    accepted.push(node.id().to_owned());
                }
            }
        }
        log.draws.push(DrawRecord {
            reason: reason.to_owned(),
            accepted,
        });
        Ok(())
    }

    fn clear_redraw_flags(&mut self) {
        self.log.borrow_mut().redraw_clears += 1;
    }

    fn on_click(&mut self, event: &PointerEvent) {
        self.record_event(event, |log| &mut log.clicks);
    }

    fn on_pointer_move(&mut self, event: &PointerEvent) {
        self.record_event(event, |log| &mut log.moves);
    }

    fn on_pointer_leave(&mut self, event: &PointerEvent) {
        self.record_event(event, |log| &mut log.leaves);
    }

    fn finalize(&mut self) {
        self.layers.clear();
        self.log.borrow_mut().finalized += 1;
    }
}

type Logs = Rc<RefCell<Vec<Rc<RefCell<RendererLog>>>>>;

/// A mock host plus a manager whose factory records every renderer it builds.
pub struct Harness {
    pub host: Rc<MockHost>,
    pub manager: InstanceManager<MockGpu>,
    logs: Logs,
    calls: Rc<Cell<usize>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(BridgeConfig::default())
    }

    pub fn with_config(config: BridgeConfig) -> Self {
        Self::build(config, false)
    }

    /// A harness whose factory always fails.
    pub fn failing() -> Self {
        Self::build(BridgeConfig::default(), true)
    }

    fn build(config: BridgeConfig, fail: bool) -> Self {
        init_logging(LoggingConfig::for_tests());

        let logs = Logs::default();
        let calls = Rc::new(Cell::new(0));

        let factory_logs = Rc::clone(&logs);
        let factory_calls = Rc::clone(&calls);
        let factory = move |_gpu: &MockGpu, config: RendererConfig| {
            factory_calls.set(factory_calls.get() + 1);
            if fail {
                anyhow::bail!("no adapter");
            }
            let log = Rc::new(RefCell::new(RendererLog {
                width: Some(config.width),
                height: Some(config.height),
                controller: Some(config.controller),
                use_device_pixels: Some(config.use_device_pixels),
                layer_filter: Some(config.layer_filter),
                custom_render: Some(config.custom_render),
                ..RendererLog::default()
            }));
            factory_logs.borrow_mut().push(Rc::clone(&log));
            let renderer = MockRenderer {
                log,
                layers: Vec::new(),
            };
            Ok(Box::new(renderer) as Box<dyn SceneRenderer>)
        };

        Self {
            host: MockHost::new(),
            manager: InstanceManager::with_config(factory, config),
            logs,
            calls,
        }
    }

    pub fn instance(&self) -> Rc<RendererInstance> {
        self.manager
            .get_or_create(&self.host.as_dyn(), &MockGpu, None)
            .expect("renderer instance")
    }

    pub fn instance_with_parent(&self, parent: &Rc<MockParent>) -> Rc<RendererInstance> {
        self.manager
            .get_or_create(&self.host.as_dyn(), &MockGpu, Some(&parent.as_dyn()))
            .expect("renderer instance")
    }

    /// Log of the `index`th renderer the factory built.
    pub fn log(&self, index: usize) -> Rc<RefCell<RendererLog>> {
        Rc::clone(&self.logs.borrow()[index])
    }

    pub fn factory_calls(&self) -> usize {
        self.calls.get()
    }

    pub fn set_viewport_height(&self, index: usize, height: f32) {
        self.log(index).borrow_mut().viewport_height = height;
    }
}
