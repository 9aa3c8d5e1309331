use std::fmt;
use std::rc::Rc;

use glam::Vec2;
use serde_json::{Map, Value};
use tandem_engine::camera::LngLat;

/// Keys a property update may never overwrite.
const RESERVED_KEYS: &[&str] = &["id"];

/// Property bag of one visual layer.
///
/// Values are JSON so that any concrete layer type can define its own schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerProps(Map<String, Value>);

impl LayerProps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Shallow-merges `update` into `self`; later keys win.
    ///
    /// Reserved keys are skipped. Returns the reserved keys that were present
    /// in `update`.
    pub fn merge(&mut self, update: LayerProps) -> Vec<String> {
        let mut rejected = Vec::new();
        for (key, value) in update.0 {
            if RESERVED_KEYS.contains(&key.as_str()) {
                rejected.push(key);
                continue;
            }
            self.0.insert(key, value);
        }
        rejected
    }
}

impl From<Map<String, Value>> for LayerProps {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// What a pick hit, as reported to click/hover callbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct PickInfo {
    pub layer_id: Option<String>,
    /// Index of the picked object within its layer's data.
    pub index: Option<usize>,
    pub pixel: Vec2,
    pub coordinate: Option<LngLat>,
}

/// Click/hover callback. Returning `true` marks the event handled.
pub type PickCallback = Rc<dyn Fn(&PickInfo) -> bool>;

/// Cross-cutting renderer properties a nested instance copies from its parent
/// before every draw.
#[derive(Clone, Default)]
pub struct SharedProps {
    pub picking_radius: u32,
    pub animate: bool,
    pub draw_picking_colors: bool,
    pub on_layer_click: Option<PickCallback>,
    pub on_layer_hover: Option<PickCallback>,
}

impl fmt::Debug for SharedProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedProps")
            .field("picking_radius", &self.picking_radius)
            .field("animate", &self.animate)
            .field("draw_picking_colors", &self.draw_picking_colors)
            .field("on_layer_click", &self.on_layer_click.is_some())
            .field("on_layer_hover", &self.on_layer_hover.is_some())
            .finish()
    }
}
