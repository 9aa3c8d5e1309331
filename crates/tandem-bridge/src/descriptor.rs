use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{BridgeError, Result};
use crate::host::LayerNode;
use crate::props::LayerProps;

/// A materialized visual layer, handed to the scene renderer.
pub trait ConcreteLayer: LayerNode + fmt::Debug {
    fn type_name(&self) -> &str;
    fn props(&self) -> &LayerProps;
}

/// Constructor for one kind of visual layer (scatterplot, arcs, ...).
pub trait LayerType {
    fn name(&self) -> &str;

    fn build(&self, id: &str, props: &LayerProps) -> anyhow::Result<Box<dyn ConcreteLayer>>;
}

/// Declared configuration of one injected layer.
///
/// Registries key descriptors by `Rc` identity. The id never changes; the
/// property bag is merged in place by `MapLayer::set_props`.
pub struct LayerDescriptor {
    id: String,
    layer_type: Rc<dyn LayerType>,
    props: RefCell<LayerProps>,
    before_id: Option<String>,
}

impl LayerDescriptor {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn layer_type(&self) -> &Rc<dyn LayerType> {
        &self.layer_type
    }

    pub fn props(&self) -> Ref<'_, LayerProps> {
        self.props.borrow()
    }

    /// Host layer this one should be inserted before.
    pub fn before_id(&self) -> Option<&str> {
        self.before_id.as_deref()
    }

    /// Merges `update` into the property bag. Returns rejected reserved keys.
    pub(crate) fn merge_props(&self, update: LayerProps) -> Vec<String> {
        self.props.borrow_mut().merge(update)
    }

    pub(crate) fn restore_props(&self, props: LayerProps) {
        *self.props.borrow_mut() = props;
    }

    /// Builds a fresh concrete layer from the current properties.
    pub fn materialize(&self) -> Result<Box<dyn ConcreteLayer>> {
        let props = self.props.borrow();
        self.layer_type
            .build(&self.id, &props)
            .map_err(|source| BridgeError::Build {
                id: self.id.clone(),
                source,
            })
    }
}

impl fmt::Debug for LayerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerDescriptor")
            .field("id", &self.id)
            .field("layer_type", &self.layer_type.name())
            .field("props", &self.props.borrow())
            .field("before_id", &self.before_id)
            .finish()
    }
}

/// What a layer author provides: `id` (required), the layer type, its
/// properties, and an optional host placement hint.
#[derive(Clone)]
pub struct LayerOptions {
    pub id: Option<String>,
    pub layer_type: Rc<dyn LayerType>,
    pub props: LayerProps,
    pub before_id: Option<String>,
}

#[derive(Deserialize)]
struct RawOptions {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "beforeId")]
    before_id: Option<String>,
    #[serde(flatten)]
    props: Map<String, Value>,
}

impl LayerOptions {
    pub fn new(layer_type: Rc<dyn LayerType>) -> Self {
        Self {
            id: None,
            layer_type,
            props: LayerProps::new(),
            before_id: None,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn before_id(mut self, before_id: impl Into<String>) -> Self {
        self.before_id = Some(before_id.into());
        self
    }

    pub fn prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key, value);
        self
    }

    /// Parses `{"id": ..., "beforeId": ..., <layer props>}`.
    pub fn from_json(layer_type: Rc<dyn LayerType>, value: Value) -> Result<Self> {
        let raw: RawOptions = serde_json::from_value(value)?;
        Ok(Self {
            id: raw.id,
            layer_type,
            props: LayerProps::from_map(raw.props),
            before_id: raw.before_id,
        })
    }

    /// Validates the options into a descriptor.
    pub fn into_descriptor(self) -> Result<LayerDescriptor> {
        let id = match self.id {
            Some(id) if !id.is_empty() => id,
            _ => return Err(BridgeError::MissingId),
        };
        Ok(LayerDescriptor {
            id,
            layer_type: self.layer_type,
            props: RefCell::new(self.props),
            before_id: self.before_id,
        })
    }
}

impl fmt::Debug for LayerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerOptions")
            .field("id", &self.id)
            .field("layer_type", &self.layer_type.name())
            .field("props", &self.props)
            .field("before_id", &self.before_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testing::MockLayerType;

    #[test]
    fn options_without_id_are_rejected() {
        let err = LayerOptions::new(MockLayerType::shared("scatterplot"))
            .prop("radius", 10)
            .into_descriptor()
            .unwrap_err();
        assert!(matches!(err, BridgeError::MissingId));

        let err = LayerOptions::new(MockLayerType::shared("scatterplot"))
            .id("")
            .into_descriptor()
            .unwrap_err();
        assert!(matches!(err, BridgeError::MissingId));
    }

    #[test]
    fn json_options_split_id_and_before_id_from_props() {
        let options = LayerOptions::from_json(
            MockLayerType::shared("scatterplot"),
            json!({"id": "deckgl-pois", "beforeId": "place-labels", "radiusMinPixels": 0.25}),
        )
        .unwrap();
        let desc = options.into_descriptor().unwrap();

        assert_eq!(desc.id(), "deckgl-pois");
        assert_eq!(desc.before_id(), Some("place-labels"));
        assert_eq!(desc.props().get("radiusMinPixels"), Some(&json!(0.25)));
        assert!(desc.props().get("id").is_none());
        assert!(desc.props().get("beforeId").is_none());
    }

    #[test]
    fn json_options_with_non_string_id_are_invalid() {
        let err =
            LayerOptions::from_json(MockLayerType::shared("arc"), json!({"id": 7})).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidOptions(_)));

        let err = LayerOptions::from_json(MockLayerType::shared("arc"), json!([1, 2])).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidOptions(_)));
    }

    #[test]
    fn materialize_uses_current_props() {
        let desc = LayerOptions::new(MockLayerType::shared("arc"))
            .id("arcs")
            .prop("width", 1)
            .into_descriptor()
            .unwrap();
        desc.merge_props(LayerProps::new().with("width", 4));

        let layer = desc.materialize().unwrap();
        assert_eq!(layer.id(), "arcs");
        assert_eq!(layer.type_name(), "arc");
        assert_eq!(layer.props().get("width"), Some(&json!(4)));
    }

    #[test]
    fn build_failure_names_the_layer() {
        let desc = LayerOptions::new(MockLayerType::failing("broken"))
            .id("bad")
            .into_descriptor()
            .unwrap();
        match desc.materialize().unwrap_err() {
            BridgeError::Build { id, .. } => assert_eq!(id, "bad"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
