//! Per-instance draw filter.
//!
//! The scene renderer receives one predicate at construction and keeps it.
//! The predicate reads [`FilterState`], which is written right before each
//! pass:
//!
//! 1. a layer's `render` writes `Layer(id)`, the event bridge writes `All`
//! 2. the scene renderer reads it through the predicate during that pass
//! 3. the next pass overwrites it
//!
//! Pushing the filter as a renderer property instead would make the property
//! update itself schedule another render.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::LayerFilter;
use crate::host::LayerNode;

/// Which layers take part in the current draw or pick pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActiveFilter {
    All,
    /// Initial state: nothing is drawn until a pass selects something.
    #[default]
    Nothing,
    /// Only the named top-level layer and everything generated from it.
    Layer(String),
}

impl From<bool> for ActiveFilter {
    fn from(all: bool) -> Self {
        if all { ActiveFilter::All } else { ActiveFilter::Nothing }
    }
}

/// Shared handle to an instance's active filter value.
#[derive(Debug, Clone, Default)]
pub struct FilterState(Rc<RefCell<ActiveFilter>>);

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, value: ActiveFilter) {
        *self.0.borrow_mut() = value;
    }

    pub fn get(&self) -> ActiveFilter {
        self.0.borrow().clone()
    }

    pub fn should_draw(&self, candidate: &dyn LayerNode) -> bool {
        should_draw(&self.0.borrow(), candidate)
    }

    /// The predicate installed into the scene renderer.
    pub fn predicate(&self) -> LayerFilter {
        let state = self.clone();
        Box::new(move |layer: &dyn LayerNode| state.should_draw(layer))
    }
}

/// Decides whether `candidate` takes part in the pass selected by `active`.
///
/// For `Layer(id)` the candidate's ancestor chain is walked, starting with
/// the candidate itself.
pub fn should_draw(active: &ActiveFilter, candidate: &dyn LayerNode) -> bool {
    let target = match active {
        ActiveFilter::All => return true,
        ActiveFilter::Nothing => return false,
        ActiveFilter::Layer(id) => id.as_str(),
    };

    let mut node = Some(candidate);
    while let Some(layer) = node {
        if layer.id() == target {
            return true;
        }
        node = layer.parent();
    }
    false
}
