//! Descriptor set of one renderer instance.
//!
//! Every mutation rebuilds the complete concrete layer list and submits it
//! to the scene renderer before returning, so the next draw already sees it.
//! The renderer diffs by layer id on its own. A mutation whose rebuild fails
//! is undone, so the set always matches the last accepted submission.

use std::rc::Rc;

use crate::descriptor::{ConcreteLayer, LayerDescriptor};
use crate::error::Result;
use crate::instance::RendererInstance;

/// Insertion-ordered set of descriptors, keyed by `Rc` identity.
///
/// Two distinct descriptors with the same id are two entries; uniqueness of
/// ids is up to the caller. Removal keeps the order of the survivors.
#[derive(Debug, Clone, Default)]
pub struct LayerSet {
    entries: Vec<Rc<LayerDescriptor>>,
}

impl LayerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if this exact descriptor is already present.
    pub fn insert(&mut self, descriptor: &Rc<LayerDescriptor>) -> bool {
        if self.contains(descriptor) {
            return false;
        }
        self.entries.push(Rc::clone(descriptor));
        true
    }

    pub fn remove(&mut self, descriptor: &Rc<LayerDescriptor>) -> bool {
        match self.entries.iter().position(|d| Rc::ptr_eq(d, descriptor)) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, descriptor: &Rc<LayerDescriptor>) -> bool {
        self.entries.iter().any(|d| Rc::ptr_eq(d, descriptor))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<LayerDescriptor>> {
        self.entries.iter()
    }

    /// Builds one concrete layer per descriptor, in set order.
    pub fn materialize(&self) -> Result<Vec<Box<dyn ConcreteLayer>>> {
        self.entries.iter().map(|d| d.materialize()).collect()
    }
}

/// Adds `descriptor` and rebuilds.
pub fn add(instance: &RendererInstance, descriptor: &Rc<LayerDescriptor>) -> Result<()> {
    instance.ensure_live()?;
    let previous = instance.layers.borrow().clone();
    if !instance.layers.borrow_mut().insert(descriptor) {
        log::debug!(
            "layer `{}` already registered with {}",
            descriptor.id(),
            instance.context_id()
        );
    }
    rebuild_or_restore(instance, previous)
}

/// Removes `descriptor` and rebuilds.
pub fn remove(instance: &RendererInstance, descriptor: &Rc<LayerDescriptor>) -> Result<()> {
    instance.ensure_live()?;
    let previous = instance.layers.borrow().clone();
    if !instance.layers.borrow_mut().remove(descriptor) {
        log::debug!(
            "layer `{}` was not registered with {}",
            descriptor.id(),
            instance.context_id()
        );
    }
    rebuild_or_restore(instance, previous)
}

/// Swaps `old` for `new` and rebuilds. With the same descriptor on both sides
/// this only rebuilds, picking up in-place property changes.
pub fn replace(
    instance: &RendererInstance,
    old: &Rc<LayerDescriptor>,
    new: &Rc<LayerDescriptor>,
) -> Result<()> {
    instance.ensure_live()?;
    let previous = instance.layers.borrow().clone();
    if !Rc::ptr_eq(old, new) {
        let mut layers = instance.layers.borrow_mut();
        layers.remove(old);
        layers.insert(new);
    }
    rebuild_or_restore(instance, previous)
}

fn rebuild_or_restore(instance: &RendererInstance, previous: LayerSet) -> Result<()> {
    let result = rebuild(instance);
    if let Err(err) = &result {
        log::warn!("{}: layer rebuild failed, keeping previous set: {err}", instance.context_id());
        *instance.layers.borrow_mut() = previous;
    }
    result
}

fn rebuild(instance: &RendererInstance) -> Result<()> {
    // Materialize before touching the renderer; layer constructors may be
    // arbitrarily slow and must not run under the renderer borrow.
    let layers = instance.layers.borrow().materialize()?;
    log::trace!("{}: submitting {} layers", instance.context_id(), layers.len());
    instance.submit_layers(layers)
}
