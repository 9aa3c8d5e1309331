//! Pointer event forwarding into the scene renderer's hit-testing.

use std::rc::Rc;

use tandem_engine::input::{PointerEvent, PointerKind, RawPointerEvent};

use crate::error::{BridgeError, Result};
use crate::filter::ActiveFilter;
use crate::host::{HostMap, ParentRenderer, PointerHandler};
use crate::instance::RendererInstance;

/// Converts either event shape into the scene renderer's shape.
///
/// Events from a parent scene renderer are already normalized and pass
/// through unchanged.
pub fn normalize(event: &RawPointerEvent) -> PointerEvent {
    match event {
        RawPointerEvent::Scene(ev) => ev.clone(),
        RawPointerEvent::Map(ev) => PointerEvent {
            offset_center: ev.point,
            src_event: ev.original.clone(),
        },
    }
}

/// Forwards one event to the matching renderer handler.
///
/// Picking has to consider every registered layer, so the filter is opened
/// to `All` first. The next draw narrows it again.
pub fn dispatch(
    instance: &RendererInstance,
    kind: PointerKind,
    event: &RawPointerEvent,
) -> Result<()> {
    instance.ensure_live()?;
    instance.filter().set(ActiveFilter::All);

    let event = normalize(event);
    log::trace!(
        "{}: {} at ({}, {})",
        instance.context_id(),
        kind.scene_event_name(),
        event.offset_center.x,
        event.offset_center.y
    );

    instance.with_renderer(|renderer| {
        match kind {
            PointerKind::Click => renderer.on_click(&event),
            PointerKind::Move => renderer.on_pointer_move(&event),
            PointerKind::Leave => renderer.on_pointer_leave(&event),
        }
        Ok(())
    })
}

/// Subscribes `instance` to the host's pointer events and, when nested, to
/// the parent renderer's event manager.
pub(crate) fn subscribe(
    instance: &Rc<RendererInstance>,
    host: &dyn HostMap,
    parent: Option<&dyn ParentRenderer>,
) {
    if let Some(parent) = parent {
        for kind in PointerKind::ALL {
            parent.on_pointer(kind, handler(instance, kind));
        }
    }
    for kind in PointerKind::ALL {
        host.on_pointer(kind, handler(instance, kind));
    }
}

fn handler(instance: &Rc<RendererInstance>, kind: PointerKind) -> PointerHandler {
    let instance = Rc::downgrade(instance);
    Box::new(move |event: &RawPointerEvent| {
        let Some(instance) = instance.upgrade() else {
            return;
        };
        match dispatch(&instance, kind, event) {
            Ok(()) => {}
            Err(BridgeError::Finalized { context }) => {
                log::debug!("{context}: dropping {} after teardown", kind.host_event_name());
            }
            Err(err) => log::warn!("dropping {} event: {err}", kind.host_event_name()),
        }
    })
}
