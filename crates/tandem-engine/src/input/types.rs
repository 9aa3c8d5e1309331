use glam::Vec2;

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

/// Modifier keys state.
///
/// Stored as booleans rather than bitflags to keep it explicit and stable.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// The three pointer interactions routed into hit-testing.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PointerKind {
    Click,
    Move,
    Leave,
}

impl PointerKind {
    pub const ALL: [PointerKind; 3] = [PointerKind::Click, PointerKind::Move, PointerKind::Leave];

    /// Event name on the host map side.
    pub fn host_event_name(self) -> &'static str {
        match self {
            PointerKind::Click => "click",
            PointerKind::Move => "mousemove",
            PointerKind::Leave => "mouseleave",
        }
    }

    /// Handler name on the scene renderer side.
    pub fn scene_event_name(self) -> &'static str {
        match self {
            PointerKind::Click => "click",
            PointerKind::Move => "pointermove",
            PointerKind::Leave => "pointerleave",
        }
    }
}

/// The platform event a pointer event was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceEvent {
    pub kind: PointerKind,
    /// Button involved, for clicks.
    pub button: Option<MouseButton>,
    pub modifiers: Modifiers,
}

impl SourceEvent {
    #[inline]
    pub fn new(kind: PointerKind) -> Self {
        Self {
            kind,
            button: None,
            modifiers: Modifiers::default(),
        }
    }
}

/// Pointer event in the host map's native shape.
///
/// `point` is in logical pixels relative to the map canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct MapPointerEvent {
    pub point: Vec2,
    pub original: SourceEvent,
}

/// Normalized pointer event consumed by scene renderer hit-testing.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub offset_center: Vec2,
    pub src_event: SourceEvent,
}

/// Pointer event as delivered by either event source.
///
/// Host maps emit `Map`; a parent scene renderer's event manager emits events
/// that are already normalized (`Scene`).
#[derive(Debug, Clone, PartialEq)]
pub enum RawPointerEvent {
    Map(MapPointerEvent),
    Scene(PointerEvent),
}

impl From<MapPointerEvent> for RawPointerEvent {
    fn from(ev: MapPointerEvent) -> Self {
        RawPointerEvent::Map(ev)
    }
}

impl From<PointerEvent> for RawPointerEvent {
    fn from(ev: PointerEvent) -> Self {
        RawPointerEvent::Scene(ev)
    }
}
