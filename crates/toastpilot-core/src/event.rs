use crate::platform::WindowHandle;

/// A window object was created.
pub const EVENT_OBJECT_CREATE: u32 = 0x8000;

/// A hidden window object was shown.
pub const EVENT_OBJECT_SHOW: u32 = 0x8002;

/// A window object changed position, shape, or size.
pub const EVENT_OBJECT_LOCATIONCHANGE: u32 = 0x800B;

/// Object ID indicating the event applies to the window itself,
/// not a child element like a scrollbar or caret.
pub const OBJID_WINDOW: i32 = 0;

/// A window event exactly as the OS hook delivered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    pub code: u32,
    pub hwnd: WindowHandle,
    pub id_object: i32,
    pub thread_id: u32,
}

/// The window lifecycle events the hook engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Created,
    Shown,
    LocationChanged,
}

impl RawEvent {
    /// Whether the event targets a real top-level window object.
    ///
    /// Most system chatter (carets, scrollbars, menu items) fails this
    /// check, so it runs before anything else.
    pub fn targets_window(&self) -> bool {
        self.id_object == OBJID_WINDOW && self.hwnd != 0
    }

    /// Maps the event code to a monitored kind, or `None` for codes
    /// inside the subscribed range that we don't care about.
    pub fn kind(&self) -> Option<EventKind> {
        match self.code {
            EVENT_OBJECT_CREATE => Some(EventKind::Created),
            EVENT_OBJECT_SHOW => Some(EventKind::Shown),
            EVENT_OBJECT_LOCATIONCHANGE => Some(EventKind::LocationChanged),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Shown => write!(f, "shown"),
            Self::LocationChanged => write!(f, "location-changed"),
        }
    }
}
