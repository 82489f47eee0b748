use crate::foundation::core::{Millis, Point, Size, Vec2};

/// Handle for a scheduled timeout or interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

/// Handle for a registered event listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

/// Window-level event sources an engine can subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    /// Pointer movement over the window.
    PointerMove,
    /// Window resize.
    Resize,
    /// Page scroll.
    Scroll,
}

/// An event delivered by the host to a subscribed engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HostEvent {
    /// Pointer position in viewport coordinates.
    PointerMove(Point),
    /// New viewport size.
    Resize(Size),
    /// New page scroll offset.
    Scroll(Vec2),
}

impl HostEvent {
    /// The listener kind this event is delivered to.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::PointerMove(_) => EventKind::PointerMove,
            Self::Resize(_) => EventKind::Resize,
            Self::Scroll(_) => EventKind::Scroll,
        }
    }
}

/// Deferred-callback capability. Fired timers are routed back to the owner through
/// [`TimerTarget::on_timer`].
pub trait TimerHost {
    /// Current host time.
    fn now(&self) -> Millis;

    /// Schedule a one-shot timer `delay` from now.
    fn set_timeout(&mut self, delay: Millis) -> TimerId;

    /// Schedule a repeating timer firing every `period` (at least 1ms).
    fn set_interval(&mut self, period: Millis) -> TimerId;

    /// Cancel a timer. Unknown or already-fired ids are ignored.
    fn clear_timer(&mut self, id: TimerId);
}

/// Event-subscription capability standing in for window-level listeners.
pub trait EventHost {
    /// Subscribe to `kind`; events arrive through the engine's `on_event`.
    fn listen(&mut self, kind: EventKind) -> ListenerId;

    /// Unknown ids are ignored.
    fn unlisten(&mut self, id: ListenerId);
}

/// Something that owns timers and wants their callbacks.
pub trait TimerTarget {
    /// Handle a fired timer. Stale ids (cancelled or superseded) must be ignored.
    fn on_timer(&mut self, id: TimerId, timers: &mut dyn TimerHost);
}
