//! Internal event bus.
//!
//! Viewport, sidebar and layout notifications are funnelled through a single
//! channel carrying a closed set of [`LayoutEvent`]s. The application root
//! drains the bus once per turn and hands each event to the subsystems,
//! which treat it as input to a reducer.

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Instant;

pub mod listeners;
pub mod timing;

pub use listeners::{ListenerSet, SubscriptionId};
pub use timing::{Debouncer, FrameScheduler, Throttler};

use crate::config::constants::LAYOUT_CHANGE_DEBOUNCE;
use crate::sidebar::SidebarState;

/// Layout-affecting events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutEvent {
    /// Window resized or rotated to `width` CSS pixels.
    ViewportChanged {
        /// New viewport width.
        width: u32,
    },
    /// Sidebar collapse state or width changed.
    SidebarChanged(SidebarState),
    /// Generic `layoutChange` notification.
    LayoutInvalidated,
    /// New dynamic centering offset (a CSS length).
    CenteringOffsetChanged {
        /// Offset value, e.g. `"130px"`.
        offset: String,
    },
}

/// Cloneable publishing handle.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<LayoutEvent>,
}

impl EventSender {
    /// Publish an event. Events sent after the bus is dropped are discarded.
    pub fn publish(&self, event: LayoutEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("event bus closed; dropping layout event");
        }
    }
}

/// Single-consumer event channel.
#[derive(Debug)]
pub struct EventBus {
    tx: Sender<LayoutEvent>,
    rx: Receiver<LayoutEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    /// Handle for publishers.
    pub fn sender(&self) -> EventSender {
        EventSender {
            tx: self.tx.clone(),
        }
    }

    /// Publish from the owning side.
    pub fn publish(&self, event: LayoutEvent) {
        // The bus holds its own receiver, so this send cannot fail.
        let _ = self.tx.send(event);
    }

    /// Take every queued event in publish order.
    pub fn drain(&self) -> Vec<LayoutEvent> {
        self.rx.try_iter().collect()
    }
}

/// Emitter-side debounce for `layoutChange` notifications.
///
/// Components that shift layout call [`notify`](Self::notify) as often as
/// they like; one [`LayoutEvent::LayoutInvalidated`] is published once input
/// has been quiet for the layout-change delay.
#[derive(Debug)]
pub struct LayoutChangeEmitter {
    sender: EventSender,
    debounce: Debouncer,
}

impl LayoutChangeEmitter {
    /// Create an emitter publishing to `sender`.
    pub fn new(sender: EventSender) -> Self {
        Self {
            sender,
            debounce: Debouncer::new(LAYOUT_CHANGE_DEBOUNCE),
        }
    }

    /// Record a layout change.
    pub fn notify(&mut self, now: Instant) {
        self.debounce.trigger(now);
    }

    /// Publish if the debounce window has elapsed. Returns whether it published.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.debounce.poll(now) {
            self.sender.publish(LayoutEvent::LayoutInvalidated);
            true
        } else {
            false
        }
    }

    /// Drop a pending notification.
    pub fn cancel(&mut self) {
        self.debounce.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn drain_returns_events_in_publish_order() {
        let bus = EventBus::new();
        let sender = bus.sender();
        sender.publish(LayoutEvent::ViewportChanged { width: 800 });
        bus.publish(LayoutEvent::LayoutInvalidated);

        assert_eq!(
            bus.drain(),
            vec![
                LayoutEvent::ViewportChanged { width: 800 },
                LayoutEvent::LayoutInvalidated
            ]
        );
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn publishing_after_bus_drop_is_silent() {
        let bus = EventBus::new();
        let sender = bus.sender();
        drop(bus);
        sender.publish(LayoutEvent::LayoutInvalidated);
    }

    #[test]
    fn layout_change_emitter_debounces() {
        let bus = EventBus::new();
        let mut emitter = LayoutChangeEmitter::new(bus.sender());
        let t0 = Instant::now();

        emitter.notify(t0);
        emitter.notify(t0 + Duration::from_millis(30));
        assert!(!emitter.tick(t0 + Duration::from_millis(60)));
        assert!(emitter.tick(t0 + Duration::from_millis(80)));

        assert_eq!(bus.drain(), vec![LayoutEvent::LayoutInvalidated]);
    }
}
