//! Centering Manager.
//!
//! Keeps registered floating elements horizontally centered over the
//! content area as the viewport and sidebar change. Bus events pass through
//! the [`EventCoordinator`]; when the resulting [`CenteringContext`] changes,
//! every registration is recomputed and its styles are queued for the next
//! frame.

use std::time::Instant;

pub mod applicator;
pub mod calculator;
pub mod coordinator;
pub mod registry;

pub use applicator::{FlushReport, StyleApplicator};
pub use calculator::{
    cleared_styles, compute_styles, CenteringContext, DeviceType, PositionCalculator, StyleMap,
    StyleValue,
};
pub use coordinator::{EventCoordinator, Trigger};
pub use registry::{ElementRegistration, Positioning, PositioningRule, Registry, VerticalAnchor};

use crate::dom::Document;
use crate::events::LayoutEvent;
use crate::sidebar::SidebarState;

/// Owns registrations, context and the compute/apply pipeline.
#[derive(Debug)]
pub struct CenteringManager {
    registry: Registry,
    calculator: PositionCalculator,
    applicator: StyleApplicator,
    coordinator: EventCoordinator,
    sidebar: SidebarState,
    offset_override: Option<String>,
    context: CenteringContext,
}

impl CenteringManager {
    /// Manager starting from `sidebar`.
    pub fn new(sidebar: SidebarState) -> Self {
        Self {
            registry: Registry::new(),
            calculator: PositionCalculator::default(),
            applicator: StyleApplicator::new(),
            coordinator: EventCoordinator::new(),
            sidebar,
            offset_override: None,
            context: CenteringContext::new(sidebar, None),
        }
    }

    /// Current context.
    pub fn context(&self) -> &CenteringContext {
        &self.context
    }

    /// Registered elements.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Whether style writes are waiting for a frame.
    pub fn has_pending_writes(&self) -> bool {
        self.applicator.has_pending()
    }

    /// Register (or replace) `key` and queue its styles.
    pub fn register(&mut self, key: impl Into<String>, registration: ElementRegistration) {
        let key = key.into();
        let styles = self.calculator.compute(&registration, &self.context);
        self.applicator.queue(&registration.selector, styles);
        if let Some(previous) = self.registry.register(key.clone(), registration) {
            let still_used = self.registry.iter().any(|(_, r)| r.selector == previous.selector);
            if !still_used {
                self.applicator.forget(&previous.selector);
            }
        }
        tracing::debug!(key = %key, "centering element registered");
    }

    /// Remove `key`, clearing its inline styles first.
    pub fn unregister(&mut self, doc: &mut Document, key: &str) -> bool {
        let Some(registration) = self.registry.get(key).cloned() else {
            return false;
        };
        if let Err(err) = self.applicator.write(doc, &registration.selector, &cleared_styles()) {
            tracing::warn!(key, error = %err, "failed to clear centering styles");
        }
        self.applicator.forget(&registration.selector);
        self.registry.unregister(key);
        true
    }

    /// Feed a bus event.
    pub fn on_event(&mut self, event: &LayoutEvent, now: Instant) {
        if let Some(trigger) = self.coordinator.handle(event, now) {
            self.apply_trigger(trigger);
        }
    }

    /// Fire due rate-limited events.
    pub fn tick(&mut self, now: Instant) {
        for trigger in self.coordinator.tick(now) {
            self.apply_trigger(trigger);
        }
    }

    fn apply_trigger(&mut self, trigger: Trigger) {
        let force = match trigger {
            Trigger::Viewport(width) => {
                self.sidebar.screen_width = width;
                false
            }
            Trigger::Sidebar(state) => {
                self.sidebar = state;
                false
            }
            Trigger::Offset(offset) => {
                self.offset_override = Some(offset);
                false
            }
            Trigger::Layout => true,
        };
        self.recompute(force);
    }

    /// Recompute every registration regardless of context changes.
    pub fn refresh(&mut self) {
        self.recompute(true);
    }

    fn recompute(&mut self, force: bool) {
        let next = CenteringContext::new(self.sidebar, self.offset_override.as_deref());
        if !force && next == self.context {
            return;
        }
        if next != self.context {
            tracing::debug!(
                device = ?next.device_type,
                collapsed = next.sidebar_collapsed,
                offset = %next.centering_offset,
                "centering context changed"
            );
        }
        self.context = next;
        self.calculator.clear();
        for (_, registration) in self.registry.iter() {
            let styles = self.calculator.compute(registration, &self.context);
            self.applicator.queue(&registration.selector, styles);
        }
    }

    /// Run the frame: write all queued styles.
    pub fn flush_frame(&mut self, doc: &mut Document) -> FlushReport {
        self.applicator.flush(doc)
    }

    /// Unregister everything and cancel pending work.
    pub fn dispose(&mut self, doc: &mut Document) {
        self.coordinator.cancel();
        self.applicator.cancel();
        for key in self.registry.keys() {
            self.unregister(doc, &key);
        }
        self.calculator.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeId;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn setup() -> (Document, NodeId, NodeId, CenteringManager) {
        let mut doc = Document::new();
        let toolbar = doc.create_element("div");
        doc.set_attribute(toolbar, "id", "toolbar").unwrap();
        doc.append_child(doc.body(), toolbar).unwrap();
        let content = doc.create_element("main");
        doc.add_class(content, "content").unwrap();
        doc.append_child(doc.body(), content).unwrap();

        let mut manager = CenteringManager::new(SidebarState {
            is_collapsed: false,
            screen_width: 1280,
        });
        manager.register(
            "toolbar",
            ElementRegistration::new(
                "#toolbar",
                Positioning::uniform(PositioningRule::FixedTop { top: "8px".into() }),
            )
            .with_centering_offset(),
        );
        manager.register(
            "content",
            ElementRegistration::new(
                "main.content",
                Positioning::uniform(PositioningRule::CssControlled {
                    base_offset: "130px".into(),
                }),
            ),
        );
        (doc, toolbar, content, manager)
    }

    #[test]
    fn registration_writes_on_next_frame() {
        let (mut doc, toolbar, content, mut manager) = setup();
        assert_eq!(doc.style(toolbar, "left"), None);

        let report = manager.flush_frame(&mut doc);
        assert_eq!(report.applied, 2);
        assert_eq!(doc.style(toolbar, "left"), Some("calc(50% + 130px)"));
        assert_eq!(doc.style(content, "--centering-offset"), Some("130px"));
    }

    #[test]
    fn sidebar_collapse_recomputes_immediately_on_leading_edge() {
        let (mut doc, toolbar, content, mut manager) = setup();
        manager.flush_frame(&mut doc);

        manager.on_event(
            &LayoutEvent::SidebarChanged(SidebarState {
                is_collapsed: true,
                screen_width: 1280,
            }),
            Instant::now(),
        );
        assert!(manager.has_pending_writes());
        manager.flush_frame(&mut doc);
        assert_eq!(doc.style(toolbar, "left"), Some("calc(50% + 32px)"));
        assert_eq!(doc.style(content, "--centering-offset"), Some("0px"));
    }

    #[test]
    fn resize_to_mobile_settles_after_debounce() {
        let (mut doc, toolbar, _, mut manager) = setup();
        manager.flush_frame(&mut doc);
        let t0 = Instant::now();

        manager.on_event(&LayoutEvent::ViewportChanged { width: 600 }, t0);
        manager.tick(t0 + ms(100));
        assert_eq!(manager.context().device_type, DeviceType::Desktop);

        manager.tick(t0 + ms(150));
        assert_eq!(manager.context().device_type, DeviceType::Mobile);
        manager.flush_frame(&mut doc);
        assert_eq!(doc.style(toolbar, "left"), Some("50%"));
    }

    #[test]
    fn unchanged_context_queues_nothing() {
        let (mut doc, _, _, mut manager) = setup();
        manager.flush_frame(&mut doc);
        let t0 = Instant::now();
        manager.on_event(&LayoutEvent::ViewportChanged { width: 1280 }, t0);
        manager.tick(t0 + ms(200));
        assert!(!manager.has_pending_writes());

        manager.on_event(&LayoutEvent::LayoutInvalidated, t0);
        assert!(manager.has_pending_writes(), "layout change forces a refresh");
    }

    #[test]
    fn offset_change_applies_immediately() {
        let (mut doc, toolbar, _, mut manager) = setup();
        manager.on_event(
            &LayoutEvent::CenteringOffsetChanged {
                offset: "90px".into(),
            },
            Instant::now(),
        );
        manager.flush_frame(&mut doc);
        assert_eq!(doc.style(toolbar, "left"), Some("calc(50% + 90px)"));
    }

    #[test]
    fn unregister_clears_inline_styles() {
        let (mut doc, toolbar, _, mut manager) = setup();
        manager.flush_frame(&mut doc);
        assert!(manager.unregister(&mut doc, "toolbar"));
        assert!(doc.styles(toolbar).unwrap().is_empty());
        assert!(!manager.unregister(&mut doc, "toolbar"));

        manager.refresh();
        assert_eq!(manager.flush_frame(&mut doc).applied, 1);
        assert!(doc.styles(toolbar).unwrap().is_empty());
    }

    #[test]
    fn missing_element_is_skipped_not_fatal() {
        let (mut doc, _, _, mut manager) = setup();
        manager.register(
            "ghost",
            ElementRegistration::new(
                "#ghost",
                Positioning::uniform(PositioningRule::FixedCenter {
                    anchor: VerticalAnchor::Middle,
                }),
            ),
        );
        let report = manager.flush_frame(&mut doc);
        assert_eq!(report, FlushReport { applied: 2, skipped: 1 });
    }

    #[test]
    fn dispose_clears_everything() {
        let (mut doc, toolbar, content, mut manager) = setup();
        manager.flush_frame(&mut doc);
        manager.dispose(&mut doc);
        assert!(manager.registry().is_empty());
        assert!(doc.styles(toolbar).unwrap().is_empty());
        assert!(doc.styles(content).unwrap().is_empty());
        assert_eq!(manager.flush_frame(&mut doc), FlushReport::default());
    }
}
