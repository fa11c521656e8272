//! Registrations of floating elements kept centered over the content area.

/// Vertical anchor for [`PositioningRule::FixedCenter`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VerticalAnchor {
    /// Distance from the viewport top (CSS length).
    Top(String),
    /// Distance from the viewport bottom (CSS length).
    Bottom(String),
    /// Vertically centered.
    Middle,
}

/// How an element is positioned for one device type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PositioningRule {
    /// `position: fixed`, horizontally centered, anchored vertically.
    FixedCenter {
        /// Vertical anchor.
        anchor: VerticalAnchor,
    },
    /// `position: fixed`, horizontally centered at a fixed top offset.
    FixedTop {
        /// Top offset (CSS length).
        top: String,
    },
    /// Stylesheet handles placement; only `--centering-offset` is written.
    CssControlled {
        /// Offset used while the sidebar is expanded.
        base_offset: String,
    },
}

/// Rules per device type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Positioning {
    /// Rule at or below the mobile breakpoint.
    pub mobile: PositioningRule,
    /// Rule above it.
    pub desktop: PositioningRule,
}

impl Positioning {
    /// Same rule on every device.
    pub fn uniform(rule: PositioningRule) -> Self {
        Self {
            mobile: rule.clone(),
            desktop: rule,
        }
    }
}

/// A managed element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRegistration {
    /// Selector locating the element.
    pub selector: String,
    /// Positioning rules.
    pub positioning: Positioning,
    /// Stacking order, if managed.
    pub z_index: Option<i32>,
    /// Follow the dynamic centering offset.
    pub use_centering_offset: bool,
}

impl ElementRegistration {
    /// Registration with no z-index that ignores the dynamic offset.
    pub fn new(selector: impl Into<String>, positioning: Positioning) -> Self {
        Self {
            selector: selector.into(),
            positioning,
            z_index: None,
            use_centering_offset: false,
        }
    }

    /// Set the z-index.
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = Some(z_index);
        self
    }

    /// Follow the dynamic centering offset.
    pub fn with_centering_offset(mut self) -> Self {
        self.use_centering_offset = true;
        self
    }
}

/// Ordered, keyed registrations.
///
/// Re-registering a key overwrites it in place, so flush order stays the
/// order of first registration.
#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<(String, ElementRegistration)>,
}

impl Registry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `key`. Returns the previous registration.
    pub fn register(
        &mut self,
        key: impl Into<String>,
        registration: ElementRegistration,
    ) -> Option<ElementRegistration> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, registration)),
            None => {
                self.entries.push((key, registration));
                None
            }
        }
    }

    /// Remove `key`.
    pub fn unregister(&mut self, key: &str) -> Option<ElementRegistration> {
        let position = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(position).1)
    }

    /// Registration for `key`.
    pub fn get(&self, key: &str) -> Option<&ElementRegistration> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, r)| r)
    }

    /// Registrations in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ElementRegistration)> {
        self.entries.iter().map(|(k, r)| (k.as_str(), r))
    }

    /// Registered keys in order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reg(selector: &str) -> ElementRegistration {
        ElementRegistration::new(
            selector,
            Positioning::uniform(PositioningRule::FixedTop { top: "16px".into() }),
        )
    }

    #[test]
    fn reregistration_overwrites_in_place() {
        let mut registry = Registry::new();
        registry.register("a", reg("#a"));
        registry.register("b", reg("#b"));
        let previous = registry.register("a", reg("#a2"));

        assert_eq!(previous.map(|r| r.selector), Some("#a".to_string()));
        assert_eq!(registry.keys(), vec!["a", "b"]);
        assert_eq!(registry.get("a").unwrap().selector, "#a2");
    }

    #[test]
    fn unregister_removes_only_that_key() {
        let mut registry = Registry::new();
        registry.register("a", reg("#a"));
        registry.register("b", reg("#b"));
        assert!(registry.unregister("a").is_some());
        assert!(registry.unregister("a").is_none());
        assert_eq!(registry.len(), 1);
    }
}
