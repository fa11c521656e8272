//! Subscriber sets for change notifications.

/// Handle returned by [`ListenerSet::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

type Listener<T> = Box<dyn FnMut(&T)>;

/// Ordered set of boxed callbacks.
pub struct ListenerSet<T> {
    listeners: Vec<(SubscriptionId, Listener<T>)>,
    next_id: usize,
}

impl<T> Default for ListenerSet<T> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T> std::fmt::Debug for ListenerSet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSet")
            .field("len", &self.listeners.len())
            .finish()
    }
}

impl<T> ListenerSet<T> {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&T) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a callback. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Invoke every callback in subscription order.
    pub fn notify(&mut self, value: &T) {
        for (_, listener) in &mut self.listeners {
            listener(value);
        }
    }

    /// Number of callbacks.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether there are no callbacks.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Drop every callback.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}
