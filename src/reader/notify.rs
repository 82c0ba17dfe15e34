use std::collections::BTreeMap;

// Subscriptions
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone)]
pub struct SubscriptionId(u64);

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Detached {
    Unknown,
    Removed,
    /// The registry is empty now
    RemovedLast,
}

/// Listeners keyed by subscription handle. Handles are never reused, and iteration follows
/// subscription order.
pub struct Registry<L> {
    next: u64,
    listeners: BTreeMap<SubscriptionId, L>,
}

impl<L> Default for Registry<L> {
    fn default() -> Self {
        Self { next: 0, listeners: BTreeMap::new() }
    }
}

impl<L> Registry<L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the new handle and whether this is the first listener.
    pub fn attach(&mut self, listener: L) -> (SubscriptionId, bool) {
        let id = SubscriptionId(self.next);
        self.next += 1;
        let first = self.listeners.is_empty();
        self.listeners.insert(id, listener);
        (id, first)
    }

    pub fn detach(&mut self, id: SubscriptionId) -> Detached {
        match self.listeners.remove(&id) {
            None => Detached::Unknown,
            Some(_) if self.listeners.is_empty() => Detached::RemovedLast,
            Some(_) => Detached::Removed,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &L> {
        self.listeners.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut L> {
        self.listeners.values_mut()
    }
}
