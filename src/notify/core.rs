use std::fmt;

/// Handle returned by [`ChangeNotifier::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<T> = Box<dyn FnMut(&T)>;

/// Registered callbacks. Detached from the notifier while a signal is being
/// delivered so the signalling object can be lent to them immutably.
pub struct Subscribers<T> {
    entries: Vec<(SubscriptionId, Callback<T>)>,
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> Subscribers<T> {
    /// Invoke every callback in registration order.
    pub fn deliver(&mut self, target: &T) {
        for (_, callback) in self.entries.iter_mut() {
            callback(target);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Coarse "something changed" signal with no payload.
///
/// Every raised signal bumps the revision and sets the dirty flag before the
/// callbacks run, so a subscriber reading [`revision`](Self::revision) through
/// the target sees the new value. Callbacks only ever get `&T`; mutating the
/// target from inside a notification does not type-check, which rules out
/// re-entrant delivery.
pub struct ChangeNotifier<T> {
    subscribers: Subscribers<T>,
    next_id: u64,
    revision: u64,
    dirty: bool,
}

impl<T> Default for ChangeNotifier<T> {
    fn default() -> Self {
        Self {
            subscribers: Subscribers::default(),
            next_id: 0,
            revision: 0,
            dirty: false,
        }
    }
}

impl<T> ChangeNotifier<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&T) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.entries.push((id, Box::new(callback)));
        id
    }

    /// Returns `false` when the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.entries.len();
        self.subscribers.entries.retain(|(entry, _)| *entry != id);
        before != self.subscribers.entries.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Record a change without delivering it. Returns the new revision.
    pub fn mark_changed(&mut self) -> u64 {
        self.revision = self.revision.wrapping_add(1);
        self.dirty = true;
        self.revision
    }

    /// Take the callbacks out for delivery. Pair with [`attach`](Self::attach).
    pub fn detach(&mut self) -> Subscribers<T> {
        std::mem::take(&mut self.subscribers)
    }

    pub fn attach(&mut self, subscribers: Subscribers<T>) {
        self.subscribers = subscribers;
    }

    /// Mark and deliver in one step, for targets that do not own the notifier.
    pub fn notify(&mut self, target: &T) {
        self.mark_changed();
        self.subscribers.deliver(target);
    }

    /// Number of signals raised so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag, returning whether anything changed since the
    /// last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

impl<T> fmt::Debug for ChangeNotifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribers", &self.subscribers.len())
            .field("revision", &self.revision)
            .field("dirty", &self.dirty)
            .finish()
    }
}
