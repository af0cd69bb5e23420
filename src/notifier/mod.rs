//! Change notification hub
//!
//! Watchers register a callback and get called, without payload, whenever the
//! document has changed. They re-read whatever state they need afterwards.

/// Handle returned by [`ChangeNotifier::watch`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatcherId(u64);

pub struct ChangeNotifier {
    watchers: Vec<(WatcherId, Box<dyn FnMut()>)>,
    next_id: u64,
    dirty: bool,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self {
            watchers: Vec::new(),
            next_id: 0,
            dirty: false,
        }
    }

    pub fn watch(&mut self, watcher: impl FnMut() + 'static) -> WatcherId {
        let id = WatcherId(self.next_id);
        self.next_id += 1;
        self.watchers.push((id, Box::new(watcher)));
        id
    }

    /// Returns false when the id was not registered
    pub fn unwatch(&mut self, id: WatcherId) -> bool {
        let before = self.watchers.len();
        self.watchers.retain(|(w, _)| *w != id);
        self.watchers.len() != before
    }

    pub fn watcher_count(&self) -> usize {
        self.watchers.len()
    }

    /// Mark the document as changed; watchers hear about it on the next flush
    pub fn changed(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Broadcast to every watcher now, regardless of the dirty flag
    pub fn notify_watchers(&mut self) {
        self.dirty = false;
        for (_, watcher) in self.watchers.iter_mut() {
            watcher();
        }
    }

    /// Broadcast only if something changed since the last broadcast
    pub fn flush(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        self.notify_watchers();
        true
    }
}
