//! Source of "document loaded" notifications.

use std::fmt;
use std::rc::Rc;

use super::accessor::SharedDocument;
use crate::events::{ListenerId, Listeners};

/// Payload of a "document loaded" notification.
pub struct DocumentLoaded<D> {
    pub load_id: String,
    pub document: SharedDocument<D>,
}

impl<D> Clone for DocumentLoaded<D> {
    fn clone(&self) -> Self {
        Self {
            load_id: self.load_id.clone(),
            document: Rc::clone(&self.document),
        }
    }
}

impl<D> fmt::Debug for DocumentLoaded<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentLoaded")
            .field("load_id", &self.load_id)
            .finish_non_exhaustive()
    }
}

/// Tracks the single active document and notifies subscribers when a new
/// one is loaded.
pub struct ActiveDocumentTracker<D> {
    current: Option<DocumentLoaded<D>>,
    listeners: Listeners<DocumentLoaded<D>>,
}

impl<D: 'static> ActiveDocumentTracker<D> {
    pub fn new() -> Self {
        Self {
            current: None,
            listeners: Listeners::new(),
        }
    }

    /// Makes `document` the active document and notifies every subscriber.
    pub fn load(&mut self, load_id: impl Into<String>, document: SharedDocument<D>) {
        let event = DocumentLoaded {
            load_id: load_id.into(),
            document,
        };
        tracing::debug!(load_id = %event.load_id, subscribers = self.listeners.len(), "document loaded");
        self.current = Some(event.clone());
        self.listeners.dispatch(&event);
    }

    /// Registers a callback. If a document is already active the callback
    /// receives it immediately.
    pub fn subscribe<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&DocumentLoaded<D>) + 'static,
    {
        let id = self.listeners.add(callback);
        if let Some(ref current) = self.current {
            self.listeners.dispatch_to(id, current);
        }
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// The currently active document, if any.
    pub fn current_document(&self) -> Option<SharedDocument<D>> {
        self.current.as_ref().map(|event| Rc::clone(&event.document))
    }

    /// Load id of the currently active document.
    pub fn current_load_id(&self) -> Option<&str> {
        self.current.as_ref().map(|event| event.load_id.as_str())
    }
}

impl<D: 'static> Default for ActiveDocumentTracker<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{share, TreeDocument};
    use std::cell::RefCell;

    #[test]
    fn test_load_notifies_subscribers() {
        let mut tracker = ActiveDocumentTracker::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s = Rc::clone(&seen);
        tracker.subscribe(move |event: &DocumentLoaded<TreeDocument>| {
            s.borrow_mut().push(event.load_id.clone())
        });

        tracker.load("first", share(TreeDocument::new(1, "a")));
        tracker.load("second", share(TreeDocument::new(2, "b")));

        assert_eq!(*seen.borrow(), vec!["first", "second"]);
        assert_eq!(tracker.current_load_id(), Some("second"));
    }

    #[test]
    fn test_late_subscriber_receives_current() {
        let mut tracker = ActiveDocumentTracker::new();
        let doc = share(TreeDocument::new(1, "a"));
        tracker.load("only", Rc::clone(&doc));

        let seen = Rc::new(RefCell::new(None));
        let s = Rc::clone(&seen);
        tracker.subscribe(move |event: &DocumentLoaded<TreeDocument>| {
            *s.borrow_mut() = Some(Rc::clone(&event.document))
        });

        let received = seen.borrow().clone().unwrap();
        assert!(Rc::ptr_eq(&received, &doc));
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let mut tracker: ActiveDocumentTracker<TreeDocument> = ActiveDocumentTracker::new();
        let count = Rc::new(RefCell::new(0));

        let c = Rc::clone(&count);
        let id = tracker.subscribe(move |_| *c.borrow_mut() += 1);
        tracker.load("a", share(TreeDocument::new(1, "a")));
        assert!(tracker.unsubscribe(id));
        tracker.load("b", share(TreeDocument::new(1, "b")));

        assert_eq!(*count.borrow(), 1);
    }
}
