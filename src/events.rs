//! Per-instance callback registries.
//!
//! Each observable event owns one `Listeners<T>`. Dispatch is synchronous and
//! runs callbacks in registration order.

use std::fmt;

/// Handle returned on registration, used to remove the callback later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Ordered registry of callbacks receiving `&T`.
pub struct Listeners<T> {
    next_id: u64,
    entries: Vec<(ListenerId, Box<dyn FnMut(&T)>)>,
}

impl<T> Listeners<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Registers a callback at the end of the dispatch order.
    pub fn add<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&T) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(callback)));
        id
    }

    /// Removes a callback. Returns false if the handle was unknown.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Invokes every callback with `value`.
    pub fn dispatch(&mut self, value: &T) {
        for (_, callback) in self.entries.iter_mut() {
            callback(value);
        }
    }

    /// Invokes a single callback, if still registered.
    pub(crate) fn dispatch_to(&mut self, id: ListenerId, value: &T) {
        if let Some((_, callback)) = self.entries.iter_mut().find(|(entry_id, _)| *entry_id == id) {
            callback(value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_dispatch_in_registration_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::new();

        let a = Rc::clone(&seen);
        listeners.add(move |v: &i32| a.borrow_mut().push(format!("a{}", v)));
        let b = Rc::clone(&seen);
        listeners.add(move |v: &i32| b.borrow_mut().push(format!("b{}", v)));

        listeners.dispatch(&1);
        listeners.dispatch(&2);

        assert_eq!(*seen.borrow(), vec!["a1", "b1", "a2", "b2"]);
    }

    #[test]
    fn test_remove_listener() {
        let count = Rc::new(RefCell::new(0));
        let mut listeners = Listeners::new();

        let c = Rc::clone(&count);
        let id = listeners.add(move |_: &()| *c.borrow_mut() += 1);

        listeners.dispatch(&());
        assert!(listeners.remove(id));
        assert!(!listeners.remove(id));
        listeners.dispatch(&());

        assert_eq!(*count.borrow(), 1);
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_dispatch_to_single_listener() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::new();

        let a = Rc::clone(&seen);
        listeners.add(move |v: &&str| a.borrow_mut().push(format!("a:{}", v)));
        let b = Rc::clone(&seen);
        let second = listeners.add(move |v: &&str| b.borrow_mut().push(format!("b:{}", v)));

        listeners.dispatch_to(second, &"x");

        assert_eq!(*seen.borrow(), vec!["b:x"]);
        assert_eq!(listeners.len(), 2);
    }
}
