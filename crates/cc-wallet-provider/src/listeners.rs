use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Disposer returned by every handler registration.
///
/// Runs its teardown once, either through [`Subscription::dispose`] or when
/// dropped.
#[must_use = "dropping a Subscription unregisters its handler"]
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(teardown: impl FnOnce() + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    pub fn noop() -> Self {
        Self { teardown: None }
    }

    pub fn dispose(mut self) {
        self.run();
    }

    /// Keep the handler registered for the lifetime of the program.
    pub fn forget(mut self) {
        self.teardown = None;
    }

    fn run(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.teardown.is_some())
            .finish()
    }
}

type Handler<E> = Rc<dyn Fn(&E)>;

struct Slots<E> {
    next_id: u64,
    handlers: Vec<(u64, Handler<E>)>,
}

/// Handler registry shared by providers and the contract event feed.
pub struct Listeners<E> {
    slots: Rc<RefCell<Slots<E>>>,
}

impl<E> Clone for Listeners<E> {
    fn clone(&self) -> Self {
        Self {
            slots: Rc::clone(&self.slots),
        }
    }
}

impl<E: 'static> Default for Listeners<E> {
    fn default() -> Self {
        Self {
            slots: Rc::new(RefCell::new(Slots {
                next_id: 0,
                handlers: Vec::new(),
            })),
        }
    }
}

impl<E: 'static> Listeners<E> {
    pub fn add(&self, handler: Rc<dyn Fn(&E)>) -> Subscription {
        let id = {
            let mut slots = self.slots.borrow_mut();
            let id = slots.next_id;
            slots.next_id += 1;
            slots.handlers.push((id, handler));
            id
        };

        let slots: Weak<RefCell<Slots<E>>> = Rc::downgrade(&self.slots);
        Subscription::new(move || {
            if let Some(slots) = slots.upgrade() {
                slots.borrow_mut().handlers.retain(|(slot, _)| *slot != id);
            }
        })
    }

    /// Deliver `event` to every handler registered at the time of the call.
    /// Handlers may register or dispose others while running.
    pub fn emit(&self, event: &E) {
        let handlers: Vec<Handler<E>> = self
            .slots
            .borrow()
            .handlers
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();
        for handler in handlers {
            handler(event);
        }
    }

    pub fn len(&self) -> usize {
        self.slots.borrow().handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
