//! Join/leave vision handlers.
//!
//! Handlers are owned by the index that fires them and run synchronously
//! while its write lock is held: they must be quick and must not call back
//! into the same index.

/// Handler invoked with `(observer, observed)`.
pub trait VisionHandler<E>: Send + Sync {
    /// React to `observed` entering or leaving the focus set of `observer`.
    fn handle(&self, observer: &E, observed: &E);
}

/// Blanket implementation for closures.
impl<E, F> VisionHandler<E> for F
where
    F: Fn(&E, &E) + Send + Sync,
{
    fn handle(&self, observer: &E, observed: &E) {
        self(observer, observed);
    }
}

/// Registered join and leave handlers, invoked in registration order.
pub struct VisionEvents<E> {
    join: Vec<Box<dyn VisionHandler<E>>>,
    leave: Vec<Box<dyn VisionHandler<E>>>,
}

impl<E> VisionEvents<E> {
    /// Create an empty handler registry.
    pub fn new() -> Self {
        Self {
            join: Vec::new(),
            leave: Vec::new(),
        }
    }

    /// Register a handler for entities entering a focus set.
    pub fn register_join<H: VisionHandler<E> + 'static>(&mut self, handler: H) {
        self.join.push(Box::new(handler));
    }

    /// Register a handler for entities leaving a focus set.
    pub fn register_leave<H: VisionHandler<E> + 'static>(&mut self, handler: H) {
        self.leave.push(Box::new(handler));
    }

    pub(crate) fn emit_join(&self, observer: &E, observed: &E) {
        for handler in &self.join {
            handler.handle(observer, observed);
        }
    }

    pub(crate) fn emit_leave(&self, observer: &E, observed: &E) {
        for handler in &self.leave {
            handler.handle(observer, observed);
        }
    }

    #[cfg(test)]
    fn handler_counts(&self) -> (usize, usize) {
        (self.join.len(), self.leave.len())
    }
}

impl<E> Default for VisionEvents<E> {
    fn default() -> Self {
        Self::new()
    }
}
