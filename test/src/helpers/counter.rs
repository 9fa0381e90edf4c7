use std::{cell::Cell, rc::Rc};

/// Shared count of how often a listener or handler ran
#[derive(Clone, Default)]
pub struct Counter(Rc<Cell<usize>>);

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }

    pub fn increment(&self) {
        self.0.set(self.0.get() + 1);
    }

    /// A listener which bumps this counter
    pub fn listener<A: 'static>(&self) -> impl FnMut(&A) + 'static {
        let counter = self.clone();
        move |_| counter.increment()
    }
}
