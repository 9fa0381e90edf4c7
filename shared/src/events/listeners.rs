/// Handle returned by `Listeners::add`, used to remove that listener later
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct ListenerKey(u64);

/// An ordered list of callbacks fired synchronously on the caller's thread.
///
/// Listeners run in registration order. Every invocation reaches every
/// listener present when it started.
pub struct Listeners<A> {
    listeners: Vec<(ListenerKey, Box<dyn FnMut(&A)>)>,
    next_key: u64,
}

impl<A> Default for Listeners<A> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
            next_key: 0,
        }
    }
}

impl<A> Listeners<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F: FnMut(&A) + 'static>(&mut self, listener: F) -> ListenerKey {
        let key = ListenerKey(self.next_key);
        self.next_key += 1;
        self.listeners.push((key, Box::new(listener)));
        key
    }

    pub fn remove(&mut self, key: &ListenerKey) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_key, _)| listener_key != key);
        self.listeners.len() != before
    }

    pub fn invoke(&mut self, arg: &A) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(arg);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}
