use smol::channel::{self, Receiver, Sender, TryRecvError};

use helm_shared::SceneOperation;

/// The engine side of a scene load. Implementations start loading and hand
/// back a handle which completes once the scene is in place.
pub trait SceneLoader {
    fn load(&mut self, scene_name: &str, operation: SceneOperation) -> LoadHandle;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadStatus {
    Pending,
    Complete,
    /// The loader dropped its completer without completing
    Abandoned,
}

/// Polled, never awaited, so a load never blocks the update loop
pub struct LoadHandle {
    receiver: Receiver<()>,
}

impl LoadHandle {
    /// A load still in progress, finished through the returned completer
    pub fn pending() -> (LoadCompleter, LoadHandle) {
        let (sender, receiver) = channel::bounded(1);
        (LoadCompleter { sender }, LoadHandle { receiver })
    }

    /// A load which already finished
    pub fn completed() -> LoadHandle {
        let (completer, handle) = Self::pending();
        completer.complete();
        handle
    }

    pub fn poll(&mut self) -> LoadStatus {
        match self.receiver.try_recv() {
            Ok(()) => LoadStatus::Complete,
            Err(TryRecvError::Empty) => LoadStatus::Pending,
            Err(TryRecvError::Closed) => LoadStatus::Abandoned,
        }
    }
}

pub struct LoadCompleter {
    sender: Sender<()>,
}

impl LoadCompleter {
    pub fn complete(self) {
        // a full slot means it was completed already
        let _ = self.sender.try_send(());
    }
}

/// Loader for worlds that swap scenes synchronously
#[derive(Default)]
pub struct ImmediateSceneLoader;

impl SceneLoader for ImmediateSceneLoader {
    fn load(&mut self, _scene_name: &str, _operation: SceneOperation) -> LoadHandle {
        LoadHandle::completed()
    }
}
