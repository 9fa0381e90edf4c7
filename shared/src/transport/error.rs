use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// The receiving end of the link has been dropped
    #[error("Transport link is closed, message `{name}` was not delivered")]
    Closed { name: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecvError {
    /// The sending end of the link has been dropped
    #[error("Transport link is closed")]
    Closed,
}
