/// Coarse classification shared by every helm error type, so callers can
/// branch on the failure class without matching each variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required argument was missing or empty
    InvalidArgument,
    /// The operation is not permitted in the current state or role
    InvalidOperation,
}
