//! Error types for the application registry

use thiserror::Error;

/// Result type alias using RegistryError
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors surfaced by the registry core
///
/// `Forbidden` means authentication failed (missing or invalid credentials);
/// `Unauthorized` means the caller authenticated but lacks the trust level
/// or ownership the operation requires. Neither is ever downgraded before
/// reaching the caller.
///
/// The enum is `Clone` because cursor errors are sticky: once a scan fails,
/// every later call on that cursor observes the same error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Lookup miss
    #[error("application not found")]
    NotFound,

    /// Missing or invalid caller credentials
    #[error("forbidden")]
    Forbidden,

    /// Valid credentials but insufficient trust or ownership
    #[error("unauthorized")]
    Unauthorized,

    /// Corrupt stored value
    #[error("decode error: {0}")]
    Decode(String),

    /// Opaque underlying store failure
    #[error("store error: {0}")]
    Store(String),

    /// Malformed caller input
    #[error("invalid request: {0}")]
    Invalid(String),
}

impl RegistryError {
    /// True for lookup misses, used by existence checks that treat a miss
    /// as "does not exist" rather than an error
    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::NotFound)
    }
}
