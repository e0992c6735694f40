//! Persistence contract for identities.
//!
//! The auth service depends on this trait only; concrete engines (Postgres,
//! an in-process map, a remote service) live behind it. The store owns the
//! uniqueness invariants: `create` must enforce them atomically at write
//! time, because the service's pre-checks are inherently racy.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::{AuthError, BoxedError, ConflictField};
use crate::identity::{Identity, NewIdentity};

/// The error type for identity store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated at write time.
    #[error("{0} is already taken")]
    Conflict(ConflictField),

    /// The store could not be reached or failed mid-operation.
    ///
    /// Retry policy belongs to the store implementation; callers observe a
    /// single, final failure.
    #[error("identity store is unavailable")]
    Unavailable(#[source] BoxedError),
}

impl StoreError {
    /// Creates an unavailable error from any source error.
    pub fn unavailable(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Box::new(source))
    }
}

impl From<StoreError> for AuthError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict(field) => AuthError::Conflict(field),
            StoreError::Unavailable(source) => AuthError::StoreUnavailable(source),
        }
    }
}

/// Persistence collaborator for identities.
///
/// Implementations must be safe to call concurrently. Lookups by email
/// expect the normalized (lowercase) form; see
/// [`normalize_email`](crate::normalize_email).
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Finds an identity by its normalized email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError>;

    /// Finds an identity by its username.
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, StoreError>;

    /// Persists a new identity, assigning its id and creation timestamp.
    ///
    /// Must enforce email and username uniqueness atomically: two concurrent
    /// creates with the same email yield exactly one success and one
    /// [`StoreError::Conflict`].
    async fn create(&self, identity: NewIdentity) -> Result<Identity, StoreError>;
}
