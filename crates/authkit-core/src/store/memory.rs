//! In-process identity store.
//!
//! Backs tests and single-node deployments. Uniqueness is enforced under a
//! single write lock, so the check-then-insert race the service cannot avoid
//! resolves here: one winner, one typed conflict.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use jiff::Timestamp;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{IdentityStore, StoreError};
use crate::identity::{Identity, NewIdentity};

/// Tracing target for memory store operations.
const TRACING_TARGET: &str = "authkit_core::store::memory";

#[derive(Default)]
struct MemoryStoreInner {
    identities: HashMap<Uuid, Identity>,
    by_email: HashMap<String, Uuid>,
    by_username: HashMap<String, Uuid>,
}

/// In-memory [`IdentityStore`] implementation.
///
/// Cheap to clone; all clones share the same state. The store can be
/// switched into an unavailable mode so callers' `StoreUnavailable` handling
/// is exercisable without a real outage.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
    available: Arc<AtomicBool>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryStoreInner::default())),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Toggles availability.
    ///
    /// While unavailable every operation fails with
    /// [`StoreError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Returns the number of stored identities.
    pub async fn len(&self) -> usize {
        self.inner.read().await.identities.len()
    }

    /// Returns `true` if no identities are stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::unavailable(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "memory store marked unavailable",
            )))
        }
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("available", &self.available.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        self.check_available()?;

        let inner = self.inner.read().await;
        let identity = inner
            .by_email
            .get(email)
            .and_then(|id| inner.identities.get(id))
            .cloned();

        Ok(identity)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, StoreError> {
        self.check_available()?;

        let inner = self.inner.read().await;
        let identity = inner
            .by_username
            .get(username)
            .and_then(|id| inner.identities.get(id))
            .cloned();

        Ok(identity)
    }

    async fn create(&self, new_identity: NewIdentity) -> Result<Identity, StoreError> {
        use crate::error::ConflictField;

        self.check_available()?;

        // Uniqueness checks and the insert happen under one write lock, so
        // concurrent creates serialize here.
        let mut inner = self.inner.write().await;

        if inner.by_email.contains_key(&new_identity.email) {
            return Err(StoreError::Conflict(ConflictField::Email));
        }

        if inner.by_username.contains_key(&new_identity.username) {
            return Err(StoreError::Conflict(ConflictField::Username));
        }

        let identity = Identity {
            id: Uuid::now_v7(),
            email: new_identity.email,
            username: new_identity.username,
            password_hash: new_identity.password_hash,
            created_at: Timestamp::now(),
        };

        inner.by_email.insert(identity.email.clone(), identity.id);
        inner
            .by_username
            .insert(identity.username.clone(), identity.id);
        inner.identities.insert(identity.id, identity.clone());

        tracing::debug!(
            target: TRACING_TARGET,
            id = %identity.id,
            username = %identity.username,
            "identity created"
        );

        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_identity(email: &str, username: &str) -> NewIdentity {
        NewIdentity {
            email: email.to_owned(),
            username: username.to_owned(),
            password_hash: "$argon2id$test".to_owned(),
        }
    }

    #[tokio::test]
    async fn create_then_find() -> anyhow::Result<()> {
        let store = MemoryStore::new();

        let created = store.create(new_identity("a@x.com", "abc")).await?;
        assert_eq!(
            store.find_by_email("a@x.com").await?.map(|i| i.id),
            Some(created.id)
        );
        assert_eq!(
            store.find_by_username("abc").await?.map(|i| i.id),
            Some(created.id)
        );
        assert!(store.find_by_email("b@x.com").await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() -> anyhow::Result<()> {
        let store = MemoryStore::new();

        store.create(new_identity("a@x.com", "abc")).await?;
        let error = store
            .create(new_identity("a@x.com", "other"))
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            StoreError::Conflict(crate::error::ConflictField::Email)
        ));
        assert_eq!(store.len().await, 1);

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() -> anyhow::Result<()> {
        let store = MemoryStore::new();

        store.create(new_identity("a@x.com", "abc")).await?;
        let error = store
            .create(new_identity("b@x.com", "abc"))
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            StoreError::Conflict(crate::error::ConflictField::Username)
        ));

        Ok(())
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_operation() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        store.set_available(false);

        assert!(matches!(
            store.find_by_email("a@x.com").await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store.create(new_identity("a@x.com", "abc")).await,
            Err(StoreError::Unavailable(_))
        ));

        store.set_available(true);
        assert!(store.find_by_email("a@x.com").await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_creates_yield_one_winner() -> anyhow::Result<()> {
        let store = MemoryStore::new();

        let (first, second) = tokio::join!(
            store.create(new_identity("a@x.com", "abc")),
            store.create(new_identity("a@x.com", "abd")),
        );

        let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert_eq!(store.len().await, 1);

        Ok(())
    }
}
