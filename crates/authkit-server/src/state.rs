//! Application state and dependency injection.

use std::sync::Arc;

use authkit_core::{AuthConfig, AuthService, MemoryStore, Result as CoreResult};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct AppState {
    auth_service: AuthService,
}

impl AppState {
    /// Creates state around an already-assembled service.
    pub fn new(auth_service: AuthService) -> Self {
        Self { auth_service }
    }

    /// Initializes state from configuration with an in-process store.
    ///
    /// Returns the store handle alongside the state so callers (tests, the
    /// demo binary) keep control over it.
    ///
    /// # Errors
    ///
    /// Fails on signer or hasher misconfiguration; this aborts startup.
    pub fn with_memory_store(config: &AuthConfig) -> CoreResult<(Self, MemoryStore)> {
        let store = MemoryStore::new();
        let auth_service = AuthService::new(
            Arc::new(store.clone()),
            config.create_hasher()?,
            config.create_signer()?,
        );

        Ok((Self::new(auth_service), store))
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<AppState> for $t {
            fn from_ref(state: &AppState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(auth_service: AuthService);
