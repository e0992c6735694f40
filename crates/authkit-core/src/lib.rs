#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod credential;
mod error;
mod identity;
mod service;
mod store;
mod token;

pub use crate::config::AuthConfig;
pub use crate::credential::CredentialHasher;
pub use crate::error::{AuthError, BoxedError, ConflictField, FieldViolation, Result};
pub use crate::identity::{Identity, IdentityProfile, NewIdentity, normalize_email};
pub use crate::service::{AuthService, AuthSession, LoginRequest, RegisterRequest};
pub use crate::store::{IdentityStore, MemoryStore, StoreError};
pub use crate::token::{SessionClaims, TokenSigner};
