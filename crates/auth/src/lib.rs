//! `atrium-auth`: session validation boundary (zero-trust, fail-closed).
//!
//! This crate is decoupled from HTTP and storage. Transport hands in
//! [`RequestCredentials`]; persistence is reached through the
//! [`AccountDirectory`] and [`DelegationSessionStore`] contracts.

pub mod claims;
pub mod config;
pub mod directory;
pub mod extract;
pub mod principal;
pub mod resolver;
pub mod revocation;
pub mod roles;
pub mod sweeper;

pub use claims::{Claims, Hs256TokenVerifier, TokenVerifier, VerificationError};
pub use config::{AuthConfig, ConfigError};
pub use directory::{
    AccountDirectory, AccountRecord, DelegationSession, DelegationSessionStore,
    InMemoryAccountDirectory, InMemoryDelegationSessionStore, LookupError,
};
pub use extract::{RequestCredentials, TokenExtractor, DEFAULT_SESSION_COOKIE};
pub use principal::{Delegation, Identity, Principal};
pub use resolver::{PrincipalResolver, Rejection, UnauthorizedReason};
pub use revocation::{
    hash_token, InMemoryRevocationStore, RevocationEntry, RevocationError, RevocationStore,
    DEFAULT_REVOCATION_TTL,
};
pub use roles::Role;
pub use sweeper::{RevocationSweeper, SweeperHandle, DEFAULT_SWEEP_INTERVAL};
