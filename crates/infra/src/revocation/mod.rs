//! Shared revocation backends for multi-instance deployments.
//!
//! The in-process store in `atrium-auth` only sees revocations made by its own
//! process; these keep the same contract across instances.

#[cfg(feature = "redis")]
mod redis;

#[cfg(feature = "redis")]
pub use self::redis::RedisRevocationStore;
