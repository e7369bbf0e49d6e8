//! Infrastructure adapters for the auth boundary: Postgres lookups and the
//! shared Redis revocation list.

pub mod directory;
pub mod revocation;

pub use directory::{PgAccountDirectory, PgDelegationSessionStore};
#[cfg(feature = "redis")]
pub use revocation::RedisRevocationStore;
