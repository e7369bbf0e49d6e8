//! Account and delegation-session lookups backed by external persistence.

mod postgres;

pub use postgres::{PgAccountDirectory, PgDelegationSessionStore};
