//! Token revocation (logout, password change).
//!
//! Tokens are keyed by their SHA-256 hex digest; the raw token is never stored.
//! An entry counts as absent once `now > expires_at_ms`, whether or not it has
//! been physically removed yet.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

use atrium_core::{Clock, SystemClock};

/// Matches the access-token lifetime, so a revoked token cannot outlive its entry.
pub const DEFAULT_REVOCATION_TTL: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevocationEntry {
    pub token_hash: String,
    pub expires_at_ms: i64,
}

impl RevocationEntry {
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms > self.expires_at_ms
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RevocationError {
    #[error("revocation backend unavailable: {0}")]
    Backend(String),
}

/// Revocation list contract.
///
/// The in-process store is only correct for a single-instance deployment; a
/// shared backend can be swapped in behind the same contract.
pub trait RevocationStore: Send + Sync {
    /// Mark `token` revoked for `ttl`. Revoking again overwrites the expiry.
    fn revoke(&self, token: &str, ttl: Duration) -> Result<(), RevocationError>;

    /// `true` while a live entry exists for `token`.
    fn is_revoked(&self, token: &str) -> bool;

    /// Remove every expired entry and return how many were removed.
    fn sweep(&self) -> usize;

    fn revoke_default(&self, token: &str) -> Result<(), RevocationError> {
        self.revoke(token, DEFAULT_REVOCATION_TTL)
    }
}

impl<S> RevocationStore for Arc<S>
where
    S: RevocationStore + ?Sized,
{
    fn revoke(&self, token: &str, ttl: Duration) -> Result<(), RevocationError> {
        (**self).revoke(token, ttl)
    }

    fn is_revoked(&self, token: &str) -> bool {
        (**self).is_revoked(token)
    }

    fn sweep(&self) -> usize {
        (**self).sweep()
    }
}

/// SHA-256 of the raw token, lowercase hex.
///
/// Unsalted: two tokens colliding on SHA-256 would share an entry.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// In-process revocation list guarded by a single mutex.
///
/// Revoke, lookup-with-lazy-eviction and sweep all take the same lock, and the
/// lock is never held across anything but map access.
pub struct InMemoryRevocationStore {
    entries: Mutex<HashMap<String, RevocationEntry>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Number of physically stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn now_ms(&self) -> i64 {
        self.clock.now().timestamp_millis()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, RevocationEntry>> {
        // A panic elsewhere must not disable revocation checks.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for InMemoryRevocationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for InMemoryRevocationStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InMemoryRevocationStore")
            .field("entries", &self.len())
            .finish()
    }
}

impl RevocationStore for InMemoryRevocationStore {
    fn revoke(&self, token: &str, ttl: Duration) -> Result<(), RevocationError> {
        let token_hash = hash_token(token);
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let expires_at_ms = self.now_ms().saturating_add(ttl_ms);

        self.lock().insert(
            token_hash.clone(),
            RevocationEntry {
                token_hash,
                expires_at_ms,
            },
        );
        Ok(())
    }

    fn is_revoked(&self, token: &str) -> bool {
        let token_hash = hash_token(token);
        let now_ms = self.now_ms();

        let mut entries = self.lock();
        match entries.get(&token_hash) {
            None => false,
            Some(entry) if entry.is_expired_at(now_ms) => {
                entries.remove(&token_hash);
                false
            }
            Some(_) => true,
        }
    }

    fn sweep(&self) -> usize {
        let now_ms = self.now_ms();

        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now_ms));
        let removed = before - entries.len();

        if removed > 0 {
            debug!(removed, remaining = entries.len(), "revocation sweep");
        }
        removed
    }
}
