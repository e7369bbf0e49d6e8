//! Redis-backed revocation list shared by every instance.
//!
//! Keys are `atrium:revoked_token:{sha256_hex}` set with `PX <ttl>`, so Redis
//! expires them on its own and `sweep` has nothing to do.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::error;

use atrium_auth::{hash_token, RevocationError, RevocationStore};

const DEFAULT_KEY_PREFIX: &str = "atrium:revoked_token:";

/// Bound on connect, read and write for the shared connection.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_millis(500);

pub struct RedisRevocationStore {
    client: Arc<redis::Client>,
    conn: Mutex<Option<redis::Connection>>,
    key_prefix: String,
    io_timeout: Duration,
}

impl RedisRevocationStore {
    /// Create a store for `redis_url` (e.g. "redis://localhost:6379").
    ///
    /// The connection is opened lazily on first use and reopened after errors.
    pub fn new(redis_url: impl AsRef<str>) -> Result<Self, RevocationError> {
        let client = redis::Client::open(redis_url.as_ref())
            .map_err(|e| RevocationError::Backend(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
            conn: Mutex::new(None),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            io_timeout: DEFAULT_IO_TIMEOUT,
        })
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Zero is ignored; redis rejects a zero socket timeout.
    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        if !timeout.is_zero() {
            self.io_timeout = timeout;
        }
        self
    }

    fn connect(&self) -> redis::RedisResult<redis::Connection> {
        let conn = self.client.get_connection_with_timeout(self.io_timeout)?;
        conn.set_read_timeout(Some(self.io_timeout))?;
        conn.set_write_timeout(Some(self.io_timeout))?;
        Ok(conn)
    }

    fn key_for(&self, token: &str) -> String {
        format!("{}{}", self.key_prefix, hash_token(token))
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut redis::Connection) -> redis::RedisResult<T>,
    ) -> Result<T, RevocationError> {
        let mut guard = self.conn.lock().unwrap_or_else(|e| e.into_inner());

        if guard.is_none() {
            let conn = self
                .connect()
                .map_err(|e| RevocationError::Backend(e.to_string()))?;
            *guard = Some(conn);
        }

        let Some(conn) = guard.as_mut() else {
            return Err(RevocationError::Backend("no connection".to_string()));
        };

        f(conn).map_err(|e| {
            // Drop the connection so the next call reconnects.
            *guard = None;
            RevocationError::Backend(e.to_string())
        })
    }
}

impl core::fmt::Debug for RedisRevocationStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RedisRevocationStore")
            .field("key_prefix", &self.key_prefix)
            .field("io_timeout", &self.io_timeout)
            .finish_non_exhaustive()
    }
}

impl RevocationStore for RedisRevocationStore {
    fn revoke(&self, token: &str, ttl: Duration) -> Result<(), RevocationError> {
        let key = self.key_for(token);
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);

        self.with_conn(|conn| {
            redis::cmd("SET")
                .arg(&key)
                .arg(1)
                .arg("PX")
                .arg(ttl_ms)
                .query::<()>(conn)
        })
        .inspect_err(|e| error!(error = %e, "failed to record revocation"))
    }

    fn is_revoked(&self, token: &str) -> bool {
        let key = self.key_for(token);

        match self.with_conn(|conn| redis::cmd("EXISTS").arg(&key).query::<bool>(conn)) {
            Ok(exists) => exists,
            Err(e) => {
                // Fail closed: an unreachable revocation list denies the request.
                error!(error = %e, "revocation check failed");
                true
            }
        }
    }

    fn sweep(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RedisRevocationStore {
        RedisRevocationStore::new("redis://127.0.0.1:1").unwrap()
    }

    #[test]
    fn keys_use_the_token_hash() {
        let key = store().key_for("raw-token");
        assert_eq!(key, format!("atrium:revoked_token:{}", hash_token("raw-token")));
        assert!(!key.contains("raw-token"));
    }

    #[test]
    fn custom_prefix() {
        let key = store().with_key_prefix("test:").key_for("t");
        assert!(key.starts_with("test:"));
    }

    #[test]
    fn io_timeout_defaults_and_ignores_zero() {
        assert_eq!(store().io_timeout, DEFAULT_IO_TIMEOUT);

        let store = store()
            .with_io_timeout(Duration::from_millis(50))
            .with_io_timeout(Duration::ZERO);
        assert_eq!(store.io_timeout, Duration::from_millis(50));
    }

    #[test]
    fn unreachable_backend_fails_closed_within_the_timeout() {
        // Non-routable address.
        let store = RedisRevocationStore::new("redis://10.255.255.1:6379")
            .unwrap()
            .with_io_timeout(Duration::from_millis(100));

        let started = std::time::Instant::now();
        assert!(store.is_revoked("anything"));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn unreachable_backend_fails_closed() {
        let store = store();
        assert!(store.is_revoked("anything"));
        assert!(store.revoke("anything", Duration::from_secs(1)).is_err());
        assert_eq!(store.sweep(), 0);
    }
}
