//! Read contracts for account liveness and delegation sessions.
//!
//! Implementations live with the storage they talk to; the in-memory versions
//! here back dev runs and tests.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use atrium_core::{DelegationSessionId, StaffId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: StaffId,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationSession {
    pub id: DelegationSessionId,
    pub ended_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
}

impl DelegationSession {
    /// Open and not yet expired at `now`.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.ended_at.is_none() && self.expires_at > now
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("lookup backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn find_by_id(&self, id: StaffId) -> Result<Option<AccountRecord>, LookupError>;
}

#[async_trait]
pub trait DelegationSessionStore: Send + Sync {
    async fn find_by_id(
        &self,
        id: DelegationSessionId,
    ) -> Result<Option<DelegationSession>, LookupError>;
}

/// In-memory account directory for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryAccountDirectory {
    inner: RwLock<HashMap<StaffId, AccountRecord>>,
}

impl InMemoryAccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<StaffId, AccountRecord>> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<StaffId, AccountRecord>> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn upsert(&self, record: AccountRecord) {
        self.write().insert(record.id, record);
    }

    pub fn set_active(&self, id: StaffId, is_active: bool) {
        self.upsert(AccountRecord { id, is_active });
    }

    pub fn remove(&self, id: StaffId) {
        self.write().remove(&id);
    }
}

#[async_trait]
impl AccountDirectory for InMemoryAccountDirectory {
    async fn find_by_id(&self, id: StaffId) -> Result<Option<AccountRecord>, LookupError> {
        Ok(self.read().get(&id).cloned())
    }
}

/// In-memory delegation session store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryDelegationSessionStore {
    inner: RwLock<HashMap<DelegationSessionId, DelegationSession>>,
}

impl InMemoryDelegationSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<DelegationSessionId, DelegationSession>> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<DelegationSessionId, DelegationSession>> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn upsert(&self, session: DelegationSession) {
        self.write().insert(session.id, session);
    }

    /// Mark a session as manually ended.
    pub fn end(&self, id: DelegationSessionId, at: DateTime<Utc>) {
        if let Some(session) = self.write().get_mut(&id) {
            session.ended_at = Some(at);
        }
    }
}

#[async_trait]
impl DelegationSessionStore for InMemoryDelegationSessionStore {
    async fn find_by_id(
        &self,
        id: DelegationSessionId,
    ) -> Result<Option<DelegationSession>, LookupError> {
        Ok(self.read().get(&id).cloned())
    }
}
