//! Postgres-backed account and delegation-session lookups.
//!
//! Both adapters are read-only and map every driver error into
//! [`LookupError`]; the resolver treats that as "not found".

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use atrium_auth::{
    AccountDirectory, AccountRecord, DelegationSession, DelegationSessionStore, LookupError,
};
use atrium_core::{DelegationSessionId, StaffId};

fn backend(e: sqlx::Error) -> LookupError {
    LookupError::Backend(e.to_string())
}

/// Staff accounts, read from the `staff` table.
#[derive(Debug, Clone)]
pub struct PgAccountDirectory {
    pool: Arc<PgPool>,
}

impl PgAccountDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl AccountDirectory for PgAccountDirectory {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: StaffId) -> Result<Option<AccountRecord>, LookupError> {
        let row = sqlx::query(
            r#"
            SELECT id, is_active
            FROM staff
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(backend)?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(AccountRecord {
            id: StaffId::from_uuid(row.try_get::<Uuid, _>("id").map_err(backend)?),
            is_active: row.try_get::<bool, _>("is_active").map_err(backend)?,
        }))
    }
}

/// "View-as" sessions, read from the `view_as_sessions` table.
#[derive(Debug, Clone)]
pub struct PgDelegationSessionStore {
    pool: Arc<PgPool>,
}

impl PgDelegationSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl DelegationSessionStore for PgDelegationSessionStore {
    #[instrument(skip(self))]
    async fn find_by_id(
        &self,
        id: DelegationSessionId,
    ) -> Result<Option<DelegationSession>, LookupError> {
        let row = sqlx::query(
            r#"
            SELECT id, ended_at, expires_at
            FROM view_as_sessions
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(backend)?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(DelegationSession {
            id: DelegationSessionId::from_uuid(row.try_get::<Uuid, _>("id").map_err(backend)?),
            ended_at: row
                .try_get::<Option<DateTime<Utc>>, _>("ended_at")
                .map_err(backend)?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(backend)?,
        }))
    }
}
