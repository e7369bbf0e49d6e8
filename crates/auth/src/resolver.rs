//! Principal resolution pipeline.
//!
//! One pass, in order, fail-closed:
//! extract → verify → revocation → account liveness → delegation → principal.
//!
//! The revocation check runs before any lookup so a revoked token never costs a
//! database round-trip. Lookup errors are treated exactly like "not found".

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use atrium_core::{Clock, StaffId, SystemClock};

use crate::{
    AccountDirectory, Claims, Delegation, DelegationSessionStore, Principal, RequestCredentials,
    RevocationStore, TokenExtractor, TokenVerifier, VerificationError,
};

/// Why an otherwise well-formed token was refused.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum UnauthorizedReason {
    #[error("token has been revoked")]
    Revoked,

    /// The account was deleted or deactivated; callers cannot tell which.
    #[error("account is deactivated")]
    AccountDeactivated,

    /// The view-as session is missing, ended or expired; callers cannot tell which.
    #[error("view-as session has expired")]
    DelegationExpired,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("unauthorized: {0}")]
    Unauthorized(UnauthorizedReason),

    #[error("invalid token: {0}")]
    InvalidToken(#[from] VerificationError),
}

impl Rejection {
    /// Message safe to return to the caller.
    ///
    /// Verification failures all collapse into one generic message.
    pub fn message(&self) -> &'static str {
        match self {
            Rejection::Unauthorized(UnauthorizedReason::Revoked) => "Token has been revoked",
            Rejection::Unauthorized(UnauthorizedReason::AccountDeactivated) => {
                "Account is deactivated"
            }
            Rejection::Unauthorized(UnauthorizedReason::DelegationExpired) => {
                "View-as session has expired"
            }
            Rejection::InvalidToken(_) => "Unauthorized",
        }
    }
}

impl From<UnauthorizedReason> for Rejection {
    fn from(value: UnauthorizedReason) -> Self {
        Rejection::Unauthorized(value)
    }
}

/// Resolves the authenticated [`Principal`] for a request.
pub struct PrincipalResolver {
    extractor: TokenExtractor,
    verifier: Arc<dyn TokenVerifier>,
    revocations: Arc<dyn RevocationStore>,
    accounts: Arc<dyn AccountDirectory>,
    delegations: Arc<dyn DelegationSessionStore>,
    clock: Arc<dyn Clock>,
}

impl PrincipalResolver {
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        revocations: Arc<dyn RevocationStore>,
        accounts: Arc<dyn AccountDirectory>,
        delegations: Arc<dyn DelegationSessionStore>,
    ) -> Self {
        Self {
            extractor: TokenExtractor::default(),
            verifier,
            revocations,
            accounts,
            delegations,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_extractor(mut self, extractor: TokenExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn extractor(&self) -> &TokenExtractor {
        &self.extractor
    }

    /// Full pipeline for one request.
    pub async fn resolve(&self, credentials: &RequestCredentials) -> Result<Principal, Rejection> {
        let Some(token) = self.extractor.extract(credentials) else {
            debug!("no credentials on request");
            return Err(VerificationError::MissingToken.into());
        };

        self.resolve_token(token).await
    }

    /// Pipeline for a token that was already extracted by the caller.
    pub async fn resolve_token(&self, token: &str) -> Result<Principal, Rejection> {
        let claims = self.verifier.verify(token).map_err(|e| {
            debug!(error = %e, "token verification failed");
            Rejection::InvalidToken(e)
        })?;

        self.validate(Some(token), &claims).await
    }

    /// Post-verification stages, for claims already decoded upstream.
    ///
    /// Without a raw token the revocation check is skipped; account liveness and
    /// delegation checks still run.
    pub async fn validate(
        &self,
        token: Option<&str>,
        claims: &Claims,
    ) -> Result<Principal, Rejection> {
        if let Some(token) = token {
            if self.revocations.is_revoked(token) {
                return Err(reject(claims.sub, UnauthorizedReason::Revoked));
            }
        }

        self.ensure_account_active(claims.sub).await?;

        let delegation = match &claims.delegation {
            Some(delegation) => Some(self.ensure_delegation_live(claims.sub, delegation).await?),
            None => None,
        };

        Ok(Principal::from_claims(claims, delegation))
    }

    async fn ensure_account_active(&self, subject: StaffId) -> Result<(), Rejection> {
        match self.accounts.find_by_id(subject).await {
            Ok(Some(account)) if account.is_active => Ok(()),
            Ok(_) => Err(reject(subject, UnauthorizedReason::AccountDeactivated)),
            Err(e) => {
                warn!(subject = %subject, error = %e, "account lookup failed");
                Err(reject(subject, UnauthorizedReason::AccountDeactivated))
            }
        }
    }

    async fn ensure_delegation_live(
        &self,
        subject: StaffId,
        delegation: &Delegation,
    ) -> Result<Delegation, Rejection> {
        let session_id = delegation.delegation_session_id;

        let session = match self.delegations.find_by_id(session_id).await {
            Ok(session) => session,
            Err(e) => {
                warn!(subject = %subject, session = %session_id, error = %e, "delegation lookup failed");
                None
            }
        };

        let now = self.clock.now();
        match session {
            Some(session) if session.is_live_at(now) => Ok(delegation.clone()),
            _ => Err(reject(subject, UnauthorizedReason::DelegationExpired)),
        }
    }
}

impl core::fmt::Debug for PrincipalResolver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PrincipalResolver")
            .field("extractor", &self.extractor)
            .finish_non_exhaustive()
    }
}

fn reject(subject: StaffId, reason: UnauthorizedReason) -> Rejection {
    warn!(subject = %subject, reason = ?reason, "request rejected");
    Rejection::Unauthorized(reason)
}
