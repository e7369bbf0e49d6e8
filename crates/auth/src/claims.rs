use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use atrium_core::{BusinessId, StaffId};

use crate::{ConfigError, Delegation, Role};

/// Access-token claims (transport-agnostic).
///
/// This is what the token verifier yields once signature and expiry have been
/// checked. `delegation` is present only for "view-as" tokens and is not yet
/// trusted: the resolver still has to check the session it points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the staff account the token was issued to.
    pub sub: StaffId,

    pub email: String,

    /// Business the token is scoped to (the target business when delegated).
    pub business_id: BusinessId,

    pub role: Role,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegation: Option<Delegation>,

    /// Issued-at, seconds since the epoch.
    pub iat: i64,

    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VerificationError {
    #[error("no credentials presented")]
    MissingToken,

    #[error("token has expired")]
    Expired,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token is malformed")]
    Malformed,
}

/// Decodes a raw token into claims, checking signature and standard expiry.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Claims, VerificationError>;
}

/// HS256 verifier backed by `jsonwebtoken`.
///
/// Only HS256 is accepted; tokens with any other `alg` header are rejected as
/// having an invalid signature.
pub struct Hs256TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256TokenVerifier {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, ConfigError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(ConfigError::MissingSigningSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            key: DecodingKey::from_secret(secret),
            validation,
        })
    }
}

impl TokenVerifier for Hs256TokenVerifier {
    fn verify(&self, token: &str) -> Result<Claims, VerificationError> {
        jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => VerificationError::Expired,
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    VerificationError::InvalidSignature
                }
                _ => VerificationError::Malformed,
            })
    }
}

impl core::fmt::Debug for Hs256TokenVerifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256TokenVerifier").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header};

    use super::*;

    const SECRET: &str = "unit-test-secret";

    fn claims(exp_offset_secs: i64) -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            sub: StaffId::new(),
            email: "ops@example.com".to_string(),
            business_id: BusinessId::new(),
            role: Role::new("manager"),
            delegation: None,
            iat: now,
            exp: now + exp_offset_secs,
        }
    }

    fn mint(claims: &Claims, secret: &str, alg: Algorithm) -> String {
        jsonwebtoken::encode(
            &Header::new(alg),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_yields_claims() {
        let verifier = Hs256TokenVerifier::new(SECRET).unwrap();
        let claims = claims(600);
        let token = mint(&claims, SECRET, Algorithm::HS256);

        assert_eq!(verifier.verify(&token).unwrap(), claims);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let verifier = Hs256TokenVerifier::new(SECRET).unwrap();
        let token = mint(&claims(600), "another-secret", Algorithm::HS256);

        assert_eq!(
            verifier.verify(&token),
            Err(VerificationError::InvalidSignature)
        );
    }

    #[test]
    fn other_algorithms_are_rejected() {
        let verifier = Hs256TokenVerifier::new(SECRET).unwrap();
        let token = mint(&claims(600), SECRET, Algorithm::HS512);

        assert_eq!(
            verifier.verify(&token),
            Err(VerificationError::InvalidSignature)
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let verifier = Hs256TokenVerifier::new(SECRET).unwrap();
        let token = mint(&claims(-3600), SECRET, Algorithm::HS256);

        assert_eq!(verifier.verify(&token), Err(VerificationError::Expired));
    }

    #[test]
    fn garbage_is_malformed() {
        let verifier = Hs256TokenVerifier::new(SECRET).unwrap();
        assert_eq!(
            verifier.verify("not-a-jwt"),
            Err(VerificationError::Malformed)
        );
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(
            Hs256TokenVerifier::new(""),
            Err(ConfigError::MissingSigningSecret)
        ));
    }

    #[test]
    fn delegation_claims_roundtrip_through_json() {
        let mut claims = claims(600);
        claims.delegation = Some(Delegation {
            delegation_session_id: atrium_core::DelegationSessionId::new(),
            original_business_id: BusinessId::new(),
            original_role: Role::new("owner"),
        });

        let json = serde_json::to_value(&claims).unwrap();
        assert!(json.get("delegation").is_some());

        let back: Claims = serde_json::from_value(json).unwrap();
        assert_eq!(back, claims);
    }
}
