use serde::{Deserialize, Serialize};

use atrium_core::{BusinessId, DelegationSessionId, StaffId};

use crate::{Claims, Role};

/// Who the request is acting as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub subject_id: StaffId,
    pub email: String,
    pub business_id: BusinessId,
    pub role: Role,
}

/// A "view-as" grant: the session id plus the context the staff member came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    pub delegation_session_id: DelegationSessionId,
    pub original_business_id: BusinessId,
    pub original_role: Role,
}

/// A fully resolved principal for one request.
///
/// Built fresh by the resolver on every request and never cached. The
/// `Delegated` variant only exists once the delegation session has been checked
/// against the session store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Direct(Identity),
    Delegated {
        identity: Identity,
        delegation: Delegation,
    },
}

impl Principal {
    pub(crate) fn from_claims(claims: &Claims, delegation: Option<Delegation>) -> Self {
        let identity = Identity {
            subject_id: claims.sub,
            email: claims.email.clone(),
            business_id: claims.business_id,
            role: claims.role.clone(),
        };

        match delegation {
            Some(delegation) => Principal::Delegated {
                identity,
                delegation,
            },
            None => Principal::Direct(identity),
        }
    }

    pub fn identity(&self) -> &Identity {
        match self {
            Principal::Direct(identity) => identity,
            Principal::Delegated { identity, .. } => identity,
        }
    }

    pub fn subject_id(&self) -> StaffId {
        self.identity().subject_id
    }

    /// Staff accounts are the token subjects, so this is the subject id.
    pub fn staff_id(&self) -> StaffId {
        self.identity().subject_id
    }

    pub fn email(&self) -> &str {
        &self.identity().email
    }

    pub fn business_id(&self) -> BusinessId {
        self.identity().business_id
    }

    pub fn role(&self) -> &Role {
        &self.identity().role
    }

    pub fn delegation(&self) -> Option<&Delegation> {
        match self {
            Principal::Direct(_) => None,
            Principal::Delegated { delegation, .. } => Some(delegation),
        }
    }

    pub fn is_delegated(&self) -> bool {
        matches!(self, Principal::Delegated { .. })
    }
}
