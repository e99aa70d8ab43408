use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use campus_core::{DomainError, EntityId, PrincipalId, TenantId};

use crate::{
    permissions::Permission,
    principal::{Principal, PrincipalError},
    roles::Role,
    store::LinkedEntityResolver,
};

/// Verified session claims (transport-agnostic).
///
/// This is the minimal set of claims the campus backend expects once a
/// session token has been decoded/verified by whatever transport/security
/// layer is in use. Signature verification is intentionally outside this
/// crate; what happens here is deterministic claim validation and assembly
/// of the per-request [`Principal`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject / principal identifier.
    pub sub: PrincipalId,

    pub role: Role,

    /// Tenant context for the session. Absent only for `super_admin`.
    pub tenant_id: Option<TenantId>,

    /// Explicit permission grants (e.g. `manage_students`).
    pub permissions: Vec<Permission>,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum ClaimsError {
    #[error("session has expired")]
    Expired,

    #[error("session not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid session time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error(transparent)]
    Malformed(#[from] PrincipalError),

    #[error("linked-entity resolution failed: {0}")]
    Resolution(#[from] DomainError),
}

/// Deterministically validate session claims.
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), ClaimsError> {
    if claims.expires_at <= claims.issued_at {
        return Err(ClaimsError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(ClaimsError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(ClaimsError::Expired);
    }
    Ok(())
}

/// Build the per-request [`Principal`] from verified claims.
///
/// This is the one place a lookup happens during principal assembly: for
/// ownership-scoped roles the resolver is asked once for the principal's
/// linked entities (a parent's children, a teacher's sections). A student is
/// always linked to their own record in addition to whatever the resolver
/// returns. The result is valid for this request only.
pub fn principal_from_claims<R>(
    claims: &SessionClaims,
    now: DateTime<Utc>,
    resolver: &R,
) -> Result<Principal, ClaimsError>
where
    R: LinkedEntityResolver + ?Sized,
{
    validate_claims(claims, now)?;

    let mut principal = Principal::new(claims.sub, claims.role, claims.tenant_id)?
        .with_permissions(claims.permissions.iter().cloned());

    if claims.role.is_ownership_scoped() {
        let linked = resolver.linked_entities(claims.sub, claims.role)?;
        principal = principal.with_linked_entities(linked);

        if claims.role == Role::Student {
            principal = principal.with_linked_entities([EntityId::from(claims.sub)]);
        }
    }

    Ok(principal)
}
