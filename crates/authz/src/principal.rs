use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use campus_core::{EntityId, PrincipalId, TenantId};

use crate::{permissions::Permission, roles::Role};

/// A fully resolved principal for authorization decisions.
///
/// Immutable per request: it is rebuilt from the verified session on every
/// call (see [`crate::claims`]) and discarded at request end. Construction is
/// where malformed input fails — a tenant-requiring role without a tenant id
/// is a programming error upstream and never reaches the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    id: PrincipalId,
    role: Role,
    tenant_id: Option<TenantId>,
    permissions: HashSet<Permission>,

    /// Entities this principal is personally tied to: a parent's children,
    /// a teacher's class sections, a student's own record. Required for
    /// ownership checks; resolved once per request.
    linked_entity_ids: HashSet<EntityId>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrincipalError {
    #[error("role '{0}' requires a tenant id")]
    MissingTenant(Role),

    #[error("super_admin principals must not carry a tenant id")]
    UnexpectedTenant,
}

impl Principal {
    /// Construct a tenant-scoped principal. Fails fast for role/tenant
    /// combinations the evaluator must never see.
    pub fn new(
        id: PrincipalId,
        role: Role,
        tenant_id: Option<TenantId>,
    ) -> Result<Self, PrincipalError> {
        match (role.requires_tenant(), tenant_id) {
            (true, None) => Err(PrincipalError::MissingTenant(role)),
            (false, Some(_)) => Err(PrincipalError::UnexpectedTenant),
            _ => Ok(Self {
                id,
                role,
                tenant_id,
                permissions: HashSet::new(),
                linked_entity_ids: HashSet::new(),
            }),
        }
    }

    /// Convenience constructor for the platform operator role.
    pub fn super_admin(id: PrincipalId) -> Self {
        Self {
            id,
            role: Role::SuperAdmin,
            tenant_id: None,
            permissions: HashSet::new(),
            linked_entity_ids: HashSet::new(),
        }
    }

    pub fn with_permissions(mut self, permissions: impl IntoIterator<Item = Permission>) -> Self {
        self.permissions.extend(permissions);
        self
    }

    pub fn with_linked_entities(mut self, entities: impl IntoIterator<Item = EntityId>) -> Self {
        self.linked_entity_ids.extend(entities);
        self
    }

    pub fn id(&self) -> PrincipalId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// `None` only for `super_admin`.
    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn permissions(&self) -> &HashSet<Permission> {
        &self.permissions
    }

    pub fn has_permission(&self, permission: &Permission) -> bool {
        self.permissions.contains(permission)
    }

    pub fn linked_entity_ids(&self) -> &HashSet<EntityId> {
        &self.linked_entity_ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_scoped_role_requires_tenant() {
        let err = Principal::new(PrincipalId::new(), Role::Teacher, None).unwrap_err();
        assert_eq!(err, PrincipalError::MissingTenant(Role::Teacher));
    }

    #[test]
    fn super_admin_must_not_carry_tenant() {
        let err =
            Principal::new(PrincipalId::new(), Role::SuperAdmin, Some(TenantId::new())).unwrap_err();
        assert_eq!(err, PrincipalError::UnexpectedTenant);

        let ok = Principal::super_admin(PrincipalId::new());
        assert_eq!(ok.tenant_id(), None);
    }

    #[test]
    fn builder_accumulates_permissions_and_links() {
        let child = EntityId::new();
        let principal = Principal::new(PrincipalId::new(), Role::Parent, Some(TenantId::new()))
            .unwrap()
            .with_permissions([Permission::new("download_admit_cards")])
            .with_linked_entities([child]);

        assert!(principal.has_permission(&Permission::new("download_admit_cards")));
        assert!(principal.linked_entity_ids().contains(&child));
    }
}
