//! Collection scoping: derive a query predicate from a principal.
//!
//! Where [`crate::decide`] guards one resource, [`scope_for`] constrains a
//! list/search query *before* it reaches storage, so disallowed rows never
//! leave the store. The filter is compiled from the same [`PolicyRule`] the
//! evaluator consults, clause for clause, which is what makes the
//! filter/decide equivalence hold for every role and table.
//!
//! [`PolicyRule`]: crate::policy::PolicyRule

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use campus_core::{EntityId, TenantId};

use crate::{
    evaluate::ownership_exempt,
    policy::{Action, PolicyTable},
    principal::Principal,
    resource::{ResourceDescriptor, ResourceKind},
};

/// A conjunction of restrictions over one resource kind.
///
/// Storage adapters translate this into their native query predicate
/// (`tenant_id = ? AND owner_refs && ?`); [`ResourceFilter::matches`] is the
/// reference semantics they must agree with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceFilter {
    deny_all: bool,
    tenant_id: Option<TenantId>,
    owner_ids: Option<HashSet<EntityId>>,
}

impl ResourceFilter {
    /// The unrestricted filter (matches everything). Only ever reachable
    /// for `super_admin`, and such access is still audited.
    pub fn all() -> Self {
        Self {
            deny_all: false,
            tenant_id: None,
            owner_ids: None,
        }
    }

    /// The empty filter (matches nothing) — the Deny-equivalent scope.
    pub fn none() -> Self {
        Self {
            deny_all: true,
            tenant_id: None,
            owner_ids: None,
        }
    }

    fn and_tenant(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    fn and_owners(mut self, owner_ids: HashSet<EntityId>) -> Self {
        self.owner_ids = Some(owner_ids);
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        !self.deny_all && self.tenant_id.is_none() && self.owner_ids.is_none()
    }

    pub fn is_deny_all(&self) -> bool {
        self.deny_all
    }

    /// Tenant restriction, if any.
    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    /// Ownership restriction, if any: the resource must reference at least
    /// one of these entities.
    pub fn owner_ids(&self) -> Option<&HashSet<EntityId>> {
        self.owner_ids.as_ref()
    }

    /// Reference predicate semantics.
    pub fn matches(&self, resource: &ResourceDescriptor) -> bool {
        if self.deny_all {
            return false;
        }
        if let Some(tenant_id) = self.tenant_id {
            if resource.tenant_id() != tenant_id {
                return false;
            }
        }
        if let Some(owner_ids) = &self.owner_ids {
            if resource.owner_refs().is_disjoint(owner_ids) {
                return false;
            }
        }
        true
    }
}

/// Compile the minimal read scope for `principal` over `kind`.
///
/// - No Read rule for the role: the match-nothing filter (fail closed).
/// - `super_admin`: unrestricted.
/// - Tenant-scoped roles: `tenant_id = principal's tenant`.
/// - Ownership-gated rules additionally require an owner-ref intersection
///   with the principal's linked entities, unless the role holds the kind's
///   `manage_*` exemption.
pub fn scope_for(table: &PolicyTable, principal: &Principal, kind: ResourceKind) -> ResourceFilter {
    let Some(rule) = table.rule(principal.role(), kind, Action::Read) else {
        tracing::warn!(
            role = %principal.role(),
            kind = %kind,
            "no read policy for role/kind; scoping to nothing"
        );
        return ResourceFilter::none();
    };

    let mut filter = ResourceFilter::all();

    if rule.requires_same_tenant && !principal.role().is_super_admin() {
        match principal.tenant_id() {
            Some(tenant_id) => filter = filter.and_tenant(tenant_id),
            // Unreachable through Principal construction; still fail closed.
            None => return ResourceFilter::none(),
        }
    }

    if rule.requires_ownership && !ownership_exempt(principal, kind) {
        filter = filter.and_owners(principal.linked_entity_ids().clone());
    }

    filter
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::campus_default_rules;
    use crate::roles::Role;
    use campus_core::{PrincipalId, ResourceId};

    fn table() -> PolicyTable {
        PolicyTable::from_rules(campus_default_rules()).unwrap()
    }

    #[test]
    fn super_admin_scope_is_unrestricted() {
        let operator = Principal::super_admin(PrincipalId::new());
        let filter = scope_for(&table(), &operator, ResourceKind::School);
        assert!(filter.is_unrestricted());
    }

    #[test]
    fn accountant_scope_is_tenant_only() {
        let tenant = TenantId::new();
        let accountant =
            Principal::new(PrincipalId::new(), Role::Accountant, Some(tenant)).unwrap();

        let filter = scope_for(&table(), &accountant, ResourceKind::Fee);
        assert_eq!(filter.tenant_id(), Some(tenant));
        assert!(filter.owner_ids().is_none());

        let own = ResourceDescriptor::new(ResourceKind::Fee, tenant, ResourceId::new());
        let foreign = ResourceDescriptor::new(ResourceKind::Fee, TenantId::new(), ResourceId::new());
        assert!(filter.matches(&own));
        assert!(!filter.matches(&foreign));
    }

    #[test]
    fn parent_fee_scope_excludes_other_children() {
        let tenant = TenantId::new();
        let child1 = EntityId::new();
        let child2 = EntityId::new();
        let parent = Principal::new(PrincipalId::new(), Role::Parent, Some(tenant))
            .unwrap()
            .with_linked_entities([child1]);

        let filter = scope_for(&table(), &parent, ResourceKind::Fee);

        let own_fee = ResourceDescriptor::new(ResourceKind::Fee, tenant, ResourceId::new())
            .with_owner(child1);
        let sibling_fee = ResourceDescriptor::new(ResourceKind::Fee, tenant, ResourceId::new())
            .with_owner(child2);

        assert!(filter.matches(&own_fee));
        // Same tenant is not enough: the other child is not linked.
        assert!(!filter.matches(&sibling_fee));
    }

    #[test]
    fn missing_rule_scopes_to_nothing() {
        let tenant = TenantId::new();
        let student = Principal::new(PrincipalId::new(), Role::Student, Some(tenant)).unwrap();

        // Students have no School read rule in the default table.
        let filter = scope_for(&table(), &student, ResourceKind::School);
        assert!(filter.is_deny_all());

        let school = ResourceDescriptor::new(ResourceKind::School, tenant, ResourceId::new());
        assert!(!filter.matches(&school));
    }

    #[test]
    fn manage_permission_widens_scope_to_tenant() {
        let tenant = TenantId::new();
        let head = Principal::new(PrincipalId::new(), Role::Principal, Some(tenant))
            .unwrap()
            .with_permissions([ResourceKind::Student.manage_permission()]);

        let filter = scope_for(&table(), &head, ResourceKind::Student);
        assert_eq!(filter.tenant_id(), Some(tenant));
        assert!(filter.owner_ids().is_none());
    }
}
