//! End-to-end access flow: claims → principal → decide/scope → audit trail.

use chrono::{Duration, Utc};

use campus_audit::{AccessRecorder, InMemoryAuditSink};
use campus_authz::{
    Action, Decision, DenyReason, Outcome, Permission, PolicyHandle, PolicyTable,
    ResourceDescriptor, ResourceKind, Role, SessionClaims, principal_from_claims,
};
use campus_authz::store::InMemoryDirectory;
use campus_core::{EntityId, PrincipalId, ResourceId, TenantId};

fn claims(role: Role, tenant_id: Option<TenantId>, permissions: Vec<Permission>) -> SessionClaims {
    let now = Utc::now();
    SessionClaims {
        sub: PrincipalId::new(),
        role,
        tenant_id,
        permissions,
        issued_at: now - Duration::minutes(1),
        expires_at: now + Duration::minutes(30),
    }
}

fn default_table() -> PolicyTable {
    PolicyTable::from_rules(campus_authz::campus_default_rules()).unwrap()
}

#[test]
fn parent_reads_own_childs_fee_but_not_anothers() {
    let directory = InMemoryDirectory::new();
    let tenant = TenantId::new();

    let parent_claims = claims(Role::Parent, Some(tenant), Vec::new());
    let child = EntityId::new();
    let other_child = EntityId::new();
    directory.link(parent_claims.sub, child);

    let own_fee_id = ResourceId::new();
    let own_fee =
        ResourceDescriptor::new(ResourceKind::Fee, tenant, own_fee_id).with_owner(child);
    let other_fee = ResourceDescriptor::new(ResourceKind::Fee, tenant, ResourceId::new())
        .with_owner(other_child);
    directory.insert(own_fee);
    directory.insert(other_fee.clone());

    let parent = principal_from_claims(&parent_claims, Utc::now(), &directory).unwrap();

    // Descriptors are loaded from storage immediately before evaluation.
    use campus_authz::DescriptorSource;
    let own_fee = directory.load(ResourceKind::Fee, own_fee_id).unwrap();
    let other_fee = directory.load(ResourceKind::Fee, other_fee.id()).unwrap();

    let table = default_table();
    let recorder = AccessRecorder::new(InMemoryAuditSink::new());

    assert_eq!(
        recorder.decide_recorded(&table, &parent, Action::Read, &own_fee),
        Decision::Allow
    );
    assert_eq!(
        recorder.decide_recorded(&table, &parent, Action::Read, &other_fee),
        Decision::Deny(DenyReason::OwnershipFailure)
    );

    // The collection scope agrees with the two single-resource decisions.
    let filter = recorder.scope_recorded(&table, &parent, ResourceKind::Fee);
    assert!(filter.matches(&own_fee));
    assert!(!filter.matches(&other_fee));

    // Two audited attempts, outcomes in decision order.
    let entries = recorder.sink().entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].outcome, Outcome::Allow);
    assert_eq!(entries[1].outcome, Outcome::Deny);
    assert!(entries[0].seq < entries[1].seq);
}

#[test]
fn head_of_school_manages_students_without_ownership_links() {
    let directory = InMemoryDirectory::new();
    let tenant = TenantId::new();

    let head_claims = claims(
        Role::Principal,
        Some(tenant),
        vec![ResourceKind::Student.manage_permission()],
    );
    let head = principal_from_claims(&head_claims, Utc::now(), &directory).unwrap();

    let student = ResourceDescriptor::new(ResourceKind::Student, tenant, ResourceId::new())
        .with_owner(EntityId::new());

    let table = default_table();
    let recorder = AccessRecorder::new(InMemoryAuditSink::new());
    let decision = recorder.decide_recorded(&table, &head, Action::Update, &student);
    assert_eq!(decision, Decision::Allow);

    // But never across schools.
    let foreign = ResourceDescriptor::new(ResourceKind::Student, TenantId::new(), ResourceId::new());
    let decision = recorder.decide_recorded(&table, &head, Action::Update, &foreign);
    assert_eq!(decision, Decision::Deny(DenyReason::TenantMismatch));
}

#[test]
fn super_admin_cross_tenant_delete_is_allowed_and_audited() {
    let operator = campus_authz::Principal::super_admin(PrincipalId::new());
    let school = ResourceDescriptor::new(ResourceKind::School, TenantId::new(), ResourceId::new());

    let table = default_table();
    let recorder = AccessRecorder::new(InMemoryAuditSink::new());

    let decision = recorder.decide_recorded(&table, &operator, Action::Delete, &school);
    assert_eq!(decision, Decision::Allow);

    let entries = recorder.sink().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].outcome, Outcome::Allow);
    assert_eq!(entries[0].resource_kind, ResourceKind::School);
    assert_eq!(entries[0].resource_id, Some(school.id()));
}

#[test]
fn policy_reload_swaps_the_whole_snapshot() {
    let handle = PolicyHandle::new(default_table());
    let tenant = TenantId::new();
    let accountant_claims = claims(Role::Accountant, Some(tenant), Vec::new());
    let directory = InMemoryDirectory::new();
    let accountant = principal_from_claims(&accountant_claims, Utc::now(), &directory).unwrap();

    let fee = ResourceDescriptor::new(ResourceKind::Fee, tenant, ResourceId::new());

    let before = handle.snapshot();
    assert!(campus_authz::decide(&before, &accountant, Action::Read, &fee).is_allow());

    // Revoke everything.
    handle.reload(PolicyTable::default());

    // The old snapshot still evaluates consistently; fresh snapshots deny.
    assert!(campus_authz::decide(&before, &accountant, Action::Read, &fee).is_allow());
    let after = handle.snapshot();
    assert_eq!(
        campus_authz::decide(&after, &accountant, Action::Read, &fee),
        Decision::Deny(DenyReason::NoMatchingPolicy)
    );
}
