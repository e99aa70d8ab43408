//! Typed handles to the domain entities access decisions are made about.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use campus_core::{EntityId, ResourceId, TenantId};

use crate::permissions::Permission;

/// The kinds of domain entity the campus backend stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    School,
    Student,
    Fee,
    Notice,
    Assignment,
    ExamResult,
    Attendance,
    Routine,
    AdmitCard,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 9] = [
        ResourceKind::School,
        ResourceKind::Student,
        ResourceKind::Fee,
        ResourceKind::Notice,
        ResourceKind::Assignment,
        ResourceKind::ExamResult,
        ResourceKind::Attendance,
        ResourceKind::Routine,
        ResourceKind::AdmitCard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::School => "school",
            ResourceKind::Student => "student",
            ResourceKind::Fee => "fee",
            ResourceKind::Notice => "notice",
            ResourceKind::Assignment => "assignment",
            ResourceKind::ExamResult => "exam_result",
            ResourceKind::Attendance => "attendance",
            ResourceKind::Routine => "routine",
            ResourceKind::AdmitCard => "admit_card",
        }
    }

    /// The `manage_*` permission that exempts admin/principal roles from
    /// ownership checks on this kind.
    pub fn manage_permission(&self) -> Permission {
        Permission::new(match self {
            ResourceKind::School => "manage_schools",
            ResourceKind::Student => "manage_students",
            ResourceKind::Fee => "manage_fees",
            ResourceKind::Notice => "manage_notices",
            ResourceKind::Assignment => "manage_assignments",
            ResourceKind::ExamResult => "manage_exam_results",
            ResourceKind::Attendance => "manage_attendance",
            ResourceKind::Routine => "manage_routines",
            ResourceKind::AdmitCard => "manage_admit_cards",
        })
    }
}

impl core::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A minimal, typed reference to one stored entity, carrying just enough
/// metadata (tenant, owners) to decide access.
///
/// Descriptors are derived from a storage read immediately before policy
/// evaluation and never cached across requests — role and ownership links
/// can change between calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    kind: ResourceKind,
    tenant_id: TenantId,

    /// Entities this resource belongs to: the student a fee is billed to,
    /// the class section an attendance row was taken for.
    owner_refs: HashSet<EntityId>,

    id: ResourceId,
}

impl ResourceDescriptor {
    pub fn new(kind: ResourceKind, tenant_id: TenantId, id: ResourceId) -> Self {
        Self {
            kind,
            tenant_id,
            owner_refs: HashSet::new(),
            id,
        }
    }

    pub fn with_owner(mut self, owner: impl Into<EntityId>) -> Self {
        self.owner_refs.insert(owner.into());
        self
    }

    pub fn with_owners(mut self, owners: impl IntoIterator<Item = EntityId>) -> Self {
        self.owner_refs.extend(owners);
        self
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn owner_refs(&self) -> &HashSet<EntityId> {
        &self.owner_refs
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }
}
