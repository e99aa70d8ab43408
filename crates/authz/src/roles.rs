use serde::{Deserialize, Serialize};

/// Closed role set for the campus deployment.
///
/// Roles are a tagged enum rather than opaque strings: every authorization
/// decision is keyed on `(Role, ResourceKind, Action)`, and an unknown role
/// must be unrepresentable past the claims boundary (parsing fails there,
/// so the evaluator never sees one).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform operator; bypasses tenant scoping but is always audited.
    SuperAdmin,
    /// Tenant-level administrator.
    Admin,
    /// Head of a school (the staff role, not the authenticated actor).
    Principal,
    Teacher,
    Student,
    Parent,
    Accountant,
}

impl Role {
    /// All roles, in declaration order. Handy for table construction and tests.
    pub const ALL: [Role; 7] = [
        Role::SuperAdmin,
        Role::Admin,
        Role::Principal,
        Role::Teacher,
        Role::Student,
        Role::Parent,
        Role::Accountant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Principal => "principal",
            Role::Teacher => "teacher",
            Role::Student => "student",
            Role::Parent => "parent",
            Role::Accountant => "accountant",
        }
    }

    pub fn is_super_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }

    /// Whether a principal with this role must carry a tenant id.
    pub fn requires_tenant(&self) -> bool {
        !self.is_super_admin()
    }

    /// Roles whose linked entities are resolved per request (a teacher's
    /// class sections, a student's own record, a parent's children).
    pub fn is_ownership_scoped(&self) -> bool {
        matches!(self, Role::Teacher | Role::Student | Role::Parent)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
