//! Declarative policy rules: authorization as data, not scattered conditionals.
//!
//! The rule table is the one place roles and permissions are wired to
//! resource kinds. It is loaded at startup, immutable at runtime, and
//! replaced wholesale on reload via [`PolicyHandle`] so no in-flight
//! evaluation observes a half-updated rule set.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{resource::ResourceKind, roles::Role};

/// CRUD-level action a principal attempts on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Read, Action::Create, Action::Update, Action::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    /// Mutations are the actions that must always be audited.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Action::Read)
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One grant in the policy table.
///
/// Absence of a rule is itself a decision: no rule for a
/// `(role, kind, action)` triple means Deny (fail closed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
    pub role: Role,
    pub kind: ResourceKind,
    pub action: Action,

    /// Grant only applies within the principal's own tenant.
    /// `super_admin` is exempt from this check by role.
    pub requires_same_tenant: bool,

    /// Grant only applies to resources whose owner refs intersect the
    /// principal's linked entities. Admin/principal roles holding the
    /// kind's `manage_*` permission are exempt.
    pub requires_ownership: bool,
}

#[derive(Debug, Error)]
pub enum PolicyConfigError {
    #[error("duplicate rule for ({role}, {kind}, {action})")]
    DuplicateRule {
        role: Role,
        kind: ResourceKind,
        action: Action,
    },

    #[error("policy document parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Immutable lookup table over [`PolicyRule`]s.
///
/// Lookups are O(1); the table carries no interior mutability. Reload is
/// done by building a fresh table and swapping it in via [`PolicyHandle`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolicyTable {
    rules: HashMap<(Role, ResourceKind, Action), PolicyRule>,
}

impl PolicyTable {
    /// Build a table, rejecting duplicate `(role, kind, action)` entries —
    /// a duplicate almost always means two conflicting grants in config.
    pub fn from_rules(
        rules: impl IntoIterator<Item = PolicyRule>,
    ) -> Result<Self, PolicyConfigError> {
        let mut table = HashMap::new();
        for rule in rules {
            let key = (rule.role, rule.kind, rule.action);
            if table.insert(key, rule).is_some() {
                return Err(PolicyConfigError::DuplicateRule {
                    role: rule.role,
                    kind: rule.kind,
                    action: rule.action,
                });
            }
        }
        Ok(Self { rules: table })
    }

    /// Parse a JSON rule document (an array of rules).
    pub fn from_json(doc: &str) -> Result<Self, PolicyConfigError> {
        let rules: Vec<PolicyRule> = serde_json::from_str(doc)?;
        Self::from_rules(rules)
    }

    pub fn rule(&self, role: Role, kind: ResourceKind, action: Action) -> Option<&PolicyRule> {
        self.rules.get(&(role, kind, action))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Shared handle to the current policy snapshot.
///
/// Readers clone the inner `Arc` under a short lock; a reload swaps the
/// whole snapshot atomically, so evaluations started before the reload keep
/// the table they began with.
#[derive(Debug, Clone)]
pub struct PolicyHandle {
    current: Arc<Mutex<Arc<PolicyTable>>>,
}

impl PolicyHandle {
    pub fn new(table: PolicyTable) -> Self {
        Self {
            current: Arc::new(Mutex::new(Arc::new(table))),
        }
    }

    pub fn snapshot(&self) -> Arc<PolicyTable> {
        // A poisoned lock only means a panic elsewhere mid-swap; the stored
        // snapshot is still a complete table, so recover and serve it.
        let guard = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    pub fn reload(&self, table: PolicyTable) {
        let mut guard = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(table);
    }
}

fn rule(
    role: Role,
    kind: ResourceKind,
    action: Action,
    requires_same_tenant: bool,
    requires_ownership: bool,
) -> PolicyRule {
    PolicyRule {
        role,
        kind,
        action,
        requires_same_tenant,
        requires_ownership,
    }
}

/// The built-in campus rule set.
///
/// This is the data the legacy controllers expressed as per-route role
/// checks. Deployments can replace it with [`PolicyTable::from_json`];
/// the defaults are:
///
/// - `super_admin`: everything, everywhere (audited, never silently).
/// - `admin` / `principal`: full CRUD within their own school.
/// - `teacher`: reads scoped to assigned class sections, plus
///   create/update of attendance, results and assignments for them.
/// - `student` / `parent`: reads of their own (or their children's) records;
///   school-wide notices and routines are tenant-scoped reads.
/// - `accountant`: fee management plus tenant-wide student reads.
pub fn campus_default_rules() -> Vec<PolicyRule> {
    use Action::*;
    use ResourceKind::*;

    let mut rules = Vec::new();

    for kind in ResourceKind::ALL {
        for action in Action::ALL {
            rules.push(rule(Role::SuperAdmin, kind, action, false, false));
        }
    }

    // Tenant administration: full CRUD inside the school, no per-resource
    // ownership (these roles carry manage_* permissions instead).
    for role in [Role::Admin, Role::Principal] {
        for kind in ResourceKind::ALL {
            if kind == School {
                // Schools are platform-managed; tenant staff may only read
                // their own school record.
                rules.push(rule(role, School, Read, true, false));
                rules.push(rule(role, School, Update, true, false));
                continue;
            }
            for action in Action::ALL {
                rules.push(rule(role, kind, action, true, false));
            }
        }
    }

    // Teachers: class-section ownership for student-facing data.
    for kind in [Student, Attendance, ExamResult, Assignment, Routine] {
        rules.push(rule(Role::Teacher, kind, Read, true, true));
    }
    for kind in [Attendance, ExamResult, Assignment] {
        rules.push(rule(Role::Teacher, kind, Create, true, true));
        rules.push(rule(Role::Teacher, kind, Update, true, true));
    }
    rules.push(rule(Role::Teacher, Notice, Read, true, false));

    // Students and parents: own records only; notices and routines are
    // published school-wide.
    for role in [Role::Student, Role::Parent] {
        for kind in [Student, Fee, ExamResult, Attendance, Assignment, AdmitCard] {
            rules.push(rule(role, kind, Read, true, true));
        }
        rules.push(rule(role, Notice, Read, true, false));
        rules.push(rule(role, Routine, Read, true, false));
    }

    // Accountants: fee lifecycle plus the student roster it bills against.
    for action in [Read, Create, Update] {
        rules.push(rule(Role::Accountant, Fee, action, true, false));
    }
    rules.push(rule(Role::Accountant, Student, Read, true, false));

    rules
}
