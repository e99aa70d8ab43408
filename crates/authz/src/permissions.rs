use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are modeled as opaque strings (e.g. "manage_students").
/// The policy layer only interprets the `manage_*` family: holding the
/// manage permission for a resource kind exempts admin/principal roles
/// from per-resource ownership checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceKind;

    #[test]
    fn manage_permission_names_are_stable() {
        assert_eq!(ResourceKind::Student.manage_permission().as_str(), "manage_students");
        assert_eq!(ResourceKind::Fee.manage_permission().as_str(), "manage_fees");
        assert_eq!(ResourceKind::ExamResult.manage_permission().as_str(), "manage_exam_results");
    }
}
