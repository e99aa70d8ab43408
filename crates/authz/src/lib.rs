//! `campus-authz` — tenant-scoped authorization core (pure, storage-agnostic).
//!
//! Every controller in the campus backend funnels its access decisions through
//! two entry points: [`decide`] for single-resource operations and
//! [`scope_for`] for collection reads. Both are pure evaluations over an
//! immutable per-request [`Principal`] plus a static [`PolicyTable`];
//! this crate is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod evaluate;
pub mod permissions;
pub mod policy;
pub mod principal;
pub mod resource;
pub mod roles;
pub mod scope;
pub mod store;

pub use claims::{ClaimsError, SessionClaims, principal_from_claims, validate_claims};
pub use evaluate::{Decision, DenyReason, Outcome, decide};
pub use permissions::Permission;
pub use policy::{Action, PolicyConfigError, PolicyHandle, PolicyRule, PolicyTable, campus_default_rules};
pub use principal::{Principal, PrincipalError};
pub use resource::{ResourceDescriptor, ResourceKind};
pub use roles::Role;
pub use scope::{ResourceFilter, scope_for};
pub use store::{DescriptorSource, InMemoryDirectory, LinkedEntityResolver};
