//! Storage-collaborator seams.
//!
//! The authorization core never talks to a database directly; controllers
//! hand it descriptors and linked-entity sets loaded through these traits.
//! The in-memory implementation backs tests and development.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use campus_core::{DomainError, DomainResult, EntityId, PrincipalId, ResourceId};

use crate::{
    resource::{ResourceDescriptor, ResourceKind},
    roles::Role,
};

/// Load a resource descriptor by kind and id, immediately before policy
/// evaluation. Implementations must not cache across requests.
pub trait DescriptorSource: Send + Sync {
    fn load(&self, kind: ResourceKind, id: ResourceId) -> DomainResult<ResourceDescriptor>;
}

/// Resolve the entities a principal is personally tied to (a parent's
/// children, a teacher's class sections). Called once per request while the
/// principal is being assembled; the result lives only as long as the
/// principal does.
pub trait LinkedEntityResolver: Send + Sync {
    fn linked_entities(&self, principal_id: PrincipalId, role: Role)
    -> DomainResult<HashSet<EntityId>>;
}

/// In-memory directory of descriptors and principal links.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    descriptors: Mutex<HashMap<(ResourceKind, ResourceId), ResourceDescriptor>>,
    links: Mutex<HashMap<PrincipalId, HashSet<EntityId>>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, descriptor: ResourceDescriptor) {
        let mut descriptors = self
            .descriptors
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        descriptors.insert((descriptor.kind(), descriptor.id()), descriptor);
    }

    pub fn link(&self, principal_id: PrincipalId, entity: EntityId) {
        let mut links = self
            .links
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        links.entry(principal_id).or_default().insert(entity);
    }
}

impl DescriptorSource for InMemoryDirectory {
    fn load(&self, kind: ResourceKind, id: ResourceId) -> DomainResult<ResourceDescriptor> {
        let descriptors = self
            .descriptors
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        descriptors
            .get(&(kind, id))
            .cloned()
            .ok_or(DomainError::NotFound)
    }
}

impl LinkedEntityResolver for InMemoryDirectory {
    fn linked_entities(
        &self,
        principal_id: PrincipalId,
        _role: Role,
    ) -> DomainResult<HashSet<EntityId>> {
        let links = self
            .links
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(links.get(&principal_id).cloned().unwrap_or_default())
    }
}
