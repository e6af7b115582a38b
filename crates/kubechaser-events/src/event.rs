// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Resource events as consumed by the owning loop.

use serde::{Deserialize, Serialize};
use std::fmt;

use kubechaser_layout::{ResourceKind, ResourceSignature, ResourceStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Create,
    Modify,
    Delete,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Create => write!(f, "create"),
            EventType::Modify => write!(f, "modify"),
            EventType::Delete => write!(f, "delete"),
        }
    }
}

/// One creation, update or deletion notification
///
/// Immutable once queued; consumed exactly once by the owning loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceEvent {
    pub event_type: EventType,
    pub signature: ResourceSignature,
    /// Owners in the same namespace
    pub owned_by: Vec<ResourceSignature>,
    pub status: ResourceStatus,
}

impl ResourceEvent {
    pub fn new(
        event_type: EventType,
        kind: ResourceKind,
        name: impl Into<String>,
        namespace: impl Into<String>,
        owned_by: Vec<ResourceSignature>,
        status: ResourceStatus,
    ) -> Self {
        Self {
            event_type,
            signature: ResourceSignature::new(kind, name, namespace),
            owned_by,
            status,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.signature.kind
    }

    pub fn name(&self) -> &str {
        &self.signature.name
    }

    pub fn namespace(&self) -> &str {
        &self.signature.namespace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let owner = ResourceSignature::new(ResourceKind::ReplicaSet, "rs1", "default");
        let event = ResourceEvent::new(
            EventType::Create,
            ResourceKind::Pod,
            "p1",
            "default",
            vec![owner.clone()],
            ResourceStatus::Opaque,
        );

        assert_eq!(event.kind(), ResourceKind::Pod);
        assert_eq!(event.name(), "p1");
        assert_eq!(event.namespace(), "default");
        assert_eq!(event.owned_by, vec![owner]);
        assert_eq!(event.event_type.to_string(), "create");
    }
}
