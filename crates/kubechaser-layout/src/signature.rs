// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Resource identity.
//!
//! The canonical key joins namespace, kind and name with `/`, which is not
//! allowed in Kubernetes namespace or object names, so distinct triples can
//! never produce the same key.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::kind::ResourceKind;

const SEPARATOR: char = '/';

/// Identity of one resource: (namespace, name, kind)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceSignature {
    pub namespace: String,
    pub name: String,
    pub kind: ResourceKind,
}

impl ResourceSignature {
    pub fn new(kind: ResourceKind, name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            kind,
        }
    }

    /// `namespace/Kind/name`
    pub fn canonical(&self) -> String {
        signature(self.kind, &self.name, &self.namespace)
    }
}

impl fmt::Display for ResourceSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            self.namespace,
            self.kind,
            self.name,
            sep = SEPARATOR
        )
    }
}

/// Canonical key for a (kind, name, namespace) triple
pub fn signature(kind: ResourceKind, name: &str, namespace: &str) -> String {
    format!("{namespace}{SEPARATOR}{kind}{SEPARATOR}{name}")
}
