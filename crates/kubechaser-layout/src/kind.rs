// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Resource kinds and their in-row precedence.

Precedence is an explicit value handed to the slot table at construction;
there is no process-wide kind registry.
*/

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::{LayoutError, LayoutResult};
use kubechaser_config::PrecedenceEntry;

/// Kubernetes object kinds the scene knows how to place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Deployment,
    StatefulSet,
    DaemonSet,
    ReplicaSet,
    Job,
    CronJob,
    Pod,
    Service,
    Ingress,
    ServiceAccount,
    Role,
    RoleBinding,
    ClusterRole,
    ClusterRoleBinding,
    Secret,
    ConfigMap,
    PersistentVolume,
    PersistentVolumeClaim,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 18] = [
        ResourceKind::Deployment,
        ResourceKind::StatefulSet,
        ResourceKind::DaemonSet,
        ResourceKind::ReplicaSet,
        ResourceKind::Job,
        ResourceKind::CronJob,
        ResourceKind::Pod,
        ResourceKind::Service,
        ResourceKind::Ingress,
        ResourceKind::ServiceAccount,
        ResourceKind::Role,
        ResourceKind::RoleBinding,
        ResourceKind::ClusterRole,
        ResourceKind::ClusterRoleBinding,
        ResourceKind::Secret,
        ResourceKind::ConfigMap,
        ResourceKind::PersistentVolume,
        ResourceKind::PersistentVolumeClaim,
    ];

    /// The Kubernetes `kind` string
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Deployment => "Deployment",
            ResourceKind::StatefulSet => "StatefulSet",
            ResourceKind::DaemonSet => "DaemonSet",
            ResourceKind::ReplicaSet => "ReplicaSet",
            ResourceKind::Job => "Job",
            ResourceKind::CronJob => "CronJob",
            ResourceKind::Pod => "Pod",
            ResourceKind::Service => "Service",
            ResourceKind::Ingress => "Ingress",
            ResourceKind::ServiceAccount => "ServiceAccount",
            ResourceKind::Role => "Role",
            ResourceKind::RoleBinding => "RoleBinding",
            ResourceKind::ClusterRole => "ClusterRole",
            ResourceKind::ClusterRoleBinding => "ClusterRoleBinding",
            ResourceKind::Secret => "Secret",
            ResourceKind::ConfigMap => "ConfigMap",
            ResourceKind::PersistentVolume => "PersistentVolume",
            ResourceKind::PersistentVolumeClaim => "PersistentVolumeClaim",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| LayoutError::UnknownKind(s.to_string()))
    }
}

/// Where a kind lands when inserted into an existing row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementClass {
    /// Lowest configured rank; prepended
    Ancestor,
    /// Between lowest and highest rank; inserted before the first descendant
    Mid,
    /// Highest configured rank; appended
    Descendant,
    /// No rank; appended and sorted last
    Other,
}

/// Mapping from kind to rank, lower ranks sort first within a row
#[derive(Debug, Clone, PartialEq)]
pub struct KindPrecedence {
    ranks: AHashMap<ResourceKind, u32>,
    lowest: Option<u32>,
    highest: Option<u32>,
}

impl KindPrecedence {
    pub fn new<I>(ranks: I) -> Self
    where
        I: IntoIterator<Item = (ResourceKind, u32)>,
    {
        let ranks: AHashMap<ResourceKind, u32> = ranks.into_iter().collect();
        let lowest = ranks.values().copied().min();
        let highest = ranks.values().copied().max();
        Self {
            ranks,
            lowest,
            highest,
        }
    }

    /// Build from the `[layout] precedence` table of the config file
    ///
    /// # Errors
    ///
    /// Returns `LayoutError::UnknownKind` for kind names outside `ResourceKind`
    pub fn from_config(entries: &[PrecedenceEntry]) -> LayoutResult<Self> {
        let ranks = entries
            .iter()
            .map(|entry| Ok((entry.kind.parse::<ResourceKind>()?, entry.rank)))
            .collect::<LayoutResult<Vec<_>>>()?;
        Ok(Self::new(ranks))
    }

    pub fn rank(&self, kind: ResourceKind) -> Option<u32> {
        self.ranks.get(&kind).copied()
    }

    pub fn class(&self, kind: ResourceKind) -> PlacementClass {
        match self.rank(kind) {
            None => PlacementClass::Other,
            Some(rank) if Some(rank) == self.lowest => PlacementClass::Ancestor,
            Some(rank) if Some(rank) == self.highest => PlacementClass::Descendant,
            Some(_) => PlacementClass::Mid,
        }
    }

    /// Sort key placing ranked kinds in rank order and unranked kinds last
    pub fn sort_key(&self, kind: ResourceKind) -> (bool, u32) {
        match self.rank(kind) {
            Some(rank) => (false, rank),
            None => (true, 0),
        }
    }
}

impl Default for KindPrecedence {
    fn default() -> Self {
        Self::new([
            (ResourceKind::Deployment, 0),
            (ResourceKind::StatefulSet, 0),
            (ResourceKind::DaemonSet, 0),
            (ResourceKind::CronJob, 0),
            (ResourceKind::ReplicaSet, 1),
            (ResourceKind::Job, 1),
            (ResourceKind::Pod, 2),
        ])
    }
}
