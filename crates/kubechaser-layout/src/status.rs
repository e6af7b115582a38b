// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Typed resource status.

Status is decoded once when an event is ingested and carried as one of these
variants from then on; nothing downstream inspects raw object JSON.
*/

use serde::{Deserialize, Serialize};

/// Lifecycle state shown by a visual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ObjectState {
    #[default]
    Loading,
    Running,
    Succeeded,
    Failed,
}

/// Ready/desired replica counts for replicated workloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReplicaCounts {
    pub ready_replicas: i32,
    pub replicas: i32,
}

impl ReplicaCounts {
    pub fn new(ready_replicas: i32, replicas: i32) -> Self {
        Self {
            ready_replicas,
            replicas,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready_replicas == self.replicas
    }
}

/// Pod counts reported by a Job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobCounts {
    pub active: i32,
    pub succeeded: i32,
    pub failed: i32,
}

/// `status.phase` of a Pod
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PodPhase {
    #[default]
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl PodPhase {
    /// Parse a phase string; anything unrecognised maps to `Unknown`
    pub fn from_phase(phase: &str) -> Self {
        match phase {
            "Pending" => PodPhase::Pending,
            "Running" => PodPhase::Running,
            "Succeeded" => PodPhase::Succeeded,
            "Failed" => PodPhase::Failed,
            _ => PodPhase::Unknown,
        }
    }
}

/// Status payload, one variant per kind that reports one
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ResourceStatus {
    Deployment(ReplicaCounts),
    StatefulSet(ReplicaCounts),
    DaemonSet(ReplicaCounts),
    ReplicaSet(ReplicaCounts),
    Job(JobCounts),
    /// `up` is true once the pod is running with every container ready
    Pod { phase: PodPhase, up: bool },
    #[default]
    Opaque,
}

impl ResourceStatus {
    pub fn object_state(&self) -> ObjectState {
        match self {
            ResourceStatus::Deployment(counts)
            | ResourceStatus::StatefulSet(counts)
            | ResourceStatus::DaemonSet(counts)
            | ResourceStatus::ReplicaSet(counts) => {
                if counts.is_ready() {
                    ObjectState::Running
                } else {
                    ObjectState::Loading
                }
            }
            ResourceStatus::Job(counts) => {
                if counts.active > 0 {
                    ObjectState::Running
                } else if counts.failed > 0 {
                    ObjectState::Failed
                } else if counts.succeeded > 0 {
                    ObjectState::Succeeded
                } else {
                    ObjectState::Loading
                }
            }
            ResourceStatus::Pod { phase, up } => match phase {
                PodPhase::Running if *up => ObjectState::Running,
                PodPhase::Succeeded => ObjectState::Succeeded,
                PodPhase::Failed => ObjectState::Failed,
                _ => ObjectState::Loading,
            },
            ResourceStatus::Opaque => ObjectState::Running,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replica_readiness() {
        let loading = ResourceStatus::Deployment(ReplicaCounts::new(1, 3));
        let ready = ResourceStatus::ReplicaSet(ReplicaCounts::new(3, 3));
        assert_eq!(loading.object_state(), ObjectState::Loading);
        assert_eq!(ready.object_state(), ObjectState::Running);
    }

    #[test]
    fn test_pod_state() {
        let starting = ResourceStatus::Pod {
            phase: PodPhase::Running,
            up: false,
        };
        let running = ResourceStatus::Pod {
            phase: PodPhase::Running,
            up: true,
        };
        let failed = ResourceStatus::Pod {
            phase: PodPhase::Failed,
            up: false,
        };
        assert_eq!(starting.object_state(), ObjectState::Loading);
        assert_eq!(running.object_state(), ObjectState::Running);
        assert_eq!(failed.object_state(), ObjectState::Failed);
    }

    #[test]
    fn test_job_state() {
        let job = |active, succeeded, failed| {
            ResourceStatus::Job(JobCounts {
                active,
                succeeded,
                failed,
            })
            .object_state()
        };
        assert_eq!(job(1, 0, 0), ObjectState::Running);
        assert_eq!(job(0, 1, 0), ObjectState::Succeeded);
        assert_eq!(job(0, 0, 2), ObjectState::Failed);
        assert_eq!(job(0, 0, 0), ObjectState::Loading);
    }

    #[test]
    fn test_phase_parsing() {
        assert_eq!(PodPhase::from_phase("Running"), PodPhase::Running);
        assert_eq!(PodPhase::from_phase("Evicted"), PodPhase::Unknown);
    }
}
