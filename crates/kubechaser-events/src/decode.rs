// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Decoding of raw Kubernetes object JSON.

Runs once per notification at ingestion. Only the fields the scene needs are
read: name, namespace, owner references and the kind-specific status.
*/

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{EventError, EventResult};
use kubechaser_layout::{
    JobCounts, PodPhase, ReplicaCounts, ResourceKind, ResourceSignature, ResourceStatus,
};

/// Namespace used for cluster-scoped objects
///
/// Empty, which no real namespace can be.
pub const CLUSTER_NAMESPACE: &str = "";

/// Fields extracted from one object
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedObject {
    pub name: String,
    pub namespace: String,
    pub owned_by: Vec<ResourceSignature>,
    pub status: ResourceStatus,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ObjectMeta {
    name: Option<String>,
    namespace: Option<String>,
    owner_references: Vec<OwnerReference>,
}

#[derive(Debug, Deserialize)]
struct OwnerReference {
    kind: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct MetadataEnvelope {
    #[serde(default)]
    metadata: ObjectMeta,
}

#[derive(Debug, Deserialize)]
struct StatusEnvelope<S> {
    status: Option<S>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ReplicaStatus {
    ready_replicas: i32,
    replicas: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct DaemonSetStatus {
    number_ready: i32,
    desired_number_scheduled: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JobStatus {
    active: i32,
    succeeded: i32,
    failed: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PodStatus {
    phase: Option<String>,
    container_statuses: Vec<ContainerStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContainerStatus {
    ready: bool,
}

/// Decode name, namespace, owners and status of a `kind` object
///
/// `fallback_namespace` is used when the object carries none; cluster-scoped
/// kinds always land in `CLUSTER_NAMESPACE`.
///
/// # Errors
///
/// Returns `EventError::MissingField` without `metadata.name`, and
/// `EventError::Malformed` when a known field has the wrong type
pub fn decode_object(
    kind: ResourceKind,
    object: &Value,
    fallback_namespace: &str,
) -> EventResult<DecodedObject> {
    let MetadataEnvelope { metadata } = MetadataEnvelope::deserialize(object)?;

    let name = metadata
        .name
        .filter(|n| !n.is_empty())
        .ok_or(EventError::MissingField("metadata.name"))?;

    let namespace = if is_cluster_scoped(kind) {
        CLUSTER_NAMESPACE.to_string()
    } else {
        metadata
            .namespace
            .filter(|ns| !ns.is_empty())
            .unwrap_or_else(|| fallback_namespace.to_string())
    };

    let owned_by = metadata
        .owner_references
        .into_iter()
        .filter_map(|owner| match owner.kind.parse::<ResourceKind>() {
            Ok(owner_kind) => Some(ResourceSignature::new(
                owner_kind,
                owner.name,
                namespace.clone(),
            )),
            Err(_) => {
                debug!(
                    target: "kubechaser-events",
                    "Dropping owner reference to unsupported kind {} on {}", owner.kind, name
                );
                None
            }
        })
        .collect();

    let status = decode_status(kind, object)?;

    Ok(DecodedObject {
        name,
        namespace,
        owned_by,
        status,
    })
}

/// Kind-specific status; kinds without one decode to `Opaque`
pub fn decode_status(kind: ResourceKind, object: &Value) -> EventResult<ResourceStatus> {
    let status = match kind {
        ResourceKind::Deployment => ResourceStatus::Deployment(replica_counts(object)?),
        ResourceKind::StatefulSet => ResourceStatus::StatefulSet(replica_counts(object)?),
        ResourceKind::ReplicaSet => ResourceStatus::ReplicaSet(replica_counts(object)?),
        ResourceKind::DaemonSet => {
            let raw: DaemonSetStatus = status_of(object)?;
            ResourceStatus::DaemonSet(ReplicaCounts::new(
                raw.number_ready,
                raw.desired_number_scheduled,
            ))
        }
        ResourceKind::Job => {
            let raw: JobStatus = status_of(object)?;
            ResourceStatus::Job(JobCounts {
                active: raw.active,
                succeeded: raw.succeeded,
                failed: raw.failed,
            })
        }
        ResourceKind::Pod => {
            let raw: PodStatus = status_of(object)?;
            let phase = raw
                .phase
                .as_deref()
                .map(PodPhase::from_phase)
                .unwrap_or_default();
            let up = phase == PodPhase::Running && raw.container_statuses.iter().all(|c| c.ready);
            ResourceStatus::Pod { phase, up }
        }
        _ => ResourceStatus::Opaque,
    };
    Ok(status)
}

/// Parse a Kubernetes `kind` string
///
/// # Errors
///
/// Returns `EventError::UnsupportedKind` for kinds the scene does not place
pub fn parse_kind(kind: &str) -> EventResult<ResourceKind> {
    kind.parse::<ResourceKind>()
        .map_err(|_| EventError::UnsupportedKind(kind.to_string()))
}

pub fn is_cluster_scoped(kind: ResourceKind) -> bool {
    matches!(
        kind,
        ResourceKind::ClusterRole
            | ResourceKind::ClusterRoleBinding
            | ResourceKind::PersistentVolume
    )
}

fn replica_counts(object: &Value) -> EventResult<ReplicaCounts> {
    let raw: ReplicaStatus = status_of(object)?;
    Ok(ReplicaCounts::new(raw.ready_replicas, raw.replicas))
}

fn status_of<S: DeserializeOwned + Default>(object: &Value) -> EventResult<S> {
    let StatusEnvelope { status } = StatusEnvelope::<S>::deserialize(object)?;
    Ok(status.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_pod_with_owner() {
        let object = json!({
            "metadata": {
                "name": "web-5d9c7-abcde",
                "namespace": "shop",
                "ownerReferences": [
                    { "kind": "ReplicaSet", "name": "web-5d9c7", "uid": "1" },
                    { "kind": "Node", "name": "worker-1", "uid": "2" }
                ]
            },
            "status": {
                "phase": "Running",
                "containerStatuses": [{ "ready": true }, { "ready": true }]
            }
        });

        let decoded = decode_object(ResourceKind::Pod, &object, "default").unwrap();

        assert_eq!(decoded.name, "web-5d9c7-abcde");
        assert_eq!(decoded.namespace, "shop");
        assert_eq!(
            decoded.owned_by,
            vec![ResourceSignature::new(ResourceKind::ReplicaSet, "web-5d9c7", "shop")]
        );
        assert_eq!(
            decoded.status,
            ResourceStatus::Pod {
                phase: PodPhase::Running,
                up: true
            }
        );
    }

    #[test]
    fn test_pod_with_unready_container_is_not_up() {
        let object = json!({
            "metadata": { "name": "p1" },
            "status": {
                "phase": "Running",
                "containerStatuses": [{ "ready": true }, { "ready": false }]
            }
        });
        let decoded = decode_object(ResourceKind::Pod, &object, "default").unwrap();
        assert_eq!(decoded.namespace, "default");
        assert_eq!(
            decoded.status,
            ResourceStatus::Pod {
                phase: PodPhase::Running,
                up: false
            }
        );
    }

    #[test]
    fn test_decode_replica_counts() {
        let object = json!({
            "metadata": { "name": "web", "namespace": "shop" },
            "status": { "readyReplicas": 2, "replicas": 3 }
        });
        let decoded = decode_object(ResourceKind::Deployment, &object, "default").unwrap();
        assert_eq!(decoded.status, ResourceStatus::Deployment(ReplicaCounts::new(2, 3)));
    }

    #[test]
    fn test_missing_status_defaults() {
        let object = json!({ "metadata": { "name": "web" }, "status": null });
        let decoded = decode_object(ResourceKind::ReplicaSet, &object, "ns").unwrap();
        assert_eq!(decoded.status, ResourceStatus::ReplicaSet(ReplicaCounts::default()));
    }

    #[test]
    fn test_daemonset_and_job() {
        let ds = json!({
            "metadata": { "name": "agent" },
            "status": { "numberReady": 3, "desiredNumberScheduled": 3 }
        });
        let job = json!({ "metadata": { "name": "migrate" }, "status": { "succeeded": 1 } });

        assert_eq!(
            decode_status(ResourceKind::DaemonSet, &ds).unwrap(),
            ResourceStatus::DaemonSet(ReplicaCounts::new(3, 3))
        );
        assert_eq!(
            decode_status(ResourceKind::Job, &job).unwrap(),
            ResourceStatus::Job(JobCounts {
                active: 0,
                succeeded: 1,
                failed: 0
            })
        );
    }

    #[test]
    fn test_cluster_scoped_namespace() {
        let object = json!({ "metadata": { "name": "admin", "namespace": "ignored" } });
        let decoded = decode_object(ResourceKind::ClusterRole, &object, "default").unwrap();
        assert_eq!(decoded.namespace, CLUSTER_NAMESPACE);
        assert_eq!(decoded.status, ResourceStatus::Opaque);
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind("StatefulSet").unwrap(), ResourceKind::StatefulSet);
        assert!(matches!(
            parse_kind("Node"),
            Err(EventError::UnsupportedKind(kind)) if kind == "Node"
        ));
    }

    #[test]
    fn test_missing_name_rejected() {
        let object = json!({ "metadata": { "namespace": "shop" } });
        assert!(matches!(
            decode_object(ResourceKind::Service, &object, "default"),
            Err(EventError::MissingField("metadata.name"))
        ));
    }

    #[test]
    fn test_wrong_type_is_malformed() {
        let object = json!({
            "metadata": { "name": "web" },
            "status": { "readyReplicas": "three" }
        });
        assert!(matches!(
            decode_object(ResourceKind::Deployment, &object, "default"),
            Err(EventError::Malformed(_))
        ));
    }
}
