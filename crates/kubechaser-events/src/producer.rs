// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Watch producers.

One producer runs per watched (namespace, kind). It turns raw watch
notifications into queued events, tracking which object names it has seen
so that the owning loop only gets a create for something new and only gets
modify/delete for something it was told about.
*/

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::decode::decode_object;
use crate::event::{EventType, ResourceEvent};
use crate::queue::EventQueue;
use kubechaser_layout::ResourceKind;

/// Watch event type as reported by the API server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WatchAction {
    Added,
    Modified,
    Deleted,
}

impl WatchAction {
    pub fn event_type(&self) -> EventType {
        match self {
            WatchAction::Added => EventType::Create,
            WatchAction::Modified => EventType::Modify,
            WatchAction::Deleted => EventType::Delete,
        }
    }
}

/// One raw notification from a watch stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchNotification {
    pub action: WatchAction,
    pub object: Value,
}

impl WatchNotification {
    pub fn new(action: WatchAction, object: Value) -> Self {
        Self { action, object }
    }
}

/// What happened to a single notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    Pushed(EventType),
    /// Added for a name already seen, or Modified/Deleted for an unseen one
    Ignored,
    Malformed,
}

/// Why a producer stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerEnd {
    StreamClosed,
    IdleTimeout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerSummary {
    pub namespace: String,
    pub kind: ResourceKind,
    pub pushed: usize,
    pub ignored: usize,
    pub malformed: usize,
    pub end: ProducerEnd,
}

/// Converts notifications for one (namespace, kind) into queued events
pub struct WatchProducer {
    queue: Arc<EventQueue>,
    namespace: String,
    kind: ResourceKind,
    seen: AHashSet<String>,
    pushed: usize,
    ignored: usize,
    malformed: usize,
}

impl WatchProducer {
    pub fn new(queue: Arc<EventQueue>, namespace: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            queue,
            namespace: namespace.into(),
            kind,
            seen: AHashSet::new(),
            pushed: 0,
            ignored: 0,
            malformed: 0,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Number of objects currently known to exist
    pub fn live_count(&self) -> usize {
        self.seen.len()
    }

    /// Decode one notification and push it if it passes the seen-set filter
    pub fn handle(&mut self, notification: WatchNotification) -> HandleOutcome {
        let decoded = match decode_object(self.kind, &notification.object, &self.namespace) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(
                    target: "kubechaser-events",
                    "Dropping malformed {} notification in {}: {}", self.kind, self.namespace, e
                );
                self.malformed += 1;
                return HandleOutcome::Malformed;
            }
        };

        let key = format!("{}/{}", decoded.namespace, decoded.name);
        let accepted = match notification.action {
            WatchAction::Added => self.seen.insert(key),
            WatchAction::Modified => self.seen.contains(&key),
            WatchAction::Deleted => self.seen.remove(&key),
        };
        if !accepted {
            debug!(
                target: "kubechaser-events",
                "Ignoring {:?} for {} {}", notification.action, self.kind, decoded.name
            );
            self.ignored += 1;
            return HandleOutcome::Ignored;
        }

        let event_type = notification.action.event_type();
        self.queue.push(ResourceEvent::new(
            event_type,
            self.kind,
            decoded.name,
            decoded.namespace,
            decoded.owned_by,
            decoded.status,
        ));
        self.pushed += 1;
        HandleOutcome::Pushed(event_type)
    }

    /// Consume notifications until the channel closes or stays idle too long
    pub async fn run(
        mut self,
        mut receiver: mpsc::Receiver<WatchNotification>,
        idle_timeout: Duration,
    ) -> ProducerSummary {
        info!(
            target: "kubechaser-events",
            "Watching {} in {}", self.kind, self.namespace
        );

        let end = loop {
            match tokio::time::timeout(idle_timeout, receiver.recv()).await {
                Ok(Some(notification)) => {
                    self.handle(notification);
                }
                Ok(None) => break ProducerEnd::StreamClosed,
                Err(_) => break ProducerEnd::IdleTimeout,
            }
        };

        info!(
            target: "kubechaser-events",
            "Stopped watching {} in {} ({:?}): {} pushed, {} ignored, {} malformed",
            self.kind,
            self.namespace,
            end,
            self.pushed,
            self.ignored,
            self.malformed
        );

        ProducerSummary {
            namespace: self.namespace,
            kind: self.kind,
            pushed: self.pushed,
            ignored: self.ignored,
            malformed: self.malformed,
            end,
        }
    }
}

/// Spawn a producer task on the current tokio runtime
pub fn spawn_watch_producer(
    queue: Arc<EventQueue>,
    namespace: impl Into<String>,
    kind: ResourceKind,
    receiver: mpsc::Receiver<WatchNotification>,
    idle_timeout: Duration,
) -> JoinHandle<ProducerSummary> {
    let producer = WatchProducer::new(queue, namespace, kind);
    tokio::spawn(producer.run(receiver, idle_timeout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pod(name: &str) -> Value {
        json!({
            "metadata": { "name": name, "namespace": "default" },
            "status": { "phase": "Pending" }
        })
    }

    fn notify(action: WatchAction, name: &str) -> WatchNotification {
        WatchNotification::new(action, pod(name))
    }

    #[test]
    fn test_seen_set_filters_notifications() {
        let queue = Arc::new(EventQueue::new());
        let mut producer = WatchProducer::new(Arc::clone(&queue), "default", ResourceKind::Pod);

        let modified_early = producer.handle(notify(WatchAction::Modified, "p1"));
        let added = producer.handle(notify(WatchAction::Added, "p1"));
        let added_again = producer.handle(notify(WatchAction::Added, "p1"));
        let modified = producer.handle(notify(WatchAction::Modified, "p1"));
        let deleted = producer.handle(notify(WatchAction::Deleted, "p1"));
        let deleted_again = producer.handle(notify(WatchAction::Deleted, "p1"));

        assert_eq!(modified_early, HandleOutcome::Ignored);
        assert_eq!(added, HandleOutcome::Pushed(EventType::Create));
        assert_eq!(added_again, HandleOutcome::Ignored);
        assert_eq!(modified, HandleOutcome::Pushed(EventType::Modify));
        assert_eq!(deleted, HandleOutcome::Pushed(EventType::Delete));
        assert_eq!(deleted_again, HandleOutcome::Ignored);
        assert_eq!(queue.len(), 3);
        assert_eq!(producer.live_count(), 0);
    }

    #[test]
    fn test_malformed_counted() {
        let queue = Arc::new(EventQueue::new());
        let mut producer = WatchProducer::new(Arc::clone(&queue), "default", ResourceKind::Pod);

        let nameless = json!({ "metadata": {} });
        let outcome = producer.handle(WatchNotification::new(WatchAction::Added, nameless));

        assert_eq!(outcome, HandleOutcome::Malformed);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_action_wire_format() {
        let notification: WatchNotification =
            serde_json::from_value(json!({ "action": "ADDED", "object": {} })).unwrap();
        assert_eq!(notification.action, WatchAction::Added);
    }
}
