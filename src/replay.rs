// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Replay recorded watch notifications through the owning loop.
//!
//! Each input line is one JSON object:
//!
//! ```json
//! {"action": "ADDED", "kind": "Pod", "object": {"metadata": {"name": "web-1"}}}
//! ```
//!
//! One [`WatchProducer`] is kept per kind, so `ADDED`/`MODIFIED`/`DELETED`
//! filtering behaves exactly as it would against a live watch stream.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::config::KubechaserConfig;
use crate::events::{
    parse_kind, EventQueue, HandleOutcome, WatchAction, WatchNotification, WatchProducer,
};
use crate::layout::{LayoutError, LayoutSnapshot, ResourceKind, VisualBackend};
use crate::runtime::Cluster;

/// Errors raised while reading a replay line
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Line {line}: invalid JSON: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Line {line}: missing field '{field}'")]
    MissingField { line: usize, field: &'static str },

    #[error("Line {line}: unsupported kind '{kind}'")]
    UnsupportedKind { line: usize, kind: String },

    #[error("Layout setup failed: {0}")]
    Layout(#[from] LayoutError),
}

/// Counters reported once a replay has been fed through
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub lines: usize,
    pub pushed: usize,
    pub ignored: usize,
    pub malformed: usize,
    pub ticks: u64,
}

/// Drives a [`Cluster`] from recorded notifications
pub struct Replayer<B: VisualBackend> {
    cluster: Cluster<B>,
    queue: Arc<EventQueue>,
    producers: BTreeMap<ResourceKind, WatchProducer>,
    fallback_namespace: String,
    stats: ReplayStats,
}

impl<B: VisualBackend> Replayer<B> {
    /// Build a replayer whose cluster follows `config`
    ///
    /// Objects without `metadata.namespace` land in `fallback_namespace`.
    pub fn new(
        config: &KubechaserConfig,
        backend: B,
        fallback_namespace: impl Into<String>,
    ) -> Result<Self, ReplayError> {
        let queue = Arc::new(EventQueue::new());
        let cluster = Cluster::from_config(config, backend, Arc::clone(&queue))?;

        Ok(Self {
            cluster,
            queue,
            producers: BTreeMap::new(),
            fallback_namespace: fallback_namespace.into(),
            stats: ReplayStats::default(),
        })
    }

    pub fn cluster(&self) -> &Cluster<B> {
        &self.cluster
    }

    pub fn stats(&self) -> ReplayStats {
        self.stats
    }

    /// Feed one line, then tick until the queue is empty
    ///
    /// Blank lines are skipped and return `Ok(None)`.
    pub fn feed_line(&mut self, raw: &str) -> Result<Option<HandleOutcome>, ReplayError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        self.stats.lines += 1;
        let line = self.stats.lines;

        let mut value: Value =
            serde_json::from_str(trimmed).map_err(|source| ReplayError::Json { line, source })?;

        let action: WatchAction = value
            .get_mut("action")
            .map(Value::take)
            .ok_or(ReplayError::MissingField {
                line,
                field: "action",
            })
            .and_then(|v| {
                serde_json::from_value(v).map_err(|source| ReplayError::Json { line, source })
            })?;

        let kind_name = value
            .get("kind")
            .and_then(Value::as_str)
            .ok_or(ReplayError::MissingField { line, field: "kind" })?;
        let kind = parse_kind(kind_name).map_err(|_| ReplayError::UnsupportedKind {
            line,
            kind: kind_name.to_string(),
        })?;

        let object = value
            .get_mut("object")
            .map(Value::take)
            .ok_or(ReplayError::MissingField {
                line,
                field: "object",
            })?;

        let producer = self.producers.entry(kind).or_insert_with(|| {
            debug!(target: "kubechaser", "Opening replay stream for {}", kind);
            WatchProducer::new(Arc::clone(&self.queue), self.fallback_namespace.clone(), kind)
        });

        let outcome = producer.handle(WatchNotification::new(action, object));
        match outcome {
            HandleOutcome::Pushed(_) => self.stats.pushed += 1,
            HandleOutcome::Ignored => self.stats.ignored += 1,
            HandleOutcome::Malformed => self.stats.malformed += 1,
        }

        self.settle();
        Ok(Some(outcome))
    }

    /// Tick the cluster until every queued event has been dispatched
    pub fn settle(&mut self) {
        while !self.queue.is_empty() {
            self.cluster.tick();
            self.stats.ticks += 1;
        }
    }

    /// Let every pending fade finish, collect, and return the final layout
    ///
    /// `finish_fades` is handed the backend so a headless backend can mark
    /// its fades complete.
    pub fn finish(mut self, finish_fades: impl FnOnce(&mut B)) -> (LayoutSnapshot, ReplayStats) {
        self.settle();
        self.cluster.engine().with_backend(finish_fades);
        let report = self.cluster.engine().collect();

        info!(
            target: "kubechaser",
            "Replay finished: {} lines, {} events, {} evicted, {} still fading",
            self.stats.lines,
            self.stats.pushed,
            report.evicted.len(),
            report.still_pending
        );

        (self.cluster.engine().snapshot(), self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::HeadlessBackend;

    fn replayer() -> Replayer<HeadlessBackend> {
        Replayer::new(&KubechaserConfig::default(), HeadlessBackend::new(), "default").unwrap()
    }

    #[test]
    fn test_feed_line_places_object() {
        let mut replay = replayer();
        let outcome = replay
            .feed_line(r#"{"action":"ADDED","kind":"Pod","object":{"metadata":{"name":"p1"}}}"#)
            .unwrap();

        assert!(matches!(outcome, Some(HandleOutcome::Pushed(_))));
        assert_eq!(replay.cluster().engine().len(), 1);
        assert_eq!(
            replay.cluster().engine().snapshot().row_names("default"),
            vec![vec!["p1"]]
        );
    }

    #[test]
    fn test_blank_line_skipped() {
        let mut replay = replayer();
        assert!(replay.feed_line("   ").unwrap().is_none());
        assert_eq!(replay.stats().lines, 0);
    }

    #[test]
    fn test_bad_lines_report_line_number() {
        let mut replay = replayer();
        replay.feed_line("").unwrap();

        let err = replay.feed_line("{not json").unwrap_err();
        assert!(matches!(err, ReplayError::Json { line: 1, .. }));

        let err = replay
            .feed_line(r#"{"action":"ADDED","kind":"Gadget","object":{}}"#)
            .unwrap_err();
        assert!(matches!(err, ReplayError::UnsupportedKind { line: 2, .. }));

        let err = replay.feed_line(r#"{"kind":"Pod","object":{}}"#).unwrap_err();
        assert!(matches!(
            err,
            ReplayError::MissingField {
                line: 3,
                field: "action"
            }
        ));
    }

    #[test]
    fn test_modify_before_add_ignored() {
        let mut replay = replayer();
        let outcome = replay
            .feed_line(r#"{"action":"MODIFIED","kind":"Pod","object":{"metadata":{"name":"p1"}}}"#)
            .unwrap();

        assert_eq!(outcome, Some(HandleOutcome::Ignored));
        assert!(replay.cluster().engine().is_empty());
    }

    #[test]
    fn test_finish_evicts_deleted() {
        let mut replay = replayer();
        for line in [
            r#"{"action":"ADDED","kind":"Pod","object":{"metadata":{"name":"p1"}}}"#,
            r#"{"action":"ADDED","kind":"Pod","object":{"metadata":{"name":"p2"}}}"#,
            r#"{"action":"DELETED","kind":"Pod","object":{"metadata":{"name":"p1"}}}"#,
        ] {
            replay.feed_line(line).unwrap();
        }

        let (snapshot, stats) = replay.finish(|backend| {
            backend.complete_all_fades();
        });
        assert_eq!(snapshot.row_names("default"), vec![vec!["p2"]]);
        assert_eq!(stats.pushed, 3);
    }
}
