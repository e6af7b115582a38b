// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # kubechaser-events
//!
//! Ingestion side of KubeChaser: watch notifications are decoded once into
//! typed `ResourceEvent`s and pushed onto a shared `EventQueue`, which the
//! owning loop polls without ever blocking.
//!
//! ```text
//! watch stream → WatchProducer (tokio task) → EventQueue → owning loop
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod decode;
pub mod event;
pub mod producer;
pub mod queue;

pub use decode::{decode_object, decode_status, parse_kind, DecodedObject, CLUSTER_NAMESPACE};
pub use event::{EventType, ResourceEvent};
pub use producer::{
    spawn_watch_producer, HandleOutcome, ProducerEnd, ProducerSummary, WatchAction,
    WatchNotification, WatchProducer,
};
pub use queue::EventQueue;

/// Result type for event decoding
pub type EventResult<T> = Result<T, EventError>;

/// Errors raised while turning raw notifications into events
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Malformed object: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Unsupported resource kind: {0}")]
    UnsupportedKind(String),
}
