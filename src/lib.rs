// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # KubeChaser
//!
//! Live 3D placement of Kubernetes resources. Every object gets a stable slot
//! on a grid: one horizontal band per namespace, one row per ownership group
//! (a Deployment, its ReplicaSets and their Pods share a row), and one column
//! per position inside the row. Rows merge when a late-arriving owner bridges
//! two groups, and a deleted object keeps its slot until its fade-out finishes.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! kubechaser = "0.0.1-beta.1"  # Default: runtime + observability
//! ```
//!
//! ## Feature Flags
//!
//! - **`runtime`** (default): event queue, watch producers and the tick loop
//! - **`events`**: only the event queue and watch producers
//! - **`observability`** (default): per-crate debug flags and logging setup
//!
//! The config and layout crates are always available.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use kubechaser::prelude::*;
//!
//! let queue = Arc::new(EventQueue::new());
//! let mut cluster = Cluster::new(
//!     LayoutSettings::default(),
//!     RuntimeConfig::default(),
//!     HeadlessBackend::new(),
//!     Arc::clone(&queue),
//! );
//!
//! queue.push_event(
//!     EventType::Create,
//!     ResourceKind::Deployment,
//!     "web",
//!     "shop",
//!     Vec::new(),
//!     ResourceStatus::default(),
//! );
//! cluster.tick();
//! assert_eq!(cluster.engine().len(), 1);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: kubechaser-config, kubechaser-observability│
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Core: kubechaser-layout                                │
//! │  (slot table, allocator, row merge, garbage collector)  │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Ingestion: kubechaser-events                           │
//! │  (event queue, watch producers)                         │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Owning loop: kubechaser-runtime                        │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

pub use kubechaser_config as config;
pub use kubechaser_layout as layout;

#[cfg(feature = "events")]
pub use kubechaser_events as events;

#[cfg(feature = "runtime")]
pub use kubechaser_runtime as runtime;

#[cfg(feature = "observability")]
pub use kubechaser_observability as observability;

#[cfg(feature = "runtime")]
pub mod replay;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::config::{load_config, KubechaserConfig, RuntimeConfig};
    pub use crate::layout::prelude::*;
    pub use crate::layout::{LayoutSnapshot, ObjectState, Position, Reservation};

    #[cfg(feature = "events")]
    pub use crate::events::{
        spawn_watch_producer, EventQueue, EventType, ResourceEvent, WatchAction,
        WatchNotification, WatchProducer,
    };

    #[cfg(feature = "runtime")]
    pub use crate::runtime::{Cluster, DispatchOutcome, TickReport};

    #[cfg(feature = "runtime")]
    pub use crate::replay::{ReplayError, ReplayStats, Replayer};

    #[cfg(feature = "observability")]
    pub use crate::observability::{init_console_logging, init_logging, parse_debug_flags};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_facade_imports() {
        use crate::prelude::*;
        let sig = ResourceSignature::new(ResourceKind::Pod, "p", "ns");
        assert_eq!(sig.canonical(), "ns/Pod/p");
    }
}
