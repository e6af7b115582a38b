// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # kubechaser-layout
//!
//! Placement and lifecycle engine for KubeChaser scenes.
//!
//! Every live resource gets a slot in a namespace-keyed table of rows. Rows
//! hold ownership chains (Deployment → ReplicaSet → Pod) in precedence
//! order, and each slot maps to a grid position:
//!
//! ```text
//! x = row index × stride
//! y = namespace index × stride
//! z = position within row × stride
//! ```
//!
//! ## Modules
//! - `signature`: resource identity and canonical keys
//! - `kind`: resource kinds and in-row precedence
//! - `table`, `allocator`, `merge`: the slot table, insertion and row merging
//! - `gc`: fade-out tracking and eviction
//! - `visual`: the outbound rendering interface and a headless backend
//! - `engine`: thread-safe facade used by the owning loop
//!
//! ## Usage
//!
//! ```rust
//! use kubechaser_layout::prelude::*;
//!
//! let engine = LayoutEngine::new(LayoutSettings::default(), HeadlessBackend::new());
//! let d1 = ResourceSignature::new(ResourceKind::Deployment, "web", "default");
//! let rs1 = ResourceSignature::new(ResourceKind::ReplicaSet, "web-5d9c7", "default");
//!
//! engine.reserve(d1.clone(), vec![], ResourceStatus::Opaque);
//! engine.reserve(rs1, vec![d1], ResourceStatus::Opaque);
//!
//! assert_eq!(engine.snapshot().row_names("default"), vec![vec!["web", "web-5d9c7"]]);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod allocator;
pub mod engine;
pub mod gc;
pub mod kind;
pub mod merge;
pub mod settings;
pub mod signature;
pub mod slot;
pub mod snapshot;
pub mod status;
pub mod table;
pub mod types;
pub mod visual;

pub use allocator::Reservation;
pub use engine::LayoutEngine;
pub use gc::{CollectReport, PendingDeletion, PendingDeletions};
pub use kind::{KindPrecedence, PlacementClass, ResourceKind};
pub use merge::FlattenOutcome;
pub use settings::LayoutSettings;
pub use signature::{signature, ResourceSignature};
pub use slot::{Row, SlotEntry};
pub use snapshot::{EntrySnapshot, LayoutSnapshot, NamespaceBounds, NamespaceSnapshot};
pub use status::{JobCounts, ObjectState, PodPhase, ReplicaCounts, ResourceStatus};
pub use table::{Eviction, Placement, SlotTable};
pub use types::{LayoutError, LayoutResult, Position};
pub use visual::{HeadlessBackend, HeadlessVisual, VisualBackend, VisualHandle, VisualStyle};

pub mod prelude {
    pub use crate::engine::LayoutEngine;
    pub use crate::kind::ResourceKind;
    pub use crate::settings::LayoutSettings;
    pub use crate::signature::ResourceSignature;
    pub use crate::status::ResourceStatus;
    pub use crate::visual::{HeadlessBackend, VisualBackend};
}
