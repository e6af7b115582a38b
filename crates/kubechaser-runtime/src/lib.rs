// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # kubechaser-runtime
//!
//! The owning loop. A `Cluster` is ticked by whatever drives the scene
//! (typically the render loop); on a fixed cadence it pops queued events
//! into the layout engine and sweeps finished fade-outs.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cluster;

pub use cluster::{Cluster, DispatchOutcome, TickReport};
