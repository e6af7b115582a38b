// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # kubechaser-observability
//!
//! Logging setup shared by every KubeChaser crate.
//!
//! Each crate logs under its own `tracing` target (`kubechaser-layout`,
//! `kubechaser-events`, ...). Debug output is switched on per crate with
//! `--debug-<crate>` flags or the `KUBECHASER_DEBUG` environment variable,
//! and `init_logging` wires the resulting filter into a console layer plus
//! an optional JSON file layer.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Tracing targets used across the workspace
pub const KNOWN_CRATES: &[&str] = &[
    "kubechaser-config",
    "kubechaser-layout",
    "kubechaser-events",
    "kubechaser-runtime",
    "kubechaser",
];
