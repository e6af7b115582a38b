// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `kubechaser.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct KubechaserConfig {
    pub layout: LayoutConfig,
    pub runtime: RuntimeConfig,
    pub watch: WatchConfig,
    pub logging: LoggingConfig,
}

/// One row of the resource-kind precedence table
///
/// Lower ranks are laid out first within a row. Kinds that do not appear in
/// the table are unranked and sort after every ranked kind.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PrecedenceEntry {
    /// Kubernetes kind name, e.g. `"Deployment"`
    pub kind: String,
    pub rank: u32,
}

impl PrecedenceEntry {
    pub fn new(kind: impl Into<String>, rank: u32) -> Self {
        Self {
            kind: kind.into(),
            rank,
        }
    }
}

/// Slot layout configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Distance between neighbouring slots on every axis
    pub stride: f32,
    pub precedence: Vec<PrecedenceEntry>,
    /// Spawn new visuals at a random point before they travel to their slot
    pub scatter_spawn: bool,
    /// Size of the box (centred on the origin) used for scattered spawns
    pub spawn_extent: [f32; 3],
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            stride: 6.0,
            precedence: vec![
                PrecedenceEntry::new("Deployment", 0),
                PrecedenceEntry::new("StatefulSet", 0),
                PrecedenceEntry::new("DaemonSet", 0),
                PrecedenceEntry::new("CronJob", 0),
                PrecedenceEntry::new("ReplicaSet", 1),
                PrecedenceEntry::new("Job", 1),
                PrecedenceEntry::new("Pod", 2),
            ],
            scatter_spawn: true,
            spawn_extent: [1000.0, 200.0, 1000.0],
        }
    }
}

/// Owning-loop cadence
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Pop events every N loop ticks
    pub pop_every_ticks: u64,
    /// Sweep pending deletions every N loop ticks
    pub collect_every_ticks: u64,
    /// Maximum events dispatched per pop tick
    pub events_per_pop: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            pop_every_ticks: 10,
            collect_every_ticks: 20,
            events_per_pop: 1,
        }
    }
}

/// Watch producer configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WatchConfig {
    /// A producer stops after this long without a notification
    pub idle_timeout_secs: u64,
}

impl WatchConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 30 * 60,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Base directory for run folders when file logging is enabled
    pub log_dir: PathBuf,
    pub file_logging: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: PathBuf::from("./logs"),
            file_logging: false,
        }
    }
}
