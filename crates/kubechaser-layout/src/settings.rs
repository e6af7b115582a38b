// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Typed layout settings built from `kubechaser_config::LayoutConfig`.

use rand::Rng;

use crate::kind::KindPrecedence;
use crate::types::{LayoutError, LayoutResult, Position};
use kubechaser_config::LayoutConfig;

/// Construction-time parameters for the slot table and visual spawning
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSettings {
    /// Distance between neighbouring slots on every axis
    pub stride: f32,
    pub precedence: KindPrecedence,
    /// Spawn new visuals at a random point before the first resync moves them
    pub scatter_spawn: bool,
    /// Size of the spawn box, centred on the origin
    pub spawn_extent: [f32; 3],
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            stride: 6.0,
            precedence: KindPrecedence::default(),
            scatter_spawn: true,
            spawn_extent: [1000.0, 200.0, 1000.0],
        }
    }
}

impl LayoutSettings {
    /// Convert the `[layout]` config section
    ///
    /// # Errors
    ///
    /// Returns error for a non-positive stride, a negative extent, or an
    /// unknown kind in the precedence table
    pub fn from_config(config: &LayoutConfig) -> LayoutResult<Self> {
        if !config.stride.is_finite() || config.stride <= 0.0 {
            return Err(LayoutError::InvalidStride(config.stride));
        }
        if config.spawn_extent.iter().any(|e| !e.is_finite() || *e < 0.0) {
            return Err(LayoutError::InvalidSetting(format!(
                "spawn_extent must be non-negative, got {:?}",
                config.spawn_extent
            )));
        }

        Ok(Self {
            stride: config.stride,
            precedence: KindPrecedence::from_config(&config.precedence)?,
            scatter_spawn: config.scatter_spawn,
            spawn_extent: config.spawn_extent,
        })
    }

    /// Where a freshly created visual appears
    pub fn spawn_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        if !self.scatter_spawn {
            return Position::ORIGIN;
        }
        let [x, y, z] = self.spawn_extent;
        Position::new(scatter(rng, x), scatter(rng, y), scatter(rng, z))
    }
}

fn scatter<R: Rng + ?Sized>(rng: &mut R, extent: f32) -> f32 {
    rng.gen::<f32>() * extent - extent / 2.0
}
