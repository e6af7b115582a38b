// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Core types shared by the layout modules.
*/

use serde::{Deserialize, Serialize};

/// Result type for layout operations
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Errors raised while building layout settings
///
/// Table operations themselves never fail; duplicate inserts and unknown
/// signatures are treated as no-ops.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("Unknown resource kind: {0}")]
    UnknownKind(String),

    #[error("Invalid stride: {0}")]
    InvalidStride(f32),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}

/// Point in scene space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub const ORIGIN: Position = Position {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Offset of the slot at (`row`, `namespace`, `column`) for a given stride
    ///
    /// Rows advance along x, namespaces along y, and entries within a row along z.
    pub fn slot(row: usize, namespace: usize, column: usize, stride: f32) -> Self {
        Self {
            x: row as f32 * stride,
            y: namespace as f32 * stride,
            z: column as f32 * stride,
        }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f32; 3]> for Position {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_offsets() {
        assert_eq!(Position::slot(0, 0, 0, 6.0), Position::ORIGIN);
        assert_eq!(Position::slot(2, 1, 3, 6.0), Position::new(12.0, 6.0, 18.0));
    }

    #[test]
    fn test_error_display() {
        let err = LayoutError::UnknownKind("Widget".to_string());
        assert_eq!(err.to_string(), "Unknown resource kind: Widget");
    }
}
