// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Ensures configuration values are within valid ranges and don't conflict
//! with each other. Kind names in the precedence table are checked later,
//! when the layout crate turns the table into typed settings.

use crate::{ConfigError, ConfigResult, KubechaserConfig};
use std::collections::HashSet;

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    DuplicateKind { kind: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateKind { kind } => {
                write!(f, "Kind {} appears more than once in layout.precedence", kind)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &KubechaserConfig) -> ConfigResult<()> {
    let errors = collect_errors(config);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

/// Run every check and return the individual failures
pub fn collect_errors(config: &KubechaserConfig) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();
    validate_layout(config, &mut errors);
    validate_runtime(config, &mut errors);
    errors
}

fn validate_layout(config: &KubechaserConfig, errors: &mut Vec<ConfigValidationError>) {
    let layout = &config.layout;

    if !layout.stride.is_finite() || layout.stride <= 0.0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "layout.stride".to_string(),
            reason: format!("must be a positive number, got {}", layout.stride),
        });
    }

    for (axis, extent) in ["x", "y", "z"].iter().zip(layout.spawn_extent.iter()) {
        if !extent.is_finite() || *extent < 0.0 {
            errors.push(ConfigValidationError::InvalidValue {
                field: format!("layout.spawn_extent.{}", axis),
                reason: format!("must be zero or positive, got {}", extent),
            });
        }
    }

    let mut seen = HashSet::new();
    for entry in &layout.precedence {
        if !seen.insert(entry.kind.as_str()) {
            errors.push(ConfigValidationError::DuplicateKind {
                kind: entry.kind.clone(),
            });
        }
    }
}

fn validate_runtime(config: &KubechaserConfig, errors: &mut Vec<ConfigValidationError>) {
    let runtime = &config.runtime;

    if runtime.pop_every_ticks == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "runtime.pop_every_ticks".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if runtime.collect_every_ticks == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "runtime.collect_every_ticks".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if runtime.events_per_pop == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "runtime.events_per_pop".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PrecedenceEntry;

    #[test]
    fn test_valid_default_config() {
        assert!(collect_errors(&KubechaserConfig::default()).is_empty());
    }

    #[test]
    fn test_zero_stride_rejected() {
        let mut config = KubechaserConfig::default();
        config.layout.stride = 0.0;

        let errors = collect_errors(&config);
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            ConfigValidationError::InvalidValue { field, .. } if field == "layout.stride"
        ));
    }

    #[test]
    fn test_nan_stride_rejected() {
        let mut config = KubechaserConfig::default();
        config.layout.stride = f32::NAN;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_duplicate_kind_rejected() {
        let mut config = KubechaserConfig::default();
        config.layout.precedence.push(PrecedenceEntry::new("Pod", 7));

        let errors = collect_errors(&config);
        assert_eq!(
            errors,
            vec![ConfigValidationError::DuplicateKind {
                kind: "Pod".to_string()
            }]
        );
    }

    #[test]
    fn test_all_errors_reported_together() {
        let mut config = KubechaserConfig::default();
        config.runtime.pop_every_ticks = 0;
        config.runtime.collect_every_ticks = 0;
        config.layout.spawn_extent = [-1.0, 0.0, 0.0];

        let errors = collect_errors(&config);
        assert_eq!(errors.len(), 3);

        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("runtime.pop_every_ticks"));
        assert!(message.contains("runtime.collect_every_ticks"));
        assert!(message.contains("layout.spawn_extent.x"));
    }
}
