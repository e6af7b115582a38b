// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{validate_config, ConfigError, ConfigResult, KubechaserConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "kubechaser.toml";

/// Find the KubeChaser configuration file
///
/// Search order:
/// 1. `KUBECHASER_CONFIG_PATH` environment variable
/// 2. Current working directory: `./kubechaser.toml`
/// 3. Parent directories (searches up to 5 levels)
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("KUBECHASER_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by KUBECHASER_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();

    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd.clone();
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join(CONFIG_FILE_NAME));
                current = parent.to_path_buf();
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "KubeChaser configuration file '{}' not found in any of these locations:\n{}\n\n\
         Set KUBECHASER_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found, contains invalid TOML, or fails validation
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<KubechaserConfig> {
    let config_file = if let Some(path) = config_path {
        path.to_path_buf()
    } else {
        find_config_file()?
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: KubechaserConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);

    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    validate_config(&config)?;
    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `KUBECHASER_STRIDE` -> `layout.stride`
/// - `KUBECHASER_SCATTER_SPAWN` -> `layout.scatter_spawn`
/// - `KUBECHASER_POP_EVERY_TICKS` -> `runtime.pop_every_ticks`
/// - `KUBECHASER_COLLECT_EVERY_TICKS` -> `runtime.collect_every_ticks`
/// - `KUBECHASER_EVENTS_PER_POP` -> `runtime.events_per_pop`
/// - `KUBECHASER_WATCH_IDLE_TIMEOUT_SECS` -> `watch.idle_timeout_secs`
/// - `KUBECHASER_LOG_LEVEL` -> `logging.level`
/// - `KUBECHASER_LOG_DIR` -> `logging.log_dir`
pub fn apply_environment_overrides(config: &mut KubechaserConfig) {
    let values: HashMap<String, String> = [
        ("stride", "KUBECHASER_STRIDE"),
        ("scatter_spawn", "KUBECHASER_SCATTER_SPAWN"),
        ("pop_every_ticks", "KUBECHASER_POP_EVERY_TICKS"),
        ("collect_every_ticks", "KUBECHASER_COLLECT_EVERY_TICKS"),
        ("events_per_pop", "KUBECHASER_EVENTS_PER_POP"),
        ("watch_idle_timeout_secs", "KUBECHASER_WATCH_IDLE_TIMEOUT_SECS"),
        ("log_level", "KUBECHASER_LOG_LEVEL"),
        ("log_dir", "KUBECHASER_LOG_DIR"),
    ]
    .into_iter()
    .filter_map(|(key, var)| env::var(var).ok().map(|value| (key.to_string(), value)))
    .collect();

    apply_overrides(config, &values);
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"stride": "8", "log_level": "debug"}`)
pub fn apply_cli_overrides(config: &mut KubechaserConfig, cli_args: &HashMap<String, String>) {
    apply_overrides(config, cli_args);
}

fn apply_overrides(config: &mut KubechaserConfig, values: &HashMap<String, String>) {
    // Layout settings
    if let Some(value) = values.get("stride") {
        if let Ok(stride) = value.parse::<f32>() {
            config.layout.stride = stride;
        }
    }
    if let Some(value) = values.get("scatter_spawn") {
        config.layout.scatter_spawn = parse_flag(value);
    }

    // Runtime settings
    if let Some(value) = values.get("pop_every_ticks") {
        if let Ok(ticks) = value.parse::<u64>() {
            config.runtime.pop_every_ticks = ticks;
        }
    }
    if let Some(value) = values.get("collect_every_ticks") {
        if let Ok(ticks) = value.parse::<u64>() {
            config.runtime.collect_every_ticks = ticks;
        }
    }
    if let Some(value) = values.get("events_per_pop") {
        if let Ok(count) = value.parse::<usize>() {
            config.runtime.events_per_pop = count;
        }
    }

    // Watch settings
    if let Some(value) = values.get("watch_idle_timeout_secs") {
        if let Ok(secs) = value.parse::<u64>() {
            config.watch.idle_timeout_secs = secs;
        }
    }

    // Logging settings
    if let Some(value) = values.get("log_level") {
        config.logging.level = value.clone();
    }
    if let Some(value) = values.get("log_dir") {
        config.logging.log_dir = PathBuf::from(value);
    }
}

fn parse_flag(value: &str) -> bool {
    let lowered = value.to_lowercase();
    lowered == "true" || lowered == "1" || lowered == "yes"
}
