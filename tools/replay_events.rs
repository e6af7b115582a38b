// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Watch Event Replay Tool

Feeds a recorded JSON-lines watch stream through the layout engine with a
headless backend and prints the final slot layout as JSON.

Usage:
  cargo run --bin replay_events -- [--config <path>] [--namespace <ns>] <events.jsonl | ->

Each line: {"action": "ADDED|MODIFIED|DELETED", "kind": "<Kind>", "object": {...}}

Debug output per crate: --debug-kubechaser-layout, --debug-all, or KUBECHASER_DEBUG.
*/

use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use kubechaser::config::{
    apply_environment_overrides, find_config_file, load_config, KubechaserConfig,
};
use kubechaser::layout::HeadlessBackend;
use kubechaser::observability::{debug_flags_help, init_logging, parse_debug_flags};
use kubechaser::replay::Replayer;
use tracing::warn;

struct Args {
    config: Option<PathBuf>,
    namespace: String,
    input: String,
}

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: replay_events [--config <path>] [--namespace <ns>] <events.jsonl | ->\n\n\
         Defaults:\n\
         - config: $KUBECHASER_CONFIG_PATH or ./kubechaser.toml, built-in defaults if absent\n\
         - namespace: default (used when an object has no metadata.namespace)\n\n{}",
        debug_flags_help()
    );
    process::exit(2);
}

fn parse_args() -> Args {
    let mut config = None;
    let mut namespace = "default".to_string();
    let mut input = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                config = Some(PathBuf::from(v));
            }
            "--namespace" => {
                namespace = args.next().unwrap_or_else(|| usage_and_exit());
            }
            "-h" | "--help" => usage_and_exit(),
            other if other.starts_with("--debug-") => {}
            other if input.is_none() => input = Some(other.to_string()),
            other => {
                eprintln!("Unexpected argument: {other}");
                usage_and_exit();
            }
        }
    }

    let Some(input) = input else {
        usage_and_exit();
    };

    Args {
        config,
        namespace,
        input,
    }
}

fn resolve_config(explicit: Option<&PathBuf>) -> Result<KubechaserConfig> {
    if let Some(path) = explicit {
        return load_config(Some(path.as_path()), None)
            .with_context(|| format!("Failed to load {}", path.display()));
    }

    match find_config_file() {
        Ok(path) => load_config(Some(path.as_path()), None)
            .with_context(|| format!("Failed to load {}", path.display())),
        Err(_) => {
            let mut config = KubechaserConfig::default();
            apply_environment_overrides(&mut config);
            Ok(config)
        }
    }
}

fn main() -> Result<()> {
    let args = parse_args();
    let config = resolve_config(args.config.as_ref())?;

    let flags = parse_debug_flags();
    let log_dir = config
        .logging
        .file_logging
        .then_some(config.logging.log_dir.as_path());
    let _guard = init_logging(&flags, &config.logging.level, log_dir)?;

    let reader: Box<dyn BufRead> = if args.input == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(&args.input)
            .with_context(|| format!("Failed to open {}", args.input))?;
        Box::new(BufReader::new(file))
    };

    let mut replayer = Replayer::new(&config, HeadlessBackend::new(), args.namespace)?;
    for line in reader.lines() {
        let line = line.context("Failed to read input")?;
        if let Err(err) = replayer.feed_line(&line) {
            warn!(target: "kubechaser", "Skipping input: {}", err);
        }
    }

    let (snapshot, stats) = replayer.finish(|backend| {
        backend.complete_all_fades();
    });

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    eprintln!(
        "{} lines, {} events pushed, {} ignored, {} malformed, {} ticks",
        stats.lines, stats.pushed, stats.ignored, stats.malformed, stats.ticks
    );
    Ok(())
}
