// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-RaccoonInspect-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Raccoon Inspect and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Raccoon Inspect replay harness.
//!
//! Replays a scenario file against an in-memory page and prints every message the selector
//! posts to its parent frame, one JSON object per line. A one-line summary goes to stderr.

use std::error::Error;

use raccoon_inspect::channel::protocol_schema;
use raccoon_inspect::replay::{self, Scenario};

const LOG_ENV: &str = "RACCOON_LOG";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} <scenario.json> [--capture] [--log <level>]\n  {program} --schema\n\n--capture attaches outline screenshots to submitted selections.\n--log sets the log filter (default: `{LOG_ENV}` or `warn`). Logs go to stderr.\n--schema prints the JSON schemas of the frame protocol and exits."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    scenario: Option<String>,
    capture: bool,
    schema: bool,
    log: Option<String>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--capture" => {
                if options.capture {
                    return Err(());
                }
                options.capture = true;
            }
            "--schema" => {
                if options.schema {
                    return Err(());
                }
                options.schema = true;
            }
            "--log" => {
                if options.log.is_some() {
                    return Err(());
                }
                options.log = Some(args.next().ok_or(())?);
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.scenario.is_some() {
                    return Err(());
                }
                options.scenario = Some(arg);
            }
        }
    }

    if options.schema == options.scenario.is_some() {
        return Err(());
    }
    if options.schema && options.capture {
        return Err(());
    }

    Ok(options)
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => tracing_subscriber::EnvFilter::new(level),
        None => tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "raccoon-inspect".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };
        init_tracing(options.log.as_deref());

        if options.schema {
            println!("{}", serde_json::to_string_pretty(&protocol_schema())?);
            return Ok(());
        }

        let path = options.scenario.unwrap_or_default();
        let raw = std::fs::read_to_string(&path)
            .map_err(|err| format!("failed to read scenario `{path}`: {err}"))?;
        let scenario = Scenario::from_json(&raw)?;

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        let local = tokio::task::LocalSet::new();
        let report = local.block_on(&runtime, replay::run(&scenario, options.capture))?;

        for message in &report.outbound {
            println!("{}", serde_json::to_string(message)?);
        }
        eprintln!("raccoon-inspect: {report}");
        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("raccoon-inspect: {err}");
        std::process::exit(1);
    }
}
