// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowdag contributors

//! Watch command - re-validate a pipeline on file changes

use colored::Colorize;
use miette::Result;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;

use super::load_config;
use super::validate::validate_file;
use crate::actions::ActionRegistry;
use crate::config::FlowdagConfig;
use crate::pipeline::{PipelineValidator, Severity};
use crate::utils::{print_error, print_success, print_warning};

/// Run the watch command
pub async fn run(
    dag_path: PathBuf,
    debounce_ms: u64,
    config_path: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    if !dag_path.exists() {
        return Err(miette::miette!(
            "Pipeline file not found: {}\n\n\
             Run 'flowdag new <NAME> -o {}' to create one.",
            dag_path.display(),
            dag_path.display()
        ));
    }

    let config = load_config(config_path.as_deref())?;
    let registry = config.registry().await;
    let validator = config.validator();

    let watched = dag_path
        .canonicalize()
        .map_err(|e| miette::miette!("Failed to resolve '{}': {}", dag_path.display(), e))?;
    let dir = watched.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();

    println!("{}", "Starting watch mode...".bold());
    println!("Watching {} (debounce: {}ms)", dag_path.display(), debounce_ms);
    println!("Press {} to exit.", "Ctrl+C".cyan());
    println!();

    let (tx, rx) = channel();

    let mut debouncer = new_debouncer(Duration::from_millis(debounce_ms), tx)
        .map_err(|e| miette::miette!("Failed to create file watcher: {}", e))?;

    // Editors often replace files instead of writing in place, so watch the directory.
    debouncer
        .watcher()
        .watch(&dir, RecursiveMode::NonRecursive)
        .map_err(|e| miette::miette!("Failed to start watching: {}", e))?;

    report(&dag_path, &config, &validator, &registry, verbose);

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed = events
                    .iter()
                    .filter(|e| matches!(e.kind, DebouncedEventKind::Any))
                    .any(|e| e.path == watched);

                if changed {
                    println!();
                    println!("{}", "─".repeat(50).dimmed());
                    println!("{}: {}", "Change detected".yellow(), dag_path.display());
                    println!();
                    report(&dag_path, &config, &validator, &registry, verbose);
                }
            }
            Ok(Err(e)) => {
                eprintln!("{}: {:?}", "Watch error".red(), e);
            }
            Err(e) => {
                eprintln!("{}: {}", "Channel error".red(), e);
                break;
            }
        }
    }

    Ok(())
}

fn report(
    path: &Path,
    config: &FlowdagConfig,
    validator: &PipelineValidator,
    registry: &ActionRegistry,
    verbose: bool,
) {
    let validation = match validate_file(path, config, validator, registry) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{}: {}", "Failed to load pipeline".red(), e);
            return;
        }
    };

    for finding in &validation.errors {
        match finding.severity {
            Severity::Error => print_error(&finding.message),
            Severity::Warning if verbose || !validation.valid => print_warning(&finding.message),
            Severity::Warning => {}
        }
    }

    if validation.valid {
        let suffix = if validation.has_warnings() && !verbose {
            format!(" ({} warning(s), -v to show)", validation.warning_count())
        } else {
            String::new()
        };
        print_success(&format!("Pipeline is valid{}", suffix));
    } else {
        println!(
            "{}",
            format!("Pipeline has {} error(s)", validation.error_count()).red()
        );
    }
}
