// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowdag contributors

//! Levels command - show how steps are laid out in columns

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use crate::pipeline::{compute_levels, DagDefinition};
use crate::utils::print_header;

/// Run the levels command
pub async fn run(dag_path: PathBuf, verbose: bool) -> Result<()> {
    let dag = DagDefinition::from_file(&dag_path)?;
    let levels = compute_levels(&dag.steps);

    print_header(&format!("Levels of '{}'", dag.name));

    for (level, indices) in levels.iter().enumerate() {
        println!();
        println!("{} {}", "Level".bold(), level.to_string().bold());
        for &idx in indices {
            let step = &dag.steps[idx];
            let deps = if verbose && !step.depends_on.is_empty() {
                format!(" [after: {}]", step.depends_on.join(", "))
            } else {
                String::new()
            };
            println!("  {} {} ({}){}", "•".cyan(), step.id, step.action, deps.dimmed());
        }
    }

    if levels.is_empty() {
        println!();
        println!("{}", "Pipeline has no steps.".dimmed());
    }

    Ok(())
}
