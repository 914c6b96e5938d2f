// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowdag contributors

//! Actions command - browse the action catalog

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use super::load_config;
use crate::actions::{ActionMeta, ActionRegistry};
use crate::utils::{print_header, print_section};

/// Run the actions command
pub async fn run(
    category: Option<String>,
    action: Option<String>,
    config_path: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let registry = config.registry().await;

    if let Some(action) = action {
        let meta = registry.meta(&action);
        if !registry.contains(&action) {
            println!(
                "{} '{}' is not in the catalog; editors show it as a placeholder.",
                "Note:".yellow().bold(),
                action
            );
            println!();
        }
        print_action_details(&meta);
        return Ok(());
    }

    list_categories(&registry, category.as_deref(), verbose)
}

fn list_categories(registry: &ActionRegistry, only: Option<&str>, verbose: bool) -> Result<()> {
    let categories: Vec<_> = registry
        .categories()
        .iter()
        .filter(|c| only.map_or(true, |id| c.id == id))
        .collect();

    if categories.is_empty() {
        return Err(miette::miette!(
            "Unknown category: {}\n\nAvailable: {}",
            only.unwrap_or_default(),
            registry
                .categories()
                .iter()
                .map(|c| c.id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    print_header("Action catalog");

    for category in categories {
        print_section(&format!("{} ({})", category.label, category.id));
        for meta in &category.actions {
            println!(
                "  {} {:<16} {}",
                meta.icon,
                meta.value.cyan(),
                meta.label
            );
            if verbose && !meta.description.is_empty() {
                println!("      {}", meta.description.dimmed());
            }
        }
    }

    Ok(())
}

fn print_action_details(meta: &ActionMeta) {
    print_header(&format!("{} {}", meta.icon, meta.label));
    println!("  Kind:  {}", meta.value.cyan());
    println!("  Color: {}", meta.color);
    if !meta.description.is_empty() {
        println!("  {}", meta.description);
    }

    print_section("Parameters");
    if meta.params.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for param in &meta.params {
        let required = if param.required {
            " required".red().to_string()
        } else {
            String::new()
        };
        println!(
            "  • {} ({}){}",
            param.name.bold(),
            param.param_type,
            required
        );

        let mut notes = Vec::new();
        if let Some(ref default) = param.default {
            notes.push(format!("default: {}", default));
        }
        if param.min.is_some() || param.max.is_some() {
            notes.push(format!(
                "range: {}..{}",
                param.min.map(|v| v.to_string()).unwrap_or_default(),
                param.max.map(|v| v.to_string()).unwrap_or_default()
            ));
        }
        if let Some(ref pattern) = param.pattern {
            notes.push(format!("pattern: {}", pattern));
        }
        if !param.options.is_empty() {
            let values: Vec<&str> = param.options.iter().map(|o| o.value.as_str()).collect();
            notes.push(format!("options: {}", values.join(", ")));
        }
        if let Some(ref cond) = param.show_when {
            notes.push(format!("shown when {} = {}", cond.field, cond.equals));
        }
        for note in notes {
            println!("      {}", note.dimmed());
        }
    }

    if !meta.outputs.is_empty() {
        print_section("Outputs");
        for output in &meta.outputs {
            println!("  • {} {}", output.name.bold(), output.description.dimmed());
        }
    }
}
