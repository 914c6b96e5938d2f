// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowdag contributors

//! New command - create an empty workflow document

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use super::emit;
use crate::pipeline::{DagDefinition, DocumentFormat};

/// Run the new command
pub async fn run(name: String, output: Option<PathBuf>) -> Result<()> {
    let dag = DagDefinition::new_workflow(&name);

    match output {
        Some(path) => {
            if path.exists() {
                return Err(miette::miette!(
                    "Refusing to overwrite existing file: {}",
                    path.display()
                ));
            }
            dag.save(&path)?;
            println!("{} Created workflow '{}' at {}", "✓".green(), name, path.display());
            Ok(())
        }
        None => emit(&dag.render(DocumentFormat::Yaml)?, None),
    }
}
