// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowdag contributors

//! Validate command - check pipeline documents

use colored::Colorize;
use miette::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::{load_config, OutputFormat};
use crate::actions::ActionRegistry;
use crate::config::FlowdagConfig;
use crate::errors::{FlowdagError, RecoverySuggestion};
use crate::pipeline::{
    dag_to_flow_with_layout, param_findings, DagDefinition, PipelineValidation, PipelineValidator,
    Severity,
};
use crate::utils::{print_error, print_section, print_success, print_warning};

/// Validation outcome for one file
#[derive(Debug, Serialize)]
struct FileReport {
    file: PathBuf,
    #[serde(flatten)]
    validation: PipelineValidation,
}

/// Run the validate command
pub async fn run(
    patterns: Vec<String>,
    format: OutputFormat,
    config_path: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let registry = config.registry().await;
    let validator = config.validator();

    let files = expand_patterns(&patterns)?;
    if files.is_empty() {
        return Err(miette::miette!(
            "No pipeline files matched: {}",
            patterns.join(", ")
        ));
    }

    let mut reports = Vec::with_capacity(files.len());
    for file in files {
        let validation = validate_file(&file, &config, &validator, &registry)?;
        reports.push(FileReport { file, validation });
    }

    let failed = reports.iter().filter(|r| !r.validation.valid).count();

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&reports).map_err(FlowdagError::from)?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            for report in &reports {
                print_report(report, verbose);
            }
            println!();
            if failed == 0 {
                println!("{}", "All pipelines are valid!".green().bold());
            }
        }
    }

    if failed > 0 {
        Err(miette::miette!(
            "{} of {} pipeline(s) failed validation",
            failed,
            reports.len()
        ))
    } else {
        Ok(())
    }
}

/// Structural and param validation of one pipeline file
pub(crate) fn validate_file(
    path: &Path,
    config: &FlowdagConfig,
    validator: &PipelineValidator,
    registry: &ActionRegistry,
) -> Result<PipelineValidation> {
    let dag = DagDefinition::from_file(path)?;
    let graph = dag_to_flow_with_layout(&dag, &config.layout);

    let mut validation = validator.validate_graph(&graph);
    if config.validation.check_params {
        validation.extend(param_findings(
            &graph.nodes,
            registry,
            config.validation.exempt_hidden_params,
        ));
    }

    tracing::debug!(
        file = %path.display(),
        errors = validation.error_count(),
        warnings = validation.warning_count(),
        "validated pipeline"
    );
    Ok(validation)
}

/// Expand glob patterns; plain paths pass through untouched
fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            files.push(PathBuf::from(pattern));
            continue;
        }

        let entries = glob::glob(pattern).map_err(FlowdagError::from)?;
        for entry in entries {
            match entry {
                Ok(path) => files.push(path),
                Err(e) => tracing::warn!(error = %e, "skipping unreadable path"),
            }
        }
    }

    files.dedup();
    Ok(files)
}

fn print_report(report: &FileReport, verbose: bool) {
    print_section(&report.file.display().to_string());

    let validation = &report.validation;
    if validation.errors.is_empty() {
        print_success("No problems found");
        return;
    }

    for finding in &validation.errors {
        let location = finding
            .node_id
            .as_deref()
            .map(|id| format!(" [{}]", id).dimmed().to_string())
            .unwrap_or_default();
        let line = format!("{}{}", finding.message, location);

        match finding.severity {
            Severity::Error => print_error(&line),
            Severity::Warning => print_warning(&line),
        }

        if verbose {
            if let Some(suggestion) = RecoverySuggestion::for_finding(finding) {
                for line in suggestion.to_string().lines() {
                    println!("      {}", line.dimmed());
                }
            }
        }
    }

    if validation.valid {
        println!(
            "  {}",
            format!("valid with {} warning(s)", validation.warning_count()).yellow()
        );
    } else {
        println!(
            "  {}",
            format!(
                "{} error(s), {} warning(s)",
                validation.error_count(),
                validation.warning_count()
            )
            .red()
        );
    }
}
