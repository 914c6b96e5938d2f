// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowdag contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for flowdag.

pub mod actions;
pub mod dag;
pub mod flow;
pub mod graph;
pub mod levels;
pub mod new;
pub mod params;
pub mod validate;
pub mod watch;

use clap::{Parser, Subcommand};
use miette::Result;
use std::path::{Path, PathBuf};

use crate::config::FlowdagConfig;
use crate::errors::FlowdagError;
use crate::pipeline::DocumentFormat;

/// Pipeline DAG toolkit
///
/// Convert pipelines between step lists and editable graphs, and validate them.
#[derive(Parser, Debug)]
#[clap(
    name = "flowdag",
    version,
    about = "Pipeline DAG toolkit: conversion, layout and validation",
    long_about = None,
    after_help = "Examples:\n\
        flowdag new triage -o triage.yaml      Create an empty workflow\n\
        flowdag validate 'pipelines/*.yaml'    Validate pipelines\n\
        flowdag flow triage.yaml -o graph.json Export the editor graph\n\
        flowdag graph triage.yaml -f mermaid   Draw the pipeline\n\n\
        See 'flowdag <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: ./.flowdag.toml, then the user config dir)
    #[clap(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate pipeline documents
    Validate {
        /// Files or glob patterns
        #[clap(required = true)]
        files: Vec<String>,

        /// Output format
        #[clap(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Convert a pipeline into an editor graph (JSON)
    Flow {
        /// Pipeline file
        dag: PathBuf,

        /// Output file (default: stdout)
        #[clap(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert an editor graph back into a pipeline
    Dag {
        /// Graph file (JSON)
        graph: PathBuf,

        /// Pipeline whose name and metadata are carried over
        #[clap(short, long)]
        base: PathBuf,

        /// Output file (default: stdout)
        #[clap(short, long)]
        output: Option<PathBuf>,

        /// Document format when writing to stdout
        #[clap(short, long, default_value = "yaml")]
        format: DocumentFormat,
    },

    /// Show layout levels
    Levels {
        /// Pipeline file
        dag: PathBuf,
    },

    /// Show pipeline as a graph
    Graph {
        /// Pipeline file
        dag: PathBuf,

        /// Output format
        #[clap(short, long, default_value = "text")]
        format: GraphFormat,
    },

    /// List the action catalog
    Actions {
        /// Only show one category
        #[clap(long)]
        category: Option<String>,

        /// Show the parameters of one action
        #[clap(short, long)]
        action: Option<String>,
    },

    /// Validate parameter values for an action
    Params {
        /// Action kind
        action: String,

        /// Parameter values as a JSON object
        values: String,

        /// Skip parameters hidden by their display condition
        #[clap(long)]
        visible_only: bool,
    },

    /// Create an empty workflow
    New {
        /// Workflow name
        name: String,

        /// Output file (default: stdout as YAML)
        #[clap(short, long)]
        output: Option<PathBuf>,
    },

    /// Watch mode - re-validate on file changes
    Watch {
        /// Pipeline file
        dag: PathBuf,

        /// Debounce delay in milliseconds
        #[clap(long, default_value = "500")]
        debounce: u64,
    },
}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Graph output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    Text,
    Dot,
    Mermaid,
}

impl std::str::FromStr for GraphFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "dot" => Ok(Self::Dot),
            "mermaid" => Ok(Self::Mermaid),
            _ => Err(format!("Unknown graph format: {}", s)),
        }
    }
}

/// Load configuration for a command
pub(crate) fn load_config(path: Option<&Path>) -> Result<FlowdagConfig> {
    Ok(FlowdagConfig::discover(path)?)
}

/// Write to a file, or print to stdout
pub(crate) fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .map_err(|e| FlowdagError::write_failed(path, e))?;
            tracing::info!(path = %path.display(), "wrote output");
        }
        None => println!("{}", content.trim_end()),
    }
    Ok(())
}
