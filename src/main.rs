// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowdag contributors

//! flowdag - Pipeline DAG toolkit
//!
//! Convert, lay out and validate pipelines built in visual editors.

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flowdag::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "flowdag=debug" } else { "flowdag=info" };

    // Initialize tracing; stdout is reserved for command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if !flowdag::utils::should_use_colors() {
        colored::control::set_override(false);
    }

    let config = cli.config;

    // Dispatch to command handlers
    match cli.command {
        Commands::Validate { files, format } => {
            flowdag::cli::validate::run(files, format, config, cli.verbose).await
        }
        Commands::Flow { dag, output } => flowdag::cli::flow::run(dag, output, config).await,
        Commands::Dag {
            graph,
            base,
            output,
            format,
        } => flowdag::cli::dag::run(graph, base, output, format).await,
        Commands::Levels { dag } => flowdag::cli::levels::run(dag, cli.verbose).await,
        Commands::Graph { dag, format } => flowdag::cli::graph::run(dag, format).await,
        Commands::Actions { category, action } => {
            flowdag::cli::actions::run(category, action, config, cli.verbose).await
        }
        Commands::Params {
            action,
            values,
            visible_only,
        } => flowdag::cli::params::run(action, values, visible_only, config).await,
        Commands::New { name, output } => flowdag::cli::new::run(name, output).await,
        Commands::Watch { dag, debounce } => {
            flowdag::cli::watch::run(dag, debounce, config, cli.verbose).await
        }
    }
}
