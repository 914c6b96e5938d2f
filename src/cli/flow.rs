// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowdag contributors

//! Flow command - export the editor graph of a pipeline

use miette::Result;
use std::path::PathBuf;

use super::{emit, load_config};
use crate::pipeline::{dag_to_flow_with_layout, DagDefinition};

/// Run the flow command
pub async fn run(dag_path: PathBuf, output: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let dag = DagDefinition::from_file(&dag_path)?;

    let graph = dag_to_flow_with_layout(&dag, &config.layout);
    tracing::debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "converted pipeline to graph"
    );

    emit(&graph.to_json()?, output.as_deref())
}
