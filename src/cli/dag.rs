// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowdag contributors

//! Dag command - convert an editor graph back into a pipeline document

use miette::Result;
use std::path::PathBuf;

use super::emit;
use crate::pipeline::{DagDefinition, DocumentFormat, FlowGraph};

/// Run the dag command
pub async fn run(
    graph_path: PathBuf,
    base_path: PathBuf,
    output: Option<PathBuf>,
    format: DocumentFormat,
) -> Result<()> {
    let graph = FlowGraph::from_file(&graph_path)?;
    let base = DagDefinition::from_file(&base_path)?;

    let dag = graph.to_dag(&base);

    match output {
        Some(path) => {
            dag.save(&path)?;
            tracing::info!(path = %path.display(), steps = dag.steps.len(), "wrote pipeline");
            Ok(())
        }
        None => emit(&dag.render(format)?, None),
    }
}
