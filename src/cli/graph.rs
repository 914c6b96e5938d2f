// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowdag contributors

//! Graph command - visualize pipeline as a graph

use miette::Result;
use std::path::PathBuf;

use super::GraphFormat;
use crate::pipeline::{dag_to_flow, DagDefinition};

/// Run the graph command
pub async fn run(dag_path: PathBuf, format: GraphFormat) -> Result<()> {
    let dag = DagDefinition::from_file(&dag_path)?;
    let graph = dag_to_flow(&dag);

    let output = match format {
        GraphFormat::Text => graph.to_text(),
        GraphFormat::Dot => graph.to_dot(),
        GraphFormat::Mermaid => graph.to_mermaid(),
    };

    println!("{}", output);

    Ok(())
}
