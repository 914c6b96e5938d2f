// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowdag contributors

//! # flowdag - Pipeline DAG model for visual editors
//!
//! `flowdag` keeps two views of a pipeline in sync: the persisted step list
//! (`DagDefinition`) and the node/edge graph a canvas editor works on
//! (`FlowGraph`).
//!
//! ## Features
//!
//! - **Action registry** - Catalog of step kinds with parameter schemas
//! - **Layout leveling** - Column assignment that tolerates cycles and bad references
//! - **Conversion** - Step list to graph and back, including conditional branches
//! - **Validation** - Named structural rules plus parameter checks
//! - **Editing** - Headless session applying edits with cycle rejection
//!
//! ## Quick Start
//!
//! ```bash
//! # Create a workflow
//! flowdag new triage -o triage.yaml
//!
//! # Validate it
//! flowdag validate triage.yaml
//!
//! # Export the editor graph
//! flowdag flow triage.yaml -o triage.flow.json
//! ```

pub mod actions;
pub mod cli;
pub mod config;
pub mod editor;
pub mod errors;
pub mod pipeline;
pub mod utils;

// Re-export commonly used types
pub use actions::{
    get_action_meta, get_action_params, get_default_params, validate_params, ActionMeta,
    ActionRegistry, ParamDefinition, ParamValidation,
};
pub use config::FlowdagConfig;
pub use editor::EditorSession;
pub use errors::{FlowdagError, FlowdagResult};
pub use pipeline::{
    compute_levels, create_step_node, dag_to_flow, flow_to_dag, validate_pipeline, DagDefinition,
    FlowEdge, FlowGraph, FlowNode, PipelineValidation, Step,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
