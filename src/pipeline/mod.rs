// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowdag contributors

//! Pipeline model
//!
//! The persisted step list (`DagDefinition`), the editable graph
//! (`FlowGraph`), and the operations between them: leveling, conversion
//! and validation.

mod convert;
mod definition;
mod graph;
mod levels;
mod validation;

pub use convert::{
    create_step_node, create_step_node_with, dag_to_flow, dag_to_flow_with_layout, flow_to_dag,
    LayoutConfig,
};
pub use definition::{ConditionalBranch, DagDefinition, DocumentFormat, Step};
pub use graph::{
    node_id_for_step, FlowEdge, FlowGraph, FlowNode, GraphView, NodeData, Position,
    START_NODE_ID, START_NODE_TYPE,
};
pub use levels::{compute_levels, level_of_each};
pub use validation::{
    default_rules, param_findings, rules, validate_pipeline, PipelineValidation,
    PipelineValidator, Rule, RuleFn, Severity, ValidationFinding,
};
