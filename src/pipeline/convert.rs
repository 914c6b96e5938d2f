// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowdag contributors

//! Conversion between pipeline definitions and editable graphs
//!
//! `dag_to_flow` derives nodes and edges from a definition; `flow_to_dag`
//! rebuilds the step list from whatever the user drew. Positions and edge
//! ids are not part of the definition and don't survive a round trip.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use super::graph::{
    node_id_for_step, unique_id, FlowEdge, FlowGraph, FlowNode, NodeData, Position, START_NODE_ID,
};
use super::levels::compute_levels;
use super::{DagDefinition, Step};
use crate::actions::ActionRegistry;

/// Spacing used when placing nodes on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// x of the start node
    pub origin_x: f64,
    /// y of the start node; each level is centered on it
    pub origin_y: f64,
    /// Horizontal distance between levels
    pub level_spacing: f64,
    /// Vertical distance between nodes of one level
    pub node_spacing: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            origin_x: 100.0,
            origin_y: 200.0,
            level_spacing: 250.0,
            node_spacing: 120.0,
        }
    }
}

impl LayoutConfig {
    /// Position of the `index`-th of `count` nodes on `level`
    fn position(&self, level: usize, index: usize, count: usize) -> Position {
        let offset = index as f64 - (count.saturating_sub(1)) as f64 / 2.0;
        Position {
            x: self.origin_x + (level as f64 + 1.0) * self.level_spacing,
            y: self.origin_y + offset * self.node_spacing,
        }
    }
}

/// Convert a definition to a graph using the default layout
pub fn dag_to_flow(dag: &DagDefinition) -> FlowGraph {
    dag_to_flow_with_layout(dag, &LayoutConfig::default())
}

/// Convert a definition to a graph.
///
/// Branch edges of conditional steps are emitted first. Node pairs are
/// connected at most once, so a `depends_on` entry already covered by a
/// branch edge (or repeated) doesn't get a second edge.
pub fn dag_to_flow_with_layout(dag: &DagDefinition, layout: &LayoutConfig) -> FlowGraph {
    let steps = &dag.steps;
    let mut nodes = Vec::with_capacity(steps.len() + 1);
    nodes.push(FlowNode::start(Position::new(layout.origin_x, layout.origin_y)));

    // Node id per step index. First occurrences keep their natural id;
    // repeated step ids get a suffix that no other node uses.
    let mut used: HashSet<String> = HashSet::from([START_NODE_ID.to_string()]);
    let natural: Vec<Option<String>> = steps
        .iter()
        .map(|step| {
            let id = node_id_for_step(&step.id);
            used.insert(id.clone()).then_some(id)
        })
        .collect();

    let mut node_ids: Vec<String> = Vec::with_capacity(steps.len());
    for (step, id) in steps.iter().zip(natural) {
        let id = id.unwrap_or_else(|| {
            let id = unique_id(&node_id_for_step(&step.id), |c| used.contains(c));
            used.insert(id.clone());
            id
        });
        node_ids.push(id);
    }

    let mut positions = vec![Position::default(); steps.len()];
    for (level, members) in compute_levels(steps).iter().enumerate() {
        for (i, &idx) in members.iter().enumerate() {
            positions[idx] = layout.position(level, i, members.len());
        }
    }

    for (idx, step) in steps.iter().enumerate() {
        nodes.push(step_node(step, node_ids[idx].clone(), positions[idx]));
    }

    let mut step_to_node: HashMap<&str, &str> = HashMap::new();
    for (idx, step) in steps.iter().enumerate() {
        step_to_node
            .entry(step.id.as_str())
            .or_insert(node_ids[idx].as_str());
    }

    let mut edges = EdgeSet::default();

    for (idx, step) in steps.iter().enumerate() {
        for branch in step.branches() {
            let Some(target) = branch.target_step else {
                continue;
            };
            let Some(target_node) = step_to_node.get(target.as_str()) else {
                tracing::debug!(step = %step.id, target = %target, "branch target missing");
                continue;
            };

            edges.push(FlowEdge::branch(
                &node_ids[idx],
                target_node,
                &branch.id,
                &branch.label,
            ));
        }
    }

    for (idx, step) in steps.iter().enumerate() {
        if step.depends_on.is_empty() {
            edges.push(FlowEdge::new(START_NODE_ID, &node_ids[idx]));
            continue;
        }

        for dep in &step.depends_on {
            match step_to_node.get(dep.as_str()) {
                Some(source) => edges.push(FlowEdge::new(source, &node_ids[idx])),
                None => {
                    tracing::debug!(step = %step.id, dependency = %dep, "dangling dependency");
                }
            }
        }
    }

    FlowGraph {
        nodes,
        edges: edges.edges,
    }
}

/// Edges being emitted by a conversion. At most one edge per node pair;
/// edge ids are unique.
#[derive(Default)]
struct EdgeSet {
    edges: Vec<FlowEdge>,
    pairs: HashSet<(String, String)>,
    ids: HashSet<String>,
}

impl EdgeSet {
    fn push(&mut self, mut edge: FlowEdge) {
        if !self.pairs.insert((edge.source.clone(), edge.target.clone())) {
            return;
        }
        edge.id = unique_id(&edge.id, |c| self.ids.contains(c));
        self.ids.insert(edge.id.clone());
        self.edges.push(edge);
    }
}

fn step_node(step: &Step, id: String, position: Position) -> FlowNode {
    FlowNode {
        id,
        node_type: step.action.clone(),
        position,
        data: NodeData {
            step_id: Some(step.id.clone()),
            name: step.name.clone(),
            action: step.action.clone(),
            condition: step.condition.clone(),
            params: step.params.clone(),
            depends_on: step.depends_on.clone(),
        },
    }
}

/// Rebuild a definition from a graph.
///
/// Only `steps` is replaced; every other field of `base` is kept. A step's
/// dependencies are the sources of its incoming edges, minus the start node.
pub fn flow_to_dag(nodes: &[FlowNode], edges: &[FlowEdge], base: &DagDefinition) -> DagDefinition {
    let mut node_steps: HashMap<&str, Option<&str>> = HashMap::new();
    for node in nodes {
        let step = if node.is_start() {
            None
        } else {
            Some(node.step_id())
        };
        node_steps.entry(node.id.as_str()).or_insert(step);
    }

    let steps = nodes
        .iter()
        .filter(|node| !node.is_start())
        .map(|node| {
            let mut depends_on: Vec<String> = Vec::new();
            for edge in edges.iter().filter(|e| e.target == node.id) {
                let Some(Some(dep)) = node_steps.get(edge.source.as_str()) else {
                    continue;
                };
                if !depends_on.iter().any(|d| d == dep) {
                    depends_on.push((*dep).to_string());
                }
            }

            Step {
                id: node.step_id().to_string(),
                name: node.data.name.clone(),
                action: if node.data.action.is_empty() {
                    node.node_type.clone()
                } else {
                    node.data.action.clone()
                },
                params: node.data.params.clone(),
                depends_on,
                condition: node.data.condition.clone(),
            }
        })
        .collect();

    DagDefinition {
        steps,
        ..base.clone()
    }
}

impl FlowGraph {
    /// Rebuild a definition from this graph, keeping `base`'s other fields
    pub fn to_dag(&self, base: &DagDefinition) -> DagDefinition {
        flow_to_dag(&self.nodes, &self.edges, base)
    }
}

/// Create a node for a new step of the given action using the built-in catalog
pub fn create_step_node(action: &str, position: Position) -> FlowNode {
    create_step_node_with(ActionRegistry::builtin(), action, position)
}

/// Create a node for a new step with a fresh id and the action's default
/// params
pub fn create_step_node_with(
    registry: &ActionRegistry,
    action: &str,
    position: Position,
) -> FlowNode {
    let suffix = Uuid::new_v4().simple().to_string();
    let step_id = format!("{}_{}", action, &suffix[..8]);
    let meta = registry.meta(action);

    FlowNode {
        id: node_id_for_step(&step_id),
        node_type: action.to_string(),
        position,
        data: NodeData {
            step_id: Some(step_id),
            name: meta.label.clone(),
            action: action.to_string(),
            condition: None,
            params: registry.default_params(action),
            depends_on: Vec::new(),
        },
    }
}
