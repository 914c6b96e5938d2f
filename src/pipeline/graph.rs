// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowdag contributors

//! Editable node/edge graph
//!
//! The shape consumed by the visual canvas. Field names follow the canvas's
//! JSON conventions (`type`, `stepId`).

use petgraph::algo::{has_path_connecting, tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

use crate::errors::{FlowdagError, FlowdagResult};

/// Id of the start node produced by conversion
pub const START_NODE_ID: &str = "start";

/// Node type of the start node
pub const START_NODE_TYPE: &str = "start";

/// Prefix of node ids generated for steps
pub const STEP_NODE_PREFIX: &str = "step-";

/// Canvas coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Step payload carried by a node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    /// Absent on the start node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub action: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    #[serde(default)]
    pub params: Map<String, Value>,

    #[serde(default, rename = "depends_on")]
    pub depends_on: Vec<String>,
}

/// A node on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: String,

    /// `"start"` or an action kind
    #[serde(rename = "type")]
    pub node_type: String,

    #[serde(default)]
    pub position: Position,

    #[serde(default)]
    pub data: NodeData,
}

impl FlowNode {
    /// The pipeline entry node
    pub fn start(position: Position) -> Self {
        Self {
            id: START_NODE_ID.to_string(),
            node_type: START_NODE_TYPE.to_string(),
            position,
            data: NodeData {
                name: "Start".to_string(),
                ..NodeData::default()
            },
        }
    }

    pub fn is_start(&self) -> bool {
        self.node_type == START_NODE_TYPE
    }

    /// Step id of this node: the explicit `stepId`, or one derived from the
    /// node id
    pub fn step_id(&self) -> &str {
        match self.data.step_id.as_deref() {
            Some(id) => id,
            None => self.id.strip_prefix(STEP_NODE_PREFIX).unwrap_or(&self.id),
        }
    }

    /// Display name, falling back to the step id
    pub fn display_name(&self) -> &str {
        if self.data.name.is_empty() {
            self.step_id()
        } else {
            &self.data.name
        }
    }
}

/// Node id used for a step
pub fn node_id_for_step(step_id: &str) -> String {
    format!("{}{}", STEP_NODE_PREFIX, step_id)
}

/// `base` if it is free, otherwise `base` with the first free `-N` suffix
pub(crate) fn unique_id(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    let mut n = 1;
    loop {
        let candidate = format!("{}-{}", base, n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// A directed connection on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub target: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl FlowEdge {
    /// Unlabeled dependency edge
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            id: format!("e-{}-{}", source, target),
            source: source.to_string(),
            target: target.to_string(),
            label: None,
        }
    }

    /// Labeled branch-routing edge
    pub fn branch(source: &str, target: &str, branch_id: &str, label: &str) -> Self {
        Self {
            id: format!("e-{}-{}-{}", source, target, branch_id),
            source: source.to_string(),
            target: target.to_string(),
            label: Some(label.to_string()),
        }
    }
}

/// Nodes and edges of one pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

impl FlowGraph {
    /// Load a graph from a JSON file
    pub fn from_file(path: &Path) -> FlowdagResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| FlowdagError::read_failed(path, e))?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn to_json(&self) -> FlowdagResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// First start node, if any
    pub fn start_node(&self) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.is_start())
    }

    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut FlowNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Edges ending at `node_id`
    pub fn incoming<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a FlowEdge> {
        self.edges.iter().filter(move |e| e.target == node_id)
    }

    /// Edges starting at `node_id`
    pub fn outgoing<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a FlowEdge> {
        self.edges.iter().filter(move |e| e.source == node_id)
    }

    /// Append an edge, renaming it if its id is already taken; returns the id
    pub fn add_edge(&mut self, mut edge: FlowEdge) -> String {
        edge.id = unique_id(&edge.id, |c| self.edges.iter().any(|e| e.id == c));
        let id = edge.id.clone();
        self.edges.push(edge);
        id
    }

    pub fn view(&self) -> GraphView<'_> {
        GraphView::new(&self.nodes, &self.edges)
    }

    /// Generate Mermaid diagram of the graph
    pub fn to_mermaid(&self) -> String {
        let mut out = String::from("graph LR\n");

        for node in &self.nodes {
            let id = mermaid_id(&node.id);
            if node.is_start() {
                out.push_str(&format!("    {}((Start))\n", id));
            } else {
                out.push_str(&format!("    {}[\"{}\"]\n", id, node.display_name()));
            }
        }

        for edge in &self.edges {
            let from = mermaid_id(&edge.source);
            let to = mermaid_id(&edge.target);
            match &edge.label {
                Some(label) => out.push_str(&format!("    {} -->|{}| {}\n", from, label, to)),
                None => out.push_str(&format!("    {} --> {}\n", from, to)),
            }
        }

        out
    }

    /// Generate DOT diagram of the graph
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph pipeline {\n");
        out.push_str("    rankdir=LR;\n");
        out.push_str("    node [shape=box, style=rounded];\n\n");

        for node in &self.nodes {
            if node.is_start() {
                out.push_str(&format!("    \"{}\" [shape=circle, label=\"Start\"];\n", node.id));
            } else {
                out.push_str(&format!(
                    "    \"{}\" [label=\"{}\"];\n",
                    node.id,
                    node.display_name()
                ));
            }
        }
        out.push('\n');

        for edge in &self.edges {
            match &edge.label {
                Some(label) => out.push_str(&format!(
                    "    \"{}\" -> \"{}\" [label=\"{}\"];\n",
                    edge.source, edge.target, label
                )),
                None => out.push_str(&format!("    \"{}\" -> \"{}\";\n", edge.source, edge.target)),
            }
        }

        out.push_str("}\n");
        out
    }

    /// Generate text listing of steps in dependency order
    pub fn to_text(&self) -> String {
        let view = self.view();
        let order: Vec<&str> = view
            .topological_order()
            .unwrap_or_else(|| self.nodes.iter().map(|n| n.id.as_str()).collect());

        let mut out = String::new();
        let mut number = 0;

        for node_id in order {
            let Some(node) = self.node(node_id) else {
                continue;
            };
            if node.is_start() {
                continue;
            }
            number += 1;

            out.push_str(&format!("{}. {} ({})", number, node.display_name(), node.node_type));

            let sources: Vec<&str> = self
                .incoming(&node.id)
                .filter_map(|e| self.node(&e.source))
                .filter(|n| !n.is_start())
                .map(|n| n.step_id())
                .collect();
            if !sources.is_empty() {
                out.push_str(&format!(" [after: {}]", sources.join(", ")));
            }

            out.push('\n');
        }

        out
    }
}

fn mermaid_id(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Petgraph view over a node/edge list.
///
/// Edges whose endpoints are missing are left out. When node ids repeat,
/// the first node with that id is used.
pub struct GraphView<'a> {
    graph: DiGraph<&'a str, ()>,
    index: HashMap<&'a str, NodeIndex>,
}

impl<'a> GraphView<'a> {
    pub fn new(nodes: &'a [FlowNode], edges: &'a [FlowEdge]) -> Self {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();

        for node in nodes {
            index
                .entry(node.id.as_str())
                .or_insert_with(|| graph.add_node(node.id.as_str()));
        }

        for edge in edges {
            if let (Some(&from), Some(&to)) =
                (index.get(edge.source.as_str()), index.get(edge.target.as_str()))
            {
                graph.add_edge(from, to, ());
            }
        }

        Self { graph, index }
    }

    /// Whether `to` is reachable from `from`
    pub fn has_path(&self, from: &str, to: &str) -> bool {
        let (Some(&a), Some(&b)) = (self.index.get(from), self.index.get(to)) else {
            return false;
        };
        has_path_connecting(&self.graph, a, b, None)
    }

    /// Groups of node ids that lie on a cycle, in node order
    pub fn cycles(&self) -> Vec<Vec<&'a str>> {
        let mut cycles: Vec<Vec<&'a str>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]))
            .map(|mut scc| {
                scc.sort_unstable();
                scc.into_iter().map(|n| self.graph[n]).collect()
            })
            .collect();

        cycles.sort_by_key(|members| members.first().and_then(|id| self.index.get(id).copied()));
        cycles
    }

    /// Node ids in topological order, or `None` if the graph has a cycle
    pub fn topological_order(&self) -> Option<Vec<&'a str>> {
        toposort(&self.graph, None)
            .ok()
            .map(|order| order.into_iter().map(|n| self.graph[n]).collect())
    }
}
