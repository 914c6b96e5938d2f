// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowdag contributors

//! Headless editing session
//!
//! Holds the graph being edited and applies edit commands to it. Node data
//! (`depends_on`) is kept in step with the edges so validation sees the
//! same picture the canvas shows.

use serde_json::{Map, Value};

use crate::actions::{ActionRegistry, ParamValidation};
use crate::config::FlowdagConfig;
use crate::errors::{FlowdagError, FlowdagResult};
use crate::pipeline::{
    create_step_node_with, dag_to_flow_with_layout, param_findings, DagDefinition, FlowEdge,
    FlowGraph, FlowNode, LayoutConfig, PipelineValidation, PipelineValidator, Position,
};

/// An open pipeline in the editor
#[derive(Debug)]
pub struct EditorSession {
    base: DagDefinition,
    graph: FlowGraph,
    registry: ActionRegistry,
    validator: PipelineValidator,
    layout: LayoutConfig,
    check_params: bool,
    exempt_hidden_params: bool,
    saved_fingerprint: String,
}

impl EditorSession {
    /// Open a pipeline with the built-in catalog and default settings
    pub fn open(dag: DagDefinition) -> Self {
        Self::with_config(dag, &FlowdagConfig::default(), ActionRegistry::builtin().clone())
    }

    /// Open a pipeline with explicit settings and catalog
    pub fn with_config(dag: DagDefinition, config: &FlowdagConfig, registry: ActionRegistry) -> Self {
        let graph = dag_to_flow_with_layout(&dag, &config.layout);
        let mut session = Self {
            base: dag,
            graph,
            registry,
            validator: config.validator(),
            layout: config.layout,
            check_params: config.validation.check_params,
            exempt_hidden_params: config.validation.exempt_hidden_params,
            saved_fingerprint: String::new(),
        };
        session.saved_fingerprint = session.to_dag().fingerprint();
        tracing::debug!(pipeline = %session.base.name, "opened editor session");
        session
    }

    /// Start a new, empty workflow
    pub fn new_workflow(name: &str) -> Self {
        Self::open(DagDefinition::new_workflow(name))
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Add a step of the given action; returns the new node id
    pub fn add_step(&mut self, action: &str, position: Position) -> String {
        let node = create_step_node_with(&self.registry, action, position);
        let id = node.id.clone();
        tracing::debug!(node = %id, action, "added step");
        self.graph.nodes.push(node);
        id
    }

    /// Connect two nodes; returns the new edge id.
    ///
    /// Rejects unknown nodes, self-loops, edges into the start node,
    /// duplicates, and edges that would close a cycle.
    pub fn connect(&mut self, source: &str, target: &str) -> FlowdagResult<String> {
        let source_node = self.require_node(source)?;
        let target_node = self.require_node(target)?;

        if target_node.is_start() {
            return Err(FlowdagError::connection_rejected(
                source,
                target,
                "the start node cannot have dependencies",
            ));
        }
        if source == target {
            return Err(FlowdagError::connection_rejected(
                source,
                target,
                "a step cannot depend on itself",
            ));
        }
        if self.graph.outgoing(source).any(|e| e.target == target) {
            return Err(FlowdagError::connection_rejected(
                source,
                target,
                "the nodes are already connected",
            ));
        }
        if self.graph.view().has_path(target, source) {
            return Err(FlowdagError::connection_rejected(
                source,
                target,
                "the connection would create a cycle",
            ));
        }

        let source_step = (!source_node.is_start()).then(|| source_node.step_id().to_string());

        let edge_id = self.graph.add_edge(FlowEdge::new(source, target));

        if let Some(step_id) = source_step {
            // A step that waits on another no longer runs first.
            let starts: Vec<String> = self
                .graph
                .nodes
                .iter()
                .filter(|n| n.is_start())
                .map(|n| n.id.clone())
                .collect();
            self.graph
                .edges
                .retain(|e| !(e.target == target && starts.contains(&e.source)));

            if let Some(node) = self.graph.node_mut(target) {
                if !node.data.depends_on.contains(&step_id) {
                    node.data.depends_on.push(step_id);
                }
            }
        }

        Ok(edge_id)
    }

    /// Remove an edge
    pub fn disconnect(&mut self, edge_id: &str) -> FlowdagResult<FlowEdge> {
        let pos = self
            .graph
            .edges
            .iter()
            .position(|e| e.id == edge_id)
            .ok_or_else(|| FlowdagError::EdgeNotFound {
                edge: edge_id.to_string(),
            })?;
        let edge = self.graph.edges.remove(pos);

        let still_connected = self
            .graph
            .edges
            .iter()
            .any(|e| e.source == edge.source && e.target == edge.target);

        if !still_connected {
            let source_step = self
                .graph
                .node(&edge.source)
                .filter(|n| !n.is_start())
                .map(|n| n.step_id().to_string());

            if let (Some(step_id), Some(node)) = (source_step, self.graph.node_mut(&edge.target)) {
                node.data.depends_on.retain(|d| d != &step_id);
            }
        }

        Ok(edge)
    }

    /// Remove a node and every edge touching it
    pub fn remove_node(&mut self, node_id: &str) -> FlowdagResult<FlowNode> {
        let node = self.require_node(node_id)?;
        let start_count = self.graph.nodes.iter().filter(|n| n.is_start()).count();
        if node.is_start() && start_count == 1 {
            return Err(FlowdagError::StartNodeRequired);
        }

        let removed_step = (!node.is_start()).then(|| node.step_id().to_string());

        let pos = self
            .graph
            .nodes
            .iter()
            .position(|n| n.id == node_id)
            .ok_or_else(|| FlowdagError::NodeNotFound {
                node: node_id.to_string(),
            })?;
        let node = self.graph.nodes.remove(pos);

        self.graph
            .edges
            .retain(|e| e.source != node_id && e.target != node_id);

        if let Some(step_id) = removed_step {
            for other in &mut self.graph.nodes {
                other.data.depends_on.retain(|d| d != &step_id);
            }
        }

        tracing::debug!(node = node_id, "removed node");
        Ok(node)
    }

    /// Replace a step's params; returns their validation result
    pub fn update_params(
        &mut self,
        node_id: &str,
        params: Map<String, Value>,
    ) -> FlowdagResult<ParamValidation> {
        let exempt_hidden = self.exempt_hidden_params;
        let node = self
            .graph
            .node_mut(node_id)
            .ok_or_else(|| FlowdagError::NodeNotFound {
                node: node_id.to_string(),
            })?;

        let result = if exempt_hidden {
            self.registry.validate_visible_params(&node.data.action, &params)
        } else {
            self.registry.validate_params(&node.data.action, &params)
        };
        node.data.params = params;

        Ok(result)
    }

    /// Rename a step
    pub fn rename(&mut self, node_id: &str, name: &str) -> FlowdagResult<()> {
        let node = self
            .graph
            .node_mut(node_id)
            .ok_or_else(|| FlowdagError::NodeNotFound {
                node: node_id.to_string(),
            })?;
        node.data.name = name.to_string();
        Ok(())
    }

    /// Structural validation plus, if enabled, param validation
    pub fn validate(&self) -> PipelineValidation {
        let mut result = self.validator.validate_graph(&self.graph);
        if self.check_params {
            result.extend(param_findings(
                &self.graph.nodes,
                &self.registry,
                self.exempt_hidden_params,
            ));
        }
        result
    }

    /// The pipeline as it currently stands
    pub fn to_dag(&self) -> DagDefinition {
        self.graph.to_dag(&self.base)
    }

    /// Whether the pipeline changed since it was opened or last saved
    pub fn is_dirty(&self) -> bool {
        self.to_dag().fingerprint() != self.saved_fingerprint
    }

    /// Record the current state as saved and return it
    pub fn mark_saved(&mut self) -> DagDefinition {
        let dag = self.to_dag();
        self.saved_fingerprint = dag.fingerprint();
        self.base = dag.clone();
        dag
    }

    /// Re-derive the graph (and layout) from the current pipeline
    pub fn relayout(&mut self) {
        let dag = self.to_dag();
        self.graph = dag_to_flow_with_layout(&dag, &self.layout);
    }

    fn require_node(&self, id: &str) -> FlowdagResult<&FlowNode> {
        self.graph.node(id).ok_or_else(|| FlowdagError::NodeNotFound {
            node: id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{rules, Step, START_NODE_ID};
    use serde_json::json;

    fn two_step_session() -> (EditorSession, String, String) {
        let mut session = EditorSession::new_workflow("demo");
        let a = session.add_step("delay", Position::new(300.0, 200.0));
        let b = session.add_step("delay", Position::new(550.0, 200.0));
        (session, a, b)
    }

    #[test]
    fn test_new_workflow_has_single_start() {
        let session = EditorSession::new_workflow("fresh");

        assert_eq!(session.graph().nodes.len(), 1);
        assert!(session.graph().nodes[0].is_start());
        assert!(!session.is_dirty());

        let result = session.validate();
        assert!(result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].rule, rules::START_CONNECTIVITY);
    }

    #[test]
    fn test_build_pipeline_by_editing() {
        let (mut session, a, b) = two_step_session();

        session.connect(START_NODE_ID, &a).unwrap();
        session.connect(START_NODE_ID, &b).unwrap();
        session.connect(&a, &b).unwrap();

        // b now waits on a, so its start edge is gone
        assert!(!session
            .graph()
            .edges
            .iter()
            .any(|e| e.source == START_NODE_ID && e.target == b));

        let dag = session.to_dag();
        let a_step = session.graph().node(&a).unwrap().step_id().to_string();
        assert_eq!(dag.steps.len(), 2);
        assert!(dag.steps[0].depends_on.is_empty());
        assert_eq!(dag.steps[1].depends_on, vec![a_step.clone()]);
        assert_eq!(session.graph().node(&b).unwrap().data.depends_on, vec![a_step]);

        assert!(session.validate().valid);
        assert!(session.is_dirty());
    }

    #[test]
    fn test_connect_rejections() {
        let (mut session, a, b) = two_step_session();
        session.connect(&a, &b).unwrap();

        for (source, target) in [
            (a.as_str(), a.as_str()),
            (a.as_str(), START_NODE_ID),
            (a.as_str(), b.as_str()),
            (b.as_str(), a.as_str()),
        ] {
            assert!(matches!(
                session.connect(source, target),
                Err(FlowdagError::ConnectionRejected { .. })
            ));
        }

        assert!(matches!(
            session.connect("ghost", &a),
            Err(FlowdagError::NodeNotFound { .. })
        ));
    }

    #[test]
    fn test_disconnect_updates_dependencies() {
        let (mut session, a, b) = two_step_session();
        let edge = session.connect(&a, &b).unwrap();

        session.disconnect(&edge).unwrap();

        assert!(session.graph().node(&b).unwrap().data.depends_on.is_empty());
        assert!(matches!(
            session.disconnect(&edge),
            Err(FlowdagError::EdgeNotFound { .. })
        ));
    }

    #[test]
    fn test_disconnect_removes_only_the_named_edge() {
        let dag = DagDefinition {
            steps: vec![
                Step::new("a", "delay").with_param("duration_seconds", json!(1)),
                Step::new("b-step-c", "delay")
                    .with_param("duration_seconds", json!(1))
                    .with_dependencies(&["a"]),
                Step::new("a-step-b", "delay").with_param("duration_seconds", json!(1)),
                Step::new("c", "delay").with_param("duration_seconds", json!(1)),
            ],
            ..DagDefinition::new_workflow("ids")
        };
        let mut session = EditorSession::open(dag);

        let edge = session.connect("step-a-step-b", "step-c").unwrap();
        assert_eq!(edge, "e-step-a-step-b-step-c-1");

        let removed = session.disconnect(&edge).unwrap();
        assert_eq!(removed.source, "step-a-step-b");
        assert!(session.graph().node("step-c").unwrap().data.depends_on.is_empty());
        assert_eq!(
            session.graph().node("step-b-step-c").unwrap().data.depends_on,
            vec!["a"]
        );
        assert!(session
            .graph()
            .edges
            .iter()
            .any(|e| e.source == "step-a" && e.target == "step-b-step-c"));
    }

    #[test]
    fn test_remove_node() {
        let (mut session, a, b) = two_step_session();
        session.connect(&a, &b).unwrap();

        session.remove_node(&a).unwrap();

        assert!(session.graph().edges.is_empty());
        assert!(session.graph().node(&b).unwrap().data.depends_on.is_empty());
        assert!(matches!(
            session.remove_node(START_NODE_ID),
            Err(FlowdagError::StartNodeRequired)
        ));
    }

    #[test]
    fn test_update_params_reports_validation() {
        let (mut session, a, _) = two_step_session();

        let mut params = Map::new();
        params.insert("duration_seconds".into(), json!(0));
        let result = session.update_params(&a, params).unwrap();

        assert!(!result.valid);
        assert_eq!(
            session.graph().node(&a).unwrap().data.params.get("duration_seconds"),
            Some(&json!(0))
        );
        assert!(session
            .validate()
            .errors
            .iter()
            .any(|f| f.rule == rules::STEP_PARAMS));
    }

    #[test]
    fn test_dirty_tracking() {
        let dag = DagDefinition {
            steps: vec![
                Step::new("a", "delay").with_param("duration_seconds", json!(5)),
                Step::new("b", "delay")
                    .with_param("duration_seconds", json!(5))
                    .with_dependencies(&["a"]),
            ],
            ..DagDefinition::new_workflow("saved")
        };
        let mut session = EditorSession::open(dag);
        assert!(!session.is_dirty());

        session.rename("step-b", "Second wait").unwrap();
        assert!(session.is_dirty());

        let saved = session.mark_saved();
        assert_eq!(saved.get_step("b").unwrap().name, "Second wait");
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_relayout_keeps_pipeline() {
        let (mut session, a, b) = two_step_session();
        session.connect(START_NODE_ID, &a).unwrap();
        session.connect(&a, &b).unwrap();
        let before = session.to_dag();

        session.relayout();

        let after = session.to_dag();
        assert_eq!(before.steps.len(), after.steps.len());
        for (x, y) in before.steps.iter().zip(after.steps.iter()) {
            assert_eq!(x.id, y.id);
            assert_eq!(x.depends_on, y.depends_on);
        }
    }
}
