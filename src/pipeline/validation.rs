// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowdag contributors

//! Pipeline validation
//!
//! Structural checks over an editable graph. Each rule is independent and
//! reports findings; only error-severity findings make a graph invalid.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::graph::{FlowGraph, FlowNode};
use super::FlowEdge;
use crate::actions::{ActionRegistry, CONDITIONAL_ACTION};

/// Rule names, usable to disable rules from configuration
pub mod rules {
    pub const SINGLE_START: &str = "single-start";
    pub const UNIQUE_STEP_IDS: &str = "unique-step-ids";
    pub const VALID_DEPENDENCIES: &str = "valid-dependencies";
    pub const CONNECTIVITY: &str = "connectivity";
    pub const START_CONNECTIVITY: &str = "start-connectivity";
    pub const CONDITIONAL_CONDITION: &str = "conditional-condition";
    pub const ACYCLIC: &str = "acyclic";
    pub const STEP_PARAMS: &str = "step-params";
}

/// How serious a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks saving
    Error,
    /// Advisory only
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// One problem found by a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFinding {
    /// Node the finding is attached to, if any
    pub node_id: Option<String>,
    pub message: String,
    pub severity: Severity,
    /// Name of the rule that produced it
    pub rule: &'static str,
}

impl ValidationFinding {
    pub fn error(rule: &'static str, node_id: Option<&str>, message: String) -> Self {
        Self {
            node_id: node_id.map(str::to_string),
            message,
            severity: Severity::Error,
            rule,
        }
    }

    pub fn warning(rule: &'static str, node_id: Option<&str>, message: String) -> Self {
        Self {
            node_id: node_id.map(str::to_string),
            message,
            severity: Severity::Warning,
            rule,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Aggregate result of validating a graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineValidation {
    /// True when no finding has error severity
    pub valid: bool,
    /// All findings, errors and warnings, in rule order
    pub errors: Vec<ValidationFinding>,
}

impl PipelineValidation {
    pub fn from_findings(findings: Vec<ValidationFinding>) -> Self {
        Self {
            valid: !findings.iter().any(ValidationFinding::is_error),
            errors: findings,
        }
    }

    /// Add more findings, keeping `valid` consistent
    pub fn extend(&mut self, findings: Vec<ValidationFinding>) {
        self.errors.extend(findings);
        self.valid = !self.errors.iter().any(ValidationFinding::is_error);
    }

    pub fn error_count(&self) -> usize {
        self.errors.iter().filter(|f| f.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.errors.len() - self.error_count()
    }

    pub fn has_warnings(&self) -> bool {
        self.warning_count() > 0
    }

    /// Findings attached to one node
    pub fn for_node<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a ValidationFinding> {
        self.errors
            .iter()
            .filter(move |f| f.node_id.as_deref() == Some(node_id))
    }
}

/// Signature of a validation rule
pub type RuleFn = fn(&[FlowNode], &[FlowEdge]) -> Vec<ValidationFinding>;

/// A named validation rule
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub check: RuleFn,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// The standard rule set, in evaluation order
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule { name: rules::SINGLE_START, check: single_start },
        Rule { name: rules::UNIQUE_STEP_IDS, check: unique_step_ids },
        Rule { name: rules::VALID_DEPENDENCIES, check: valid_dependencies },
        Rule { name: rules::CONNECTIVITY, check: connectivity },
        Rule { name: rules::START_CONNECTIVITY, check: start_connectivity },
        Rule { name: rules::CONDITIONAL_CONDITION, check: conditional_condition },
        Rule { name: rules::ACYCLIC, check: acyclic },
    ]
}

/// Pipeline validator
#[derive(Debug, Clone)]
pub struct PipelineValidator {
    rules: Vec<Rule>,
}

impl PipelineValidator {
    /// Validator with the standard rule set
    pub fn new() -> Self {
        Self {
            rules: default_rules(),
        }
    }

    /// Validator with no rules
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Drop every rule with the given name
    pub fn without(mut self, name: &str) -> Self {
        self.rules.retain(|r| r.name != name);
        self
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).collect()
    }

    /// Run every rule over the graph
    pub fn validate(&self, nodes: &[FlowNode], edges: &[FlowEdge]) -> PipelineValidation {
        let findings = self
            .rules
            .iter()
            .flat_map(|rule| {
                let found = (rule.check)(nodes, edges);
                if !found.is_empty() {
                    tracing::debug!(rule = rule.name, count = found.len(), "rule reported findings");
                }
                found
            })
            .collect();

        PipelineValidation::from_findings(findings)
    }

    pub fn validate_graph(&self, graph: &FlowGraph) -> PipelineValidation {
        self.validate(&graph.nodes, &graph.edges)
    }
}

impl Default for PipelineValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a graph with the standard rule set
pub fn validate_pipeline(nodes: &[FlowNode], edges: &[FlowEdge]) -> PipelineValidation {
    PipelineValidator::new().validate(nodes, edges)
}

/// Check every step node's params against the registry.
///
/// Not part of the structural rule set because it needs a registry.
pub fn param_findings(
    nodes: &[FlowNode],
    registry: &ActionRegistry,
    visible_only: bool,
) -> Vec<ValidationFinding> {
    nodes
        .iter()
        .filter(|n| !n.is_start())
        .flat_map(|node| {
            let result = if visible_only {
                registry.validate_visible_params(&node.data.action, &node.data.params)
            } else {
                registry.validate_params(&node.data.action, &node.data.params)
            };
            result.errors.into_iter().map(move |message| {
                ValidationFinding::error(
                    rules::STEP_PARAMS,
                    Some(&node.id),
                    format!("{}: {}", node.display_name(), message),
                )
            })
        })
        .collect()
}

fn step_nodes(nodes: &[FlowNode]) -> impl Iterator<Item = &FlowNode> {
    nodes.iter().filter(|n| !n.is_start())
}

fn single_start(nodes: &[FlowNode], _edges: &[FlowEdge]) -> Vec<ValidationFinding> {
    let starts: Vec<&FlowNode> = nodes.iter().filter(|n| n.is_start()).collect();

    if starts.is_empty() {
        return vec![ValidationFinding::error(
            rules::SINGLE_START,
            None,
            "Pipeline must have a start node".into(),
        )];
    }

    starts
        .iter()
        .skip(1)
        .map(|n| {
            ValidationFinding::error(
                rules::SINGLE_START,
                Some(&n.id),
                "Only one start node allowed".into(),
            )
        })
        .collect()
}

fn unique_step_ids(nodes: &[FlowNode], _edges: &[FlowEdge]) -> Vec<ValidationFinding> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for node in step_nodes(nodes) {
        *counts.entry(node.step_id()).or_default() += 1;
    }

    step_nodes(nodes)
        .filter(|n| counts.get(n.step_id()).copied().unwrap_or(0) > 1)
        .map(|n| {
            ValidationFinding::error(
                rules::UNIQUE_STEP_IDS,
                Some(&n.id),
                format!("Duplicate step ID '{}'", n.step_id()),
            )
        })
        .collect()
}

fn valid_dependencies(nodes: &[FlowNode], _edges: &[FlowEdge]) -> Vec<ValidationFinding> {
    let known: HashSet<&str> = step_nodes(nodes).map(FlowNode::step_id).collect();

    step_nodes(nodes)
        .flat_map(|node| {
            node.data
                .depends_on
                .iter()
                .filter(|dep| !known.contains(dep.as_str()))
                .map(|dep| {
                    ValidationFinding::error(
                        rules::VALID_DEPENDENCIES,
                        Some(&node.id),
                        format!("Step '{}' depends on unknown step '{}'", node.step_id(), dep),
                    )
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

fn connectivity(nodes: &[FlowNode], edges: &[FlowEdge]) -> Vec<ValidationFinding> {
    let targets: HashSet<&str> = edges.iter().map(|e| e.target.as_str()).collect();

    step_nodes(nodes)
        .filter(|n| !targets.contains(n.id.as_str()))
        .map(|n| {
            ValidationFinding::warning(
                rules::CONNECTIVITY,
                Some(&n.id),
                format!("Step '{}' is not connected", n.display_name()),
            )
        })
        .collect()
}

fn start_connectivity(nodes: &[FlowNode], edges: &[FlowEdge]) -> Vec<ValidationFinding> {
    let Some(start) = nodes.iter().find(|n| n.is_start()) else {
        return Vec::new();
    };

    if edges.iter().any(|e| e.source == start.id) {
        return Vec::new();
    }

    vec![ValidationFinding::warning(
        rules::START_CONNECTIVITY,
        Some(&start.id),
        "Start node is not connected to any step".into(),
    )]
}

fn conditional_condition(nodes: &[FlowNode], _edges: &[FlowEdge]) -> Vec<ValidationFinding> {
    step_nodes(nodes)
        .filter(|n| n.data.action == CONDITIONAL_ACTION || n.node_type == CONDITIONAL_ACTION)
        .filter(|n| {
            !["condition", "expression"].iter().any(|key| {
                n.data
                    .params
                    .get(*key)
                    .and_then(|v| v.as_str())
                    .is_some_and(|s| !s.trim().is_empty())
            })
        })
        .map(|n| {
            ValidationFinding::warning(
                rules::CONDITIONAL_CONDITION,
                Some(&n.id),
                format!("Conditional step '{}' has no condition", n.display_name()),
            )
        })
        .collect()
}

fn acyclic(nodes: &[FlowNode], edges: &[FlowEdge]) -> Vec<ValidationFinding> {
    let by_id: HashMap<&str, &FlowNode> = nodes.iter().rev().map(|n| (n.id.as_str(), n)).collect();
    let view = super::GraphView::new(nodes, edges);
    let label = |id: &str| by_id.get(id).map_or(id.to_string(), |n| n.step_id().to_string());

    let mut findings = Vec::new();
    for cycle in view.cycles() {
        let path = cycle.iter().map(|id| label(id)).collect::<Vec<_>>().join(" → ");
        for id in &cycle {
            findings.push(ValidationFinding::error(
                rules::ACYCLIC,
                Some(id),
                format!("Step '{}' is part of a dependency cycle: {}", label(id), path),
            ));
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{dag_to_flow, DagDefinition, FlowGraph, NodeData, Position, Step};
    use serde_json::json;

    fn step(node_id: &str, step_id: &str, deps: &[&str]) -> FlowNode {
        FlowNode {
            id: node_id.into(),
            node_type: "delay".into(),
            position: Position::default(),
            data: NodeData {
                step_id: Some(step_id.into()),
                name: step_id.into(),
                action: "delay".into(),
                depends_on: deps.iter().map(|d| (*d).to_string()).collect(),
                ..NodeData::default()
            },
        }
    }

    fn start(id: &str) -> FlowNode {
        let mut node = FlowNode::start(Position::default());
        node.id = id.into();
        node
    }

    fn errors(result: &PipelineValidation) -> Vec<&ValidationFinding> {
        result.errors.iter().filter(|f| f.is_error()).collect()
    }

    fn linear() -> FlowGraph {
        dag_to_flow(&DagDefinition {
            steps: vec![
                Step::new("a", "delay"),
                Step::new("b", "delay").with_dependencies(&["a"]),
            ],
            ..DagDefinition::new_workflow("linear")
        })
    }

    #[test]
    fn test_linear_pipeline_is_valid() {
        let graph = linear();
        let result = validate_pipeline(&graph.nodes, &graph.edges);

        assert!(result.valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_missing_start_node() {
        let nodes = vec![step("n1", "a", &[])];
        let result = validate_pipeline(&nodes, &[]);

        let errs = errors(&result);
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("start node"));
        assert_eq!(errs[0].node_id, None);
        assert!(!result.valid);
    }

    #[test]
    fn test_second_start_node_is_flagged() {
        let nodes = vec![start("start"), start("start-2"), step("n1", "a", &[])];
        let edges = vec![FlowEdge::new("start", "n1")];
        let result = validate_pipeline(&nodes, &edges);

        let errs = errors(&result);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].node_id.as_deref(), Some("start-2"));
        assert_eq!(errs[0].message, "Only one start node allowed");
    }

    #[test]
    fn test_duplicate_step_ids_flag_every_node() {
        let nodes = vec![start("start"), step("n1", "a", &[]), step("n2", "a", &[])];
        let edges = vec![FlowEdge::new("start", "n1"), FlowEdge::new("start", "n2")];
        let result = validate_pipeline(&nodes, &edges);

        let errs = errors(&result);
        assert_eq!(errs.len(), 2);
        assert!(errs.iter().all(|f| f.rule == rules::UNIQUE_STEP_IDS));
        assert_eq!(result.for_node("n1").count(), 1);
        assert_eq!(result.for_node("n2").count(), 1);
    }

    #[test]
    fn test_dangling_dependency() {
        let nodes = vec![start("start"), step("n1", "a", &[]), step("n2", "b", &["ghost"])];
        let edges = vec![FlowEdge::new("start", "n1"), FlowEdge::new("n1", "n2")];
        let result = validate_pipeline(&nodes, &edges);

        let errs = errors(&result);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].node_id.as_deref(), Some("n2"));
        assert!(errs[0].message.contains("ghost"));
    }

    #[test]
    fn test_disconnected_nodes_are_warnings() {
        let nodes = vec![start("start"), step("n1", "a", &[])];
        let result = validate_pipeline(&nodes, &[]);

        assert!(result.valid);
        assert_eq!(result.warning_count(), 2);
        assert!(result
            .errors
            .iter()
            .any(|f| f.rule == rules::CONNECTIVITY && f.message.contains("not connected")));
        assert!(result
            .errors
            .iter()
            .any(|f| f.rule == rules::START_CONNECTIVITY));
    }

    #[test]
    fn test_conditional_without_condition_warns() {
        let mut cond = step("n1", "route", &[]);
        cond.node_type = CONDITIONAL_ACTION.into();
        cond.data.action = CONDITIONAL_ACTION.into();
        let nodes = vec![start("start"), cond.clone()];
        let edges = vec![FlowEdge::new("start", "n1")];

        let result = validate_pipeline(&nodes, &edges);
        assert!(result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].rule, rules::CONDITIONAL_CONDITION);

        cond.data.params.insert("expression".into(), json!("{{x}} > 1"));
        let nodes = vec![start("start"), cond];
        assert!(validate_pipeline(&nodes, &edges).errors.is_empty());
    }

    #[test]
    fn test_cycle_is_reported() {
        let graph = dag_to_flow(&DagDefinition {
            steps: vec![
                Step::new("a", "delay").with_dependencies(&["b"]),
                Step::new("b", "delay").with_dependencies(&["a"]),
            ],
            ..DagDefinition::new_workflow("cycle")
        });

        let result = validate_pipeline(&graph.nodes, &graph.edges);
        let errs = errors(&result);

        assert!(!result.valid);
        assert_eq!(errs.len(), 2);
        assert!(errs.iter().all(|f| f.rule == rules::ACYCLIC));
        assert!(errs[0].message.contains("a → b"));
    }

    #[test]
    fn test_rules_can_be_disabled() {
        let nodes = vec![step("n1", "a", &[])];
        let validator = PipelineValidator::new()
            .without(rules::SINGLE_START)
            .without(rules::CONNECTIVITY);

        let result = validator.validate(&nodes, &[]);
        assert!(result.valid);
        assert!(!validator.rule_names().contains(&rules::SINGLE_START));
    }

    #[test]
    fn test_custom_rule() {
        fn no_delays(nodes: &[FlowNode], _: &[FlowEdge]) -> Vec<ValidationFinding> {
            nodes
                .iter()
                .filter(|n| n.node_type == "delay")
                .map(|n| ValidationFinding::warning("no-delays", Some(&n.id), "slow".into()))
                .collect()
        }

        let graph = linear();
        let result = PipelineValidator::empty()
            .with_rule(Rule { name: "no-delays", check: no_delays })
            .validate_graph(&graph);

        assert_eq!(result.warning_count(), 2);
    }

    #[test]
    fn test_param_findings() {
        let mut graph = linear();
        graph.nodes[1].data.params.insert("duration_seconds".into(), json!(0));

        let findings = param_findings(&graph.nodes, ActionRegistry::builtin(), false);

        // a has an out-of-range duration, b has none at all
        assert_eq!(findings.len(), 2);
        assert!(findings[0].message.contains("at least 1"));
        assert!(findings[1].message.contains("is required"));
    }
}
