// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowdag contributors

//! Pipeline definition structures
//!
//! The declarative step list that is persisted and exchanged. Graph nodes
//! and edges are always derived from it.

use blake3::Hasher;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::actions::CONDITIONAL_ACTION;
use crate::errors::{FlowdagError, FlowdagResult};

/// A pipeline as a flat list of steps with explicit dependencies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DagDefinition {
    /// Pipeline name
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Steps in document order
    #[serde(default)]
    pub steps: Vec<Step>,

    /// Free-form fields carried through conversions untouched
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

/// A single pipeline step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Step id (must be unique within the pipeline)
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Action kind (registry key)
    pub action: String,

    #[serde(default)]
    pub params: Map<String, Value>,

    /// Ids of steps that must complete first
    #[serde(default)]
    pub depends_on: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl Step {
    /// Create a step with no params or dependencies
    pub fn new(id: &str, action: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            action: action.to_string(),
            params: Map::new(),
            depends_on: Vec::new(),
            condition: None,
        }
    }

    pub fn with_dependencies(mut self, deps: &[&str]) -> Self {
        self.depends_on = deps.iter().map(|d| (*d).to_string()).collect();
        self
    }

    pub fn with_param(mut self, name: &str, value: Value) -> Self {
        self.params.insert(name.to_string(), value);
        self
    }

    pub fn is_conditional(&self) -> bool {
        self.action == CONDITIONAL_ACTION
    }

    /// Branches of a conditional step, in evaluation order.
    ///
    /// Entries that don't parse as branches are skipped.
    pub fn branches(&self) -> Vec<ConditionalBranch> {
        if !self.is_conditional() {
            return Vec::new();
        }
        parse_branches(&self.params)
    }
}

fn parse_branches(params: &Map<String, Value>) -> Vec<ConditionalBranch> {
    let Some(Value::Array(entries)) = params.get("branches") else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match serde_json::from_value(entry.clone()) {
            Ok(branch) => Some(branch),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring malformed branch");
                None
            }
        })
        .collect()
}

/// A routing rule inside a conditional step. The first branch whose
/// condition matches wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalBranch {
    pub id: String,

    #[serde(default)]
    pub label: String,

    /// Boolean expression template
    #[serde(default)]
    pub condition: String,

    #[serde(default)]
    pub target_step: Option<String>,
}

/// Document formats for pipeline files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
    Toml,
}

impl DocumentFormat {
    /// Pick a format from a file extension
    pub fn from_path(path: &Path) -> FlowdagResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            _ => Err(FlowdagError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

impl std::str::FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            _ => Err(format!("Unknown document format: {}", s)),
        }
    }
}

impl DagDefinition {
    /// A fresh workflow with no steps
    pub fn new_workflow(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            steps: Vec::new(),
            metadata: Map::new(),
        }
    }

    /// Load a pipeline from a file, choosing the format by extension
    pub fn from_file(path: &Path) -> FlowdagResult<Self> {
        if !path.exists() {
            return Err(FlowdagError::PipelineNotFound {
                path: path.to_path_buf(),
            });
        }

        let format = DocumentFormat::from_path(path)?;
        let content =
            std::fs::read_to_string(path).map_err(|e| FlowdagError::read_failed(path, e))?;

        Self::parse(&content, format)
    }

    /// Parse a pipeline from a string
    pub fn parse(content: &str, format: DocumentFormat) -> FlowdagResult<Self> {
        match format {
            DocumentFormat::Yaml => Ok(serde_yaml::from_str(content)?),
            DocumentFormat::Json => Ok(serde_json::from_str(content)?),
            DocumentFormat::Toml => Ok(toml::from_str(content)?),
        }
    }

    /// Serialize the pipeline
    pub fn render(&self, format: DocumentFormat) -> FlowdagResult<String> {
        match format {
            DocumentFormat::Yaml => Ok(serde_yaml::to_string(self)?),
            DocumentFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            DocumentFormat::Toml => Ok(toml::to_string_pretty(self)?),
        }
    }

    /// Write the pipeline to a file, choosing the format by extension
    pub fn save(&self, path: &Path) -> FlowdagResult<()> {
        let format = DocumentFormat::from_path(path)?;
        let content = self.render(format)?;
        std::fs::write(path, content).map_err(|e| FlowdagError::write_failed(path, e))
    }

    /// Get a step by id
    pub fn get_step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Get all step ids
    pub fn step_ids(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.id.as_str()).collect()
    }

    /// Content fingerprint of the pipeline (BLAKE3, hex)
    pub fn fingerprint(&self) -> String {
        let mut hasher = Hasher::new();
        hasher.update(self.name.as_bytes());
        hasher.update(&[0]);

        if let Some(ref description) = self.description {
            hasher.update(description.as_bytes());
        }
        hasher.update(&[0]);

        for step in &self.steps {
            hasher.update(step.id.as_bytes());
            hasher.update(&[0]);
            hasher.update(step.name.as_bytes());
            hasher.update(&[0]);
            hasher.update(step.action.as_bytes());
            hasher.update(&[0]);
            hasher.update(Value::Object(step.params.clone()).to_string().as_bytes());
            hasher.update(&[0]);
            for dep in &step.depends_on {
                hasher.update(dep.as_bytes());
                hasher.update(&[1]);
            }
            if let Some(ref condition) = step.condition {
                hasher.update(condition.as_bytes());
            }
            hasher.update(&[0]);
        }

        hasher.update(Value::Object(self.metadata.clone()).to_string().as_bytes());

        hasher.finalize().to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_simple_pipeline() {
        let yaml = r#"
name: "inference-guard"
steps:
  - id: classify
    name: Classify request
    action: classify
    params:
      input: "{{request.body}}"
  - id: block
    action: blocking_rule
    depends_on: [classify]
"#;

        let dag = DagDefinition::parse(yaml, DocumentFormat::Yaml).unwrap();
        assert_eq!(dag.name, "inference-guard");
        assert_eq!(dag.steps.len(), 2);
        assert_eq!(dag.steps[1].depends_on, vec!["classify"]);
        assert_eq!(dag.step_ids(), vec!["classify", "block"]);
        assert!(dag.get_step("block").is_some());
    }

    #[test]
    fn test_parse_toml_pipeline() {
        let toml = r#"
name = "nightly-sync"

[[steps]]
id = "sync"
action = "connector_sync"
params = { connector_id = "crm", batch_size = 500 }

[[steps]]
id = "notify"
action = "notify"
depends_on = ["sync"]
"#;

        let dag = DagDefinition::parse(toml, DocumentFormat::Toml).unwrap();
        assert_eq!(dag.steps.len(), 2);
        assert_eq!(dag.steps[0].params.get("batch_size"), Some(&json!(500)));
    }

    #[test]
    fn test_branches_of_conditional_step() {
        let step = Step::new("route", CONDITIONAL_ACTION).with_param(
            "branches",
            json!([
                {"id": "b1", "label": "High", "condition": "{{score}} > 0.8", "target_step": "escalate"},
                {"id": "b2", "label": "Else", "condition": "true", "target_step": null},
                "not a branch"
            ]),
        );

        let branches = step.branches();
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0].target_step.as_deref(), Some("escalate"));
        assert_eq!(branches[1].target_step, None);
    }

    #[test]
    fn test_branches_ignored_for_other_actions() {
        let step = Step::new("x", "transform").with_param("branches", json!([{"id": "b"}]));
        assert!(step.branches().is_empty());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("a.YML")).unwrap(),
            DocumentFormat::Yaml
        );
        assert!(matches!(
            DocumentFormat::from_path(Path::new("a.txt")),
            Err(FlowdagError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_fingerprint_tracks_dependencies() {
        let a = DagDefinition {
            steps: vec![Step::new("a", "delay"), Step::new("b", "delay")],
            ..DagDefinition::new_workflow("p")
        };
        let mut b = a.clone();
        assert_eq!(a.fingerprint(), b.fingerprint());

        b.steps[1].depends_on.push("a".into());
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_round_trip_json() {
        let dag = DagDefinition {
            description: Some("demo".into()),
            steps: vec![Step::new("a", "delay").with_param("duration_seconds", json!(5))],
            ..DagDefinition::new_workflow("p")
        };

        let json = dag.render(DocumentFormat::Json).unwrap();
        let parsed = DagDefinition::parse(&json, DocumentFormat::Json).unwrap();
        assert_eq!(parsed, dag);
    }
}
