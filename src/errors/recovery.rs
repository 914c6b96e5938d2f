// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowdag contributors

//! Error recovery suggestions
//!
//! Maps validation findings to concrete steps for fixing them.

use crate::pipeline::{rules, ValidationFinding};

/// A recovery suggestion with concrete steps
#[derive(Debug, Clone)]
pub struct RecoverySuggestion {
    /// Brief description of what to do
    pub action: String,
    /// Detailed steps
    pub steps: Vec<String>,
    /// Commands to run
    pub commands: Vec<String>,
}

impl RecoverySuggestion {
    /// Suggest a fix for a validation finding, if one is known for its rule
    pub fn for_finding(finding: &ValidationFinding) -> Option<Self> {
        match finding.rule {
            rules::SINGLE_START => Some(Self::fix_start_node()),
            rules::UNIQUE_STEP_IDS => Some(Self::fix_duplicate_ids()),
            rules::VALID_DEPENDENCIES => Some(Self::fix_dangling_dependency()),
            rules::ACYCLIC => Some(Self::fix_cycle()),
            rules::CONNECTIVITY | rules::START_CONNECTIVITY => Some(Self::connect_steps()),
            rules::CONDITIONAL_CONDITION => Some(Self::add_condition()),
            _ => None,
        }
    }

    /// Suggest restoring a single start node
    pub fn fix_start_node() -> Self {
        Self {
            action: "Keep exactly one start node".into(),
            steps: vec![
                "Steps with no dependencies are wired to the start node".into(),
                "Delete extra start nodes, or regenerate the graph from the DAG document".into(),
            ],
            commands: vec![
                "# Rebuild the graph from the document:".into(),
                "flowdag flow pipeline.yaml -o pipeline.flow.json".into(),
            ],
        }
    }

    /// Suggest renaming duplicated step IDs
    pub fn fix_duplicate_ids() -> Self {
        Self {
            action: "Give every step a unique id".into(),
            steps: vec![
                "Step ids are referenced by depends_on and branch targets".into(),
                "Rename the duplicates and update any references to them".into(),
            ],
            commands: vec![],
        }
    }

    /// Suggest fixing a reference to a step that does not exist
    pub fn fix_dangling_dependency() -> Self {
        Self {
            action: "Point depends_on at an existing step".into(),
            steps: vec![
                "The referenced step id is not defined in this pipeline".into(),
                "Check for typos, or remove the entry if the step was deleted".into(),
            ],
            commands: vec![
                "# List steps by level:".into(),
                "flowdag levels pipeline.yaml".into(),
            ],
        }
    }

    /// Suggest breaking a dependency cycle
    pub fn fix_cycle() -> Self {
        Self {
            action: "Remove circular dependency".into(),
            steps: vec![
                "Review the depends_on entries of the steps in the cycle".into(),
                "Ensure steps form a directed acyclic graph (DAG)".into(),
            ],
            commands: vec![
                "# Visualize your pipeline:".into(),
                "flowdag graph pipeline.yaml --format mermaid".into(),
            ],
        }
    }

    /// Suggest wiring disconnected steps
    pub fn connect_steps() -> Self {
        Self {
            action: "Connect the step to the pipeline".into(),
            steps: vec![
                "A step with an empty depends_on list runs first, from the start node".into(),
                "Otherwise list the steps it waits for in depends_on".into(),
            ],
            commands: vec![],
        }
    }

    /// Suggest adding a condition expression
    pub fn add_condition() -> Self {
        Self {
            action: "Add a condition to the conditional step".into(),
            steps: vec![
                "Set params.condition to a boolean expression".into(),
                "Branches are evaluated in order; the first match wins".into(),
            ],
            commands: vec![],
        }
    }
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "→ {}", self.action)?;

        for step in &self.steps {
            writeln!(f, "  {}", step)?;
        }

        if !self.commands.is_empty() {
            writeln!(f)?;
            for cmd in &self.commands {
                writeln!(f, "  {}", cmd)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Severity;

    #[test]
    fn test_suggestion_for_cycle_finding() {
        let finding = ValidationFinding {
            node_id: Some("step-a".into()),
            message: "cycle".into(),
            severity: Severity::Error,
            rule: rules::ACYCLIC,
        };

        let suggestion = RecoverySuggestion::for_finding(&finding).unwrap();
        assert!(suggestion.to_string().contains("circular dependency"));
    }

    #[test]
    fn test_no_suggestion_for_custom_rule() {
        let finding = ValidationFinding {
            node_id: None,
            message: "custom".into(),
            severity: Severity::Warning,
            rule: "my-rule",
        };

        assert!(RecoverySuggestion::for_finding(&finding).is_none());
    }
}
