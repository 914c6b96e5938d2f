// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowdag contributors

//! Built-in action catalog
//!
//! Used when no live catalog is configured or the live catalog is
//! unavailable.

use serde_json::json;

use super::{ActionCategory, ActionMeta, ActionOutput, ParamDefinition, ParamType};

const URL_PATTERN: &str = r"^https?://";
const URL_MESSAGE: &str = "URL must start with http:// or https://";

fn action(
    value: &str,
    label: &str,
    icon: &str,
    color: &str,
    description: &str,
    params: Vec<ParamDefinition>,
    outputs: &[(&str, &str)],
) -> ActionMeta {
    ActionMeta {
        value: value.to_string(),
        label: label.to_string(),
        icon: icon.to_string(),
        color: color.to_string(),
        description: description.to_string(),
        params,
        outputs: outputs
            .iter()
            .map(|(name, description)| ActionOutput {
                name: (*name).to_string(),
                description: (*description).to_string(),
            })
            .collect(),
    }
}

fn category(id: &str, label: &str, actions: Vec<ActionMeta>) -> ActionCategory {
    ActionCategory {
        id: id.to_string(),
        label: label.to_string(),
        actions,
    }
}

/// All built-in categories in display order
pub(super) fn builtin_categories() -> Vec<ActionCategory> {
    vec![
        category("ai", "AI & Inference", ai_actions()),
        category("data", "Data", data_actions()),
        category("control", "Control Flow", control_actions()),
        category("output", "Output", output_actions()),
    ]
}

fn ai_actions() -> Vec<ActionMeta> {
    vec![
        action(
            "llm_prompt",
            "LLM Prompt",
            "🤖",
            "purple",
            "Send a prompt to a language model",
            vec![
                ParamDefinition::new("model", "Model", ParamType::Select)
                    .required()
                    .default_value(json!("gpt-4o-mini"))
                    .options(&[
                        ("gpt-4o-mini", "GPT-4o mini"),
                        ("gpt-4o", "GPT-4o"),
                        ("claude-3-5-sonnet", "Claude 3.5 Sonnet"),
                    ]),
                ParamDefinition::new("prompt", "Prompt", ParamType::Text)
                    .required()
                    .length(Some(1), Some(100_000))
                    .describe("Supports {{step_id.output}} templates"),
                ParamDefinition::new("system_prompt", "System Prompt", ParamType::Text),
                ParamDefinition::new("temperature", "Temperature", ParamType::Number)
                    .default_value(json!(0.7))
                    .range(0.0, 2.0),
                ParamDefinition::new("max_tokens", "Max Tokens", ParamType::Number)
                    .default_value(json!(1024))
                    .range(1.0, 32_000.0),
            ],
            &[
                ("response", "Model completion text"),
                ("usage", "Token usage for the call"),
            ],
        ),
        action(
            "classify",
            "Classify Text",
            "🏷",
            "violet",
            "Assign one of a set of labels to an input",
            vec![
                ParamDefinition::new("input", "Input", ParamType::Text).required(),
                ParamDefinition::new("labels", "Labels", ParamType::Json)
                    .required()
                    .default_value(json!([])),
                ParamDefinition::new("threshold", "Confidence Threshold", ParamType::Number)
                    .default_value(json!(0.5))
                    .range(0.0, 1.0),
            ],
            &[("label", "Chosen label"), ("score", "Confidence score")],
        ),
        action(
            "blocking_rule",
            "Blocking Rule Check",
            "🛡",
            "red",
            "Evaluate a blocking rule set against the request",
            vec![
                ParamDefinition::new("rule_set", "Rule Set", ParamType::String)
                    .required()
                    .pattern(
                        r"^[a-z0-9_-]+$",
                        Some("Rule set must use lowercase letters, digits, '-' or '_'"),
                    ),
                ParamDefinition::new("on_match", "On Match", ParamType::Select)
                    .default_value(json!("block"))
                    .options(&[("block", "Block"), ("flag", "Flag only")]),
            ],
            &[
                ("blocked", "Whether the request was blocked"),
                ("matched_rules", "Rules that matched"),
            ],
        ),
    ]
}

fn data_actions() -> Vec<ActionMeta> {
    vec![
        action(
            "http_request",
            "HTTP Request",
            "🌐",
            "blue",
            "Call an HTTP endpoint",
            vec![
                ParamDefinition::new("url", "URL", ParamType::String)
                    .required()
                    .pattern(URL_PATTERN, Some(URL_MESSAGE)),
                ParamDefinition::new("method", "Method", ParamType::Select)
                    .required()
                    .default_value(json!("GET"))
                    .options(&[
                        ("GET", "GET"),
                        ("POST", "POST"),
                        ("PUT", "PUT"),
                        ("DELETE", "DELETE"),
                    ]),
                ParamDefinition::new("headers", "Headers", ParamType::Json)
                    .default_value(json!({})),
                ParamDefinition::new("body", "Body", ParamType::Json)
                    .required()
                    .show_when("method", json!("POST")),
                ParamDefinition::new("timeout_ms", "Timeout (ms)", ParamType::Number)
                    .default_value(json!(30000))
                    .range(100.0, 300_000.0),
            ],
            &[
                ("status", "HTTP status code"),
                ("body", "Response body"),
                ("headers", "Response headers"),
            ],
        ),
        action(
            "transform",
            "Transform",
            "🔀",
            "cyan",
            "Reshape data with an expression",
            vec![
                ParamDefinition::new("expression", "Expression", ParamType::Text).required(),
                ParamDefinition::new("output_key", "Output Key", ParamType::String)
                    .default_value(json!("result"))
                    .pattern(
                        r"^[A-Za-z_][A-Za-z0-9_]*$",
                        Some("Output key must be a valid identifier"),
                    ),
            ],
            &[("result", "Transformed value")],
        ),
        action(
            "connector_sync",
            "Connector Sync",
            "🔌",
            "teal",
            "Pull records from a configured connector",
            vec![
                ParamDefinition::new("connector_id", "Connector", ParamType::String).required(),
                ParamDefinition::new("mode", "Mode", ParamType::Select)
                    .default_value(json!("incremental"))
                    .options(&[("full", "Full"), ("incremental", "Incremental")]),
                ParamDefinition::new("batch_size", "Batch Size", ParamType::Number)
                    .default_value(json!(100))
                    .range(1.0, 10_000.0),
            ],
            &[("records_synced", "Number of records pulled")],
        ),
    ]
}

fn control_actions() -> Vec<ActionMeta> {
    vec![
        action(
            super::CONDITIONAL_ACTION,
            "Conditional",
            "◆",
            "orange",
            "Route to the first branch whose condition matches",
            vec![
                ParamDefinition::new("condition", "Condition", ParamType::Text)
                    .required()
                    .describe("Boolean expression, e.g. {{classify.score}} > 0.8"),
                ParamDefinition::new("branches", "Branches", ParamType::Branches)
                    .default_value(json!([])),
            ],
            &[("matched_branch", "Id of the branch that matched")],
        ),
        action(
            "delay",
            "Delay",
            "⏱",
            "slate",
            "Wait before continuing",
            vec![ParamDefinition::new("duration_seconds", "Duration (s)", ParamType::Number)
                .required()
                .default_value(json!(60))
                .range(1.0, 86_400.0)],
            &[],
        ),
        action(
            "approval",
            "Manual Approval",
            "✋",
            "amber",
            "Pause until a reviewer approves",
            vec![
                ParamDefinition::new("approvers", "Approvers", ParamType::String).required(),
                ParamDefinition::new("timeout_hours", "Timeout (h)", ParamType::Number)
                    .default_value(json!(24))
                    .range(1.0, 720.0),
                ParamDefinition::new("escalate", "Escalate on timeout", ParamType::Boolean)
                    .default_value(json!(false)),
                ParamDefinition::new("escalation_contact", "Escalation Contact", ParamType::String)
                    .required()
                    .show_when("escalate", json!(true)),
            ],
            &[("approved_by", "Reviewer who approved")],
        ),
    ]
}

fn output_actions() -> Vec<ActionMeta> {
    vec![
        action(
            "webhook",
            "Webhook",
            "📤",
            "green",
            "POST the pipeline result to a URL",
            vec![
                ParamDefinition::new("url", "URL", ParamType::String)
                    .required()
                    .pattern(URL_PATTERN, Some(URL_MESSAGE)),
                ParamDefinition::new("secret", "Signing Secret", ParamType::String)
                    .length(Some(16), None),
            ],
            &[("status", "HTTP status code")],
        ),
        action(
            "notify",
            "Notification",
            "🔔",
            "yellow",
            "Send a message to a person or channel",
            vec![
                ParamDefinition::new("channel", "Channel", ParamType::Select)
                    .default_value(json!("slack"))
                    .options(&[("slack", "Slack"), ("email", "Email")]),
                ParamDefinition::new("recipient", "Recipient", ParamType::String).required(),
                ParamDefinition::new("message", "Message", ParamType::Text)
                    .required()
                    .length(None, Some(2000)),
            ],
            &[],
        ),
    ]
}
