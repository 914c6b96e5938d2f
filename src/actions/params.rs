// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowdag contributors

//! Structural parameter validation

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use super::ParamDefinition;

/// Result of validating a step's parameter values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParamValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ParamValidation {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

pub(super) fn validate(
    params: &[ParamDefinition],
    values: &Map<String, Value>,
    skip_hidden: bool,
) -> ParamValidation {
    let mut errors = Vec::new();

    for param in params {
        if skip_hidden && !param.is_visible(values) {
            continue;
        }

        let value = values.get(&param.name);

        if is_empty(value) {
            if param.required {
                errors.push(format!("{} is required", param.label));
            }
            continue;
        }

        match value {
            Some(Value::Number(n)) => check_number(param, n.as_f64(), &mut errors),
            Some(Value::String(s)) => check_string(param, s, &mut errors),
            _ => {}
        }
    }

    ParamValidation::from_errors(errors)
}

fn check_number(param: &ParamDefinition, value: Option<f64>, errors: &mut Vec<String>) {
    let Some(value) = value else {
        return;
    };

    if let Some(min) = param.min {
        if value < min {
            errors.push(format!("{} must be at least {}", param.label, min));
        }
    }

    if let Some(max) = param.max {
        if value > max {
            errors.push(format!("{} must be at most {}", param.label, max));
        }
    }
}

fn check_string(param: &ParamDefinition, value: &str, errors: &mut Vec<String>) {
    let len = value.chars().count();

    if let Some(min) = param.min_length {
        if len < min {
            errors.push(format!(
                "{} must be at least {} characters",
                param.label, min
            ));
        }
    }

    if let Some(max) = param.max_length {
        if len > max {
            errors.push(format!("{} must be at most {} characters", param.label, max));
        }
    }

    if let Some(pattern) = &param.pattern {
        match Regex::new(pattern) {
            Ok(re) if !re.is_match(value) => {
                errors.push(
                    param
                        .pattern_message
                        .clone()
                        .unwrap_or_else(|| format!("{} format is invalid", param.label)),
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(param = %param.name, error = %e, "skipping invalid pattern");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{validate_params, ActionRegistry, ParamType};
    use super::*;
    use serde_json::json;

    fn values(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_required_missing_null_and_empty() {
        let params = vec![ParamDefinition::new("name", "Name", ParamType::String).required()];

        for v in [json!({}), json!({"name": null}), json!({"name": ""})] {
            let result = validate(&params, &values(v), false);
            assert!(!result.valid);
            assert_eq!(result.errors, vec!["Name is required"]);
        }

        let result = validate(&params, &values(json!({"name": "x"})), false);
        assert!(result.valid);
    }

    #[test]
    fn test_numeric_bounds() {
        let result = validate_params(
            "llm_prompt",
            &values(json!({"model": "gpt-4o", "prompt": "hi", "temperature": 3})),
        );

        assert!(!result.valid);
        assert_eq!(result.errors, vec!["Temperature must be at most 2"]);
    }

    #[test]
    fn test_bounds_ignore_non_numeric_values() {
        let params = vec![ParamDefinition::new("n", "N", ParamType::Number).range(1.0, 5.0)];
        let result = validate(&params, &values(json!({"n": "100"})), false);
        assert!(result.valid);
    }

    #[test]
    fn test_pattern_uses_declared_message() {
        let result = validate_params("webhook", &values(json!({"url": "ftp://example.com"})));

        assert_eq!(result.errors, vec!["URL must start with http:// or https://"]);
    }

    #[test]
    fn test_pattern_generic_message() {
        let params = vec![ParamDefinition::new("code", "Code", ParamType::String)
            .pattern(r"^\d{3}$", None)];
        let result = validate(&params, &values(json!({"code": "12a"})), false);
        assert_eq!(result.errors, vec!["Code format is invalid"]);
    }

    #[test]
    fn test_string_length() {
        let params = vec![ParamDefinition::new("s", "Secret", ParamType::String)
            .length(Some(4), Some(6))];

        let short = validate(&params, &values(json!({"s": "abc"})), false);
        assert_eq!(short.errors, vec!["Secret must be at least 4 characters"]);

        let long = validate(&params, &values(json!({"s": "abcdefg"})), false);
        assert_eq!(long.errors, vec!["Secret must be at most 6 characters"]);
    }

    #[test]
    fn test_hidden_required_params_are_still_checked() {
        let registry = ActionRegistry::builtin();
        let v = values(json!({"url": "https://example.com", "method": "GET"}));

        // body is only shown for POST but is still required by the base validator
        let base = registry.validate_params("http_request", &v);
        assert_eq!(base.errors, vec!["Body is required"]);

        let visible = registry.validate_visible_params("http_request", &v);
        assert!(visible.valid);
    }

    #[test]
    fn test_invalid_pattern_is_skipped() {
        let params = vec![ParamDefinition::new("s", "S", ParamType::String).pattern("(", None)];
        let result = validate(&params, &values(json!({"s": "anything"})), false);
        assert!(result.valid);
    }
}
