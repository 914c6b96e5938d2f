// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowdag contributors

//! Params command - validate parameter values for one action

use miette::Result;
use serde_json::{Map, Value};
use std::path::PathBuf;

use super::load_config;
use crate::errors::FlowdagError;
use crate::utils::{print_error, print_success};

/// Run the params command
pub async fn run(
    action: String,
    values: String,
    visible_only: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let registry = config.registry().await;

    let values: Map<String, Value> = match serde_json::from_str(&values) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return Err(miette::miette!("Parameter values must be a JSON object")),
        Err(e) => return Err(FlowdagError::from(e).into()),
    };

    if !registry.contains(&action) {
        tracing::warn!(action = %action, "action is not in the catalog");
    }

    let result = if visible_only {
        registry.validate_visible_params(&action, &values)
    } else {
        registry.validate_params(&action, &values)
    };

    if result.valid {
        print_success(&format!("Parameters for '{}' are valid", action));
        return Ok(());
    }

    for error in &result.errors {
        print_error(error);
    }
    Err(miette::miette!(
        "{} parameter error(s) for '{}'",
        result.errors.len(),
        action
    ))
}
