// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowdag contributors

//! Catalog sources
//!
//! A live catalog (exported by the action-schema service, or maintained by
//! hand) can replace the built-in one. When it can't be loaded the built-in
//! catalog is used instead.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;

use super::{ActionCategory, ActionRegistry};
use crate::errors::{FlowdagError, FlowdagResult};

/// Anything that can produce an action registry
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Human-readable description of where the catalog comes from
    fn describe(&self) -> String;

    /// Load the registry
    async fn load(&self) -> FlowdagResult<ActionRegistry>;
}

/// The compiled-in catalog
pub struct BuiltinCatalog;

#[async_trait]
impl CatalogSource for BuiltinCatalog {
    fn describe(&self) -> String {
        "built-in catalog".to_string()
    }

    async fn load(&self) -> FlowdagResult<ActionRegistry> {
        Ok(ActionRegistry::builtin().clone())
    }
}

/// On-disk catalog document
#[derive(Debug, Deserialize)]
struct CatalogDocument {
    categories: Vec<ActionCategory>,
}

/// Catalog stored in a YAML or JSON file
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parse(&self, content: &str) -> FlowdagResult<CatalogDocument> {
        let is_json = self
            .path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Ok(serde_json::from_str(content)?)
        } else {
            Ok(serde_yaml::from_str(content)?)
        }
    }
}

#[async_trait]
impl CatalogSource for FileCatalog {
    fn describe(&self) -> String {
        format!("catalog file {}", self.path.display())
    }

    async fn load(&self) -> FlowdagResult<ActionRegistry> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| FlowdagError::read_failed(&self.path, e))?;

        let document = self.parse(&content)?;
        if document.categories.iter().all(|c| c.actions.is_empty()) {
            return Err(FlowdagError::InvalidCatalog {
                reason: format!("{} defines no actions", self.path.display()),
            });
        }

        Ok(ActionRegistry::new(document.categories))
    }
}

/// Load a registry from `source`, falling back to the built-in catalog
pub async fn load_with_fallback(source: &dyn CatalogSource) -> ActionRegistry {
    match source.load().await {
        Ok(registry) => {
            tracing::debug!(source = %source.describe(), "loaded action catalog");
            registry
        }
        Err(e) => {
            tracing::warn!(
                source = %source.describe(),
                error = %e,
                "action catalog unavailable, using built-in catalog"
            );
            ActionRegistry::builtin().clone()
        }
    }
}
