// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowdag contributors

//! Configuration loading
//!
//! Settings come from `.flowdag.toml`. Lookup order: an explicit path, the
//! current directory, then the per-user config directory. Missing files
//! mean defaults.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::actions::{load_with_fallback, ActionRegistry, FileCatalog};
use crate::errors::{FlowdagError, FlowdagResult};
use crate::pipeline::{LayoutConfig, PipelineValidator};

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = ".flowdag.toml";

/// flowdag configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowdagConfig {
    /// Canvas layout
    pub layout: LayoutConfig,

    /// Validation behaviour
    pub validation: ValidationConfig,

    /// Action catalog source
    pub catalog: CatalogConfig,

    /// Directory relative paths are resolved against
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

/// Validation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Rule names to skip (e.g. "acyclic")
    pub disabled_rules: Vec<String>,

    /// Check step params against the catalog
    pub check_params: bool,

    /// Skip params hidden by `showWhen` when checking required fields
    pub exempt_hidden_params: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            disabled_rules: Vec::new(),
            check_params: true,
            exempt_hidden_params: false,
        }
    }
}

/// Catalog settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// YAML or JSON catalog replacing the built-in one
    pub path: Option<PathBuf>,
}

impl FlowdagConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> FlowdagResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| FlowdagError::read_failed(path, e))?;

        let mut config: Self =
            toml::from_str(&content).map_err(|e| FlowdagError::InvalidConfig {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        config.base_dir = path.parent().map(Path::to_path_buf);

        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Find and load configuration.
    ///
    /// An explicit path must exist; the implicit locations are optional.
    pub fn discover(explicit: Option<&Path>) -> FlowdagResult<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Self::from_file(&local);
        }

        if let Some(user) = user_config_path() {
            if user.exists() {
                return Self::from_file(&user);
            }
        }

        Ok(Self::default())
    }

    /// Catalog path with relative paths resolved against the config file
    pub fn catalog_path(&self) -> Option<PathBuf> {
        let path = self.catalog.path.as_ref()?;
        match &self.base_dir {
            Some(base) if path.is_relative() => Some(base.join(path)),
            _ => Some(path.clone()),
        }
    }

    /// Validator with the configured rules disabled
    pub fn validator(&self) -> PipelineValidator {
        self.validation
            .disabled_rules
            .iter()
            .fold(PipelineValidator::new(), |validator, name| {
                validator.without(name)
            })
    }

    /// Action registry from the configured catalog, or the built-in one
    pub async fn registry(&self) -> ActionRegistry {
        match self.catalog_path() {
            Some(path) => load_with_fallback(&FileCatalog::new(path)).await,
            None => ActionRegistry::builtin().clone(),
        }
    }
}

/// Per-user configuration file, e.g. `~/.config/flowdag/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "flowdag", "flowdag").map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::rules;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = FlowdagConfig::default();

        assert_eq!(config.layout, LayoutConfig::default());
        assert!(config.validation.check_params);
        assert!(!config.validation.exempt_hidden_params);
        assert!(config.catalog_path().is_none());
        assert_eq!(config.validator().rule_names().len(), 7);
    }

    #[test]
    fn test_load_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[layout]
level_spacing = 300.0

[validation]
disabled_rules = ["acyclic"]

[catalog]
path = "catalog.yaml"
"#
        )
        .unwrap();

        let config = FlowdagConfig::from_file(&path).unwrap();

        assert_eq!(config.layout.level_spacing, 300.0);
        assert_eq!(config.layout.node_spacing, 120.0);
        assert!(!config.validator().rule_names().contains(&rules::ACYCLIC));
        assert_eq!(config.catalog_path(), Some(dir.path().join("catalog.yaml")));
    }

    #[test]
    fn test_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "layout = 3").unwrap();

        assert!(matches!(
            FlowdagConfig::from_file(&path),
            Err(FlowdagError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let result = FlowdagConfig::discover(Some(Path::new("/nonexistent/flowdag.toml")));
        assert!(matches!(result, Err(FlowdagError::FileReadError { .. })));
    }
}
