// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowdag contributors

//! Error types with actionable diagnostics
//!
//! Pure model operations never fail; these errors cover the edges where
//! flowdag touches the outside world (files, catalogs, editor commands).

mod recovery;

pub use recovery::RecoverySuggestion;

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for flowdag operations
pub type FlowdagResult<T> = Result<T, FlowdagError>;

/// Main error type for flowdag
#[derive(Error, Debug, Diagnostic)]
pub enum FlowdagError {
    // ─────────────────────────────────────────────────────────────────────────
    // Document Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Pipeline file not found: {path}")]
    #[diagnostic(
        code(flowdag::pipeline_not_found),
        help("Create a new workflow with 'flowdag new <name>'")
    )]
    PipelineNotFound { path: PathBuf },

    #[error("Unsupported document format: {path}")]
    #[diagnostic(
        code(flowdag::unsupported_format),
        help("Supported extensions: .yaml, .yml, .json, .toml")
    )]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to read file '{path}': {error}")]
    #[diagnostic(code(flowdag::file_read_error))]
    FileReadError { path: PathBuf, error: String },

    #[error("Failed to write file '{path}': {error}")]
    #[diagnostic(code(flowdag::file_write_error))]
    FileWriteError { path: PathBuf, error: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Catalog Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Invalid action catalog: {reason}")]
    #[diagnostic(
        code(flowdag::invalid_catalog),
        help("The built-in catalog is used when a live catalog cannot be loaded")
    )]
    InvalidCatalog { reason: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Editor Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Node '{node}' not found in graph")]
    #[diagnostic(code(flowdag::node_not_found))]
    NodeNotFound { node: String },

    #[error("Edge '{edge}' not found in graph")]
    #[diagnostic(code(flowdag::edge_not_found))]
    EdgeNotFound { edge: String },

    #[error("Cannot connect '{source_node}' to '{target}': {reason}")]
    #[diagnostic(code(flowdag::connection_rejected))]
    ConnectionRejected {
        source_node: String,
        target: String,
        reason: String,
    },

    #[error("The start node cannot be removed")]
    #[diagnostic(
        code(flowdag::start_node_required),
        help("Every pipeline needs exactly one start node")
    )]
    StartNodeRequired,

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Invalid configuration in '{path}': {reason}")]
    #[diagnostic(code(flowdag::invalid_config))]
    InvalidConfig { path: PathBuf, reason: String },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/Parsing Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("IO error: {message}")]
    #[diagnostic(code(flowdag::io_error))]
    Io { message: String },

    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(flowdag::yaml_error))]
    Yaml { message: String },

    #[error("JSON parsing error: {message}")]
    #[diagnostic(code(flowdag::json_error))]
    Json { message: String },

    #[error("TOML error: {message}")]
    #[diagnostic(code(flowdag::toml_error))]
    Toml { message: String },

    #[error("Glob pattern error: {message}")]
    #[diagnostic(code(flowdag::glob_error))]
    GlobPattern { message: String },
}

impl From<std::io::Error> for FlowdagError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for FlowdagError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for FlowdagError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl From<toml::de::Error> for FlowdagError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml { message: e.to_string() }
    }
}

impl From<toml::ser::Error> for FlowdagError {
    fn from(e: toml::ser::Error) -> Self {
        Self::Toml { message: e.to_string() }
    }
}

impl From<glob::PatternError> for FlowdagError {
    fn from(e: glob::PatternError) -> Self {
        Self::GlobPattern { message: e.to_string() }
    }
}

impl FlowdagError {
    /// Create a rejected-connection error
    pub fn connection_rejected(source: &str, target: &str, reason: impl Into<String>) -> Self {
        Self::ConnectionRejected {
            source_node: source.to_string(),
            target: target.to_string(),
            reason: reason.into(),
        }
    }

    /// Wrap a read failure with the path that caused it
    pub fn read_failed(path: &std::path::Path, error: impl std::fmt::Display) -> Self {
        Self::FileReadError {
            path: path.to_path_buf(),
            error: error.to_string(),
        }
    }

    /// Wrap a write failure with the path that caused it
    pub fn write_failed(path: &std::path::Path, error: impl std::fmt::Display) -> Self {
        Self::FileWriteError {
            path: path.to_path_buf(),
            error: error.to_string(),
        }
    }
}
