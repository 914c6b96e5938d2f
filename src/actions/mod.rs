// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowdag contributors

//! Action registry
//!
//! Every pipeline step names an action kind. The registry maps each kind to
//! its display metadata and parameter schema. Lookups never fail: unknown
//! kinds resolve to a placeholder so user-authored or newer actions still
//! render and round-trip.

mod catalog;
mod params;
mod source;

pub use params::ParamValidation;
pub use source::{load_with_fallback, BuiltinCatalog, CatalogSource, FileCatalog};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Action kind for conditional branch routing
pub const CONDITIONAL_ACTION: &str = "conditional";

/// Icon used for unknown action kinds
pub const FALLBACK_ICON: &str = "⚙";

/// Color used for unknown action kinds
pub const FALLBACK_COLOR: &str = "gray";

/// Parameter value types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// Single-line string
    String,
    /// Multi-line string
    Text,
    Number,
    Boolean,
    /// One of a fixed set of options
    Select,
    /// Arbitrary JSON value
    Json,
    /// Ordered list of conditional branches
    Branches,
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Text => write!(f, "text"),
            Self::Number => write!(f, "number"),
            Self::Boolean => write!(f, "boolean"),
            Self::Select => write!(f, "select"),
            Self::Json => write!(f, "json"),
            Self::Branches => write!(f, "branches"),
        }
    }
}

/// Option for select parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Conditional visibility: the parameter is shown only when another
/// parameter holds the given value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShowWhen {
    pub field: String,
    pub equals: Value,
}

impl ShowWhen {
    /// Check whether the condition holds for a set of values
    pub fn is_satisfied(&self, values: &Map<String, Value>) -> bool {
        values.get(&self.field).unwrap_or(&Value::Null) == &self.equals
    }
}

/// Schema for a single action parameter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParamDefinition {
    pub name: String,
    pub label: String,

    #[serde(rename = "type")]
    pub param_type: ParamType,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,

    /// Numeric lower bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Numeric upper bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    /// Regular expression a string value must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_when: Option<ShowWhen>,
}

impl ParamDefinition {
    /// Create an optional parameter with no constraints
    pub fn new(name: &str, label: &str, param_type: ParamType) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            param_type,
            required: false,
            default: None,
            description: None,
            options: Vec::new(),
            min: None,
            max: None,
            min_length: None,
            max_length: None,
            pattern: None,
            pattern_message: None,
            show_when: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn options(mut self, options: &[(&str, &str)]) -> Self {
        self.options = options
            .iter()
            .map(|(value, label)| SelectOption {
                value: (*value).to_string(),
                label: (*label).to_string(),
            })
            .collect();
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn pattern(mut self, pattern: &str, message: Option<&str>) -> Self {
        self.pattern = Some(pattern.to_string());
        self.pattern_message = message.map(str::to_string);
        self
    }

    pub fn show_when(mut self, field: &str, equals: Value) -> Self {
        self.show_when = Some(ShowWhen {
            field: field.to_string(),
            equals,
        });
        self
    }

    /// Whether the parameter is visible for the given values
    pub fn is_visible(&self, values: &Map<String, Value>) -> bool {
        self.show_when
            .as_ref()
            .map_or(true, |condition| condition.is_satisfied(values))
    }
}

/// A declared output of an action, referenced by downstream steps
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionOutput {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Metadata for one action kind
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionMeta {
    /// Registry key
    pub value: String,
    pub label: String,
    pub icon: String,
    pub color: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub params: Vec<ParamDefinition>,
    #[serde(default)]
    pub outputs: Vec<ActionOutput>,
}

impl ActionMeta {
    /// Placeholder metadata for an action kind the registry doesn't know
    pub fn placeholder(action: &str) -> Self {
        Self {
            value: action.to_string(),
            label: action.to_string(),
            icon: FALLBACK_ICON.to_string(),
            color: FALLBACK_COLOR.to_string(),
            description: String::new(),
            params: Vec::new(),
            outputs: Vec::new(),
        }
    }
}

/// A named group of actions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionCategory {
    pub id: String,
    pub label: String,
    pub actions: Vec<ActionMeta>,
}

/// Lookup table from action kind to metadata
#[derive(Debug, Clone)]
pub struct ActionRegistry {
    categories: Vec<ActionCategory>,
    index: HashMap<String, (usize, usize)>,
}

impl ActionRegistry {
    /// Build a registry from categories. Later duplicates of an action kind
    /// are ignored.
    pub fn new(categories: Vec<ActionCategory>) -> Self {
        let mut index = HashMap::new();
        for (ci, category) in categories.iter().enumerate() {
            for (ai, action) in category.actions.iter().enumerate() {
                if index.contains_key(&action.value) {
                    tracing::warn!(action = %action.value, "duplicate action kind in catalog");
                    continue;
                }
                index.insert(action.value.clone(), (ci, ai));
            }
        }
        Self { categories, index }
    }

    /// The built-in catalog, initialized once per process
    pub fn builtin() -> &'static ActionRegistry {
        static BUILTIN: OnceLock<ActionRegistry> = OnceLock::new();
        BUILTIN.get_or_init(|| Self::new(catalog::builtin_categories()))
    }

    /// All categories in catalog order
    pub fn categories(&self) -> &[ActionCategory] {
        &self.categories
    }

    /// All actions in catalog order
    pub fn all_actions(&self) -> impl Iterator<Item = &ActionMeta> {
        self.categories.iter().flat_map(|c| c.actions.iter())
    }

    /// Find the category an action belongs to
    pub fn category_of(&self, action: &str) -> Option<&ActionCategory> {
        let (ci, _) = self.index.get(action)?;
        self.categories.get(*ci)
    }

    /// Registered metadata, if any
    pub fn get(&self, action: &str) -> Option<&ActionMeta> {
        let (ci, ai) = self.index.get(action)?;
        self.categories.get(*ci)?.actions.get(*ai)
    }

    pub fn contains(&self, action: &str) -> bool {
        self.index.contains_key(action)
    }

    /// Metadata for an action, falling back to a placeholder
    pub fn meta(&self, action: &str) -> Cow<'_, ActionMeta> {
        match self.get(action) {
            Some(meta) => Cow::Borrowed(meta),
            None => Cow::Owned(ActionMeta::placeholder(action)),
        }
    }

    /// Parameter schema for an action (empty for unknown kinds)
    pub fn params(&self, action: &str) -> &[ParamDefinition] {
        match self.get(action) {
            Some(meta) => &meta.params,
            None => &[],
        }
    }

    /// Declared default value of every parameter that has one
    pub fn default_params(&self, action: &str) -> Map<String, Value> {
        self.params(action)
            .iter()
            .filter_map(|p| p.default.as_ref().map(|d| (p.name.clone(), d.clone())))
            .collect()
    }

    /// Validate parameter values against the action's schema
    pub fn validate_params(&self, action: &str, values: &Map<String, Value>) -> ParamValidation {
        params::validate(self.params(action), values, false)
    }

    /// Like [`validate_params`](Self::validate_params), but parameters hidden
    /// by `showWhen` are skipped
    pub fn validate_visible_params(
        &self,
        action: &str,
        values: &Map<String, Value>,
    ) -> ParamValidation {
        params::validate(self.params(action), values, true)
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

/// Metadata for an action from the built-in catalog
pub fn get_action_meta(action: &str) -> Cow<'static, ActionMeta> {
    ActionRegistry::builtin().meta(action)
}

/// Parameter schema for an action from the built-in catalog
pub fn get_action_params(action: &str) -> &'static [ParamDefinition] {
    ActionRegistry::builtin().params(action)
}

/// Default parameter values for an action from the built-in catalog
pub fn get_default_params(action: &str) -> Map<String, Value> {
    ActionRegistry::builtin().default_params(action)
}

/// Validate parameter values against the built-in catalog
pub fn validate_params(action: &str, values: &Map<String, Value>) -> ParamValidation {
    ActionRegistry::builtin().validate_params(action, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_action_placeholder() {
        let meta = get_action_meta("totally_unknown");

        assert_eq!(meta.value, "totally_unknown");
        assert_eq!(meta.label, "totally_unknown");
        assert_eq!(meta.icon, "⚙");
        assert_eq!(meta.color, "gray");
        assert!(meta.params.is_empty());
    }

    #[test]
    fn test_known_action_is_borrowed() {
        let meta = get_action_meta("http_request");
        assert!(matches!(meta, Cow::Borrowed(_)));
        assert_eq!(meta.label, "HTTP Request");
    }

    #[test]
    fn test_default_params_collects_declared_defaults() {
        let defaults = get_default_params("http_request");

        assert_eq!(defaults.get("method"), Some(&json!("GET")));
        assert_eq!(defaults.get("timeout_ms"), Some(&json!(30000)));
        // url has no default
        assert!(!defaults.contains_key("url"));
    }

    #[test]
    fn test_unknown_action_has_no_params() {
        assert!(get_action_params("nope").is_empty());
        assert!(get_default_params("nope").is_empty());
        assert!(validate_params("nope", &Map::new()).valid);
    }

    #[test]
    fn test_every_builtin_action_is_indexed() {
        let registry = ActionRegistry::builtin();
        for action in registry.all_actions() {
            assert!(registry.contains(&action.value));
            assert!(registry.category_of(&action.value).is_some());
        }
        assert!(registry.contains(CONDITIONAL_ACTION));
    }

    #[test]
    fn test_duplicate_kinds_keep_first() {
        let mut first = ActionMeta::placeholder("dup");
        first.label = "First".into();
        let mut second = ActionMeta::placeholder("dup");
        second.label = "Second".into();

        let registry = ActionRegistry::new(vec![ActionCategory {
            id: "misc".into(),
            label: "Misc".into(),
            actions: vec![first, second],
        }]);

        assert_eq!(registry.meta("dup").label, "First");
    }

    #[test]
    fn test_show_when_visibility() {
        let param = ParamDefinition::new("body", "Body", ParamType::Json)
            .show_when("method", json!("POST"));

        let mut values = Map::new();
        assert!(!param.is_visible(&values));

        values.insert("method".into(), json!("POST"));
        assert!(param.is_visible(&values));
    }
}
