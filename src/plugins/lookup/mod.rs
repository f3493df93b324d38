//! Lookup Plugin System
//!
//! This module provides the lookup plugin infrastructure the OS-specific
//! lookup plugs into. A lookup receives a list of terms plus an execution
//! context (host facts and variables) and returns a list of values.
//!
//! # Architecture
//!
//! 1. **[`LookupPlugin`]** trait: Core trait for all lookup implementations
//! 2. **[`LookupRegistry`]**: Central registry for lookup plugin discovery
//! 3. **[`LookupContext`]**: Execution context passed to lookups
//!
//! The registry is the host side of the contract: it checks that the terms
//! handed to a lookup are list-shaped before the plugin sees them, and it
//! applies the caller's [`ErrorBehavior`] to whatever the plugin returns.
//!
//! # Example
//!
//! ```rust,ignore
//! use rustible_os_specific::plugins::lookup::prelude::*;
//! use serde_json::json;
//!
//! let registry = LookupRegistry::with_builtins();
//! let context = LookupContext::new().with_facts(facts);
//!
//! let packages = registry.lookup(
//!     "os_specific",
//!     &json!([{"Debian": "apache2", "RedHat": "httpd"}]),
//!     &context,
//! )?;
//! ```

pub mod os_specific;

pub use os_specific::{FactKeys, OsKeyResolver, OsSpecificLookup, Term};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::facts::{json_type_name, Facts};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during lookup operations
#[derive(Error, Debug)]
pub enum LookupError {
    /// The requested lookup plugin was not found
    #[error("Lookup plugin not found: {0}")]
    NotFound(String),

    /// The lookup was invoked with arguments of the wrong shape
    #[error("Invalid lookup arguments: {0}")]
    InvalidArguments(String),

    /// Invalid lookup term
    #[error("Invalid lookup term: {0}")]
    InvalidTerm(String),

    /// Invalid option value
    #[error("Invalid option '{option}': {message}")]
    InvalidOption { option: String, message: String },
}

/// Result type for lookup operations
pub type LookupResult<T> = Result<T, LookupError>;

// ============================================================================
// Lookup Options
// ============================================================================

/// Options that can be passed to lookup plugins
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LookupOptions {
    /// Key-value options passed to the lookup
    #[serde(flatten)]
    pub options: HashMap<String, Value>,

    /// Lookup-specific errors behavior (fail or return nothing)
    #[serde(default)]
    pub errors: ErrorBehavior,
}

impl LookupOptions {
    /// Create new empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an option
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Set error behavior
    pub fn with_errors(mut self, behavior: ErrorBehavior) -> Self {
        self.errors = behavior;
        self
    }

    /// Get a string option
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.options.get(key).and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            _ => Some(v.to_string()),
        })
    }

    /// Get a boolean option
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.options.get(key).and_then(|v| match v {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_i64().map(|n| n != 0),
            Value::String(s) => match s.to_lowercase().as_str() {
                "true" | "yes" | "1" | "on" => Some(true),
                "false" | "no" | "0" | "off" => Some(false),
                _ => None,
            },
            _ => None,
        })
    }

    /// Get a boolean option with default
    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get_bool(key).unwrap_or(default)
    }

    /// Check if option exists
    pub fn has(&self, key: &str) -> bool {
        self.options.contains_key(key)
    }
}

/// Behavior when lookup encounters an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorBehavior {
    /// Raise an error (default)
    #[default]
    Strict,
    /// Return an empty list on error
    Ignore,
    /// Log warning and return an empty list
    Warn,
}

impl fmt::Display for ErrorBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorBehavior::Strict => write!(f, "strict"),
            ErrorBehavior::Ignore => write!(f, "ignore"),
            ErrorBehavior::Warn => write!(f, "warn"),
        }
    }
}

impl std::str::FromStr for ErrorBehavior {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(ErrorBehavior::Strict),
            "ignore" => Ok(ErrorBehavior::Ignore),
            "warn" => Ok(ErrorBehavior::Warn),
            other => Err(LookupError::InvalidOption {
                option: "errors".to_string(),
                message: format!("expected strict, ignore or warn, got '{}'", other),
            }),
        }
    }
}

// ============================================================================
// Lookup Context
// ============================================================================

/// Context for lookup execution
#[derive(Debug, Clone, Default)]
pub struct LookupContext {
    /// Facts about the current host
    pub facts: Facts,

    /// Variables in scope for the current host
    pub variables: IndexMap<String, Value>,
}

impl LookupContext {
    /// Create a new context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set facts
    pub fn with_facts(mut self, facts: Facts) -> Self {
        self.facts = facts;
        self
    }

    /// Set variables
    pub fn with_variables(mut self, vars: IndexMap<String, Value>) -> Self {
        self.variables = vars;
        self
    }

    /// Add a variable
    pub fn with_variable(mut self, key: impl Into<String>, value: Value) -> Self {
        self.variables.insert(key.into(), value);
        self
    }

    /// Look up a fact, falling back to a variable of the same name.
    ///
    /// The engine injects gathered facts into the host variable scope, so a
    /// caller may hand facts over through either field.
    pub fn fact(&self, key: &str) -> Option<&Value> {
        self.facts.get(key).or_else(|| self.variables.get(key))
    }
}

// ============================================================================
// Lookup Plugin Trait
// ============================================================================

/// Trait that all lookup plugins must implement
pub trait LookupPlugin: Send + Sync + fmt::Debug {
    /// Returns the name of the lookup plugin
    fn name(&self) -> &'static str;

    /// Returns a description of what the lookup does
    fn description(&self) -> &'static str;

    /// Execute the lookup with the given terms and options
    ///
    /// # Arguments
    ///
    /// * `terms` - The lookup terms, already checked to be a list
    /// * `options` - Options passed to the lookup
    /// * `context` - Execution context with facts and variables
    ///
    /// # Returns
    ///
    /// A vector of JSON values, in term order
    fn lookup(
        &self,
        terms: &[Value],
        options: &LookupOptions,
        context: &LookupContext,
    ) -> LookupResult<Vec<Value>>;

    /// Validate options before execution
    fn validate_options(&self, _options: &LookupOptions) -> LookupResult<()> {
        Ok(())
    }

    /// Returns example usage for documentation
    fn examples(&self) -> Vec<&'static str> {
        vec![]
    }

    /// Returns a list of available options with descriptions
    fn available_options(&self) -> Vec<LookupOptionInfo> {
        vec![]
    }
}

/// Information about a lookup option
#[derive(Debug, Clone)]
pub struct LookupOptionInfo {
    /// Option name
    pub name: &'static str,
    /// Option description
    pub description: &'static str,
    /// Option type
    pub option_type: &'static str,
    /// Default value as string
    pub default: Option<&'static str>,
}

impl LookupOptionInfo {
    /// Create a new option info
    pub fn new(name: &'static str, description: &'static str, option_type: &'static str) -> Self {
        Self {
            name,
            description,
            option_type,
            default: None,
        }
    }

    /// Set default value
    pub fn with_default(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }
}

/// Normalize lookup terms into a list.
///
/// Lookups that operate on several terms at once (`with_<name>` loops) only
/// accept list-shaped input.
pub fn listify_terms(name: &str, terms: &Value) -> LookupResult<Vec<Value>> {
    match terms {
        Value::Array(items) => Ok(items.clone()),
        other => Err(LookupError::InvalidArguments(format!(
            "with_{} expects a list, got {}",
            name,
            json_type_name(other)
        ))),
    }
}

// ============================================================================
// Lookup Registry
// ============================================================================

/// Registry for managing lookup plugins
#[derive(Debug, Default)]
pub struct LookupRegistry {
    plugins: HashMap<String, Arc<dyn LookupPlugin>>,
}

impl LookupRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with all built-in plugins
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(OsSpecificLookup::new());
        registry
    }

    /// Register a lookup plugin
    pub fn register<P: LookupPlugin + 'static>(&mut self, plugin: P) {
        let name = plugin.name().to_string();
        self.plugins.insert(name, Arc::new(plugin));
    }

    /// Get a lookup plugin by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn LookupPlugin>> {
        self.plugins.get(name).cloned()
    }

    /// Check if a lookup plugin exists
    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// List all registered plugin names, sorted
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.plugins.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Execute a lookup by plugin name
    pub fn lookup(
        &self,
        name: &str,
        terms: &Value,
        context: &LookupContext,
    ) -> LookupResult<Vec<Value>> {
        self.lookup_with_options(name, terms, &LookupOptions::default(), context)
    }

    /// Execute a lookup with options
    pub fn lookup_with_options(
        &self,
        name: &str,
        terms: &Value,
        options: &LookupOptions,
        context: &LookupContext,
    ) -> LookupResult<Vec<Value>> {
        let plugin = self
            .get(name)
            .ok_or_else(|| LookupError::NotFound(name.to_string()))?;

        let outcome = plugin
            .validate_options(options)
            .and_then(|()| listify_terms(name, terms))
            .and_then(|terms| plugin.lookup(&terms, options, context));

        match (outcome, options.errors) {
            (Ok(values), _) => {
                debug!(lookup = name, results = values.len(), "Lookup completed");
                Ok(values)
            }
            (Err(e), ErrorBehavior::Strict) => Err(e),
            (Err(e), ErrorBehavior::Warn) => {
                warn!(lookup = name, error = %e, "Lookup failed, returning no values");
                Ok(Vec::new())
            }
            (Err(e), ErrorBehavior::Ignore) => {
                debug!(lookup = name, error = %e, "Lookup failed, error ignored");
                Ok(Vec::new())
            }
        }
    }
}

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient re-exports for lookup development and usage.
pub mod prelude {
    pub use super::{
        listify_terms, ErrorBehavior, FactKeys, LookupContext, LookupError, LookupOptionInfo,
        LookupOptions, LookupPlugin, LookupRegistry, LookupResult, OsKeyResolver,
        OsSpecificLookup, Term,
    };
}

// ============================================================================
// Unit Tests
// ============================================================================
