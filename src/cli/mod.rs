//! CLI module for the OS-specific lookup
//!
//! A small host harness: it loads facts and terms from files or flags, runs
//! them through the `os_specific` lookup exactly as the engine would, and
//! prints the result.

pub mod output;

use clap::{Parser, ValueEnum};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::facts::Facts;
use crate::plugins::lookup::{LookupContext, LookupOptions, LookupRegistry, OsSpecificLookup};

/// Resolve OS-specific values from host facts
///
/// Terms are a list of strings (passed through) and mappings keyed by
/// `Distribution-version`, `Distribution-major`, `Distribution-release`,
/// `Distribution` or OS family, with an optional `default` key.
#[derive(Parser, Debug, Clone)]
#[command(name = "os-specific")]
#[command(author = "Rustible Contributors")]
#[command(version)]
#[command(about = "Resolve OS-specific lookup terms against host facts", long_about = None)]
pub struct Cli {
    /// Facts file (JSON or YAML; `setup` module output is accepted)
    #[arg(short = 'F', long, env = "RUSTIBLE_FACTS")]
    pub facts: Option<PathBuf>,

    /// Individual fact (key=value); overrides facts from file
    #[arg(long = "fact", value_parser = parse_fact_assignment, action = clap::ArgAction::Append)]
    pub fact: Vec<(String, String)>,

    /// Terms file (JSON or YAML list)
    #[arg(short = 't', long, conflicts_with = "terms_json", required_unless_present = "terms_json")]
    pub terms: Option<PathBuf>,

    /// Terms as inline JSON
    #[arg(long = "terms-json")]
    pub terms_json: Option<String>,

    /// Fallback key used when no OS identifier matches
    #[arg(long)]
    pub default_key: Option<String>,

    /// Fail on terms that are neither strings nor mappings
    #[arg(long)]
    pub strict: bool,

    /// Print the candidate keys to stderr before resolving
    #[arg(long)]
    pub show_keys: bool,

    /// Output format
    #[arg(short = 'o', long, default_value = "human")]
    pub output: OutputFormat,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short = 'c', long, env = "RUSTIBLE_OS_SPECIFIC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One value per line; strings printed raw
    #[default]
    Human,
    /// JSON list
    Json,
    /// YAML list
    Yaml,
}

/// Parse a `key=value` fact assignment
pub fn parse_fact_assignment(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{}'", s)),
    }
}

/// Read a JSON or YAML document, chosen by extension (YAML otherwise,
/// which also accepts JSON)
pub fn load_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content).map_err(|e| Error::parse(path, e)),
        _ => serde_yaml::from_str(&content).map_err(|e| Error::parse(path, e)),
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Facts from the facts file, with `--fact` overrides applied
    pub fn load_facts(&self) -> Result<Facts> {
        let mut facts = match &self.facts {
            Some(path) => Facts::from_value(load_document(path)?)?,
            None => Facts::new(),
        };

        facts.merge(
            self.fact
                .iter()
                .map(|(key, value)| (key.clone(), Value::String(value.clone())))
                .collect(),
        );

        debug!(count = facts.len(), "Loaded facts");
        Ok(facts)
    }

    /// The raw terms value; list-shape is checked by the lookup
    pub fn load_terms(&self) -> Result<Value> {
        match (&self.terms, &self.terms_json) {
            (Some(path), _) => load_document(path),
            (None, Some(inline)) => {
                serde_json::from_str(inline).map_err(|e| Error::parse("--terms-json", e))
            }
            (None, None) => Err(Error::Config(
                "either --terms or --terms-json is required".into(),
            )),
        }
    }

    /// Lookup options from config with flag overrides
    pub fn lookup_options(&self, config: &Config) -> LookupOptions {
        let mut options = config.lookup_options();
        if let Some(key) = &self.default_key {
            options = options.with_option("default_key", key.clone());
        }
        if self.strict {
            options = options.with_option("strict", true);
        }
        options
    }
}

/// Run the lookup described by `cli`
pub fn execute(cli: &Cli, config: &Config) -> Result<Vec<Value>> {
    let facts = cli.load_facts()?;
    let terms = cli.load_terms()?;
    let options = cli.lookup_options(config);

    let mut registry = LookupRegistry::new();
    registry.register(OsSpecificLookup::with_resolver(config.resolver()));

    let context = LookupContext::new().with_facts(facts);
    if cli.show_keys {
        let keys = config.resolver().candidate_keys(&context);
        output::print_candidate_keys(&keys, !cli.no_color);
    }

    Ok(registry.lookup_with_options("os_specific", &terms, &options, &context)?)
}
