//! OS-Specific Lookup Plugin
//!
//! Picks the value matching the host's operating system out of a mapping
//! keyed by OS identifiers.
//!
//! # Usage
//!
//! ```yaml
//! - name: Install the web server
//!   package:
//!     name: "{{ item }}"
//!   with_os_specific:
//!     - Debian: apache2
//!       RedHat: httpd
//!       FreeBSD: apache24
//!     - curl
//!
//! # Most specific key wins
//! python: "{{ lookup('os_specific', {'Ubuntu-20.04': 'python3.8', 'Ubuntu': 'python3', 'default': 'python'}) }}"
//! ```
//!
//! # Candidate keys
//!
//! Keys are probed in this order, built from the host facts:
//!
//! 1. `{distribution}-{version}` e.g. `Ubuntu-22.04`
//! 2. `{distribution}-{major_version}` e.g. `Ubuntu-22`
//! 3. `{distribution}-{release}` e.g. `Ubuntu-jammy`
//! 4. `{distribution}` e.g. `Ubuntu`
//! 5. `{os_family}` e.g. `Debian`
//!
//! A fact that is missing or empty contributes no key. The first key present
//! in a mapping term wins; failing that, the `default` key is used; failing
//! that, the term yields nothing.
//!
//! # Options
//!
//! - `default_key` (string): Fallback key name (default: `default`)
//! - `strict` (bool): Reject terms that are neither strings nor mappings

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use super::{
    LookupContext, LookupError, LookupOptionInfo, LookupOptions, LookupPlugin, LookupResult,
};
use crate::facts::{json_type_name, Facts};

/// Reserved mapping key used when no candidate key matches
pub const DEFAULT_KEY: &str = "default";

/// A single lookup term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Term {
    /// Passed through unchanged
    Literal(String),
    /// OS identifier to value, optionally with a default
    Conditional(IndexMap<String, Value>),
    /// Anything else; produces no output
    Unsupported(Value),
}

impl From<&Value> for Term {
    fn from(value: &Value) -> Self {
        match value {
            Value::String(s) => Term::Literal(s.clone()),
            Value::Object(map) => Term::Conditional(
                map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            ),
            other => Term::Unsupported(other.clone()),
        }
    }
}

impl From<Value> for Term {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Term::Literal(s),
            Value::Object(map) => Term::Conditional(map.into_iter().collect()),
            other => Term::Unsupported(other),
        }
    }
}

impl From<&str> for Term {
    fn from(s: &str) -> Self {
        Term::Literal(s.to_string())
    }
}

/// Names of the facts the candidate keys are built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactKeys {
    pub distribution: String,
    pub version: String,
    pub major_version: String,
    pub release: String,
    pub os_family: String,
}

impl Default for FactKeys {
    fn default() -> Self {
        Self {
            distribution: "ansible_distribution".to_string(),
            version: "ansible_distribution_version".to_string(),
            major_version: "ansible_distribution_major_version".to_string(),
            release: "ansible_distribution_release".to_string(),
            os_family: "ansible_os_family".to_string(),
        }
    }
}

/// Resolves OS-conditional terms against host facts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsKeyResolver {
    fact_keys: FactKeys,
    default_key: String,
}

impl Default for OsKeyResolver {
    fn default() -> Self {
        Self {
            fact_keys: FactKeys::default(),
            default_key: DEFAULT_KEY.to_string(),
        }
    }
}

impl OsKeyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the OS facts from different fact names
    pub fn with_fact_keys(mut self, fact_keys: FactKeys) -> Self {
        self.fact_keys = fact_keys;
        self
    }

    /// Use a different fallback key
    pub fn with_default_key(mut self, key: impl Into<String>) -> Self {
        self.default_key = key.into();
        self
    }

    pub fn fact_keys(&self) -> &FactKeys {
        &self.fact_keys
    }

    pub fn default_key(&self) -> &str {
        &self.default_key
    }

    /// Build the candidate key list, most specific first.
    pub fn candidate_keys(&self, context: &LookupContext) -> Vec<String> {
        let fact = |name: &str| context.fact(name).and_then(fact_text);
        let mut keys = Vec::with_capacity(5);

        if let Some(distribution) = fact(self.fact_keys.distribution.as_str()) {
            for name in [
                self.fact_keys.version.as_str(),
                self.fact_keys.major_version.as_str(),
                self.fact_keys.release.as_str(),
            ] {
                if let Some(suffix) = fact(name) {
                    keys.push(format!("{}-{}", distribution, suffix));
                }
            }
            keys.push(distribution);
        }

        if let Some(family) = fact(self.fact_keys.os_family.as_str()) {
            keys.push(family);
        }

        keys
    }

    /// Resolve every term, keeping input order.
    ///
    /// Conditional terms with no matching key and no default, and terms of
    /// unsupported types, produce no entry.
    pub fn resolve(&self, terms: &[Term], context: &LookupContext) -> Vec<Value> {
        let keys = self.candidate_keys(context);
        debug!(candidate_keys = ?keys, terms = terms.len(), "Resolving OS-specific terms");

        terms
            .iter()
            .enumerate()
            .filter_map(|(index, term)| {
                let resolved = self.resolve_term(term, &keys);
                if resolved.is_none() {
                    trace!(index, "Term resolved to nothing, skipping");
                }
                resolved
            })
            .collect()
    }

    /// Resolve one term against a precomputed candidate key list
    pub fn resolve_term(&self, term: &Term, keys: &[String]) -> Option<Value> {
        match term {
            Term::Literal(s) => Some(Value::String(s.clone())),
            Term::Conditional(map) => keys
                .iter()
                .find_map(|key| {
                    map.get(key).map(|value| {
                        trace!(key = %key, "Matched candidate key");
                        value.clone()
                    })
                })
                .or_else(|| map.get(&self.default_key).cloned()),
            Term::Unsupported(value) => {
                trace!(kind = json_type_name(value), "Dropping unsupported term");
                None
            }
        }
    }
}

/// Text of a fact usable in a key, or `None` if it counts as absent.
///
/// Floats are absent: an unquoted `22.10` parses to `22.1` and would build
/// the wrong key.
fn fact_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        Value::Number(n) => {
            debug!(value = %n, "Ignoring non-integer numeric fact, quote it to use it");
            None
        }
        _ => None,
    }
}

/// Candidate keys for `facts` using the standard fact names
pub fn candidate_keys(facts: &Facts) -> Vec<String> {
    OsKeyResolver::default().candidate_keys(&LookupContext::new().with_facts(facts.clone()))
}

/// Resolve `terms` against `facts` using the standard fact names and
/// `default` as the fallback key.
pub fn resolve(terms: &[Term], facts: &Facts) -> Vec<Value> {
    OsKeyResolver::default().resolve(terms, &LookupContext::new().with_facts(facts.clone()))
}

/// OS-specific lookup plugin
#[derive(Debug, Clone, Default)]
pub struct OsSpecificLookup {
    resolver: OsKeyResolver,
}

impl OsSpecificLookup {
    /// Create a new OsSpecificLookup instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a lookup backed by a custom resolver
    pub fn with_resolver(resolver: OsKeyResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &OsKeyResolver {
        &self.resolver
    }
}

impl LookupPlugin for OsSpecificLookup {
    fn name(&self) -> &'static str {
        "os_specific"
    }

    fn description(&self) -> &'static str {
        "Selects values keyed by the host's distribution, version or OS family"
    }

    fn lookup(
        &self,
        terms: &[Value],
        options: &LookupOptions,
        context: &LookupContext,
    ) -> LookupResult<Vec<Value>> {
        if options.get_bool_or("strict", false) {
            if let Some((index, bad)) = terms
                .iter()
                .enumerate()
                .find(|(_, t)| !matches!(t, Value::String(_) | Value::Object(_)))
            {
                return Err(LookupError::InvalidTerm(format!(
                    "term {} is a {}, expected a string or a mapping",
                    index,
                    json_type_name(bad)
                )));
            }
        }

        let terms: Vec<Term> = terms.iter().map(Term::from).collect();

        match options.get_string("default_key") {
            Some(key) => Ok(self
                .resolver
                .clone()
                .with_default_key(key)
                .resolve(&terms, context)),
            None => Ok(self.resolver.resolve(&terms, context)),
        }
    }

    fn validate_options(&self, options: &LookupOptions) -> LookupResult<()> {
        if let Some(value) = options.options.get("default_key") {
            match value {
                Value::String(s) if !s.is_empty() => {}
                _ => {
                    return Err(LookupError::InvalidOption {
                        option: "default_key".to_string(),
                        message: "must be a non-empty string".to_string(),
                    })
                }
            }
        }
        if options.has("strict") && options.get_bool("strict").is_none() {
            return Err(LookupError::InvalidOption {
                option: "strict".to_string(),
                message: "must be a boolean".to_string(),
            });
        }
        Ok(())
    }

    fn examples(&self) -> Vec<&'static str> {
        vec![
            "with_os_specific: [{Debian: apache2, RedHat: httpd}]",
            "lookup('os_specific', {'Ubuntu-22.04': 'python3.10', 'default': 'python3'})",
        ]
    }

    fn available_options(&self) -> Vec<LookupOptionInfo> {
        vec![
            LookupOptionInfo::new(
                "default_key",
                "Key used when no OS identifier matches",
                "string",
            )
            .with_default(DEFAULT_KEY),
            LookupOptionInfo::new(
                "strict",
                "Fail on terms that are neither strings nor mappings",
                "bool",
            )
            .with_default("false"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn ubuntu_facts() -> Facts {
        Facts::new()
            .with("ansible_distribution", "Ubuntu")
            .with("ansible_distribution_version", "20.04")
            .with("ansible_distribution_major_version", "20")
            .with("ansible_distribution_release", "focal")
            .with("ansible_os_family", "Debian")
    }

    fn conditional(value: Value) -> Term {
        Term::from(value)
    }

    #[test]
    fn test_candidate_keys_full_facts() {
        assert_eq!(
            candidate_keys(&ubuntu_facts()),
            vec!["Ubuntu-20.04", "Ubuntu-20", "Ubuntu-focal", "Ubuntu", "Debian"]
        );
    }

    #[test]
    fn test_candidate_keys_only_family() {
        let facts = Facts::new()
            .with("ansible_distribution", "")
            .with("ansible_os_family", "RedHat");
        assert_eq!(candidate_keys(&facts), vec!["RedHat"]);
    }

    #[test]
    fn test_candidate_keys_skip_empty_components() {
        let facts = Facts::new()
            .with("ansible_distribution", "Debian")
            .with("ansible_distribution_version", "")
            .with("ansible_distribution_major_version", "12")
            .with("ansible_distribution_release", Value::Null)
            .with("ansible_os_family", "Debian");
        assert_eq!(candidate_keys(&facts), vec!["Debian-12", "Debian", "Debian"]);
    }

    #[test]
    fn test_candidate_keys_need_distribution_for_composites() {
        let facts = Facts::new()
            .with("ansible_distribution_version", "9.3")
            .with("ansible_os_family", "RedHat");
        assert_eq!(candidate_keys(&facts), vec!["RedHat"]);
    }

    #[test]
    fn test_candidate_keys_numeric_version() {
        let facts = Facts::new()
            .with("ansible_distribution", "Alpine")
            .with("ansible_distribution_major_version", 3);
        assert_eq!(candidate_keys(&facts), vec!["Alpine-3", "Alpine"]);
    }

    #[test]
    fn test_candidate_keys_ignore_float_versions() {
        let facts = Facts::from_value(json!({
            "ansible_distribution": "Ubuntu",
            "ansible_distribution_version": 22.10,
            "ansible_distribution_major_version": 22,
            "ansible_os_family": "Debian"
        }))
        .unwrap();
        assert_eq!(candidate_keys(&facts), vec!["Ubuntu-22", "Ubuntu", "Debian"]);

        let term = conditional(json!({"Ubuntu-22.1": "wrong", "Ubuntu": "generic"}));
        assert_eq!(resolve(&[term], &facts), vec![json!("generic")]);
    }

    #[test]
    fn test_candidate_keys_empty_facts() {
        assert!(candidate_keys(&Facts::new()).is_empty());
    }

    #[test]
    fn test_literal_passthrough() {
        let result = resolve(&[Term::from("foo")], &Facts::new());
        assert_eq!(result, vec![json!("foo")]);
    }

    #[test]
    fn test_most_specific_key_wins() {
        let term = conditional(json!({"Ubuntu-20.04": "a", "Ubuntu": "b", "default": "c"}));
        let facts = Facts::new()
            .with("ansible_distribution", "Ubuntu")
            .with("ansible_distribution_version", "20.04");
        assert_eq!(resolve(&[term], &facts), vec![json!("a")]);
    }

    #[test]
    fn test_falls_back_to_distribution() {
        let term = conditional(json!({"Ubuntu-20.04": "a", "Ubuntu": "b", "default": "c"}));
        let facts = Facts::new()
            .with("ansible_distribution", "Ubuntu")
            .with("ansible_distribution_version", "21.10")
            .with("ansible_distribution_major_version", "21");
        assert_eq!(resolve(&[term], &facts), vec![json!("b")]);
    }

    #[test]
    fn test_family_match() {
        let term = conditional(json!({"RedHat": "httpd", "Debian": "apache2"}));
        assert_eq!(resolve(&[term], &ubuntu_facts()), vec![json!("apache2")]);
    }

    #[test]
    fn test_default_key_used() {
        let term = conditional(json!({"default": "z"}));
        let facts = Facts::new()
            .with("ansible_distribution", "Fedora")
            .with("ansible_os_family", "RedHat");
        assert_eq!(resolve(&[term], &facts), vec![json!("z")]);
    }

    #[test]
    fn test_unmatched_without_default_is_dropped() {
        let terms = vec![
            Term::from("before"),
            conditional(json!({"CentOS": "x"})),
            Term::from("after"),
        ];
        let facts = Facts::new().with("ansible_distribution", "Fedora");
        assert_eq!(resolve(&terms, &facts), vec![json!("before"), json!("after")]);
    }

    #[test]
    fn test_values_are_arbitrary_json() {
        let term = conditional(json!({
            "Debian": ["apache2", "libapache2-mod-php"],
            "default": null
        }));
        assert_eq!(
            resolve(&[term], &ubuntu_facts()),
            vec![json!(["apache2", "libapache2-mod-php"])]
        );
    }

    #[test]
    fn test_null_default_is_still_a_value() {
        let term = conditional(json!({"default": null}));
        assert_eq!(resolve(&[term], &Facts::new()), vec![Value::Null]);
    }

    #[test]
    fn test_unsupported_terms_dropped() {
        let terms: Vec<Term> = [json!(42), json!(true), json!(null), json!(["a"]), json!("ok")]
            .iter()
            .map(Term::from)
            .collect();
        assert_eq!(resolve(&terms, &ubuntu_facts()), vec![json!("ok")]);
    }

    #[test]
    fn test_custom_default_key() {
        let resolver = OsKeyResolver::new().with_default_key("fallback");
        let ctx = LookupContext::new();
        let term = conditional(json!({"default": "a", "fallback": "b"}));
        assert_eq!(resolver.resolve(&[term], &ctx), vec![json!("b")]);
    }

    #[test]
    fn test_custom_fact_keys() {
        let resolver = OsKeyResolver::new().with_fact_keys(FactKeys {
            distribution: "distro".to_string(),
            os_family: "family".to_string(),
            ..FactKeys::default()
        });
        let ctx = LookupContext::new().with_facts(
            Facts::new()
                .with("distro", "Arch")
                .with("family", "Archlinux"),
        );
        assert_eq!(resolver.candidate_keys(&ctx), vec!["Arch", "Archlinux"]);
    }

    #[test]
    fn test_term_deserialize_untagged() {
        let terms: Vec<Term> =
            serde_json::from_value(json!(["pkg", {"Debian": "x"}, 7])).unwrap();
        assert!(matches!(terms[0], Term::Literal(_)));
        assert!(matches!(terms[1], Term::Conditional(_)));
        assert!(matches!(terms[2], Term::Unsupported(_)));
    }

    #[test]
    fn test_plugin_lookup_with_options() {
        let plugin = OsSpecificLookup::new();
        let ctx = LookupContext::new().with_facts(ubuntu_facts());
        let opts = LookupOptions::new().with_option("default_key", "other");

        let result = plugin
            .lookup(&[json!({"CentOS": "a", "other": "b"})], &opts, &ctx)
            .unwrap();
        assert_eq!(result, vec![json!("b")]);
    }

    #[test]
    fn test_plugin_strict_rejects_unsupported_terms() {
        let plugin = OsSpecificLookup::new();
        let ctx = LookupContext::new();
        let opts = LookupOptions::new().with_option("strict", true);

        let err = plugin.lookup(&[json!("a"), json!(3)], &opts, &ctx).unwrap_err();
        assert!(matches!(err, LookupError::InvalidTerm(_)));
        assert!(err.to_string().contains("term 1 is a number"));

        let lenient = plugin
            .lookup(&[json!("a"), json!(3)], &LookupOptions::new(), &ctx)
            .unwrap();
        assert_eq!(lenient, vec![json!("a")]);
    }

    #[test]
    fn test_plugin_validate_options() {
        let plugin = OsSpecificLookup::new();
        assert!(plugin.validate_options(&LookupOptions::new()).is_ok());
        assert!(plugin
            .validate_options(&LookupOptions::new().with_option("default_key", ""))
            .is_err());
        assert!(plugin
            .validate_options(&LookupOptions::new().with_option("strict", "sometimes"))
            .is_err());
        assert!(plugin
            .validate_options(&LookupOptions::new().with_option("strict", "yes"))
            .is_ok());
    }

    #[test]
    fn test_plugin_metadata() {
        let plugin = OsSpecificLookup::new();
        assert_eq!(plugin.name(), "os_specific");
        assert_eq!(plugin.available_options().len(), 2);
        assert!(!plugin.examples().is_empty());
    }
}
