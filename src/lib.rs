//! # rustible-os-specific - OS-conditional lookup for Rustible
//!
//! Playbooks that target several distributions keep running into the same
//! problem: the package is `apache2` on Debian, `httpd` on RedHat and
//! `apache24` on FreeBSD. The `os_specific` lookup lets a playbook spell the
//! choice out once, as a mapping keyed by OS identifiers, and picks the entry
//! matching the host's facts.
//!
//! ## Core Concepts
//!
//! - **Facts**: host attributes gathered by the engine ([`facts::Facts`])
//! - **Terms**: literal strings or OS-keyed mappings ([`plugins::lookup::Term`])
//! - **Candidate keys**: OS identifiers derived from facts, most specific first
//! - **Lookup plugins**: the engine-facing wrapper ([`plugins::lookup::LookupPlugin`])
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use rustible_os_specific::prelude::*;
//! use serde_json::json;
//!
//! let facts = Facts::new()
//!     .with("ansible_distribution", "Ubuntu")
//!     .with("ansible_distribution_version", "22.04")
//!     .with("ansible_os_family", "Debian");
//!
//! let registry = LookupRegistry::with_builtins();
//! let context = LookupContext::new().with_facts(facts);
//! let packages = registry.lookup(
//!     "os_specific",
//!     &json!([{"Debian": "apache2", "RedHat": "httpd"}, "curl"]),
//!     &context,
//! )?;
//! assert_eq!(packages, vec![json!("apache2"), json!("curl")]);
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::error::{Error, Result};
    pub use crate::facts::Facts;
    pub use crate::plugins::lookup::os_specific::{candidate_keys, resolve};
    pub use crate::plugins::lookup::prelude::*;
}

/// Error types and result aliases.
pub mod error;

/// Host facts handed to lookups.
pub mod facts;

/// Lookup plugin infrastructure and the `os_specific` lookup.
pub mod plugins;

/// Layered configuration (files and environment).
pub mod config;

/// Tracing subscriber setup for the command line harness.
pub mod logging;

/// Command line harness for running the lookup outside the engine.
pub mod cli;

/// Returns the current version of the crate.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
