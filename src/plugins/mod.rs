//! Plugin System
//!
//! Plugins extend the automation engine. This crate ships one category:
//!
//! ## Lookup Plugins
//!
//! Plugins for retrieving values during playbook execution. See the
//! [`lookup`] module, and [`lookup::OsSpecificLookup`] for the OS-specific
//! value selector.
//!
//! # Creating Custom Plugins
//!
//! Implement the [`lookup::LookupPlugin`] trait and register the plugin:
//!
//! ```rust,ignore
//! use rustible_os_specific::plugins::lookup::prelude::*;
//!
//! #[derive(Debug, Default)]
//! struct MyLookup;
//!
//! impl LookupPlugin for MyLookup {
//!     fn name(&self) -> &'static str { "my_lookup" }
//!     fn description(&self) -> &'static str { "My custom lookup" }
//!     fn lookup(
//!         &self,
//!         terms: &[serde_json::Value],
//!         options: &LookupOptions,
//!         context: &LookupContext,
//!     ) -> LookupResult<Vec<serde_json::Value>> {
//!         Ok(terms.to_vec())
//!     }
//! }
//!
//! let mut registry = LookupRegistry::with_builtins();
//! registry.register(MyLookup);
//! ```

pub mod lookup;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use super::lookup::prelude::*;
}
