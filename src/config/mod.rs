//! Node Configuration Module
//!
//! Link, timing and health-model settings loaded from TOML, replacing every
//! hardcoded constant with an operator-tunable value.
//!
//! ## Loading Order
//!
//! 1. `FOG_CONFIG` environment variable (path to TOML file)
//! 2. `fog_node.toml` in the current working directory
//! 3. Built-in defaults (see [`defaults`])
//!
//! The config is loaded once in `main` and passed down explicitly. The only
//! runtime-mutable part is the [`LinkSettings`] triple, shared through a
//! [`SettingsCell`] that the operator API and the file watcher update.

pub mod defaults;
mod node_config;
mod settings;
pub mod validation;
pub mod watcher;

pub use node_config::*;
pub use settings::*;
