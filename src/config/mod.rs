//! Configuration loading and management for the Workforce Scope Engine.
//!
//! This module loads engine settings and per-branch attendance and salary
//! policies from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use workforce_scope_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Loaded engine: {}", config.settings().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{BranchPolicy, CheckInRules, EngineConfig, EngineSettings};
