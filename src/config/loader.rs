//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine settings
//! and branch policies from YAML files.

use std::fs;
use std::path::Path;
use std::time::Duration;

use tracing::info;

use crate::error::{EngineError, EngineResult};

use super::types::{BranchPolicy, EngineConfig, EngineSettings};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── engine.yaml      # Engine settings
/// └── branches/
///     └── *.yaml       # One branch policy per file
/// ```
///
/// # Example
///
/// ```no_run
/// use workforce_scope_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// let branch = loader.get_branch(10).unwrap();
/// println!("Branch {} probation: {} months", branch.name, branch.probation_months);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/default")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `engine.yaml` or the `branches` directory is missing
    /// - Any file contains invalid YAML
    /// - The `branches` directory holds no policy
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<EngineSettings>(&path.join("engine.yaml"))?;
        let branches = Self::load_branches(&path.join("branches"))?;

        info!(
            name = %settings.name,
            branches = branches.len(),
            "Loaded engine configuration"
        );

        Ok(Self::from_config(EngineConfig::new(settings, branches)))
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads every branch policy from the branches directory.
    fn load_branches(branches_dir: &Path) -> EngineResult<Vec<BranchPolicy>> {
        let dir_str = branches_dir.display().to_string();

        let entries = fs::read_dir(branches_dir).map_err(|_| EngineError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: dir_str.clone(),
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                paths.push(path);
            }
        }
        paths.sort();

        let branches = paths
            .iter()
            .map(|p| Self::load_yaml::<BranchPolicy>(p))
            .collect::<EngineResult<Vec<_>>>()?;

        if branches.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no branch files found)", dir_str),
            });
        }

        Ok(branches)
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        self.config.settings()
    }

    /// Returns the configured super-admin phone, if any.
    pub fn super_admin_phone(&self) -> Option<&str> {
        self.settings().super_admin_phone.as_deref()
    }

    /// Returns the idle session timeout.
    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.settings().session_timeout_secs)
    }

    /// Gets the policy of a branch.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::BranchNotFound`] for an unknown branch id.
    pub fn get_branch(&self, branch_id: i64) -> EngineResult<&BranchPolicy> {
        self.config
            .branches()
            .get(&branch_id)
            .ok_or(EngineError::BranchNotFound { branch_id })
    }
}
