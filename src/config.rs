use std::path::Path;

use serde::Deserialize;

/// File name looked up in the analysis root by [`ReachConfig::load`].
pub const CONFIG_FILE: &str = "reach-graph.toml";

/// Configuration for one reachability analysis.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReachConfig {
    /// When true, weak/non-owning references are never added to the graph, so
    /// `found_target` answers "is the target strongly held". When false, every
    /// reported reference is added and participates in the search.
    pub strong_references_only: bool,
}

impl Default for ReachConfig {
    fn default() -> Self {
        Self {
            strong_references_only: true,
        }
    }
}

impl ReachConfig {
    /// Only strong topology is discovered.
    pub fn strong_only() -> Self {
        Self {
            strong_references_only: true,
        }
    }

    /// Weak references are discovered too, and carry their strength as metadata.
    pub fn all_references() -> Self {
        Self {
            strong_references_only: false,
        }
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Load configuration from `reach-graph.toml` in the given root directory.
    ///
    /// Returns the default configuration if the file does not exist or cannot be parsed.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);

        if !config_path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => config,
                Err(err) => {
                    tracing::warn!(path = %config_path.display(), %err, "failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(err) => {
                tracing::warn!(path = %config_path.display(), %err, "failed to read config, using defaults");
                Self::default()
            }
        }
    }
}
