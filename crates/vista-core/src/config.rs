//! Configuration module for Vista navigators

use serde::{Deserialize, Serialize};
use tracing::warn;
use vista_types::{DEFAULT_VIEWPORT, ROOT_ROUTER_NAME};

/// Default limit on chained redirects during one recognition
pub const DEFAULT_MAX_REDIRECTS: usize = 8;

/// Navigator configuration, shared by every router node of a tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Name of the root router node
    pub root_name: String,

    /// Viewport name used when a view registers without a name
    pub default_viewport: String,

    /// Maximum number of redirects followed while recognizing a URL
    pub max_redirects: usize,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            root_name: ROOT_ROUTER_NAME.to_string(),
            default_viewport: DEFAULT_VIEWPORT.to_string(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl NavigatorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = NavigatorConfig::default();

        // Root router name
        if let Ok(root_name) = std::env::var("VISTA_ROOT_NAME") {
            if !root_name.trim().is_empty() {
                config.root_name = root_name.trim().to_string();
            }
        }

        // Default viewport
        if let Ok(viewport) = std::env::var("VISTA_DEFAULT_VIEWPORT") {
            if !viewport.trim().is_empty() {
                config.default_viewport = viewport.trim().to_string();
            }
        }

        // Redirect limit
        if let Ok(max_redirects) = std::env::var("VISTA_MAX_REDIRECTS") {
            match max_redirects.parse() {
                Ok(value) => config.max_redirects = value,
                Err(_) => warn!(
                    value = %max_redirects,
                    "Ignoring invalid VISTA_MAX_REDIRECTS"
                ),
            }
        }

        config
    }

    /// Parse configuration from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
