//! Error types for the navigation engine

use thiserror::Error;

/// Grammar error types
#[derive(Debug, Error)]
pub enum RouterError {
    /// No route carries the requested name
    #[error("Unknown route name: {0}")]
    UnknownRouteName(String),

    /// A parameter required by the route pattern was not supplied
    #[error("Missing parameter '{param}' for route '{route}'")]
    MissingParameter { route: String, param: String },

    /// Invalid route table
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Navigation failures surfaced by `Router::navigate`
#[derive(Debug, Error)]
pub enum NavigationError {
    /// The grammar could not resolve the URL
    #[error("No route matched: {url}")]
    NoRouteMatch { url: String },

    /// A guard refused to let the navigation proceed
    #[error("Navigation vetoed by viewport '{viewport}' of router '{router}'")]
    NavigationVetoed {
        router: String,
        viewport: String,
        reason: Option<String>,
    },

    /// A view failed to activate or deactivate
    #[error("Activation failed for viewport '{viewport}' of router '{router}': {source}")]
    ActivationFailure {
        router: String,
        viewport: String,
        #[source]
        source: anyhow::Error,
    },

    /// A custom pipeline step failed
    #[error("Pipeline step '{step}' failed: {source}")]
    Pipeline {
        step: String,
        #[source]
        source: anyhow::Error,
    },

    /// Grammar rejected a configuration or generation request
    #[error(transparent)]
    Grammar(#[from] RouterError),
}

impl NavigationError {
    /// Whether this failure came from a guard veto
    pub fn is_veto(&self) -> bool {
        matches!(self, NavigationError::NavigationVetoed { .. })
    }
}
