//! Router node - navigation state machine
//!
//! # States
//!
//! ```text
//!            navigate(url) accepted
//!   ┌──────┐ ───────────────────────► ┌────────────┐
//!   │ Idle │                          │ Navigating │
//!   └──────┘ ◄─────────────────────── └────────────┘
//!             pipeline settled (ok or err)
//! ```
//!
//! While a node is navigating, further `navigate` calls are ignored rather
//! than queued. A URL equal to the last completed one is ignored as well.

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};
use uuid::Uuid;
use vista_core::NavigatorConfig;
use vista_types::{Params, RouteTable};

use crate::error::{NavigationError, RouterError};
use crate::grammar::Grammar;
use crate::pipeline::Pipeline;
use crate::viewport::{ViewPort, ViewportRegistry};

/// Why a navigation request did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// Another navigation is in flight on this node
    InFlight,
    /// The URL equals the last completed navigation
    AlreadyCurrent,
    /// Renavigation had no destination to replay
    NoDestination,
}

/// Successful result of a navigation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationOutcome {
    /// The pipeline ran to completion
    Navigated { canonical_url: String },
    /// The request was a deliberate no-op
    Ignored(IgnoreReason),
}

impl NavigationOutcome {
    /// Canonical URL, if the navigation actually ran
    pub fn canonical_url(&self) -> Option<&str> {
        match self {
            NavigationOutcome::Navigated { canonical_url } => Some(canonical_url),
            NavigationOutcome::Ignored(_) => None,
        }
    }
}

#[derive(Debug, Default)]
struct NavigationState {
    navigating: bool,
    /// Canonical URL of the last completed navigation
    last_navigated_url: Option<String>,
    /// Requested URL of the last completed navigation
    previous_url: Option<String>,
    last_navigation_attempt: Option<String>,
}

/// Clears the navigating flag on every exit path, including a dropped future
struct NavigatingGuard<'a> {
    state: &'a Mutex<NavigationState>,
}

impl<'a> NavigatingGuard<'a> {
    fn enter(state: &'a Mutex<NavigationState>) -> Option<Self> {
        let mut guarded = state.lock();
        if guarded.navigating {
            return None;
        }
        guarded.navigating = true;
        Some(Self { state })
    }
}

impl Drop for NavigatingGuard<'_> {
    fn drop(&mut self) {
        self.state.lock().navigating = false;
    }
}

/// One node of the router tree
pub struct Router {
    pub(crate) name: String,
    parent: Weak<Router>,
    pub(crate) children: Mutex<HashMap<String, Arc<Router>>>,
    pub(crate) ports: ViewportRegistry,
    state: Mutex<NavigationState>,
    grammar: Arc<dyn Grammar>,
    pipeline: Arc<dyn Pipeline>,
    config: Arc<NavigatorConfig>,
}

impl Router {
    /// Create the root router with the default configuration
    pub fn root(grammar: Arc<dyn Grammar>, pipeline: Arc<dyn Pipeline>) -> Arc<Router> {
        Self::root_with_config(NavigatorConfig::default(), grammar, pipeline)
    }

    /// Create the root router
    pub fn root_with_config(
        config: NavigatorConfig,
        grammar: Arc<dyn Grammar>,
        pipeline: Arc<dyn Pipeline>,
    ) -> Arc<Router> {
        info!(root = %config.root_name, "Creating root router");

        Arc::new(Self {
            name: config.root_name.clone(),
            parent: Weak::new(),
            children: Mutex::new(HashMap::new()),
            ports: ViewportRegistry::new(),
            state: Mutex::new(NavigationState::default()),
            grammar,
            pipeline,
            config: Arc::new(config),
        })
    }

    pub(crate) fn child_of(parent: &Arc<Router>, name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: Arc::downgrade(parent),
            children: Mutex::new(HashMap::new()),
            ports: ViewportRegistry::new(),
            state: Mutex::new(NavigationState::default()),
            grammar: parent.grammar.clone(),
            pipeline: parent.pipeline.clone(),
            config: parent.config.clone(),
        }
    }

    /// Viewport-slot name this node governs
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent node, `None` for the root
    pub fn parent(&self) -> Option<Arc<Router>> {
        self.parent.upgrade()
    }

    /// Whether a navigation is in flight on this node
    pub fn is_navigating(&self) -> bool {
        self.state.lock().navigating
    }

    /// Canonical URL of the last completed navigation
    pub fn last_navigated_url(&self) -> Option<String> {
        self.state.lock().last_navigated_url.clone()
    }

    /// Last URL passed to `navigate`, whether or not it completed
    pub fn last_navigation_attempt(&self) -> Option<String> {
        self.state.lock().last_navigation_attempt.clone()
    }

    #[cfg(test)]
    pub(crate) fn child_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.children.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Viewport registry of this node
    pub fn viewports(&self) -> &ViewportRegistry {
        &self.ports
    }

    /// Whether both nodes hold the same grammar and pipeline instances
    #[cfg(test)]
    pub(crate) fn shares_collaborators_with(&self, other: &Router) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.grammar) as *const (),
            Arc::as_ptr(&other.grammar) as *const (),
        ) && std::ptr::eq(
            Arc::as_ptr(&self.pipeline) as *const (),
            Arc::as_ptr(&other.pipeline) as *const (),
        )
    }

    /// Navigate to `url`, resolving with the canonical URL
    pub async fn navigate(self: &Arc<Self>, url: &str) -> Result<NavigationOutcome, NavigationError> {
        self.navigate_inner(url, false).await
    }

    /// `replay` skips the already-current check so renavigation reaches late views
    async fn navigate_inner(
        self: &Arc<Self>,
        url: &str,
        replay: bool,
    ) -> Result<NavigationOutcome, NavigationError> {
        {
            let mut state = self.state.lock();
            if state.navigating {
                debug!(router = %self.name, url = %url, "Navigation in flight, ignoring");
                return Ok(NavigationOutcome::Ignored(IgnoreReason::InFlight));
            }
            if !replay && state.last_navigated_url.as_deref() == Some(url) {
                debug!(router = %self.name, url = %url, "Already at URL, ignoring");
                return Ok(NavigationOutcome::Ignored(IgnoreReason::AlreadyCurrent));
            }
            state.last_navigation_attempt = Some(url.to_string());
        }

        let instruction = self.grammar.recognize(url).ok_or_else(|| {
            warn!(router = %self.name, url = %url, "No route matched");
            NavigationError::NoRouteMatch {
                url: url.to_string(),
            }
        })?;

        let Some(_navigating) = NavigatingGuard::enter(&self.state) else {
            return Ok(NavigationOutcome::Ignored(IgnoreReason::InFlight));
        };

        let navigation_id = Uuid::new_v4();
        info!(
            router = %self.name,
            url = %url,
            navigation_id = %navigation_id,
            replay,
            "Navigation started"
        );

        let routed = self.make_descendant_routers(Arc::new(instruction));

        match self.pipeline.process(&routed).await {
            Ok(()) => {
                let canonical_url = routed
                    .canonical_url()
                    .map(str::to_string)
                    .unwrap_or_else(|| url.to_string());

                let mut state = self.state.lock();
                state.last_navigated_url = Some(canonical_url.clone());
                state.previous_url = Some(url.to_string());

                info!(
                    router = %self.name,
                    canonical_url = %canonical_url,
                    navigation_id = %navigation_id,
                    "Navigation completed"
                );
                Ok(NavigationOutcome::Navigated { canonical_url })
            }
            Err(e) => {
                warn!(
                    router = %self.name,
                    url = %url,
                    navigation_id = %navigation_id,
                    error = %e,
                    "Navigation failed"
                );
                Err(e)
            }
        }
    }

    /// Replay the last completed (or else last attempted) URL.
    ///
    /// A node with nothing to replay defers to its parent.
    pub fn renavigate(self: &Arc<Self>) -> BoxFuture<'_, Result<NavigationOutcome, NavigationError>> {
        async move {
            let destination = {
                let state = self.state.lock();
                if state.navigating {
                    return Ok(NavigationOutcome::Ignored(IgnoreReason::InFlight));
                }
                state
                    .previous_url
                    .clone()
                    .or_else(|| state.last_navigation_attempt.clone())
            };

            match destination {
                Some(url) => {
                    debug!(router = %self.name, url = %url, "Renavigating");
                    self.navigate_inner(&url, true).await
                }
                None => match self.parent() {
                    Some(parent) => parent.renavigate().await,
                    None => Ok(NavigationOutcome::Ignored(IgnoreReason::NoDestination)),
                },
            }
        }
        .boxed()
    }

    /// Register a view handle and replay navigation into it.
    ///
    /// `name` defaults to the configured default viewport.
    pub async fn register_viewport(
        self: &Arc<Self>,
        view: Arc<dyn ViewPort>,
        name: Option<&str>,
    ) -> Result<NavigationOutcome, NavigationError> {
        let name = name.unwrap_or(&self.config.default_viewport).to_string();
        debug!(router = %self.name, viewport = %name, "Registering viewport");
        self.ports.register(&name, view);
        self.renavigate().await
    }

    /// Remove a view handle
    pub fn unregister_viewport(&self, name: Option<&str>) -> Option<Arc<dyn ViewPort>> {
        let name = name.unwrap_or(&self.config.default_viewport);
        self.ports.unregister(name)
    }

    /// Forward a route table to the grammar under this node's name, then renavigate
    pub async fn config(self: &Arc<Self>, table: RouteTable) -> Result<NavigationOutcome, NavigationError> {
        self.grammar.config(&self.name, table)?;
        self.renavigate().await
    }

    /// Generate a URL for a named route
    pub fn generate(&self, name: &str, params: &Params) -> Result<String, RouterError> {
        self.grammar.generate(name, params)
    }
}
