//! Vista Shell - host application for the navigation engine
//!
//! The shell is responsible for:
//! - Building the root router from configuration
//! - Loading route tables (built-in demo or a JSON file)
//! - Mounting views that report what they render
//! - Navigating to the URLs it is given

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use vista_core::NavigatorConfig;
use vista_router::{
    Instruction, LifecyclePipeline, NavigationError, NavigationOutcome, RouteMapping, RouteTable,
    Router, TableGrammar, ViewPort,
};

/// Shell errors
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Cannot read route file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid route file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

/// Route tables keyed by router name (root name or component name)
#[derive(Debug, Clone, Default)]
pub struct ShellRoutes {
    tables: BTreeMap<String, RouteTable>,
}

impl ShellRoutes {
    /// Built-in demo: a welcome page and a two-pane mailbox
    pub fn demo(config: &NavigatorConfig) -> Self {
        let mut tables = BTreeMap::new();
        tables.insert(
            config.root_name.clone(),
            vec![
                RouteMapping::redirect("/", "/welcome"),
                RouteMapping::component("/welcome", "welcome").named("welcome"),
                RouteMapping::viewports("/mail", [("default", "inbox"), ("sidebar", "folders")])
                    .named("mail"),
            ],
        );
        tables.insert(
            "inbox".to_string(),
            vec![
                RouteMapping::component("/", "summary"),
                RouteMapping::component("/:id", "message").named("message"),
            ],
        );
        Self { tables }
    }

    /// Parse tables from JSON: `{ "<router>": [ <route>, ... ] }`
    pub fn from_json(json: &str) -> Result<Self, ShellError> {
        let tables: BTreeMap<String, RouteTable> = serde_json::from_str(json)?;
        Ok(Self { tables })
    }

    /// Read tables from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ShellError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Router names with a table
    pub fn routers(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }
}

/// View that logs and remembers what it renders
pub struct ConsoleView {
    label: String,
    rendered: Mutex<Vec<String>>,
}

impl ConsoleView {
    /// Create a view with a display label
    pub fn new(label: &str) -> Arc<Self> {
        Arc::new(Self {
            label: label.to_string(),
            rendered: Mutex::new(Vec::new()),
        })
    }

    /// Components rendered so far, oldest first
    pub fn rendered(&self) -> Vec<String> {
        self.rendered.lock().clone()
    }

    /// Component currently shown
    pub fn showing(&self) -> Option<String> {
        self.rendered.lock().last().cloned()
    }
}

#[async_trait]
impl ViewPort for ConsoleView {
    async fn activate(&self, instruction: &Instruction) -> anyhow::Result<()> {
        info!(
            view = %self.label,
            component = %instruction.component,
            params = ?instruction.params,
            "Rendering"
        );
        self.rendered.lock().push(instruction.component.clone());
        Ok(())
    }
}

/// Host application owning the root router
pub struct Shell {
    config: NavigatorConfig,
    router: Arc<Router>,
}

impl Shell {
    /// Create a shell with a table grammar and the default lifecycle pipeline
    pub fn new(config: NavigatorConfig) -> Self {
        info!(
            root = %config.root_name,
            max_redirects = config.max_redirects,
            "Creating shell"
        );

        let grammar = Arc::new(TableGrammar::new(&config));
        let router = Router::root_with_config(
            config.clone(),
            grammar,
            Arc::new(LifecyclePipeline::default()),
        );

        Self { config, router }
    }

    /// Root router
    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Router reached by following component names from the root
    pub fn router_at(&self, path: &[&str]) -> Arc<Router> {
        path.iter()
            .fold(self.router.clone(), |router, name| router.child_router(name))
    }

    /// Configure every table on the router it belongs to
    pub async fn load_routes(&self, routes: ShellRoutes) -> Result<(), ShellError> {
        for (name, table) in routes.tables {
            let router = if name == self.config.root_name {
                self.router.clone()
            } else {
                self.router.child_router(&name)
            };
            router.config(table).await?;
        }
        Ok(())
    }

    /// Mount a console view in a slot of the router at `path`
    pub async fn mount(
        &self,
        path: &[&str],
        viewport: Option<&str>,
        label: &str,
    ) -> Result<Arc<ConsoleView>, ShellError> {
        let view = ConsoleView::new(label);
        self.router_at(path)
            .register_viewport(view.clone(), viewport)
            .await?;
        Ok(view)
    }

    /// Navigate the root router
    pub async fn navigate(&self, url: &str) -> Result<NavigationOutcome, ShellError> {
        Ok(self.router.navigate(url).await?)
    }

    /// Get the shell configuration
    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }
}
