//! Router tree builder
//!
//! Mirrors a recognized instruction tree onto the router tree. Every child
//! instruction is owned by the child router named after its component:
//!
//! ```text
//! Instruction "/"                      Router "/"
//!   └── default → "inbox"       ──►      └── child "inbox"
//!         └── default → "message" ──►          └── child "message"
//! ```
//!
//! The association is built once, synchronously, before any lifecycle hook
//! runs, and travels beside the instruction instead of being written into it.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use vista_types::Instruction;

use crate::router::Router;

/// Instruction paired with the router responsible for its slot
#[derive(Clone)]
pub struct RoutedInstruction {
    instruction: Arc<Instruction>,
    router: Arc<Router>,
    viewports: BTreeMap<String, RoutedInstruction>,
}

impl RoutedInstruction {
    /// Recognized instruction for this level
    pub fn instruction(&self) -> &Arc<Instruction> {
        &self.instruction
    }

    /// Router owning this level
    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Routed children keyed by viewport name (same keys as the instruction)
    pub fn viewports(&self) -> &BTreeMap<String, RoutedInstruction> {
        &self.viewports
    }

    /// Component shown at this level
    pub fn component(&self) -> &str {
        &self.instruction.component
    }

    /// Canonical URL recorded by the grammar
    pub fn canonical_url(&self) -> Option<&str> {
        self.instruction.canonical_url.as_deref()
    }
}

impl fmt::Debug for RoutedInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutedInstruction")
            .field("component", &self.instruction.component)
            .field("router", &self.router.name())
            .field("viewports", &self.viewports)
            .finish()
    }
}

impl Router {
    /// Return the child router for `name`, creating it on first request
    pub fn child_router(self: &Arc<Self>, name: &str) -> Arc<Router> {
        self.children
            .lock()
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::debug!(parent = %self.name, child = %name, "Creating child router");
                Arc::new(Router::child_of(self, name))
            })
            .clone()
    }

    /// Assign a router to every level of `instruction`, with `self` at the root
    pub fn make_descendant_routers(self: &Arc<Self>, instruction: Arc<Instruction>) -> RoutedInstruction {
        let viewports = instruction
            .viewports
            .iter()
            .map(|(viewport, child)| {
                let child_router = self.child_router(&child.component);
                let routed = child_router.make_descendant_routers(Arc::new(child.clone()));
                (viewport.clone(), routed)
            })
            .collect();

        RoutedInstruction {
            instruction,
            router: self.clone(),
            viewports,
        }
    }
}
