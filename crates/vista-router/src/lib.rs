//! Vista Router - Hierarchical Navigation Engine
//!
//! Resolves a URL into a tree of instructions, one per nested view region,
//! and drives the view lifecycle across a tree of cooperating routers.
//!
//! # Architecture
//!
//! ```text
//! URL
//!  │
//!  ▼
//! ┌─────────────────────────┐
//! │        Grammar          │  recognize(url) → Instruction tree
//! └───────────┬─────────────┘
//!             │
//!             ▼
//! ┌─────────────────────────┐
//! │   Router tree builder   │  one child router per component
//! └───────────┬─────────────┘
//!             │
//!             ▼
//! ┌─────────────────────────┐
//! │        Pipeline         │  guard walk → can-activate → activation walk
//! └───────────┬─────────────┘
//!             │
//!             ▼
//!      canonical URL cached
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vista_router::{LifecyclePipeline, Router, TableGrammar};
//! use vista_core::NavigatorConfig;
//! use vista_types::RouteMapping;
//!
//! let config = NavigatorConfig::default();
//! let grammar = Arc::new(TableGrammar::new(&config));
//! let router = Router::root_with_config(config, grammar, Arc::new(LifecyclePipeline::default()));
//!
//! router.config(vec![
//!     RouteMapping::redirect("/", "/welcome"),
//!     RouteMapping::component("/welcome", "welcome"),
//! ]).await?;
//! router.register_viewport(view, None).await?;
//! let outcome = router.navigate("/").await?;
//! ```

// Core modules
mod error;
mod viewport;
mod grammar;

// Engine
mod router;
mod tree;
mod activation;
mod pipeline;

#[cfg(test)]
mod testing;

// Re-exports: Error types
pub use error::{NavigationError, RouterError};

// Re-exports: Viewports
pub use viewport::{PortEntry, ViewPort, ViewportRegistry};

// Re-exports: Grammar
pub use grammar::{normalize_url, Grammar, TableGrammar};

// Re-exports: Router tree
pub use router::{IgnoreReason, NavigationOutcome, Router};
pub use tree::RoutedInstruction;
pub use activation::SlotVisitor;

// Re-exports: Pipeline
pub use pipeline::{
    ActivateStep, CanActivateStep, CanDeactivateStep, LifecyclePipeline, NavigationStep, Pipeline,
};

// Re-exports: shared types
pub use vista_core::NavigatorConfig;
pub use vista_types::{Instruction, Params, RouteMapping, RouteTable, RouteTarget};
