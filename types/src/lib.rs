//! Vista Types - shared data model for the navigation engine
//!
//! - [`Instruction`]: one resolved routing decision per nesting level
//! - [`RouteMapping`]: one entry of a declarative route table

// ========== Core Modules ==========
pub mod instruction;
pub mod route;

// Export commonly used types
pub use instruction::{Instruction, Params, ViewportName};
pub use route::{RouteMapping, RouteTable, RouteTarget};

/// Name of the root router node (sentinel, never a component name)
pub const ROOT_ROUTER_NAME: &str = "/";

/// Viewport name used when a view registers without naming its slot
pub const DEFAULT_VIEWPORT: &str = "default";
