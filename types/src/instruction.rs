//! Instruction tree
//!
//! An instruction describes, for one nested view region, which component
//! should be shown and what each of its own viewports should show.
//!
//! ```text
//! Instruction { component: "app" }
//!     ├── "default" → Instruction { component: "inbox" }
//!     │                   └── "default" → Instruction { component: "message", params: {id} }
//!     └── "sidebar" → Instruction { component: "folders" }
//! ```
//!
//! Instructions are produced fresh by the grammar for every navigation
//! attempt and are never mutated by the engine afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Viewport (slot) name
pub type ViewportName = String;

/// Route parameters captured at one level
pub type Params = BTreeMap<String, String>;

/// Resolved routing decision for one nesting level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// Component to show in this slot
    pub component: String,

    /// Parameters captured while matching this level
    #[serde(default)]
    pub params: Params,

    /// Child instructions keyed by viewport name
    #[serde(default)]
    pub viewports: BTreeMap<ViewportName, Instruction>,

    /// Normalized URL, set on the root once the whole tree recognized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
}

impl Instruction {
    /// Create a leaf instruction for a component
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            params: Params::new(),
            viewports: BTreeMap::new(),
            canonical_url: None,
        }
    }

    /// Add a captured parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Add a child instruction under a viewport name
    pub fn with_viewport(mut self, name: impl Into<ViewportName>, child: Instruction) -> Self {
        self.viewports.insert(name.into(), child);
        self
    }

    /// Set the canonical URL
    pub fn with_canonical_url(mut self, url: impl Into<String>) -> Self {
        self.canonical_url = Some(url.into());
        self
    }

    /// Child instruction for a viewport, if any
    pub fn viewport(&self, name: &str) -> Option<&Instruction> {
        self.viewports.get(name)
    }

    /// Number of levels in this tree (a leaf has depth 1)
    pub fn depth(&self) -> usize {
        1 + self
            .viewports
            .values()
            .map(Instruction::depth)
            .max()
            .unwrap_or(0)
    }
}
