//! Declarative route tables
//!
//! A route table is handed to a router's `config` and forwarded to the
//! grammar under that router's name.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a matched route resolves to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteTarget {
    /// Show one component in the default viewport
    Component(String),
    /// Show one component per named viewport
    Viewports(BTreeMap<String, String>),
    /// Recognize another URL instead
    Redirect(String),
}

/// One route table entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMapping {
    /// Path pattern (`/users/:id`, `/docs/*rest`)
    pub path: String,

    /// Name used for URL generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Resolution target
    pub target: RouteTarget,
}

/// Declarative route table for one router
pub type RouteTable = Vec<RouteMapping>;

impl RouteMapping {
    /// Route showing a component in the default viewport
    pub fn component(path: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            target: RouteTarget::Component(component.into()),
        }
    }

    /// Route showing components in several named viewports
    pub fn viewports<I, K, V>(path: impl Into<String>, viewports: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            path: path.into(),
            name: None,
            target: RouteTarget::Viewports(
                viewports
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Route redirecting to another URL
    pub fn redirect(path: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            target: RouteTarget::Redirect(to.into()),
        }
    }

    /// Name this route for URL generation
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
