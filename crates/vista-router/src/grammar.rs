//! Grammar - URL recognition and generation
//!
//! The engine only needs the [`Grammar`] trait. [`TableGrammar`] is an
//! in-memory implementation driven by declarative route tables.
//!
//! # Table Layout
//!
//! ```text
//! "/"      (root table)      "/mail"    → inbox
//!                            "/"        → redirect "/mail"
//! "inbox"  (child table)     "/:id"     → message
//! ```
//!
//! Child tables are keyed by component name, the same key the router tree
//! uses for child routers. A component with a table of its own consumes a
//! path prefix and recognizes the remainder against that table.

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace, warn};
use vista_core::NavigatorConfig;
use vista_types::{Instruction, Params, RouteMapping, RouteTable, RouteTarget};

use crate::error::RouterError;

/// URL-pattern resolution and generation collaborator
pub trait Grammar: Send + Sync {
    /// Add a route table for the router named `router_name`
    fn config(&self, router_name: &str, table: RouteTable) -> Result<(), RouterError>;

    /// Resolve a URL to an instruction tree
    fn recognize(&self, url: &str) -> Option<Instruction>;

    /// Build a URL for a named route
    fn generate(&self, name: &str, params: &Params) -> Result<String, RouterError>;
}

/// Normalize a URL: drop query and fragment, collapse duplicate and trailing slashes
pub fn normalize_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or("");
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    Splat(String),
}

#[derive(Debug, Clone)]
struct CompiledRoute {
    mapping: RouteMapping,
    segments: Vec<Segment>,
}

impl CompiledRoute {
    fn compile(mapping: RouteMapping) -> Result<Self, RouterError> {
        let raw = split_segments(&mapping.path);
        let mut segments = Vec::with_capacity(raw.len());

        for (index, segment) in raw.iter().enumerate() {
            let compiled = if let Some(name) = segment.strip_prefix(':') {
                Segment::Param(name.to_string())
            } else if let Some(name) = segment.strip_prefix('*') {
                if index + 1 != raw.len() {
                    return Err(RouterError::InvalidConfig(format!(
                        "splat segment must be last in '{}'",
                        mapping.path
                    )));
                }
                Segment::Splat(name.to_string())
            } else {
                Segment::Literal(segment.to_string())
            };

            if let Segment::Param(name) | Segment::Splat(name) = &compiled {
                if name.is_empty() {
                    return Err(RouterError::InvalidConfig(format!(
                        "unnamed parameter in '{}'",
                        mapping.path
                    )));
                }
            }
            segments.push(compiled);
        }

        Ok(Self { mapping, segments })
    }

    /// Match the pattern against the head of `path`, returning captures and the unconsumed tail
    fn match_prefix<'p>(&self, path: &'p [&'p str]) -> Option<(Params, &'p [&'p str])> {
        let mut params = Params::new();
        let mut position = 0;

        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => {
                    if path.get(position) != Some(&literal.as_str()) {
                        return None;
                    }
                    position += 1;
                }
                Segment::Param(name) => {
                    let value = path.get(position)?;
                    params.insert(name.clone(), value.to_string());
                    position += 1;
                }
                Segment::Splat(name) => {
                    params.insert(name.clone(), path[position..].join("/"));
                    position = path.len();
                }
            }
        }

        Some((params, &path[position..]))
    }

    /// Whether this route shows `component` in one of its slots
    fn leads_to(&self, component: &str) -> bool {
        match &self.mapping.target {
            RouteTarget::Component(target) => target == component,
            RouteTarget::Viewports(map) => map.values().any(|target| target == component),
            RouteTarget::Redirect(_) => false,
        }
    }

    fn generate(&self, params: &Params) -> Result<String, RouterError> {
        let route = || self.mapping.name.clone().unwrap_or_default();
        let mut parts = Vec::with_capacity(self.segments.len());

        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => parts.push(literal.clone()),
                Segment::Param(name) | Segment::Splat(name) => {
                    let value = params.get(name).ok_or_else(|| RouterError::MissingParameter {
                        route: route(),
                        param: name.clone(),
                    })?;
                    parts.push(value.trim_matches('/').to_string());
                }
            }
        }

        Ok(normalize_url(&parts.join("/")))
    }
}

/// Tables in name order, so lookups across tables are deterministic
fn sorted_tables(
    tables: &HashMap<String, Vec<CompiledRoute>>,
) -> impl Iterator<Item = (&str, &Vec<CompiledRoute>)> {
    let mut sorted: Vec<(&str, &Vec<CompiledRoute>)> =
        tables.iter().map(|(name, routes)| (name.as_str(), routes)).collect();
    sorted.sort_by_key(|(name, _)| *name);
    sorted.into_iter()
}

enum Resolution {
    Matched(BTreeMap<String, Instruction>),
    Redirect(String),
}

/// In-memory grammar backed by per-router route tables
pub struct TableGrammar {
    root_name: String,
    default_viewport: String,
    max_redirects: usize,
    tables: RwLock<HashMap<String, Vec<CompiledRoute>>>,
}

impl TableGrammar {
    /// Create an empty grammar using the navigator configuration
    pub fn new(config: &NavigatorConfig) -> Self {
        Self {
            root_name: config.root_name.clone(),
            default_viewport: config.default_viewport.clone(),
            max_redirects: config.max_redirects,
            tables: RwLock::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    fn route_count(&self, router_name: &str) -> usize {
        self.tables.read().get(router_name).map_or(0, Vec::len)
    }

    /// Recognize `path` against one table.
    ///
    /// `entered` lists the tables already entered without consuming a
    /// segment since. Entering one of them again would never terminate.
    fn recognize_level(
        &self,
        tables: &HashMap<String, Vec<CompiledRoute>>,
        table_name: &str,
        path: &[&str],
        entered: &[&str],
    ) -> Option<Resolution> {
        let routes = tables.get(table_name)?;
        if entered.contains(&table_name) {
            warn!(
                table = %table_name,
                remaining = path.len(),
                "Route tables nest into themselves without consuming a segment"
            );
            return None;
        }
        let mut here = entered.to_vec();
        here.push(table_name);

        for route in routes {
            let Some((params, rest)) = route.match_prefix(path) else {
                continue;
            };

            let slots: Vec<(String, String)> = match &route.mapping.target {
                RouteTarget::Redirect(to) => {
                    if rest.is_empty() {
                        return Some(Resolution::Redirect(to.clone()));
                    }
                    continue;
                }
                RouteTarget::Component(component) => {
                    vec![(self.default_viewport.clone(), component.clone())]
                }
                RouteTarget::Viewports(map) => map
                    .iter()
                    .map(|(viewport, component)| (viewport.clone(), component.clone()))
                    .collect(),
            };

            // The tail must be consumed by at least one nested table
            let mut consumed = rest.is_empty();
            let mut viewports = BTreeMap::new();
            for (viewport, component) in slots {
                let mut child = Instruction::new(component.clone());
                child.params = params.clone();

                if tables.contains_key(&component) {
                    let chain: &[&str] = if rest.len() == path.len() { &here } else { &[] };
                    let nested = match self.recognize_level(tables, &component, rest, chain) {
                        Some(Resolution::Matched(nested)) => {
                            consumed = true;
                            Some(nested)
                        }
                        Some(Resolution::Redirect(to)) => return Some(Resolution::Redirect(to)),
                        None if rest.is_empty() => None,
                        // The tail belongs to a sibling; fall back to this table's root route
                        None => match self.recognize_level(tables, &component, &[], &[]) {
                            Some(Resolution::Matched(nested)) => Some(nested),
                            _ => None,
                        },
                    };
                    if let Some(nested) = nested {
                        child.viewports = nested;
                    }
                }

                viewports.insert(viewport, child);
            }
            if !consumed {
                continue;
            }

            trace!(
                table = %table_name,
                pattern = %route.mapping.path,
                "Route matched"
            );
            return Some(Resolution::Matched(viewports));
        }

        None
    }
}

impl Grammar for TableGrammar {
    fn config(&self, router_name: &str, table: RouteTable) -> Result<(), RouterError> {
        let compiled = table
            .into_iter()
            .map(CompiledRoute::compile)
            .collect::<Result<Vec<_>, _>>()?;

        let mut tables = self.tables.write();
        let routes = tables.entry(router_name.to_string()).or_default();

        for route in &compiled {
            let Some(name) = &route.mapping.name else { continue };
            let duplicate = routes
                .iter()
                .chain(compiled.iter().take_while(|other| !std::ptr::eq(*other, route)))
                .any(|other| other.mapping.name.as_ref() == Some(name));
            if duplicate {
                return Err(RouterError::InvalidConfig(format!(
                    "duplicate route name '{}' for router '{}'",
                    name, router_name
                )));
            }
        }

        debug!(
            router = %router_name,
            routes = compiled.len(),
            "Route table configured"
        );
        routes.extend(compiled);
        Ok(())
    }

    fn recognize(&self, url: &str) -> Option<Instruction> {
        let tables = self.tables.read();
        let mut current = normalize_url(url);

        for _ in 0..=self.max_redirects {
            let path = split_segments(&current);
            match self.recognize_level(&tables, &self.root_name, &path, &[])? {
                Resolution::Matched(viewports) => {
                    let mut root = Instruction::new(self.root_name.clone());
                    root.viewports = viewports;
                    root.canonical_url = Some(current);
                    return Some(root);
                }
                Resolution::Redirect(to) => {
                    debug!(from = %current, to = %to, "Following redirect");
                    current = normalize_url(&to);
                }
            }
        }

        warn!(
            url = %url,
            max_redirects = self.max_redirects,
            "Redirect limit exceeded"
        );
        None
    }

    fn generate(&self, name: &str, params: &Params) -> Result<String, RouterError> {
        let tables = self.tables.read();
        let (mut table, route) = sorted_tables(&tables)
            .find_map(|(table, routes)| {
                routes
                    .iter()
                    .find(|route| route.mapping.name.as_deref() == Some(name))
                    .map(|route| (table, route))
            })
            .ok_or_else(|| RouterError::UnknownRouteName(name.to_string()))?;

        // Prefix the routes leading from the root table down to this one
        let mut url = route.generate(params)?;
        let mut visited = vec![table];
        while table != self.root_name {
            let Some((parent_table, parent)) = sorted_tables(&tables)
                .filter(|(candidate, _)| !visited.contains(candidate))
                .find_map(|(candidate, routes)| {
                    routes
                        .iter()
                        .find(|route| route.leads_to(table))
                        .map(|route| (candidate, route))
                })
            else {
                debug!(table = %table, route = %name, "No route leads into table");
                break;
            };

            url = normalize_url(&format!("{}/{}", parent.generate(params)?, url));
            visited.push(parent_table);
            table = parent_table;
        }

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grammar() -> TableGrammar {
        TableGrammar::new(&NavigatorConfig::default())
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url(""), "/");
        assert_eq!(normalize_url("/"), "/");
        assert_eq!(normalize_url("//users///7/"), "/users/7");
        assert_eq!(normalize_url("/users/7?tab=info#top"), "/users/7");
    }

    #[test]
    fn test_redirect_sets_canonical_url() {
        let grammar = grammar();
        grammar
            .config(
                "/",
                vec![
                    RouteMapping::redirect("/", "/welcome"),
                    RouteMapping::component("/welcome", "welcome"),
                ],
            )
            .unwrap();

        let instruction = grammar.recognize("/").unwrap();
        assert_eq!(instruction.component, "/");
        assert_eq!(instruction.canonical_url.as_deref(), Some("/welcome"));
        assert_eq!(instruction.viewports["default"].component, "welcome");
    }

    #[test]
    fn test_params_and_nested_tables() {
        let grammar = grammar();
        grammar
            .config(
                "/",
                vec![RouteMapping::viewports(
                    "/mail",
                    [("default", "inbox"), ("sidebar", "folders")],
                )],
            )
            .unwrap();
        grammar
            .config("inbox", vec![RouteMapping::component("/:id", "message")])
            .unwrap();

        let instruction = grammar.recognize("/mail/42").unwrap();
        let inbox = &instruction.viewports["default"];
        assert_eq!(inbox.component, "inbox");
        assert_eq!(inbox.viewports["default"].component, "message");
        assert_eq!(inbox.viewports["default"].params["id"], "42");
        assert_eq!(instruction.viewports["sidebar"].component, "folders");

        // The sidebar has no table of its own, so the tail only fits the inbox
        assert!(instruction.viewports["sidebar"].viewports.is_empty());
    }

    #[test]
    fn test_sibling_table_falls_back_to_root_route() {
        let grammar = grammar();
        grammar
            .config(
                "/",
                vec![RouteMapping::viewports(
                    "/mail",
                    [("default", "inbox"), ("sidebar", "folders")],
                )],
            )
            .unwrap();
        grammar
            .config("inbox", vec![RouteMapping::component("/:id", "message")])
            .unwrap();
        grammar
            .config("folders", vec![RouteMapping::component("/", "tree")])
            .unwrap();

        let instruction = grammar.recognize("/mail/42").unwrap();
        assert_eq!(instruction.viewports["default"].viewports["default"].component, "message");
        assert_eq!(instruction.viewports["sidebar"].viewports["default"].component, "tree");
    }

    #[test]
    fn test_nested_table_optional_tail() {
        let grammar = grammar();
        grammar
            .config("/", vec![RouteMapping::component("/mail", "inbox")])
            .unwrap();
        grammar
            .config("inbox", vec![RouteMapping::component("/:id", "message")])
            .unwrap();

        let instruction = grammar.recognize("/mail").unwrap();
        assert!(instruction.viewports["default"].viewports.is_empty());
    }

    #[test]
    fn test_unmatched_tail_is_no_match() {
        let grammar = grammar();
        grammar
            .config("/", vec![RouteMapping::component("/welcome", "welcome")])
            .unwrap();

        assert!(grammar.recognize("/welcome/extra").is_none());
        assert!(grammar.recognize("/nowhere").is_none());
    }

    #[test]
    fn test_splat_captures_rest() {
        let grammar = grammar();
        grammar
            .config("/", vec![RouteMapping::component("/docs/*page", "docs")])
            .unwrap();

        let instruction = grammar.recognize("/docs/guide/intro").unwrap();
        assert_eq!(instruction.viewports["default"].params["page"], "guide/intro");
    }

    #[test]
    fn test_redirect_loop_is_no_match() {
        let grammar = grammar();
        grammar
            .config(
                "/",
                vec![
                    RouteMapping::redirect("/a", "/b"),
                    RouteMapping::redirect("/b", "/a"),
                ],
            )
            .unwrap();

        assert!(grammar.recognize("/a").is_none());
    }

    #[test]
    fn test_generate() {
        let grammar = grammar();
        grammar
            .config(
                "/",
                vec![RouteMapping::component("/users/:id", "user").named("user")],
            )
            .unwrap();

        let mut params = Params::new();
        params.insert("id".to_string(), "7".to_string());
        assert_eq!(grammar.generate("user", &params).unwrap(), "/users/7");

        let missing = grammar.generate("user", &Params::new());
        assert!(matches!(missing, Err(RouterError::MissingParameter { .. })));

        let unknown = grammar.generate("nope", &params);
        assert!(matches!(unknown, Err(RouterError::UnknownRouteName(_))));
    }

    #[test]
    fn test_self_nesting_table_terminates() {
        let grammar = grammar();
        grammar
            .config("/", vec![RouteMapping::component("/tree", "folder")])
            .unwrap();
        grammar
            .config(
                "folder",
                vec![
                    RouteMapping::component("/", "folder"),
                    RouteMapping::component("/:name", "folder"),
                ],
            )
            .unwrap();

        let instruction = grammar.recognize("/tree").unwrap();
        let folder = &instruction.viewports["default"];
        assert_eq!(folder.component, "folder");
        assert_eq!(folder.viewports["default"].component, "folder");
        assert!(folder.viewports["default"].viewports.is_empty());

        // Consuming segments still recurses as deep as the URL goes
        let instruction = grammar.recognize("/tree/a/b").unwrap();
        let b = &instruction.viewports["default"].viewports["default"].viewports["default"];
        assert_eq!(b.params["name"], "b");
    }

    #[test]
    fn test_generate_prefixes_parent_routes() {
        let grammar = grammar();
        grammar
            .config(
                "/",
                vec![RouteMapping::viewports(
                    "/accounts/:account/mail",
                    [("default", "inbox"), ("sidebar", "folders")],
                )],
            )
            .unwrap();
        grammar
            .config(
                "inbox",
                vec![RouteMapping::component("/:id", "message").named("message")],
            )
            .unwrap();

        let mut params = Params::new();
        params.insert("account".to_string(), "ana".to_string());
        params.insert("id".to_string(), "42".to_string());

        let url = grammar.generate("message", &params).unwrap();
        assert_eq!(url, "/accounts/ana/mail/42");
        let instruction = grammar.recognize(&url).unwrap();
        assert_eq!(instruction.viewports["default"].viewports["default"].params["id"], "42");

        params.remove("account");
        let missing = grammar.generate("message", &params);
        assert!(matches!(
            missing,
            Err(RouterError::MissingParameter { ref param, .. }) if param == "account"
        ));
    }

    #[test]
    fn test_config_rejects_bad_tables() {
        let grammar = grammar();
        let splat = grammar.config("/", vec![RouteMapping::component("/*rest/x", "x")]);
        assert!(matches!(splat, Err(RouterError::InvalidConfig(_))));

        let duplicate = grammar.config(
            "/",
            vec![
                RouteMapping::component("/a", "a").named("same"),
                RouteMapping::component("/b", "b").named("same"),
            ],
        );
        assert!(matches!(duplicate, Err(RouterError::InvalidConfig(_))));
        assert_eq!(grammar.route_count("/"), 0);
    }
}
