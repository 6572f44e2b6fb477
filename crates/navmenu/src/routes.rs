//! Named route resolution.
//!
//! Menu items link to symbolic route names. The host application supplies a
//! [`RouteResolver`] that reverses a name into a URL path; [`RouteTable`] is a
//! ready-made resolver backed by a name → path-pattern map.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RouteResolutionError;

/// Reverses symbolic route names into URL paths.
pub trait RouteResolver: Send + Sync {
    /// Resolve `name` to a path. Unknown names are an error.
    fn reverse(&self, name: &str) -> Result<String, RouteResolutionError>;
}

impl<F> RouteResolver for F
where
    F: Fn(&str) -> Result<String, RouteResolutionError> + Send + Sync,
{
    fn reverse(&self, name: &str) -> Result<String, RouteResolutionError> {
        self(name)
    }
}

/// A named route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDefinition {
    /// Symbolic route name (e.g., "blog_index").
    pub name: String,
    /// URL path pattern (e.g., "/blog", "/blog/:slug").
    pub path: String,
}

/// Result of matching a path against the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// Name of the matched route.
    pub name: String,
    /// Path parameters extracted (e.g., {"slug": "my-post"}).
    pub params: HashMap<String, String>,
}

/// Route table mapping names to path patterns.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    /// Path patterns indexed by route name
    routes: HashMap<String, String>,
    /// Route names ordered for matching, most specific first
    match_order: Vec<String>,
}

impl RouteTable {
    /// Create an empty route table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a route table from route definitions.
    pub fn from_definitions(definitions: impl IntoIterator<Item = RouteDefinition>) -> Self {
        let mut table = Self::new();
        for definition in definitions {
            table.insert(definition.name, definition.path);
        }
        table
    }

    /// Builder-style insert.
    pub fn with_route(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.insert(name, path);
        self
    }

    /// Register (or replace) a named route.
    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<String>) {
        let name = name.into();
        if self.routes.insert(name.clone(), path.into()).is_none() {
            self.match_order.push(name);
        }
        self.sort_match_order();
    }

    /// Sort by specificity: fewer params first, then deeper paths first.
    fn sort_match_order(&mut self) {
        let routes = &self.routes;
        self.match_order.sort_by_key(|name| {
            let path = routes.get(name).map(String::as_str).unwrap_or_default();
            let param_count = path.matches(':').count();
            let segment_count = path.matches('/').count();
            (param_count, -(segment_count as i64), name.clone())
        });
        debug!(routes = self.match_order.len(), "rebuilt route match order");
    }

    /// Get the path pattern registered for a name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.routes.get(name).map(String::as_str)
    }

    /// Reverse a route, substituting `:param` segments from `params`.
    pub fn reverse_with(
        &self,
        name: &str,
        params: &HashMap<String, String>,
    ) -> Result<String, RouteResolutionError> {
        let pattern = self
            .routes
            .get(name)
            .ok_or_else(|| RouteResolutionError::UnknownRoute {
                name: name.to_string(),
            })?;

        let segments = pattern
            .split('/')
            .map(|segment| match segment.strip_prefix(':') {
                Some(param) => params.get(param).map(String::as_str).ok_or_else(|| {
                    RouteResolutionError::MissingParam {
                        name: name.to_string(),
                        param: param.to_string(),
                    }
                }),
                None => Ok(segment),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(segments.join("/"))
    }

    /// Match a request path against registered routes.
    pub fn match_path(&self, path: &str) -> Option<RouteMatch> {
        self.match_order.iter().find_map(|name| {
            let pattern = self.routes.get(name)?;
            let params = match_pattern(pattern, path)?;
            Some(RouteMatch {
                name: name.clone(),
                params,
            })
        })
    }

    /// Get route count.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl RouteResolver for RouteTable {
    fn reverse(&self, name: &str) -> Result<String, RouteResolutionError> {
        self.reverse_with(name, &HashMap::new())
    }
}

/// Match a route pattern against a path, extracting parameters.
///
/// Pattern: "/blog/:slug/edit"
/// Path: "/blog/my-post/edit"
/// Result: Some({"slug": "my-post"})
fn match_pattern(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    let pattern_parts: Vec<&str> = pattern.split('/').collect();
    let path_parts: Vec<&str> = path.split('/').collect();

    if pattern_parts.len() != path_parts.len() {
        return None;
    }

    let mut params = HashMap::new();

    for (pat, actual) in pattern_parts.iter().zip(path_parts.iter()) {
        if let Some(param_name) = pat.strip_prefix(':') {
            if actual.is_empty() {
                return None;
            }
            params.insert(param_name.to_string(), actual.to_string());
        } else if pat != actual {
            return None;
        }
    }

    Some(params)
}
