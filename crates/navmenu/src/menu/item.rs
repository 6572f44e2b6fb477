//! Menu tree nodes.
//!
//! A [`MenuItem`] is immutable once built and cheap to share between
//! requests. All per-request state (which nodes are active) lives in the
//! request, never in the tree.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{MenuResult, check_attribute_key};
use crate::menu::output::{Active, MenuOutput};
use crate::request::MenuRequest;
use crate::routes::RouteResolver;

/// Marker prefix for link targets that bypass route resolution.
pub const LITERAL_PREFIX: char = '!';

/// Identity of a menu node, shared by every clone of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MenuItemId(Uuid);

impl MenuItemId {
    /// Allocate a fresh identity.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for MenuItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MenuItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Visibility predicate: `(request, node) -> visible`.
pub type Visibility = Arc<dyn Fn(&dyn MenuRequest, &MenuItem) -> bool + Send + Sync>;

/// Link function: `(request, node) -> url`.
pub type LinkFn = Arc<dyn Fn(&dyn MenuRequest, &MenuItem) -> Option<String> + Send + Sync>;

/// Where a menu item points.
#[derive(Clone)]
pub enum LinkTarget {
    /// Symbolic route name, reversed through a [`RouteResolver`].
    Route(String),
    /// Literal URL, returned as-is.
    Literal(String),
    /// Computed from the request.
    Dynamic(LinkFn),
}

impl LinkTarget {
    /// Parse a link string. `"!/foo"` is the literal `/foo`; anything else
    /// names a route.
    pub fn parse(target: &str) -> Self {
        match target.strip_prefix(LITERAL_PREFIX) {
            Some(literal) => LinkTarget::Literal(literal.to_string()),
            None => LinkTarget::Route(target.to_string()),
        }
    }
}

impl fmt::Debug for LinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkTarget::Route(name) => f.debug_tuple("Route").field(name).finish(),
            LinkTarget::Literal(url) => f.debug_tuple("Literal").field(url).finish(),
            LinkTarget::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// A node in a navigation menu.
#[derive(Clone)]
pub struct MenuItem {
    id: MenuItemId,
    name: Option<String>,
    title: Option<String>,
    link: Option<LinkTarget>,
    visibility: Option<Visibility>,
    attributes: Map<String, Value>,
    children: Vec<MenuItem>,
}

impl MenuItem {
    /// Start building a menu item with a fresh identity.
    pub fn builder() -> MenuItemBuilder {
        MenuItemBuilder::new()
    }

    /// Node identity, used for activation.
    pub fn id(&self) -> MenuItemId {
        self.id
    }

    /// Name the node was declared under in a menu body.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Display title, defaulting to the declared name.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Where the node points, if anywhere.
    pub fn link(&self) -> Option<&LinkTarget> {
        self.link.as_ref()
    }

    /// Extra display attributes merged into the rendered record.
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Children in declaration order.
    pub fn children(&self) -> &[MenuItem] {
        &self.children
    }

    /// Depth-first search for a node by identity, including this one.
    pub fn find(&self, id: MenuItemId) -> Option<&MenuItem> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Find a descendant by a `/`-separated path of declared names,
    /// e.g. `"account/profile"`.
    pub fn lookup(&self, path: &str) -> Option<&MenuItem> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |node, segment| {
                node.children
                    .iter()
                    .find(|child| child.name.as_deref() == Some(segment))
            })
    }

    /// This node and its descendants linking to the named route.
    pub fn linking_to(&self, route: &str) -> Vec<&MenuItem> {
        let mut found = Vec::new();
        self.collect_linking_to(route, &mut found);
        found
    }

    fn collect_linking_to<'a>(&'a self, route: &str, found: &mut Vec<&'a MenuItem>) {
        if matches!(&self.link, Some(LinkTarget::Route(name)) if name == route) {
            found.push(self);
        }
        for child in &self.children {
            child.collect_linking_to(route, found);
        }
    }

    /// Mark this node active for the request.
    pub fn activate(&self, request: &mut dyn MenuRequest) {
        request.activate(self.id);
    }

    /// Whether the visibility predicate (if any) admits this request.
    pub fn is_visible(&self, request: &dyn MenuRequest) -> bool {
        self.visibility
            .as_ref()
            .is_none_or(|visible| visible(request, self))
    }

    /// Resolve this node's link for the request.
    ///
    /// Route names that the resolver does not know are an error and are not
    /// suppressed here.
    pub fn url(
        &self,
        request: &dyn MenuRequest,
        routes: &dyn RouteResolver,
    ) -> MenuResult<Option<String>> {
        let url = match &self.link {
            None => None,
            Some(LinkTarget::Dynamic(link)) => link(request, self),
            Some(LinkTarget::Literal(url)) => Some(url.clone()),
            Some(LinkTarget::Route(name)) => Some(routes.reverse(name)?),
        };
        Ok(url)
    }

    /// Render this node and its visible subtree for the request.
    ///
    /// Returns `Ok(None)` when the node is hidden; hidden nodes prune their
    /// whole subtree without evaluating it.
    pub fn build(
        &self,
        request: &dyn MenuRequest,
        routes: &dyn RouteResolver,
    ) -> MenuResult<Option<MenuOutput>> {
        if !self.is_visible(request) {
            return Ok(None);
        }

        let mut active = if request.is_active(self.id) {
            Active::Active
        } else {
            Active::Inactive
        };
        // Resolved before the children so link errors surface parent first
        let url = self.url(request, routes)?;

        let mut items = Vec::with_capacity(self.children.len());
        for child in &self.children {
            let Some(item) = child.build(request, routes)? else {
                continue;
            };
            if item.active.is_active() && active == Active::Inactive {
                active = Active::Subitem;
            }
            items.push(item);
        }

        Ok(Some(MenuOutput {
            title: self.title.clone(),
            url,
            items,
            active,
            extra: self.attributes.clone(),
        }))
    }

    /// Record the declared name, which also becomes the title when none
    /// was set.
    pub(crate) fn named(mut self, name: &str) -> Self {
        if self.title.is_none() {
            self.title = Some(name.to_string());
        }
        self.name = Some(name.to_string());
        self
    }
}

impl fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuItem")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("title", &self.title)
            .field("link", &self.link)
            .field("visibility", &self.visibility.as_ref().map(|_| ".."))
            .field("attributes", &self.attributes)
            .field("children", &self.children)
            .finish()
    }
}

/// Builder for [`MenuItem`].
///
/// The identity is allocated when the builder is created, so
/// [`MenuItemBuilder::id`] can be handed to activation middleware before the
/// node is placed in a tree.
#[derive(Clone)]
pub struct MenuItemBuilder {
    id: MenuItemId,
    title: Option<String>,
    link: Option<LinkTarget>,
    visibility: Option<Visibility>,
    attributes: Vec<(String, Value)>,
    children: Vec<MenuItem>,
}

impl MenuItemBuilder {
    /// Builder with a fresh identity.
    pub fn new() -> Self {
        Self::with_id(MenuItemId::new())
    }

    /// Builder for a node with a pre-reserved identity.
    pub fn with_id(id: MenuItemId) -> Self {
        Self {
            id,
            title: None,
            link: None,
            visibility: None,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Identity the built node will carry.
    pub fn id(&self) -> MenuItemId {
        self.id
    }

    /// Set the display title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Link through a named route, or a literal URL when prefixed with `!`.
    pub fn link(mut self, target: &str) -> Self {
        self.link = Some(LinkTarget::parse(target));
        self
    }

    /// Link through a named route.
    pub fn route(mut self, name: impl Into<String>) -> Self {
        self.link = Some(LinkTarget::Route(name.into()));
        self
    }

    /// Link to a literal URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.link = Some(LinkTarget::Literal(url.into()));
        self
    }

    /// Compute the link from the request.
    pub fn link_fn<F>(mut self, link: F) -> Self
    where
        F: Fn(&dyn MenuRequest, &MenuItem) -> Option<String> + Send + Sync + 'static,
    {
        self.link = Some(LinkTarget::Dynamic(Arc::new(link)));
        self
    }

    /// Set an already-parsed link target.
    pub fn link_target(mut self, target: LinkTarget) -> Self {
        self.link = Some(target);
        self
    }

    /// Only render the node (and its subtree) when `visible` returns true.
    pub fn visible_if<F>(mut self, visible: F) -> Self
    where
        F: Fn(&dyn MenuRequest, &MenuItem) -> bool + Send + Sync + 'static,
    {
        self.visibility = Some(Arc::new(visible));
        self
    }

    /// Set a shared visibility predicate.
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Extra key merged into the rendered record.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Append a child node.
    pub fn child(mut self, child: MenuItem) -> Self {
        self.children.push(child);
        self
    }

    /// Append child nodes in order.
    pub fn children(mut self, children: impl IntoIterator<Item = MenuItem>) -> Self {
        self.children.extend(children);
        self
    }

    /// Finish the node. Fails if an extra attribute uses a reserved key.
    pub fn build(self) -> MenuResult<MenuItem> {
        let mut attributes = Map::new();
        for (key, value) in self.attributes {
            check_attribute_key(&key)?;
            attributes.insert(key, value);
        }

        Ok(MenuItem {
            id: self.id,
            name: None,
            title: self.title,
            link: self.link,
            visibility: self.visibility,
            attributes,
            children: self.children,
        })
    }
}

impl Default for MenuItemBuilder {
    fn default() -> Self {
        Self::new()
    }
}
