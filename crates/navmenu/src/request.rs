//! Request carrier abstraction.
//!
//! Menus never look inside the request themselves. Visibility predicates and
//! dynamic link functions receive it as `&dyn MenuRequest`, and the set of
//! activated menu nodes lives in its extensions for the duration of one request.

use std::collections::HashSet;

use axum::http::{Extensions, HeaderMap, Method, Request, Uri, request::Parts};
use tracing::trace;

use crate::menu::MenuItemId;

/// Menu nodes activated for the current request.
///
/// Stored in request extensions. Entries are only ever added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveMenus(HashSet<MenuItemId>);

impl ActiveMenus {
    /// Create an empty activation set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a node as active. Returns false if it was already active.
    pub fn insert(&mut self, id: MenuItemId) -> bool {
        self.0.insert(id)
    }

    /// Whether the node is active.
    pub fn contains(&self, id: MenuItemId) -> bool {
        self.0.contains(&id)
    }

    /// Get active node count.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no node is active.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over active node ids.
    pub fn iter(&self) -> impl Iterator<Item = &MenuItemId> {
        self.0.iter()
    }
}

/// Anything a menu can be built against.
///
/// Implemented for `http::Request<B>` and `http::request::Parts`, so the same
/// menu works from middleware, handlers and plain tests.
pub trait MenuRequest {
    fn uri(&self) -> &Uri;
    fn method(&self) -> &Method;
    fn headers(&self) -> &HeaderMap;
    fn extensions(&self) -> &Extensions;
    fn extensions_mut(&mut self) -> &mut Extensions;

    /// The activation set, if any node was activated for this request.
    fn active_menus(&self) -> Option<&ActiveMenus> {
        self.extensions().get::<ActiveMenus>()
    }

    /// Add a node to the activation set, creating the set if absent.
    fn activate(&mut self, id: MenuItemId) {
        let extensions = self.extensions_mut();
        if let Some(active) = extensions.get_mut::<ActiveMenus>() {
            active.insert(id);
        } else {
            let mut active = ActiveMenus::new();
            active.insert(id);
            extensions.insert(active);
        }
        trace!(menu_item = %id, "menu item activated");
    }

    /// Whether the node was activated. An absent set means nothing is active.
    fn is_active(&self, id: MenuItemId) -> bool {
        self.active_menus().is_some_and(|active| active.contains(id))
    }
}

impl<B> MenuRequest for Request<B> {
    fn uri(&self) -> &Uri {
        Request::uri(self)
    }

    fn method(&self) -> &Method {
        Request::method(self)
    }

    fn headers(&self) -> &HeaderMap {
        Request::headers(self)
    }

    fn extensions(&self) -> &Extensions {
        Request::extensions(self)
    }

    fn extensions_mut(&mut self) -> &mut Extensions {
        Request::extensions_mut(self)
    }
}

impl MenuRequest for Parts {
    fn uri(&self) -> &Uri {
        &self.uri
    }

    fn method(&self) -> &Method {
        &self.method
    }

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }
}
