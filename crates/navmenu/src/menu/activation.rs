//! Activation middleware.
//!
//! Wrap a route (or a whole router) so that every request passing through it
//! marks a menu node as active before the handler runs:
//!
//! ```ignore
//! Router::new().route(
//!     "/blog",
//!     get(blog_index).layer(axum::middleware::from_fn_with_state(
//!         blog_item.id(),
//!         navmenu::activate_menu,
//!     )),
//! );
//! ```
//!
//! Nested layers accumulate, so a section-level layer and a page-level layer
//! can both activate their nodes for the same request.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use tracing::trace;

use crate::menu::{MenuItem, MenuItemId};
use crate::request::MenuRequest;
use crate::routes::RouteTable;

/// Middleware adding the node in state to the request's active menus.
pub async fn activate_menu(
    State(id): State<MenuItemId>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.activate(id);
    next.run(request).await
}

/// Middleware activating several nodes at once.
pub async fn activate_menus(
    State(ids): State<Vec<MenuItemId>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    for id in ids {
        request.activate(id);
    }
    next.run(request).await
}

/// Activate every node under `root` that links to `route`.
///
/// Returns the number of nodes activated.
pub fn activate_route(request: &mut dyn MenuRequest, root: &MenuItem, route: &str) -> usize {
    let items = root.linking_to(route);
    for item in &items {
        item.activate(request);
    }
    items.len()
}

/// Activate nodes linking to whichever route matches the request path.
///
/// Returns the matched route name, if any.
pub fn activate_current_route(
    request: &mut dyn MenuRequest,
    roots: &[&MenuItem],
    routes: &RouteTable,
) -> Option<String> {
    let matched = routes.match_path(request.uri().path())?;
    let mut activated = 0;
    for root in roots {
        activated += activate_route(request, root, &matched.name);
    }
    trace!(route = %matched.name, activated, "activated menu items for route");
    Some(matched.name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn current_route_activates_matching_items() {
        let routes = RouteTable::new()
            .with_route("home", "/")
            .with_route("post", "/blog/:slug");
        let post = MenuItem::builder().route("post").build().unwrap();
        let home = MenuItem::builder().route("home").build().unwrap();
        let root = MenuItem::builder()
            .children([home.clone(), post.clone()])
            .build()
            .unwrap();

        let mut request = Request::builder().uri("/blog/hello").body(()).unwrap();
        let matched = activate_current_route(&mut request, &[&root], &routes);

        assert_eq!(matched.as_deref(), Some("post"));
        assert!(request.is_active(post.id()));
        assert!(!request.is_active(home.id()));
    }

    #[test]
    fn unmatched_path_activates_nothing() {
        let routes = RouteTable::new().with_route("home", "/");
        let root = MenuItem::builder().build().unwrap();
        let mut request = Request::builder().uri("/nowhere").body(()).unwrap();
        assert!(activate_current_route(&mut request, &[&root], &routes).is_none());
        assert!(request.active_menus().is_none());
    }
}
