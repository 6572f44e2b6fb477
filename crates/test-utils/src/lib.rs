//! navmenu test utilities.
//!
//! Helpers for integration testing: fake requests, test users that
//! visibility predicates can inspect, a fixture route table and menu, and
//! assertion utilities for rendered menus.

use std::sync::Arc;

use axum::http::Request;
use navmenu::{Menu, MenuItem, MenuItemBuilder, MenuRequest, RouteTable};
use uuid::Uuid;

/// Create a bodiless GET request for `path`.
pub fn test_request(path: &str) -> Request<()> {
    let mut request = Request::new(());
    if let Ok(uri) = path.parse() {
        *request.uri_mut() = uri;
    }
    request
}

/// Create a request carrying `user` in its extensions.
pub fn request_as(path: &str, user: TestUser) -> Request<()> {
    let mut request = test_request(path);
    request.extensions_mut().insert(user);
    request
}

/// Create a test user context.
pub fn test_user(permissions: &[&str]) -> TestUser {
    TestUser {
        id: Uuid::now_v7(),
        authenticated: true,
        permissions: permissions.iter().map(|s| s.to_string()).collect(),
    }
}

/// Create an anonymous test user.
pub fn anonymous_user() -> TestUser {
    TestUser {
        id: Uuid::nil(),
        authenticated: false,
        permissions: vec![],
    }
}

/// Create an admin test user.
pub fn admin_user() -> TestUser {
    TestUser {
        id: Uuid::now_v7(),
        authenticated: true,
        permissions: vec!["administer site".to_string()],
    }
}

/// A test user, stored in request extensions.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub authenticated: bool,
    pub permissions: Vec<String>,
}

impl TestUser {
    /// Add a permission.
    pub fn with_permission(mut self, perm: &str) -> Self {
        self.permissions.push(perm.to_string());
        self
    }

    /// Check if user has permission.
    pub fn has_permission(&self, perm: &str) -> bool {
        self.permissions.iter().any(|p| p == perm)
    }

    /// Check if user is admin.
    pub fn is_admin(&self) -> bool {
        self.has_permission("administer site")
    }
}

/// Visibility predicate admitting requests whose [`TestUser`] has `perm`.
pub fn requires_permission(
    perm: &'static str,
) -> impl Fn(&dyn MenuRequest, &MenuItem) -> bool + Send + Sync + 'static {
    move |request, _| {
        request
            .extensions()
            .get::<TestUser>()
            .is_some_and(|user| user.has_permission(perm))
    }
}

/// Route table used by the fixture menus.
pub fn fixture_routes() -> RouteTable {
    RouteTable::new()
        .with_route("home", "/")
        .with_route("blog", "/blog")
        .with_route("blog_post", "/blog/:slug")
        .with_route("admin", "/admin")
}

/// Items of [`fixture_menu`] kept outside the body so tests can activate them.
#[derive(Clone)]
pub struct FixtureItems {
    pub a: MenuItemBuilder,
    pub c: MenuItemBuilder,
}

/// Menu `{A -> home, B {C}}` named "Menu".
pub fn fixture_menu() -> (Arc<Menu>, FixtureItems) {
    let items = FixtureItems {
        a: MenuItem::builder().route("home"),
        c: MenuItem::builder(),
    };

    let c = items.c.clone();
    let b = Menu::new("B", move |menu| {
        menu.item("C", c.clone());
    });

    let a = items.a.clone();
    let menu = Menu::new("Menu", move |menu| {
        menu.item("A", a.clone());
        menu.submenu(b.clone());
    });

    (menu, items)
}

/// Assertion helpers for JSON content.
pub mod assert {
    use navmenu::MenuOutput;
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert that a JSON value equals expected.
    pub fn json_eq(actual: &Value, expected: &Value) {
        assert_eq!(
            actual,
            expected,
            "JSON mismatch:\nactual: {}\nexpected: {}",
            serde_json::to_string_pretty(actual).unwrap_or_default(),
            serde_json::to_string_pretty(expected).unwrap_or_default()
        );
    }

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that a string does not contain a substring.
    pub fn not_contains(haystack: &str, needle: &str) {
        assert!(
            !haystack.contains(needle),
            "Expected string to NOT contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert the titles of a rendered node's direct children, in order.
    pub fn item_titles(menu: &MenuOutput, expected: &[&str]) {
        let titles: Vec<_> = menu
            .items
            .iter()
            .map(|item| item.title.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(titles, expected, "menu item titles differ");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use navmenu::Active;

    #[test]
    fn test_request_sets_path() {
        let request = test_request("/blog/hello");
        assert_eq!(request.uri().path(), "/blog/hello");
    }

    #[test]
    fn test_user_builder() {
        let user = test_user(&["access content"]).with_permission("post comments");
        assert!(user.authenticated);
        assert!(user.has_permission("post comments"));
        assert!(!user.is_admin());
    }

    #[test]
    fn test_anonymous_user() {
        let user = anonymous_user();
        assert!(!user.authenticated);
        assert_eq!(user.id, Uuid::nil());
    }

    #[test]
    fn test_permission_predicate() {
        let item = MenuItem::builder()
            .visible_if(requires_permission("administer site"))
            .build()
            .unwrap();
        assert!(item.is_visible(&request_as("/", admin_user())));
        assert!(!item.is_visible(&request_as("/", anonymous_user())));
        assert!(!item.is_visible(&test_request("/")));
    }

    #[test]
    fn test_fixture_menu() {
        let (menu, _) = fixture_menu();
        menu.prepare().unwrap();
        let output = menu
            .build(&test_request("/"), &fixture_routes())
            .unwrap()
            .unwrap();
        assert::item_titles(&output, &["A", "B"]);
        assert_eq!(output.active, Active::Inactive);
    }

    #[test]
    fn test_assertions() {
        let json = serde_json::json!({"name": "test", "value": 42});
        assert::has_key(&json, "name");
        assert::contains("hello world", "world");
        assert::not_contains("hello world", "foo");
    }
}
