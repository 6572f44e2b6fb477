//! Declarative menus.
//!
//! A [`Menu`] pairs a name with a body that lists its entries in order:
//!
//! ```ignore
//! static ACCOUNT: LazyLock<Arc<Menu>> = LazyLock::new(|| {
//!     Menu::new("Account", |menu| {
//!         menu.item("profile", MenuItem::builder().route("profile"));
//!         menu.item("logout", MenuItem::builder().title("Sign out").link("!/logout"));
//!     })
//! });
//!
//! static MAIN: LazyLock<Arc<Menu>> = LazyLock::new(|| {
//!     Menu::new("Main", |menu| {
//!         menu.attr("class", "navbar");
//!         menu.item("home", MenuItem::builder().route("home"));
//!         menu.submenu(ACCOUNT.clone());
//!     })
//! });
//!
//! // At startup, before the first request
//! MAIN.prepare()?;
//!
//! // Per request
//! let output = MAIN.build(&request, &routes)?;
//! ```
//!
//! The body runs once, in [`Menu::prepare`]; building an unprepared menu
//! fails with [`MenuError::NotPrepared`]. The root node's identity is
//! reserved when the menu is declared, so the menu can be activated (for
//! example from middleware) before it is prepared.

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde_json::Value;
use tracing::debug;

use crate::error::{MenuError, MenuResult};
use crate::menu::item::{LinkTarget, MenuItem, MenuItemBuilder, MenuItemId, Visibility};
use crate::menu::output::MenuOutput;
use crate::request::MenuRequest;
use crate::routes::RouteResolver;

type MenuBody = Box<dyn Fn(&mut MenuDeclaration) + Send + Sync>;

/// An entry in a menu body, in declaration order.
enum MenuEntry {
    Item { name: String, item: MenuItemBuilder },
    Submenu(Arc<Menu>),
}

/// The body of a menu while it is being prepared.
///
/// Collects entries in the order they are declared, plus configuration for
/// the synthesized root node.
pub struct MenuDeclaration {
    id: MenuItemId,
    title: Option<String>,
    link: Option<LinkTarget>,
    visibility: Option<Visibility>,
    attributes: Vec<(String, Value)>,
    entries: Vec<MenuEntry>,
}

impl MenuDeclaration {
    fn new(id: MenuItemId) -> Self {
        Self {
            id,
            title: None,
            link: None,
            visibility: None,
            attributes: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Add an item. `name` becomes its title unless the builder sets one.
    ///
    /// Build the item outside the body and pass a clone when its identity is
    /// needed for activation; clones of a builder share one identity.
    pub fn item(&mut self, name: impl Into<String>, item: MenuItemBuilder) -> &mut Self {
        self.entries.push(MenuEntry::Item {
            name: name.into(),
            item,
        });
        self
    }

    /// Add a nested menu. It is prepared before this one.
    pub fn submenu(&mut self, menu: Arc<Menu>) -> &mut Self {
        self.entries.push(MenuEntry::Submenu(menu));
        self
    }

    /// Root title. Defaults to the menu name.
    pub fn title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    /// Root link: a route name, or a literal URL when prefixed with `!`.
    pub fn link(&mut self, target: &str) -> &mut Self {
        self.link = Some(LinkTarget::parse(target));
        self
    }

    pub fn link_target(&mut self, target: LinkTarget) -> &mut Self {
        self.link = Some(target);
        self
    }

    pub fn link_fn<F>(&mut self, link: F) -> &mut Self
    where
        F: Fn(&dyn MenuRequest, &MenuItem) -> Option<String> + Send + Sync + 'static,
    {
        self.link = Some(LinkTarget::Dynamic(Arc::new(link)));
        self
    }

    /// Only render the menu when `visible` returns true.
    pub fn visible_if<F>(&mut self, visible: F) -> &mut Self
    where
        F: Fn(&dyn MenuRequest, &MenuItem) -> bool + Send + Sync + 'static,
    {
        self.visibility = Some(Arc::new(visible));
        self
    }

    pub fn visibility(&mut self, visibility: Visibility) -> &mut Self {
        self.visibility = Some(visibility);
        self
    }

    /// Extra key on the root record.
    pub fn attr(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    fn assemble(self, menu_name: &str) -> MenuResult<MenuItem> {
        let mut root = MenuItemBuilder::with_id(self.id);
        if let Some(title) = self.title {
            root = root.title(title);
        }
        if let Some(link) = self.link {
            root = root.link_target(link);
        }
        if let Some(visibility) = self.visibility {
            root = root.visibility(visibility);
        }
        for (key, value) in self.attributes {
            root = root.attr(key, value);
        }

        for entry in self.entries {
            let child = match entry {
                MenuEntry::Item { name, item } => item.build()?.named(&name),
                MenuEntry::Submenu(menu) => menu.prepare()?.clone(),
            };
            root = root.child(child);
        }

        Ok(root.build()?.named(menu_name))
    }
}

/// A declared menu.
pub struct Menu {
    name: String,
    id: MenuItemId,
    body: MenuBody,
    root_item: OnceLock<MenuItem>,
}

impl Menu {
    /// Declare a menu. The body runs on the first [`Menu::prepare`].
    pub fn new<F>(name: impl Into<String>, body: F) -> Arc<Self>
    where
        F: Fn(&mut MenuDeclaration) + Send + Sync + 'static,
    {
        Arc::new(Self {
            name: name.into(),
            id: MenuItemId::new(),
            body: Box::new(body),
            root_item: OnceLock::new(),
        })
    }

    /// Declared menu name, also the default root title.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity of the root node, available before preparation.
    pub fn id(&self) -> MenuItemId {
        self.id
    }

    /// Assemble the menu tree, preparing nested menus first.
    ///
    /// Runs the body at most once; later calls return the stored root.
    pub fn prepare(&self) -> MenuResult<&MenuItem> {
        if let Some(root) = self.root_item.get() {
            return Ok(root);
        }

        let mut declaration = MenuDeclaration::new(self.id);
        (self.body)(&mut declaration);
        let root = declaration.assemble(&self.name)?;
        debug!(
            menu = %self.name,
            children = root.children().len(),
            "menu prepared"
        );

        Ok(self.root_item.get_or_init(|| root))
    }

    /// The root node, once prepared.
    pub fn root_item(&self) -> Option<&MenuItem> {
        self.root_item.get()
    }

    /// Find a prepared node by declared names, e.g. `"account/profile"`.
    pub fn lookup(&self, path: &str) -> Option<&MenuItem> {
        self.root_item()?.lookup(path)
    }

    pub fn is_prepared(&self) -> bool {
        self.root_item.get().is_some()
    }

    /// Mark the whole menu active for the request.
    pub fn activate(&self, request: &mut dyn MenuRequest) {
        request.activate(self.id);
    }

    /// Render the menu for the request.
    ///
    /// Fails with [`MenuError::NotPrepared`] when [`Menu::prepare`] never ran.
    /// `Ok(None)` means the menu's own visibility predicate hid it.
    pub fn build(
        &self,
        request: &dyn MenuRequest,
        routes: &dyn RouteResolver,
    ) -> MenuResult<Option<MenuOutput>> {
        let root = self.root_item().ok_or_else(|| MenuError::NotPrepared {
            menu: self.name.clone(),
        })?;
        root.build(request, routes)
    }
}

impl fmt::Debug for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Menu")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("root_item", &self.root_item.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::menu::output::Active;
    use crate::routes::RouteTable;
    use axum::http::Request;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn routes() -> RouteTable {
        RouteTable::new().with_route("home", "/")
    }

    #[test]
    fn build_before_prepare_fails() {
        let menu = Menu::new("Main", |menu| {
            menu.item("home", MenuItem::builder().route("home"));
        });
        let err = menu.build(&Request::new(()), &routes()).unwrap_err();
        assert!(matches!(err, MenuError::NotPrepared { ref menu } if menu == "Main"));
    }

    #[test]
    fn prepare_defaults_titles() {
        let menu = Menu::new("Main", |menu| {
            menu.item("home", MenuItem::builder().route("home"));
            menu.item("about", MenuItem::builder().title("About us").link("!/about"));
        });
        let root = menu.prepare().unwrap();
        assert_eq!(root.title(), Some("Main"));
        assert_eq!(root.id(), menu.id());
        let titles: Vec<_> = root.children().iter().filter_map(MenuItem::title).collect();
        assert_eq!(titles, vec!["home", "About us"]);
    }

    #[test]
    fn children_keep_declaration_order() {
        let nested = Menu::new("M", |menu| {
            menu.item("x", MenuItem::builder());
        });
        let menu = Menu::new("Main", move |menu| {
            menu.item("z", MenuItem::builder());
            menu.submenu(nested.clone());
            menu.item("a", MenuItem::builder());
        });
        let root = menu.prepare().unwrap();
        let titles: Vec<_> = root.children().iter().filter_map(MenuItem::title).collect();
        assert_eq!(titles, vec!["z", "M", "a"]);
    }

    #[test]
    fn prepare_runs_body_once() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let menu = Menu::new("Main", move |menu| {
            counter.fetch_add(1, Ordering::SeqCst);
            menu.item("home", MenuItem::builder());
        });
        let first = menu.prepare().unwrap().id();
        let second = menu.prepare().unwrap().id();
        assert_eq!(first, second);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn root_configuration_applies() {
        let menu = Menu::new("Main", |menu| {
            menu.title("Navigation").link("!/").attr("class", "navbar");
        });
        let output = menu
            .prepare()
            .and_then(|_| menu.build(&Request::new(()), &routes()))
            .unwrap()
            .unwrap();
        assert_eq!(output.title.as_deref(), Some("Navigation"));
        assert_eq!(output.url.as_deref(), Some("/"));
        assert_eq!(output.extra.get("class"), Some(&Value::from("navbar")));
    }

    #[test]
    fn reserved_root_attribute_fails_prepare() {
        let menu = Menu::new("Main", |menu| {
            menu.attr("items", 1);
        });
        assert!(matches!(
            menu.prepare().unwrap_err(),
            MenuError::ReservedAttribute { .. }
        ));
        assert!(!menu.is_prepared());
    }

    #[test]
    fn lookup_through_submenus() {
        let profile = MenuItem::builder().route("home");
        let profile_id = profile.id();
        let account = Menu::new("account", move |menu| {
            menu.title("Account");
            menu.item("profile", profile.clone());
        });
        let menu = Menu::new("Main", move |menu| {
            menu.submenu(account.clone());
        });
        let root = menu.prepare().unwrap();
        assert_eq!(root.lookup("account/profile").map(MenuItem::id), Some(profile_id));
        assert_eq!(root.lookup("account").and_then(MenuItem::title), Some("Account"));
    }

    #[test]
    fn hidden_menu_builds_to_none() {
        let menu = Menu::new("Admin", |menu| {
            menu.visible_if(|_, _| false);
            menu.item("users", MenuItem::builder());
        });
        menu.prepare().unwrap();
        assert!(menu.build(&Request::new(()), &routes()).unwrap().is_none());
    }

    #[test]
    fn menu_level_activation_before_prepare() {
        let menu = Menu::new("Main", |menu| {
            menu.item("home", MenuItem::builder());
        });
        let mut request = Request::new(());
        menu.activate(&mut request);
        menu.prepare().unwrap();

        let output = menu.build(&request, &routes()).unwrap().unwrap();
        assert_eq!(output.active, Active::Active);
        assert_eq!(output.items[0].active, Active::Inactive);
    }
}
