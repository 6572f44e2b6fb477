//! File-defined menus.
//!
//! Menus and the routes they link to can be declared in TOML or JSON instead
//! of code. Behaviour that cannot live in a file (visibility predicates and
//! computed links) is registered on the [`MenuLoader`] under a name and
//! referenced by that name.
//!
//! ```toml
//! [[routes]]
//! name = "home"
//! path = "/"
//!
//! [[menus]]
//! name = "main"
//! attributes = { class = "navbar" }
//!
//! [[menus.items]]
//! name = "home"
//! title = "Home"
//! link = "home"
//!
//! [[menus.items]]
//! name = "admin"
//! visibility = "authenticated"
//! items = [{ name = "users", link = "!/admin/users" }]
//! ```
//!
//! An entry with nested `items` becomes a submenu; entries keep file order.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{MenuError, MenuResult};
use crate::menu::{LinkFn, LinkTarget, Menu, MenuItem, MenuItemBuilder, Visibility};
use crate::request::MenuRequest;
use crate::routes::{RouteDefinition, RouteTable};

/// A menu or menu item as written in a definition file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuDefinition {
    /// Declared name; the default title.
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Route name, or a literal URL prefixed with `!`.
    #[serde(default)]
    pub link: Option<String>,
    /// Name of a link function registered on the loader.
    #[serde(default)]
    pub link_fn: Option<String>,
    /// Name of a visibility predicate registered on the loader.
    #[serde(default)]
    pub visibility: Option<String>,
    /// Extra keys merged into the rendered record.
    #[serde(default)]
    pub attributes: Map<String, Value>,
    /// Nested entries. Non-empty makes this entry a submenu.
    #[serde(default)]
    pub items: Vec<MenuDefinition>,
}

/// Top-level layout of a definition file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuFile {
    #[serde(default)]
    pub routes: Vec<RouteDefinition>,
    #[serde(default)]
    pub menus: Vec<MenuDefinition>,
}

/// Prepared menus plus the routes declared alongside them.
#[derive(Debug, Default)]
pub struct MenuSet {
    menus: Vec<Arc<Menu>>,
    routes: RouteTable,
}

impl MenuSet {
    /// Get a menu by name.
    pub fn get(&self, name: &str) -> Option<&Arc<Menu>> {
        self.menus.iter().find(|menu| menu.name() == name)
    }

    /// All menus in file order.
    pub fn menus(&self) -> &[Arc<Menu>] {
        &self.menus
    }

    /// Routes declared in the file.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Get menu count.
    pub fn len(&self) -> usize {
        self.menus.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.menus.is_empty()
    }
}

/// Turns menu definitions into prepared menus.
#[derive(Default)]
pub struct MenuLoader {
    predicates: HashMap<String, Visibility>,
    link_fns: HashMap<String, LinkFn>,
}

impl MenuLoader {
    /// Create a loader with no named predicates or link functions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a visibility predicate usable as `visibility = "<name>"`.
    pub fn predicate<F>(mut self, name: impl Into<String>, visible: F) -> Self
    where
        F: Fn(&dyn MenuRequest, &MenuItem) -> bool + Send + Sync + 'static,
    {
        self.predicates.insert(name.into(), Arc::new(visible));
        self
    }

    /// Register a link function usable as `link_fn = "<name>"`.
    pub fn link_fn<F>(mut self, name: impl Into<String>, link: F) -> Self
    where
        F: Fn(&dyn MenuRequest, &MenuItem) -> Option<String> + Send + Sync + 'static,
    {
        self.link_fns.insert(name.into(), Arc::new(link));
        self
    }

    /// Load menus from TOML source.
    pub fn from_toml(&self, source: &str) -> MenuResult<MenuSet> {
        let file: MenuFile =
            toml::from_str(source).map_err(|e| MenuError::Parse(e.to_string()))?;
        self.load(file)
    }

    /// Load menus from JSON source.
    pub fn from_json(&self, source: &str) -> MenuResult<MenuSet> {
        let file: MenuFile =
            serde_json::from_str(source).map_err(|e| MenuError::Parse(e.to_string()))?;
        self.load(file)
    }

    /// Build and prepare every menu in the file.
    pub fn load(&self, file: MenuFile) -> MenuResult<MenuSet> {
        let routes = RouteTable::from_definitions(file.routes);

        let mut menus = Vec::with_capacity(file.menus.len());
        for definition in &file.menus {
            if menus.iter().any(|m: &Arc<Menu>| m.name() == definition.name) {
                warn!(menu = %definition.name, "duplicate menu name; later definition is unreachable by name");
            }
            let menu = self.menu(definition)?;
            menu.prepare()?;
            menus.push(menu);
        }

        debug!(menus = menus.len(), routes = routes.len(), "loaded menu definitions");
        Ok(MenuSet { menus, routes })
    }

    fn menu(&self, definition: &MenuDefinition) -> MenuResult<Arc<Menu>> {
        let link = self.link_target(definition)?;
        let visibility = self.visibility(definition)?;
        let title = definition.title.clone();
        let attributes = definition.attributes.clone();

        let mut entries = Vec::with_capacity(definition.items.len());
        for item in &definition.items {
            let entry = if item.items.is_empty() {
                FileEntry::Item(item.name.clone(), self.item(item)?)
            } else {
                FileEntry::Submenu(self.menu(item)?)
            };
            entries.push(entry);
        }

        Ok(Menu::new(definition.name.clone(), move |menu| {
            if let Some(title) = &title {
                menu.title(title.clone());
            }
            if let Some(link) = &link {
                menu.link_target(link.clone());
            }
            if let Some(visibility) = &visibility {
                menu.visibility(visibility.clone());
            }
            for (key, value) in &attributes {
                menu.attr(key.clone(), value.clone());
            }
            for entry in &entries {
                match entry {
                    FileEntry::Item(name, item) => menu.item(name.clone(), item.clone()),
                    FileEntry::Submenu(submenu) => menu.submenu(submenu.clone()),
                };
            }
        }))
    }

    fn item(&self, definition: &MenuDefinition) -> MenuResult<MenuItemBuilder> {
        let mut item = MenuItem::builder();
        if let Some(title) = &definition.title {
            item = item.title(title.clone());
        }
        if let Some(link) = self.link_target(definition)? {
            item = item.link_target(link);
        }
        if let Some(visibility) = self.visibility(definition)? {
            item = item.visibility(visibility);
        }
        for (key, value) in &definition.attributes {
            item = item.attr(key.clone(), value.clone());
        }
        Ok(item)
    }

    fn link_target(&self, definition: &MenuDefinition) -> MenuResult<Option<LinkTarget>> {
        if let Some(name) = &definition.link_fn {
            let link = self
                .link_fns
                .get(name)
                .ok_or_else(|| MenuError::UnknownLinkFn { name: name.clone() })?;
            if definition.link.is_some() {
                warn!(item = %definition.name, "both link and link_fn set; using link_fn");
            }
            return Ok(Some(LinkTarget::Dynamic(link.clone())));
        }
        Ok(definition.link.as_deref().map(LinkTarget::parse))
    }

    fn visibility(&self, definition: &MenuDefinition) -> MenuResult<Option<Visibility>> {
        definition
            .visibility
            .as_ref()
            .map(|name| {
                self.predicates
                    .get(name)
                    .cloned()
                    .ok_or_else(|| MenuError::UnknownPredicate { name: name.clone() })
            })
            .transpose()
    }
}

/// A resolved entry of a file-defined menu.
enum FileEntry {
    Item(String, MenuItemBuilder),
    Submenu(Arc<Menu>),
}
