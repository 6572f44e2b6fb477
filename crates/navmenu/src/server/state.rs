//! Demo server state shared across all handlers.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::loader::{MenuLoader, MenuSet};
use crate::menu::{Menu, MenuItem};
use crate::render::MenuRenderer;
use crate::request::MenuRequest;
use crate::routes::RouteTable;
use crate::server::config::Config;

/// Header the demo treats as "signed in" for `visibility = "authenticated"`.
pub const USER_HEADER: &str = "x-demo-user";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Menus loaded from the definition file.
    menus: MenuSet,
    /// Name of the menu rendered on pages.
    main_menu: String,
    /// Template renderer.
    renderer: MenuRenderer,
}

impl AppState {
    /// Load menus and templates as configured.
    pub fn new(config: &Config) -> Result<Self> {
        let source = std::fs::read_to_string(&config.menu_file).with_context(|| {
            format!("failed to read menu file {}", config.menu_file.display())
        })?;
        let menus = load_menus(&config.menu_file, &source)?;

        let renderer = match &config.template_dir {
            Some(dir) => MenuRenderer::with_templates(dir)?,
            None => MenuRenderer::new()?,
        };

        Self::from_parts(menus, &config.main_menu, renderer)
    }

    /// Assemble state from already loaded parts.
    pub fn from_parts(menus: MenuSet, main_menu: &str, renderer: MenuRenderer) -> Result<Self> {
        if menus.get(main_menu).is_none() {
            anyhow::bail!("menu file does not define a menu named '{main_menu}'");
        }

        info!(
            menus = menus.len(),
            routes = menus.routes().len(),
            main_menu = %main_menu,
            "menus loaded"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                menus,
                main_menu: main_menu.to_string(),
                renderer,
            }),
        })
    }

    pub fn menus(&self) -> &MenuSet {
        &self.inner.menus
    }

    pub fn routes(&self) -> &RouteTable {
        self.inner.menus.routes()
    }

    /// The menu rendered on pages.
    pub fn main_menu(&self) -> Option<&Arc<Menu>> {
        self.inner.menus.get(&self.inner.main_menu)
    }

    /// Root items of every prepared menu.
    pub fn roots(&self) -> Vec<&MenuItem> {
        self.inner
            .menus
            .menus()
            .iter()
            .filter_map(|menu| menu.root_item())
            .collect()
    }

    pub fn renderer(&self) -> &MenuRenderer {
        &self.inner.renderer
    }
}

/// The loader used by the demo, with its named predicates.
pub fn demo_loader() -> MenuLoader {
    MenuLoader::new()
        .predicate("authenticated", |request, _| {
            request.headers().contains_key(USER_HEADER)
        })
        .predicate("anonymous", |request, _| {
            !request.headers().contains_key(USER_HEADER)
        })
        .link_fn("current_path", |request: &dyn MenuRequest, _| {
            Some(request.uri().path().to_string())
        })
}

/// Parse a menu file, choosing the format by extension.
pub fn load_menus(path: &Path, source: &str) -> Result<MenuSet> {
    let loader = demo_loader();
    let menus = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => loader.from_json(source),
        _ => loader.from_toml(source),
    };
    menus.with_context(|| format!("failed to load menus from {}", path.display()))
}
