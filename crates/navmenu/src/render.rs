//! Tera rendering for built menus.
//!
//! Ships a `navmenu/menu.html` macro library (`menu` and `breadcrumb`
//! macros) that application templates can import, plus a small page layout
//! used by the demo server.

use std::path::Path;

use anyhow::{Context, Result};
use tera::Tera;
use tracing::debug;

use crate::menu::MenuOutput;

const MENU_MACROS: (&str, &str) = (
    "navmenu/menu.html",
    include_str!("../templates/navmenu/menu.html"),
);
const MENU_RENDER: (&str, &str) = (
    "navmenu/render.html",
    include_str!("../templates/navmenu/render.html"),
);
const PAGE: (&str, &str) = (
    "navmenu/page.html",
    include_str!("../templates/navmenu/page.html"),
);

/// Insert a built menu and its active trail into a template context.
///
/// Adds `<key>` (the menu record) and `<key>_trail` (records along the
/// active path).
pub fn insert_menu(context: &mut tera::Context, key: &str, menu: &MenuOutput) {
    context.insert(key, menu);
    context.insert(format!("{key}_trail"), &menu.active_trail());
}

/// Escape text for use inside a double-quoted HTML attribute.
fn escape_attr(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders menus through Tera templates.
pub struct MenuRenderer {
    tera: Tera,
}

impl MenuRenderer {
    /// Create a renderer with only the built-in templates.
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        Self::add_builtin_templates(&mut tera)?;
        Ok(Self { tera })
    }

    /// Create a renderer loading `**/*.html` from `template_dir` on top of
    /// the built-in templates. Files may import `navmenu/menu.html`.
    pub fn with_templates(template_dir: &Path) -> Result<Self> {
        let pattern = template_dir.join("**/*.html");
        let pattern_str = pattern
            .to_str()
            .context("invalid template directory path")?;

        let mut tera = Tera::parse(pattern_str).context("failed to parse templates")?;
        Self::add_builtin_templates(&mut tera)?;

        let template_names: Vec<_> = tera.get_template_names().collect();
        debug!(count = template_names.len(), "loaded templates");

        Ok(Self { tera })
    }

    fn add_builtin_templates(tera: &mut Tera) -> Result<()> {
        // Tera's own escaping also rewrites '/', which mangles hrefs
        tera.register_filter(
            "escape_attr",
            |value: &tera::Value, _: &std::collections::HashMap<String, tera::Value>| {
                let text = tera::try_get_value!("escape_attr", "value", String, value);
                Ok(tera::Value::String(escape_attr(&text)))
            },
        );
        tera.add_raw_templates(vec![MENU_MACROS, MENU_RENDER, PAGE])
            .context("failed to add built-in menu templates")
    }

    /// Underlying Tera instance.
    pub fn tera(&self) -> &Tera {
        &self.tera
    }

    /// Render a menu as a nested `<ul>` list.
    pub fn render_menu(&self, menu: &MenuOutput) -> Result<String> {
        let mut context = tera::Context::new();
        context.insert("menu", menu);
        self.render(MENU_RENDER.0, &context)
    }

    /// Render any loaded template.
    pub fn render(&self, template: &str, context: &tera::Context) -> Result<String> {
        self.tera
            .render(template, context)
            .with_context(|| format!("failed to render template '{template}'"))
    }

    /// Render the built-in page layout around a menu.
    pub fn render_page(&self, page_title: &str, menu: Option<&MenuOutput>) -> Result<String> {
        let mut context = tera::Context::new();
        context.insert("page_title", page_title);
        if let Some(menu) = menu {
            context.insert("menu", menu);
            context.insert("trail", &menu.active_trail());
        }
        self.render(PAGE.0, &context)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::menu::{Active, MenuOutput};
    use serde_json::Map;

    fn node(title: &str, url: Option<&str>, active: Active, items: Vec<MenuOutput>) -> MenuOutput {
        MenuOutput {
            title: Some(title.to_string()),
            url: url.map(str::to_string),
            items,
            active,
            extra: Map::new(),
        }
    }

    fn sample() -> MenuOutput {
        node(
            "Main",
            None,
            Active::Subitem,
            vec![
                node("Home", Some("/"), Active::Inactive, vec![]),
                node(
                    "Blog",
                    Some("/blog"),
                    Active::Subitem,
                    vec![node("Archive", Some("/blog/archive"), Active::Active, vec![])],
                ),
            ],
        )
    }

    #[test]
    fn renders_active_classes() {
        let renderer = MenuRenderer::new().unwrap();
        let html = renderer.render_menu(&sample()).unwrap();
        assert!(html.contains(r#"<a href="/">Home</a>"#));
        assert!(html.contains(r#"class="menu-item subitem""#));
        assert!(html.contains(r#"class="menu-item active""#));
        assert!(html.contains(r#"<a href="/blog/archive">Archive</a>"#));
    }

    #[test]
    fn titles_are_escaped() {
        let renderer = MenuRenderer::new().unwrap();
        let menu = node("Main", None, Active::Inactive, vec![node("<b>", None, Active::Inactive, vec![])]);
        let html = renderer.render_menu(&menu).unwrap();
        assert!(html.contains("&lt;b&gt;"));
    }

    #[test]
    fn urls_keep_slashes_but_escape_quotes() {
        assert_eq!(escape_attr("/blog/a?b=1&c=\"x\""), "/blog/a?b=1&amp;c=&quot;x&quot;");
    }

    #[test]
    fn page_includes_breadcrumb() {
        let renderer = MenuRenderer::new().unwrap();
        let menu = sample();
        let html = renderer.render_page("Archive", Some(&menu)).unwrap();
        assert!(html.contains("<title>Archive</title>"));
        assert!(html.contains(r#"class="breadcrumb""#));
    }

    #[test]
    fn insert_menu_adds_trail() {
        let mut context = tera::Context::new();
        insert_menu(&mut context, "main", &sample());
        assert!(context.contains_key("main"));
        assert!(context.contains_key("main_trail"));
    }
}
