//! Demo server configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Demo server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// Menu definition file, TOML or JSON by extension (default: ./menus/main.toml).
    pub menu_file: PathBuf,

    /// Directory of extra templates layered over the built-in ones.
    pub template_dir: Option<PathBuf>,

    /// Name of the menu rendered on pages (default: "main").
    pub main_menu: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let menu_file = env::var("MENU_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./menus/main.toml"));

        let template_dir = env::var("TEMPLATE_DIR").ok().map(PathBuf::from);

        let main_menu = env::var("MAIN_MENU").unwrap_or_else(|_| "main".to_string());

        Ok(Self {
            port,
            menu_file,
            template_dir,
            main_menu,
        })
    }
}
