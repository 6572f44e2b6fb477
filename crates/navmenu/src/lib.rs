//! Declarative navigation menus.
//!
//! Menu trees are declared once and shared by every request. Activation
//! middleware marks the items on the current navigation path in the request,
//! and [`Menu::build`] renders the tree into plain records for templates,
//! with ancestors of the active item flagged as `"subitem"`.

pub mod error;
pub mod loader;
pub mod menu;
pub mod render;
pub mod request;
pub mod routes;
pub mod server;

pub use error::{MenuError, MenuResult, RouteResolutionError};
pub use loader::{MenuDefinition, MenuFile, MenuLoader, MenuSet};
pub use menu::{
    Active, LinkTarget, Menu, MenuDeclaration, MenuItem, MenuItemBuilder, MenuItemId, MenuOutput,
    activate_current_route, activate_menu, activate_menus, activate_route,
};
pub use render::{MenuRenderer, insert_menu};
pub use request::{ActiveMenus, MenuRequest};
pub use routes::{RouteDefinition, RouteMatch, RouteResolver, RouteTable};
