//! Menu trees and their per-request rendering.
//!
//! Menus are declared once at startup and provide:
//! - An immutable tree of items shared by all requests
//! - Activation middleware marking items on the current navigation path
//! - Rendering into plain records for templates

mod activation;
mod declaration;
mod item;
mod output;

pub use activation::{activate_current_route, activate_menu, activate_menus, activate_route};
pub use declaration::{Menu, MenuDeclaration};
pub use item::{
    LITERAL_PREFIX, LinkFn, LinkTarget, MenuItem, MenuItemBuilder, MenuItemId, Visibility,
};
pub use output::{Active, MenuOutput, SUBITEM};
