//! Demo HTTP server rendering file-defined menus.
//!
//! Pages are served for every declared route; the items linking to the
//! matched route are activated before the handler runs.

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use handlers::{CurrentRoute, router};
pub use state::{AppState, USER_HEADER, demo_loader, load_menus};
