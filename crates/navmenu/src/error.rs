//! Menu error types.

use thiserror::Error;

/// Keys every rendered menu record carries; extra attributes may not reuse them.
pub const RESERVED_KEYS: [&str; 4] = ["title", "url", "items", "active"];

/// Failure to turn a symbolic route name into a URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteResolutionError {
    #[error("no route named '{name}'")]
    UnknownRoute { name: String },

    #[error("route '{name}' requires parameter '{param}'")]
    MissingParam { name: String, param: String },
}

/// Errors raised while declaring, preparing or building menus.
#[derive(Debug, Error)]
pub enum MenuError {
    #[error("menu '{menu}' has no root item; was it prepared?")]
    NotPrepared { menu: String },

    #[error("extra attribute '{key}' collides with a reserved output key")]
    ReservedAttribute { key: String },

    #[error("unknown visibility predicate '{name}'")]
    UnknownPredicate { name: String },

    #[error("unknown link function '{name}'")]
    UnknownLinkFn { name: String },

    #[error("menu definition could not be parsed: {0}")]
    Parse(String),

    #[error(transparent)]
    Route(#[from] RouteResolutionError),
}

/// Result type alias using MenuError.
pub type MenuResult<T> = Result<T, MenuError>;

/// Reject extra attribute keys that would overwrite the record's own fields.
pub(crate) fn check_attribute_key(key: &str) -> MenuResult<()> {
    if RESERVED_KEYS.contains(&key) {
        return Err(MenuError::ReservedAttribute {
            key: key.to_string(),
        });
    }
    Ok(())
}
