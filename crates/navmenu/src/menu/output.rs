//! Rendered menu records.
//!
//! [`MenuOutput`] is what templates consume. It serializes to
//! `{title, url, items, active, ...extra}` where `active` is `false`, `true`
//! or the string `"subitem"`.

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Marker serialized for nodes whose descendant is the active page.
pub const SUBITEM: &str = "subitem";

/// Active state of a rendered node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Active {
    #[default]
    Inactive,
    /// This node was activated for the request.
    Active,
    /// A descendant was activated, not this node.
    Subitem,
}

impl Active {
    /// True for both `Active` and `Subitem`.
    pub fn is_active(self) -> bool {
        !matches!(self, Active::Inactive)
    }
}

impl Serialize for Active {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Active::Inactive => serializer.serialize_bool(false),
            Active::Active => serializer.serialize_bool(true),
            Active::Subitem => serializer.serialize_str(SUBITEM),
        }
    }
}

impl<'de> Deserialize<'de> for Active {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ActiveVisitor;

        impl Visitor<'_> for ActiveVisitor {
            type Value = Active;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "a boolean or \"{SUBITEM}\"")
            }

            fn visit_bool<E: de::Error>(self, value: bool) -> Result<Active, E> {
                Ok(if value { Active::Active } else { Active::Inactive })
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Active, E> {
                if value == SUBITEM {
                    Ok(Active::Subitem)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(value), &self))
                }
            }
        }

        deserializer.deserialize_any(ActiveVisitor)
    }
}

/// A rendered menu node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuOutput {
    pub title: Option<String>,
    pub url: Option<String>,
    pub items: Vec<MenuOutput>,
    pub active: Active,
    /// Caller-defined display attributes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MenuOutput {
    /// Depth-first search for a rendered node by title.
    pub fn find(&self, title: &str) -> Option<&MenuOutput> {
        if self.title.as_deref() == Some(title) {
            return Some(self);
        }
        self.items.iter().find_map(|item| item.find(title))
    }

    /// Nodes along the active path, from this node down to the active page.
    ///
    /// Empty when nothing below (or at) this node is active.
    pub fn active_trail(&self) -> Vec<&MenuOutput> {
        let mut trail = Vec::new();
        let mut current = Some(self);
        while let Some(node) = current {
            if !node.active.is_active() {
                break;
            }
            trail.push(node);
            if node.active == Active::Active {
                break;
            }
            current = node.items.iter().find(|item| item.active.is_active());
        }
        trail
    }

    /// Convert to a JSON value.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
