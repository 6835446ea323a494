use serde::{Deserialize, Serialize};
use std::fmt;

/// The collections the storefront tracks per user. Counted collections
/// carry a per-entry quantity; membership collections do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Cart,
    Wishlist,
}

impl CollectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::Cart => "cart",
            CollectionKind::Wishlist => "wishlist",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "cart" => Some(CollectionKind::Cart),
            "wishlist" => Some(CollectionKind::Wishlist),
            _ => None,
        }
    }

    pub fn is_counted(&self) -> bool {
        matches!(self, CollectionKind::Cart)
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
