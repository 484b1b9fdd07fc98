//! "All or some" selections over ids and types
//!
//! `Only` with an empty list behaves like `All`: an empty stored set means
//! nothing was narrowed down.

use serde::{Deserialize, Serialize};

/// A filter selection: everything, or an explicit subset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "items", rename_all = "lowercase")]
pub enum Selection<T> {
    All,
    Only(Vec<T>),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Self::All
    }
}

impl<T: PartialEq> Selection<T> {
    /// Build a selection from a stored set, treating empty as all
    pub fn from_items(items: Vec<T>) -> Self {
        if items.is_empty() {
            Self::All
        } else {
            Self::Only(items)
        }
    }

    /// True when no narrowing applies
    pub fn is_all(&self) -> bool {
        match self {
            Self::All => true,
            Self::Only(items) => items.is_empty(),
        }
    }

    pub fn matches(&self, item: &T) -> bool {
        match self {
            Self::All => true,
            Self::Only(items) => items.is_empty() || items.contains(item),
        }
    }

    /// The explicit items, empty for `All`
    pub fn items(&self) -> &[T] {
        match self {
            Self::All => &[],
            Self::Only(items) => items,
        }
    }
}

impl<T: Clone + PartialEq> Selection<T> {
    /// Expand to a concrete list, substituting `live` for `All`
    pub fn resolve(&self, live: impl FnOnce() -> Vec<T>) -> Vec<T> {
        if self.is_all() {
            live()
        } else {
            self.items().to_vec()
        }
    }
}
