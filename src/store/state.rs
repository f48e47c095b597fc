//! # Collection State
//!
//! The aggregate the store owns and publishes: the product list, one in-progress flag
//! per operation family, and the last failure message.

use crate::model::Product;
use std::fmt;

/// One of the four independent operation families.
///
/// Each family has its own in-progress flag; no family ever touches another's flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Fetch,
    Add,
    Update,
    Delete,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Family::Fetch => "fetch",
            Family::Add => "add",
            Family::Update => "update",
            Family::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// The store's aggregate, as read by the presentation layer.
///
/// `products` keeps insertion/server order and holds unique ids as long as the
/// gateway hands out unique ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductCollectionState {
    pub products: Vec<Product>,
    pub fetch_in_progress: bool,
    pub add_in_progress: bool,
    pub update_in_progress: bool,
    pub delete_in_progress: bool,
    pub last_error: Option<String>,
}

impl ProductCollectionState {
    pub fn in_progress(&self, family: Family) -> bool {
        match family {
            Family::Fetch => self.fetch_in_progress,
            Family::Add => self.add_in_progress,
            Family::Update => self.update_in_progress,
            Family::Delete => self.delete_in_progress,
        }
    }

    pub(crate) fn set_in_progress(&mut self, family: Family, value: bool) {
        let flag = match family {
            Family::Fetch => &mut self.fetch_in_progress,
            Family::Add => &mut self.add_in_progress,
            Family::Update => &mut self.update_in_progress,
            Family::Delete => &mut self.delete_in_progress,
        };
        *flag = value;
    }

    /// True while any family has a command in flight.
    pub fn is_busy(&self) -> bool {
        self.fetch_in_progress
            || self.add_in_progress
            || self.update_in_progress
            || self.delete_in_progress
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Back to the freshly created state: empty list, all flags down, no error.
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A gateway-confirmed change to the product list.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Mutation {
    /// Replace the whole list (fetch result).
    ReplaceAll(Vec<Product>),
    /// Append a newly created product.
    Append(Product),
    /// Replace the element with `id`; dropped when no such element exists.
    Replace { id: String, product: Product },
    /// Remove the element with `id`; no-op when absent.
    Remove(String),
}

impl Mutation {
    pub(crate) fn apply(self, products: &mut Vec<Product>) {
        match self {
            Mutation::ReplaceAll(page) => *products = page,
            Mutation::Append(product) => products.push(product),
            Mutation::Replace { id, product } => {
                if let Some(slot) = products.iter_mut().find(|p| p.id == id) {
                    *slot = product;
                }
            }
            Mutation::Remove(id) => products.retain(|p| p.id != id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn products() -> Vec<Product> {
        vec![
            Product::new("p1", "Widget", 9.99, 5, true),
            Product::new("p2", "Gadget", 4.5, 0, false),
        ]
    }

    #[test]
    fn test_flags_are_independent() {
        let mut state = ProductCollectionState::default();
        state.set_in_progress(Family::Update, true);
        assert!(state.update_in_progress);
        assert!(!state.fetch_in_progress && !state.add_in_progress && !state.delete_in_progress);
        assert!(state.is_busy());
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut list = products();
        Mutation::Replace {
            id: "p1".into(),
            product: Product::new("p1", "Widget v2", 10.0, 5, true),
        }
        .apply(&mut list);
        assert_eq!(list[0].name, "Widget v2");
        assert_eq!(list[1].id, "p2");
    }

    #[test]
    fn test_replace_and_remove_of_absent_id_are_noops() {
        let mut list = products();
        Mutation::Replace {
            id: "p9".into(),
            product: Product::new("p9", "Ghost", 1.0, 1, true),
        }
        .apply(&mut list);
        Mutation::Remove("p9".into()).apply(&mut list);
        assert_eq!(list, products());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut state = ProductCollectionState {
            products: products(),
            fetch_in_progress: true,
            add_in_progress: true,
            update_in_progress: true,
            delete_in_progress: true,
            last_error: Some("boom".into()),
        };
        state.clear();
        assert_eq!(state, ProductCollectionState::default());
    }
}
