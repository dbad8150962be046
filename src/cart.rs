//! Shopping cart state and the reconciliation engine.
//!
//! The cart is session-scoped and strictly additive: merging a new recipe
//! batch inserts ingredients the user has not seen before and never
//! removes or resets what is already there. In particular an item the
//! user has checked off stays checked when a later batch reintroduces
//! it. Items keep their first-seen insertion order, which is also the
//! display order within each partition — the cart never silently
//! reorders between renders.

use tracing::debug;

use crate::recipe::RecipeBatch;

/// One ingredient the user still needs (or has collected). `name` is the
/// unique key, matched case-sensitively against the generation service's
/// exact spelling — no fuzzy deduplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub name: String,
    pub checked: bool,
}

/// The persistent per-session cart. At most one item per distinct name;
/// uniqueness is enforced at insertion, never by later compaction.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<CartItem>,
}

/// Read-only split of the cart for display: unchecked first, checked
/// last, each in insertion order. A pure view; never mutates the cart.
#[derive(Debug)]
pub struct CartView<'a> {
    pub to_buy: Vec<&'a CartItem>,
    pub collected: Vec<&'a CartItem>,
}

impl CartView<'_> {
    /// True when both partitions are empty, so the display layer can
    /// render an "empty cart" indicator instead of two bare headers.
    pub fn is_empty(&self) -> bool {
        self.to_buy.is_empty() && self.collected.is_empty()
    }
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Merge the missing ingredients of a freshly parsed batch into the
    /// cart.
    ///
    /// Walks every recipe's missing list in order; the first occurrence
    /// of a name not yet in the cart is inserted unchecked. Names already
    /// present are left completely untouched — a checked item stays
    /// checked. Nothing is ever removed, including for a batch whose
    /// union is empty. Re-merging the same batch is a no-op.
    pub fn merge(&mut self, batch: &RecipeBatch) {
        for recipe in &batch.recipes {
            for name in &recipe.missing_ingredients {
                if !self.items.iter().any(|item| item.name == *name) {
                    debug!("cart: adding {:?}", name);
                    self.items.push(CartItem {
                        name: name.clone(),
                        checked: false,
                    });
                }
            }
        }
    }

    /// Flip the checked state of the named item. Returns whether a flip
    /// happened.
    ///
    /// An unknown name is a no-op, not an error: a stale display view can
    /// race a merge that has not re-rendered yet, and punishing the user
    /// for that would be wrong.
    pub fn toggle(&mut self, name: &str) -> bool {
        match self.items.iter_mut().find(|item| item.name == name) {
            Some(item) => {
                item.checked = !item.checked;
                true
            }
            None => {
                debug!("cart: toggle target not present, ignoring: {:?}", name);
                false
            }
        }
    }

    /// Split the cart into the to-buy and collected partitions.
    ///
    /// A single pass over the items, so each partition independently
    /// keeps insertion order. Deliberately not a sort keyed on the
    /// checked flag — a boolean sort is not guaranteed stable everywhere
    /// and has produced silent reordering here before.
    pub fn partition(&self) -> CartView<'_> {
        let mut to_buy = Vec::new();
        let mut collected = Vec::new();
        for item in &self.items {
            if item.checked {
                collected.push(item);
            } else {
                to_buy.push(item);
            }
        }
        CartView { to_buy, collected }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::Recipe;

    /// Build a batch from per-recipe missing-ingredient lists.
    fn batch(missing: &[&[&str]]) -> RecipeBatch {
        let recipes = missing
            .iter()
            .enumerate()
            .map(|(i, names)| Recipe {
                name: format!("Recipe {}", i + 1),
                time: "10 min".to_string(),
                steps: "cook".to_string(),
                missing_ingredients: names.iter().map(|s| s.to_string()).collect(),
            })
            .collect();
        RecipeBatch { recipes }
    }

    fn names(items: &[&CartItem]) -> Vec<String> {
        items.iter().map(|i| i.name.clone()).collect()
    }

    #[test]
    fn test_merge_inserts_unchecked_in_first_seen_order() {
        let mut cart = Cart::new();
        cart.merge(&batch(&[&[], &["Paneer", "Oil"], &["Maggi"]]));

        let got: Vec<(&str, bool)> = cart
            .items()
            .iter()
            .map(|i| (i.name.as_str(), i.checked))
            .collect();
        assert_eq!(
            got,
            vec![("Paneer", false), ("Oil", false), ("Maggi", false)]
        );
    }

    #[test]
    fn test_merge_dedupes_within_batch() {
        let mut cart = Cart::new();
        cart.merge(&batch(&[&["Oil", "Paneer"], &["Oil"], &["Paneer", "Oil"]]));
        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn test_merge_names_are_case_sensitive() {
        let mut cart = Cart::new();
        cart.merge(&batch(&[&["paneer"], &["Paneer"]]));
        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn test_checked_survives_reintroduction() {
        let mut cart = Cart::new();
        cart.merge(&batch(&[&[], &["Paneer", "Oil"], &["Maggi"]]));
        assert!(cart.toggle("Paneer"));

        // Second generation: only Paneer reappears.
        cart.merge(&batch(&[&[], &["Paneer"], &[]]));

        let got: Vec<(&str, bool)> = cart
            .items()
            .iter()
            .map(|i| (i.name.as_str(), i.checked))
            .collect();
        assert_eq!(
            got,
            vec![("Paneer", true), ("Oil", false), ("Maggi", false)]
        );
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut cart = Cart::new();
        cart.merge(&batch(&[&["Paneer"], &["Oil"]]));
        cart.toggle("Oil");

        let b = batch(&[&["Paneer"], &["Oil"]]);
        cart.merge(&b);
        let once = cart.items().to_vec();
        cart.merge(&b);
        assert_eq!(cart.items(), once.as_slice());
    }

    #[test]
    fn test_merge_is_additive_only() {
        let mut cart = Cart::new();
        cart.merge(&batch(&[&["Paneer", "Oil"]]));

        // A batch needing nothing removes nothing.
        cart.merge(&batch(&[&[], &[], &[]]));
        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn test_toggle_flips_both_ways() {
        let mut cart = Cart::new();
        cart.merge(&batch(&[&["Ghee"]]));

        assert!(cart.toggle("Ghee"));
        assert!(cart.items()[0].checked);
        assert!(cart.toggle("Ghee"));
        assert!(!cart.items()[0].checked);
    }

    #[test]
    fn test_toggle_unknown_is_noop() {
        let mut cart = Cart::new();
        cart.merge(&batch(&[&["Ghee"]]));
        let before = cart.items().to_vec();

        assert!(!cart.toggle("Butter"));
        assert_eq!(cart.items(), before.as_slice());
    }

    #[test]
    fn test_partition_complete_and_disjoint() {
        let mut cart = Cart::new();
        cart.merge(&batch(&[&["A", "B", "C", "D"]]));
        cart.toggle("B");
        cart.toggle("D");

        let view = cart.partition();
        assert_eq!(names(&view.to_buy), vec!["A", "C"]);
        assert_eq!(names(&view.collected), vec!["B", "D"]);
        assert_eq!(view.to_buy.len() + view.collected.len(), cart.len());
    }

    #[test]
    fn test_partition_stable_across_calls() {
        let mut cart = Cart::new();
        cart.merge(&batch(&[&["A", "B", "C"]]));
        cart.toggle("B");

        let first: Vec<String> = {
            let v = cart.partition();
            names(&v.to_buy).into_iter().chain(names(&v.collected)).collect()
        };
        let second: Vec<String> = {
            let v = cart.partition();
            names(&v.to_buy).into_iter().chain(names(&v.collected)).collect()
        };
        assert_eq!(first, second);
    }

    #[test]
    fn test_partition_keeps_insertion_order_after_interleaved_toggles() {
        let mut cart = Cart::new();
        cart.merge(&batch(&[&["A", "B"], &["C"], &["D", "E"]]));
        cart.toggle("D");
        cart.toggle("A");

        let view = cart.partition();
        assert_eq!(names(&view.to_buy), vec!["B", "C", "E"]);
        assert_eq!(names(&view.collected), vec!["A", "D"]);
    }

    #[test]
    fn test_partition_empty_cart() {
        let cart = Cart::new();
        let view = cart.partition();
        assert!(view.is_empty());
        assert!(view.to_buy.is_empty());
        assert!(view.collected.is_empty());
    }

    #[test]
    fn test_partition_one_side_empty_is_distinguishable() {
        let mut cart = Cart::new();
        cart.merge(&batch(&[&["A"]]));
        cart.toggle("A");

        let view = cart.partition();
        assert!(!view.is_empty());
        assert!(view.to_buy.is_empty());
        assert_eq!(view.collected.len(), 1);
    }
}
