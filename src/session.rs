//! Per-session state: the current recipe batch and the shopping cart.
//!
//! The session object is owned by the caller and threaded through every
//! operation explicitly — there is no ambient global state, so tests can
//! build arbitrary fixtures directly. Exactly two mutation entry points
//! exist, matching the two events the display surface can emit: a
//! finished generation and an item toggle.

use tracing::info;

use crate::cart::Cart;
use crate::error::Error;
use crate::recipe::{self, RecipeBatch};

#[derive(Debug, Default)]
pub struct Session {
    batch: Option<RecipeBatch>,
    cart: Cart,
}

impl Session {
    /// Start a session with no recipes and an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// The last successfully parsed batch, if any generation has
    /// succeeded yet.
    pub fn batch(&self) -> Option<&RecipeBatch> {
        self.batch.as_ref()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Apply the raw payload of a finished generation call.
    ///
    /// Parses first and mutates second: on a parse failure the previous
    /// batch and the cart are left exactly as they were, and the error is
    /// surfaced for a retry. On success the batch is replaced wholesale
    /// and the cart absorbs the new missing ingredients.
    pub fn apply_generation(&mut self, raw: &str) -> Result<(), Error> {
        let batch = recipe::parse_batch(raw)?;
        info!(
            "generation accepted: {} recipe(s), cart at {} item(s)",
            batch.len(),
            self.cart.len()
        );
        self.cart.merge(&batch);
        self.batch = Some(batch);
        Ok(())
    }

    /// Flip the checked state of a cart item. Unknown names are ignored;
    /// returns whether anything changed.
    pub fn toggle(&mut self, name: &str) -> bool {
        self.cart.toggle(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIRST_BATCH: &str = r#"[
        {"name":"Masala Toast","time":"5 min","steps":"Toast and top.","missing_ingredients":[]},
        {"name":"Paneer Bhurji","time":"10 min","steps":"Crumble and fry.","missing_ingredients":["Paneer","Oil"]},
        {"name":"Masala Maggi","time":"5 min","steps":"Boil.","missing_ingredients":["Maggi"]}
    ]"#;

    const SECOND_BATCH: &str = r#"[
        {"name":"Dahi Toast","time":"5 min","steps":"Spread.","missing_ingredients":[]},
        {"name":"Paneer Roll","time":"15 min","steps":"Roll.","missing_ingredients":["Paneer"]},
        {"name":"Chilla","time":"10 min","steps":"Pan-fry.","missing_ingredients":[]}
    ]"#;

    #[test]
    fn test_apply_generation_sets_batch_and_fills_cart() {
        let mut session = Session::new();
        assert!(session.batch().is_none());

        session.apply_generation(FIRST_BATCH).unwrap();

        assert_eq!(session.batch().unwrap().len(), 3);
        let cart_names: Vec<&str> = session
            .cart()
            .items()
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(cart_names, vec!["Paneer", "Oil", "Maggi"]);
        assert!(session.cart().items().iter().all(|i| !i.checked));
    }

    #[test]
    fn test_regeneration_replaces_batch_but_keeps_cart_state() {
        let mut session = Session::new();
        session.apply_generation(FIRST_BATCH).unwrap();
        assert!(session.toggle("Paneer"));

        session.apply_generation(SECOND_BATCH).unwrap();

        // The batch is the new one in full.
        assert_eq!(session.batch().unwrap().recipes[0].name, "Dahi Toast");

        // Paneer stays checked; Oil and Maggi persist despite not
        // reappearing.
        let got: Vec<(&str, bool)> = session
            .cart()
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
    fn test_parse_failure_leaves_state_untouched() {
        let mut session = Session::new();
        session.apply_generation(FIRST_BATCH).unwrap();
        session.toggle("Oil");

        let err = session.apply_generation("{not an array}").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));

        assert_eq!(session.batch().unwrap().recipes[0].name, "Masala Toast");
        let got: Vec<(&str, bool)> = session
            .cart()
            .items()
            .iter()
            .map(|i| (i.name.as_str(), i.checked))
            .collect();
        assert_eq!(
            got,
            vec![("Paneer", false), ("Oil", true), ("Maggi", false)]
        );
    }

    #[test]
    fn test_toggle_unknown_name_is_silent() {
        let mut session = Session::new();
        session.apply_generation(FIRST_BATCH).unwrap();

        assert!(!session.toggle("Butter"));
        assert_eq!(session.cart().len(), 3);
    }
}
