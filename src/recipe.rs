//! Recipe data model and the batch parser for generation responses.
//!
//! The parser is structural, not semantic: it checks that the payload is
//! a JSON array of objects carrying the required fields, and nothing
//! about the field *content* (e.g. `time` is free-form text, never parsed
//! numerically).

use serde::Deserialize;
use tracing::debug;

use crate::error::Error;

/// The upstream prompt asks for this many recipes per batch. The parser
/// does not enforce it; the display layer only warns when the count
/// differs.
pub const EXPECTED_RECIPE_COUNT: usize = 3;

/// A single suggested recipe, recreated on every generation call.
#[derive(Debug, Clone, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub time: String,
    pub steps: String,
    /// Empty means the recipe is fully satisfiable from the supplied
    /// ingredients. The first recipe of a batch is asked to be strict
    /// (empty list), but nothing here assumes that holds.
    #[serde(default)]
    pub missing_ingredients: Vec<String>,
}

/// The last successfully parsed set of recipes. Replaced wholesale on
/// every successful generation; no history is kept.
#[derive(Debug, Clone, Default)]
pub struct RecipeBatch {
    pub recipes: Vec<Recipe>,
}

impl RecipeBatch {
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Serialize the batch as plain text for the "download recipe" export.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::from("BiteBot recipe suggestions\n");
        for (i, recipe) in self.recipes.iter().enumerate() {
            out.push_str(&format!("\n{}. {} ({})\n", i + 1, recipe.name, recipe.time));
            out.push_str(&format!("   Steps: {}\n", recipe.steps));
            if recipe.missing_ingredients.is_empty() {
                out.push_str("   Missing ingredients: none\n");
            } else {
                out.push_str(&format!(
                    "   Missing ingredients: {}\n",
                    recipe.missing_ingredients.join(", ")
                ));
            }
        }
        out
    }
}

/// Parse a raw generation response into a validated batch.
///
/// Fails with [`Error::MalformedResponse`] when the payload is not valid
/// JSON, the top-level value is not an array, or any element lacks a
/// required field. The caller decides what to do with the prior batch;
/// this is a pure transform with no side effects.
pub fn parse_batch(raw: &str) -> Result<RecipeBatch, Error> {
    let recipes: Vec<Recipe> =
        serde_json::from_str(raw).map_err(|e| Error::MalformedResponse(e.to_string()))?;

    if recipes.len() != EXPECTED_RECIPE_COUNT {
        debug!(
            "generation returned {} recipe(s), expected {}",
            recipes.len(),
            EXPECTED_RECIPE_COUNT
        );
    }

    Ok(RecipeBatch { recipes })
}
