//! Prompt construction for the generation service.
//!
//! The instruction encodes the diet constraint, the time budget and the
//! free-text ingredient list, and pins the response to a JSON array of
//! exactly the fields the batch parser expects.

use clap::ValueEnum;
use std::fmt;

/// Diet constraint offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Diet {
    All,
    Vegetarian,
    Jain,
    Vegan,
}

impl Diet {
    fn as_constraint(self) -> &'static str {
        match self {
            Diet::All => "any diet",
            Diet::Vegetarian => "strictly vegetarian",
            Diet::Jain => "Jain (no onion, no garlic, no root vegetables)",
            Diet::Vegan => "strictly vegan",
        }
    }
}

impl fmt::Display for Diet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Diet::All => "all",
            Diet::Vegetarian => "vegetarian",
            Diet::Jain => "jain",
            Diet::Vegan => "vegan",
        };
        f.write_str(s)
    }
}

/// Build the generation instruction.
///
/// `has_image` switches the pantry framing: with a photo attached the
/// model is told to read ingredients off the image in addition to the
/// typed list.
pub fn build_prompt(ingredients: &str, diet: Diet, max_time: &str, has_image: bool) -> String {
    let pantry = if has_image {
        format!(
            "The attached photo shows ingredients I have. I also have: {}.",
            ingredients
        )
    } else {
        format!("I have these ingredients: {}.", ingredients)
    };

    format!(
        "You are BiteBot, a chef for quick Indian home cooking. {pantry} \
         Suggest exactly 3 recipes, each ready within {max_time}, suitable for {diet}. \
         The first recipe must use only ingredients I already have, so its \
         missing_ingredients list is empty. \
         Respond with ONLY a JSON array of 3 objects, no other text. Each object \
         has exactly these fields: \"name\" (string), \"time\" (string), \
         \"steps\" (string), \"missing_ingredients\" (array of strings naming \
         ingredients I still need to buy).",
        pantry = pantry,
        max_time = max_time,
        diet = diet.as_constraint(),
    )
}
