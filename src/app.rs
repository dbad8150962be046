//! Terminal surface: the interactive command loop, the one-shot
//! `suggest` run, and `status`.
//!
//! All recipe/cart logic lives in [`crate::session`]; this module only
//! reads lines, calls the client, and prints. The loop blocks on one
//! generation call at a time, so a session never has two outstanding
//! requests.

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::api::{self, GenerationClient};
use crate::cart::CartView;
use crate::prompt::{build_prompt, Diet};
use crate::recipe::{RecipeBatch, EXPECTED_RECIPE_COUNT};
use crate::session::Session;

const DEFAULT_MAX_TIME: &str = "15 min";

pub struct App {
    client: GenerationClient,
    session: Session,
}

impl App {
    pub fn new(client: GenerationClient) -> Self {
        Self {
            client,
            session: Session::new(),
        }
    }

    pub async fn run_interactive(&mut self) -> Result<()> {
        println!("⚡ BiteBot — quick recipes from whatever you have.");
        println!("Model: {}\n", self.client.model());
        print_help();

        loop {
            print!("bitebot> ");
            io::stdout().flush()?;

            let mut line = String::new();
            if io::stdin().read_line(&mut line)? == 0 {
                break; // EOF
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (command, rest) = split_command(line);
            match command {
                "gen" => self.cmd_generate().await?,
                "recipes" => match self.session.batch() {
                    Some(batch) => println!("{}", render_recipes(batch)),
                    None => println!("No recipes yet — run 'gen' first."),
                },
                "cart" => println!("{}", render_cart(&self.session.cart().partition())),
                "toggle" => self.cmd_toggle(rest),
                "save" => self.cmd_save(rest)?,
                "help" => print_help(),
                "quit" | "exit" => break,
                _ => println!("Unknown command {:?}. Type 'help' for commands.", command),
            }
        }

        Ok(())
    }

    async fn cmd_generate(&mut self) -> Result<()> {
        let ingredients = prompt_line("Ingredients (comma separated): ")?;
        let diet = parse_diet(&prompt_line("Diet [all/vegetarian/jain/vegan]: ")?);
        let mut max_time = prompt_line(&format!("Max time (default {}): ", DEFAULT_MAX_TIME))?;
        if max_time.is_empty() {
            max_time = DEFAULT_MAX_TIME.to_string();
        }
        let photo = prompt_line("Photo path (blank for none): ")?;

        let image = if photo.is_empty() {
            None
        } else {
            match api::read_image(Path::new(&photo)) {
                Ok(data) => Some(data),
                Err(e) => {
                    println!("⚠️  {:#}. Continuing without the photo.", e);
                    None
                }
            }
        };

        println!("⚡ BiteBot is thinking...");
        let prompt = build_prompt(&ingredients, diet, &max_time, image.is_some());

        let raw = match self.client.generate(&prompt, image).await {
            Ok(raw) => raw,
            Err(e) => {
                println!("❌ {}", e);
                println!("   Previous recipes and cart are unchanged — try again.");
                return Ok(());
            }
        };

        match self.session.apply_generation(&raw) {
            Ok(()) => {
                if let Some(batch) = self.session.batch() {
                    println!("{}", render_recipes(batch));
                }
                println!("{}", render_cart(&self.session.cart().partition()));
            }
            Err(e) => {
                println!("❌ {}", e);
                println!("   Previous recipes and cart are unchanged — try again.");
            }
        }

        Ok(())
    }

    fn cmd_toggle(&mut self, name: &str) {
        if name.is_empty() {
            println!("Usage: toggle <ingredient name>");
            return;
        }
        // An unknown name is a benign no-op; just show the cart as it is.
        self.session.toggle(name);
        println!("{}", render_cart(&self.session.cart().partition()));
    }

    fn cmd_save(&self, path: &str) -> Result<()> {
        if path.is_empty() {
            println!("Usage: save <file path>");
            return Ok(());
        }
        let Some(batch) = self.session.batch() else {
            println!("No recipes to save yet — run 'gen' first.");
            return Ok(());
        };

        std::fs::write(path, batch.to_plain_text())
            .with_context(|| format!("Failed to write recipe file: {}", path))?;
        println!("💾 Saved recipes to {}", path);
        Ok(())
    }
}

/// One-shot generation for non-interactive use.
pub async fn run_suggest(
    client: GenerationClient,
    ingredients: String,
    diet: Diet,
    max_time: String,
    photo: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let image = match &photo {
        Some(path) => Some(api::read_image(path)?),
        None => None,
    };

    let mut session = Session::new();
    let prompt = build_prompt(&ingredients, diet, &max_time, image.is_some());

    println!("⚡ Asking {}...", client.model());
    let raw = client.generate(&prompt, image).await?;
    session.apply_generation(&raw)?;

    if let Some(batch) = session.batch() {
        println!("{}", render_recipes(batch));
        if let Some(path) = output {
            std::fs::write(&path, batch.to_plain_text())
                .with_context(|| format!("Failed to write recipe file: {}", path.display()))?;
            println!("💾 Saved recipes to {}", path.display());
        }
    }
    println!("{}", render_cart(&session.cart().partition()));

    Ok(())
}

/// Validate key and connectivity without starting a session.
pub async fn run_status(client: GenerationClient) -> Result<()> {
    let models = client.list_models().await?;
    println!("✅ Generation service reachable ({} models)", models.len());

    match models.iter().find(|m| m.name == client.model()) {
        Some(model) => {
            let label = model.display_name.as_deref().unwrap_or(&model.name);
            println!("   Configured model available: {} ({})", model.name, label);
            if !model
                .supported_generation_methods
                .iter()
                .any(|method| method == "generateContent")
            {
                println!("⚠️  Model does not list generateContent support.");
            }
        }
        None => {
            println!(
                "⚠️  Configured model not in the listing: {}",
                client.model()
            );
            println!("   Generation may fail; pick another model with --model.");
        }
    }

    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  gen             suggest recipes from your ingredients");
    println!("  recipes         show the current suggestions");
    println!("  cart            show the shopping cart");
    println!("  toggle <name>   check/uncheck a cart item");
    println!("  save <path>     save the suggestions as plain text");
    println!("  help            show this help");
    println!("  quit            leave");
}

fn prompt_line(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// First whitespace-delimited token and the trimmed remainder. Ingredient
/// names may contain spaces, so the remainder stays verbatim.
fn split_command(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    }
}

fn parse_diet(raw: &str) -> Diet {
    if raw.is_empty() {
        return Diet::All;
    }
    Diet::from_str(raw, true).unwrap_or_else(|_| {
        warn!("unknown diet {:?}, using 'all'", raw);
        Diet::All
    })
}

fn render_recipes(batch: &RecipeBatch) -> String {
    let mut out = String::new();

    if batch.len() != EXPECTED_RECIPE_COUNT {
        out.push_str(&format!(
            "⚠️  Expected {} recipes, got {}.\n\n",
            EXPECTED_RECIPE_COUNT,
            batch.len()
        ));
    }

    for (i, recipe) in batch.recipes.iter().enumerate() {
        out.push_str(&format!(
            "🍲 {}. {} — {}\n   {}\n",
            i + 1,
            recipe.name,
            recipe.time,
            recipe.steps
        ));
        if recipe.missing_ingredients.is_empty() {
            out.push_str("   Uses only what you have.\n");
        } else {
            out.push_str(&format!(
                "   Needs: {}\n",
                recipe.missing_ingredients.join(", ")
            ));
        }
    }

    out
}

fn render_cart(view: &CartView<'_>) -> String {
    if view.is_empty() {
        return "🧺 Cart is empty — nothing to buy.".to_string();
    }

    let mut out = String::from("🛒 Shopping cart\n");
    if !view.to_buy.is_empty() {
        out.push_str("  To buy:\n");
        for item in &view.to_buy {
            out.push_str(&format!("    [ ] {}\n", item.name));
        }
    }
    if !view.collected.is_empty() {
        out.push_str("  Collected:\n");
        for item in &view.collected {
            out.push_str(&format!("    [x] {}\n", item.name));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::Cart;
    use crate::recipe::parse_batch;

    fn sample_cart() -> Cart {
        let batch = parse_batch(
            r#"[
                {"name":"A","time":"5 min","steps":"a","missing_ingredients":["Paneer","Oil"]},
                {"name":"B","time":"5 min","steps":"b","missing_ingredients":["Maggi"]}
            ]"#,
        )
        .unwrap();
        let mut cart = Cart::new();
        cart.merge(&batch);
        cart
    }

    #[test]
    fn test_split_command_keeps_spaced_names() {
        assert_eq!(split_command("toggle Garam Masala"), ("toggle", "Garam Masala"));
        assert_eq!(split_command("cart"), ("cart", ""));
        assert_eq!(split_command("toggle  Oil "), ("toggle", "Oil"));
    }

    #[test]
    fn test_parse_diet_defaults_and_ignores_case() {
        assert_eq!(parse_diet(""), Diet::All);
        assert_eq!(parse_diet("Vegan"), Diet::Vegan);
        assert_eq!(parse_diet("JAIN"), Diet::Jain);
        assert_eq!(parse_diet("carnivore"), Diet::All);
    }

    #[test]
    fn test_render_cart_empty_indicator() {
        let cart = Cart::new();
        let text = render_cart(&cart.partition());
        assert!(text.contains("Cart is empty"));
        assert!(!text.contains("To buy"));
    }

    #[test]
    fn test_render_cart_partitions_unchecked_first() {
        let mut cart = sample_cart();
        cart.toggle("Oil");

        let text = render_cart(&cart.partition());
        let to_buy = text.find("To buy").unwrap();
        let collected = text.find("Collected").unwrap();
        assert!(to_buy < collected);
        assert!(text.contains("[ ] Paneer"));
        assert!(text.contains("[ ] Maggi"));
        assert!(text.contains("[x] Oil"));
    }

    #[test]
    fn test_render_cart_skips_empty_partition_header() {
        let mut cart = sample_cart();
        for name in ["Paneer", "Oil", "Maggi"] {
            cart.toggle(name);
        }

        let text = render_cart(&cart.partition());
        assert!(!text.contains("To buy"));
        assert!(text.contains("Collected"));
    }

    #[test]
    fn test_render_recipes_warns_on_unexpected_count() {
        let batch = parse_batch(
            r#"[{"name":"Solo","time":"5 min","steps":"s","missing_ingredients":[]}]"#,
        )
        .unwrap();
        let text = render_recipes(&batch);
        assert!(text.contains("Expected 3 recipes, got 1"));
        assert!(text.contains("Uses only what you have"));

        let full = parse_batch(
            r#"[
                {"name":"A","time":"5 min","steps":"a"},
                {"name":"B","time":"5 min","steps":"b"},
                {"name":"C","time":"5 min","steps":"c","missing_ingredients":["Ghee"]}
            ]"#,
        )
        .unwrap();
        let text = render_recipes(&full);
        assert!(!text.contains("Expected"));
        assert!(text.contains("Needs: Ghee"));
    }
}
