use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use grocery::config::{GroceryConfig, LogFormat};
use grocery::store::InMemoryRecipeSource;
use grocery::{format_grocery_list, GroceryListGenerator, GroceryListRequest};
use log::info;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

/// Consolidate recipe ingredients into one grocery list
#[derive(Parser, Debug)]
#[command(name = "grocery", version, about)]
struct Args {
    /// JSON file holding an array of recipes
    recipes: PathBuf,

    /// Recipe id to include; repeat for several recipes (default: every recipe in the file)
    #[arg(short, long = "recipe", value_name = "ID")]
    recipe_ids: Vec<i64>,

    /// Servings multiplier applied to every quantity
    #[arg(short, long, default_value_t = 1.0)]
    servings: f64,

    /// Check recipe access as this user
    #[arg(short, long, value_name = "ID")]
    user: Option<i64>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn init_logging(format: LogFormat) {
    match format {
        LogFormat::Text => env_logger::init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init(),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load .env and GROCERY_* settings before logging so the format applies
    let config = GroceryConfig::from_env()?;
    init_logging(config.log_format);

    info!("Starting grocery list generation");

    let source = InMemoryRecipeSource::from_path(&args.recipes)?;
    let generator = GroceryListGenerator::from_config(config)?;

    let recipe_ids = if args.recipe_ids.is_empty() {
        source.recipe_ids()
    } else {
        args.recipe_ids
    };
    let request = GroceryListRequest::new(args.user, recipe_ids, args.servings);

    let list = generator
        .build(&source, &request)
        .context("Failed to build grocery list")?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&list)?),
        OutputFormat::Text => print!("{}", format_grocery_list(&list)),
    }

    Ok(())
}
