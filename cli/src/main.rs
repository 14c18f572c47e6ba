mod commands;
mod config;
mod server;

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::{
    AddOptions, cmd_add, cmd_convert, cmd_delete, cmd_hydration, cmd_ingredient_list,
    cmd_ingredient_remove, cmd_ingredient_set, cmd_list, cmd_show, cmd_stats, cmd_titles,
    json_error,
};
use crate::config::Config;
use crumb_core::convert::ConversionRules;
use crumb_core::models::BakingInfo;
use crumb_core::service::RecipeService;

#[derive(Parser)]
#[command(
    name = "crumb",
    version,
    about = "A baking recipe manager with baker's-percentage scaling"
)]
struct Cli {
    /// Database file (default: crumb.db in the data directory)
    #[arg(long, global = true, env = "CRUMB_DB", value_name = "PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all recipes
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List recipe titles only
    Titles {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one recipe with its ingredients and baking parameters
    Show {
        /// Recipe title
        title: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Save a recipe
    Add {
        /// Recipe title
        title: String,
        /// Ingredient as "group|name|weight[|percent[|desc]]" (repeatable)
        #[arg(short, long = "ingredient", value_name = "SPEC", required = true)]
        ingredients: Vec<String>,
        /// Method / steps text
        #[arg(long)]
        steps: Option<String>,
        /// Top heat in °C
        #[arg(long)]
        top_heat: Option<i64>,
        /// Bottom heat in °C
        #[arg(long)]
        bottom_heat: Option<i64>,
        /// Bake time in minutes
        #[arg(long)]
        time: Option<i64>,
        /// Bake with convection
        #[arg(long)]
        convection: bool,
        /// Bake with steam
        #[arg(long)]
        steam: bool,
        /// Replace an existing recipe with the same title
        #[arg(long)]
        update: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a recipe
    Delete {
        /// Recipe title
        title: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Scale a recipe to a target basis-flour weight
    Convert {
        /// Recipe title
        title: String,
        /// Target basis flour in grams
        target: f64,
        /// Also scale groups outside the basis (fillings, toppings)
        #[arg(long)]
        all: bool,
        /// Flour keyword (repeatable, replaces the defaults)
        #[arg(long = "flour-keyword", value_name = "KEYWORD")]
        flour_keywords: Vec<String>,
        /// Basis group (repeatable, replaces the defaults)
        #[arg(long = "basis-group", value_name = "GROUP")]
        basis_groups: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show dough hydration from the ingredient table
    Hydration {
        /// Recipe title
        title: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage the ingredient hydration table
    Ingredient {
        #[command(subcommand)]
        command: IngredientCommands,
    },
    /// Show database statistics
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start the REST API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
        /// Address to bind to (default: 127.0.0.1, use 0.0.0.0 to expose to network)
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,
        /// Disable API key authentication (for development/testing)
        #[arg(long)]
        no_auth: bool,
    },
}

#[derive(Subcommand)]
enum IngredientCommands {
    /// List known ingredients and their water content
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set an ingredient's water content (fraction, e.g. 0.9 for milk)
    Set {
        /// Ingredient name
        name: String,
        /// Water fraction of the ingredient's weight
        hydration: f64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove an ingredient from the table
    Remove {
        /// Ingredient name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    fn json(&self) -> bool {
        match self {
            Self::List { json }
            | Self::Titles { json }
            | Self::Show { json, .. }
            | Self::Add { json, .. }
            | Self::Delete { json, .. }
            | Self::Convert { json, .. }
            | Self::Hydration { json, .. }
            | Self::Stats { json } => *json,
            Self::Ingredient { command } => match command {
                IngredientCommands::List { json }
                | IngredientCommands::Set { json, .. }
                | IngredientCommands::Remove { json, .. } => *json,
            },
            Self::Serve { .. } => false,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("crumb=info,crumb_core=info,tower_http=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let json = cli.command.json();

    if let Err(e) = run(cli).await {
        if json {
            println!("{}", json_error(&format!("{e:#}")));
        } else {
            eprintln!("Error: {e:#}");
        }
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.db)?;
    let mut service = RecipeService::new(&config.db_path)?;

    match cli.command {
        Commands::List { json } => cmd_list(&service, json),
        Commands::Titles { json } => cmd_titles(&service, json),
        Commands::Show { title, json } => cmd_show(&service, &title, json),
        Commands::Add {
            title,
            ingredients,
            steps,
            top_heat,
            bottom_heat,
            time,
            convection,
            steam,
            update,
            json,
        } => {
            let options = AddOptions {
                steps,
                baking_info: BakingInfo {
                    top_heat,
                    bottom_heat,
                    time,
                    convection,
                    steam,
                },
                update,
            };
            cmd_add(&mut service, &title, &ingredients, options, json)
        }
        Commands::Delete { title, json } => cmd_delete(&service, &title, json),
        Commands::Convert {
            title,
            target,
            all,
            flour_keywords,
            basis_groups,
            json,
        } => {
            let rules = ConversionRules::with_overrides(flour_keywords, basis_groups);
            cmd_convert(&service, &title, target, all, &rules, json)
        }
        Commands::Hydration { title, json } => {
            cmd_hydration(&service, &title, &ConversionRules::default(), json)
        }
        Commands::Ingredient { command } => match command {
            IngredientCommands::List { json } => cmd_ingredient_list(&service, json),
            IngredientCommands::Set {
                name,
                hydration,
                json,
            } => cmd_ingredient_set(&service, &name, hydration, json),
            IngredientCommands::Remove { name, json } => {
                cmd_ingredient_remove(&service, &name, json)
            }
        },
        Commands::Stats { json } => cmd_stats(&service, json),
        Commands::Serve {
            port,
            bind,
            no_auth,
        } => {
            let api_key = if no_auth {
                None
            } else {
                Some(config.load_or_create_api_key()?)
            };
            server::start_server(service, port, &bind, api_key).await
        }
    }
}
