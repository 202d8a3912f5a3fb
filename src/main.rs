//! # Pantry CLI (`pantry`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pantry init` | Create the inventory database |
//! | `pantry add <name>` | Add an ingredient |
//! | `pantry list` | Show the inventory with freshness status |
//! | `pantry update <id> <name>` | Overwrite an ingredient |
//! | `pantry delete <id>` | Remove an ingredient |
//! | `pantry recipe` | Suggest a recipe from the current inventory |
//! | `pantry shell` | Interactive mode |
//! | `pantry corpus fetch` | Clone the recipe corpus |
//! | `pantry index build` | Build the vector index from the corpus |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use pantry::{app, config, corpus, index_build, inventory, logging, recipe};
use pantry_core::IngredientFields;

/// Pantry: an ingredient inventory with a recipe advisor.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/pantry.example.toml`. A missing file means defaults.
#[derive(Parser)]
#[command(
    name = "pantry",
    about = "Pantry: track perishable ingredients and get recipe suggestions",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/pantry.toml")]
    config: PathBuf,

    /// Shorthand for `--log-level debug`.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log filter (`warn`, `info`, `debug`, or an `EnvFilter` directive).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the inventory database. Safe to run repeatedly.
    Init,

    /// Add an ingredient.
    Add {
        name: String,
        #[arg(long)]
        quantity: Option<String>,
        /// Purchase date (YYYY-MM-DD).
        #[arg(long)]
        purchased: Option<String>,
        /// Expiry date (YYYY-MM-DD).
        #[arg(long)]
        expires: Option<String>,
    },

    /// List all ingredients, marking expired and soon-to-expire rows.
    List {
        /// Classify freshness against this date instead of today (YYYY-MM-DD).
        #[arg(long)]
        today: Option<String>,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Overwrite every field of an ingredient. Omitted options are cleared.
    Update {
        id: i64,
        name: String,
        #[arg(long)]
        quantity: Option<String>,
        #[arg(long)]
        purchased: Option<String>,
        #[arg(long)]
        expires: Option<String>,
    },

    /// Delete an ingredient.
    Delete { id: i64 },

    /// Ask the advisor for a recipe based on the current inventory.
    ///
    /// Failures are reported as text; the command itself succeeds.
    Recipe,

    /// Interactive shell.
    Shell,

    /// Manage the recipe corpus.
    Corpus {
        #[command(subcommand)]
        action: CorpusAction,
    },

    /// Manage the vector index.
    Index {
        #[command(subcommand)]
        action: IndexAction,
    },
}

#[derive(Subcommand)]
enum CorpusAction {
    /// Clone the recipe corpus. Skipped when the directory exists.
    Fetch,
}

#[derive(Subcommand)]
enum IndexAction {
    /// Split, embed, and index the corpus.
    Build {
        /// Rebuild even if an index already exists.
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose, cli.log_level.as_deref(), cli.log_json)?;

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => inventory::run_init(&cfg).await?,
        Commands::Add {
            name,
            quantity,
            purchased,
            expires,
        } => {
            let fields = IngredientFields::new(name, quantity, purchased, expires);
            inventory::run_add(&cfg, fields).await?;
        }
        Commands::List { today, json } => {
            inventory::run_list(&cfg, today.as_deref(), json).await?;
        }
        Commands::Update {
            id,
            name,
            quantity,
            purchased,
            expires,
        } => {
            let fields = IngredientFields::new(name, quantity, purchased, expires);
            inventory::run_update(&cfg, id, fields).await?;
        }
        Commands::Delete { id } => inventory::run_delete(&cfg, id).await?,
        Commands::Recipe => recipe::run_recipe(&cfg).await?,
        Commands::Shell => app::run_shell(&cfg).await?,
        Commands::Corpus { action } => match action {
            CorpusAction::Fetch => corpus::run_fetch(&cfg)?,
        },
        Commands::Index { action } => match action {
            IndexAction::Build { force } => index_build::run_build(&cfg, force).await?,
        },
    }

    Ok(())
}
