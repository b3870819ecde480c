//! CLI entry and dispatch.

use anyhow::{Context, Result};
use bunsik_core::config::Config;
use bunsik_core::logging;
use clap::Parser;

mod commands;

#[derive(Parser)]
#[command(name = "bunsik")]
#[command(version = "1.0")]
#[command(about = "Terminal order register for a bunsik counter")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Inspect saved orders
    Orders {
        #[command(subcommand)]
        command: OrdersCommands,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum OrdersCommands {
    /// Lists saved orders, newest first
    List {
        /// Maximum number of orders to print
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Shows a specific order
    Show {
        /// The ID of the order to show (a unique prefix is enough)
        #[arg(value_name = "ORDER_ID")]
        id: String,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let _guard = logging::init()?;

    // default to the register
    let Some(command) = cli.command else {
        let config = Config::load().context("load config")?;
        return bunsik_tui::run_register(config);
    };

    match command {
        Commands::Orders { command } => match command {
            OrdersCommands::List { limit } => commands::orders::list(limit),
            OrdersCommands::Show { id } => commands::orders::show(&id),
        },

        Commands::Config { command } => match command {
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
