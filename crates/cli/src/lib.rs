pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "pricedrop",
    about = "PriceDrop operator CLI",
    long_about = "Operate the PriceDrop tracker: run migrations, search the catalog, manage the watchlist, and inspect effective configuration.",
    after_help = "Examples:\n  pricedrop migrate\n  pricedrop search headphones --sort price_low\n  pricedrop watch add amz_001\n  pricedrop config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations")]
    Migrate,
    #[command(about = "Search the product catalog")]
    Search {
        query: String,
        #[arg(long, help = "Restrict to one marketplace (amazon|ebay|aliexpress|temu|jumia)")]
        marketplace: Option<String>,
        #[arg(long, help = "Sort key (relevance|price_low|price_high|discount|delivery)")]
        sort: Option<String>,
    },
    #[command(about = "Manage the watchlist")]
    Watch {
        #[command(subcommand)]
        action: WatchAction,
    },
    #[command(about = "Inspect effective configuration values with secret redaction")]
    Config,
}

#[derive(Debug, Subcommand)]
enum WatchAction {
    #[command(about = "List watchlist entries, most recent first")]
    List,
    #[command(about = "Add a catalog product to the watchlist by id")]
    Add { product_id: String },
    #[command(about = "Remove a product from the watchlist by id")]
    Remove { product_id: String },
    #[command(about = "Record an observed price and refresh the watchlist snapshot")]
    Record { product_id: String, price: String },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Search { query, marketplace, sort } => {
            commands::search::run(&query, marketplace.as_deref(), sort.as_deref())
        }
        Command::Watch { action } => match action {
            WatchAction::List => commands::watch::list(),
            WatchAction::Add { product_id } => commands::watch::add(&product_id),
            WatchAction::Remove { product_id } => commands::watch::remove(&product_id),
            WatchAction::Record { product_id, price } => {
                commands::watch::record(&product_id, &price)
            }
        },
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
