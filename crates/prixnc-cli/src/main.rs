mod catalog;
mod extract;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use prixnc_core::SortBy;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "prixnc-cli")]
#[command(about = "Prix NC price comparison command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search the catalog by product name
    Search {
        query: String,
        /// Zero-based page index
        #[arg(long, default_value = "0")]
        page: u32,
        /// Page size (defaults to PRIXNC_DEFAULT_PAGE_SIZE)
        #[arg(long)]
        size: Option<u32>,
        /// price, distance or store
        #[arg(long)]
        sort: Option<SortBy>,
    },
    /// Show every selling point for a product
    Details {
        /// Id to report the product under
        id: String,
        /// Product name used to resolve the catalog id
        name: String,
    },
    /// Run the shopping-list pipeline on an image
    Extract {
        image: PathBuf,
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
        /// Print the full outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database answers
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("prixnc-cli: run with --help to list commands");
        return Ok(());
    };

    let config = prixnc_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match command {
        Commands::Search {
            query,
            page,
            size,
            sort,
        } => catalog::run_search(&config, &query, page, size, sort).await,
        Commands::Details { id, name } => catalog::run_details(&config, &id, &name).await,
        Commands::Extract {
            image,
            lat,
            lon,
            json,
        } => {
            let location = lat.zip(lon).map(|(lat, lon)| prixnc_core::GeoPoint::new(lat, lon));
            extract::run_extract(&config, &image, location, json).await
        }
        Commands::Db { command } => run_db(&config, command).await,
    }
}

async fn run_db(config: &prixnc_core::AppConfig, command: DbCommands) -> anyhow::Result<()> {
    let pool = prixnc_db::connect_from_config(config).await?;
    match command {
        DbCommands::Ping => {
            prixnc_db::ping(&pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = prixnc_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
    }
    pool.close().await;
    Ok(())
}

#[cfg(test)]
mod tests;
