use std::path::PathBuf;

use clap::{Parser, Subcommand};
use opac_cli::commands::{libraries, search, settings, show};
use opac_cli::config::{default_config_path, resolve_config, Overrides, BASE_URL_ENV};
use opac_client::client::{CatalogClient, HttpCatalogClient};
use opac_client::demo::DemoCatalog;
use opac_core::query::SearchField;
use opac_core::types::RecordId;

#[derive(Parser)]
#[command(name = "opac", about = "Search a public library catalog from the terminal", version)]
struct Cli {
    /// Catalog base URL (overrides config and OPAC_BASE_URL)
    #[arg(long, global = true)]
    server: Option<String>,
    /// Library name shown in the header
    #[arg(long, global = true)]
    library: Option<String>,
    /// Use the built-in sample catalog instead of a server
    #[arg(long, global = true)]
    demo: bool,
    /// Config file path
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the catalog
    Search {
        /// Search terms
        #[arg(required = true)]
        terms: Vec<String>,
        /// keyword, title, author, subject, isbn, series or callnumber
        #[arg(long, short)]
        field: Option<SearchField>,
        /// Result page, starting at 1
        #[arg(long, short, default_value_t = 1)]
        page: u32,
    },
    /// Show a record with its holdings
    Show { id: RecordId },
    /// Dump a record's MARC fields
    Marc { id: RecordId },
    /// List the catalog's libraries
    Libraries,
    /// Print the effective configuration
    Config {
        /// Also write it to the config file
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let path = cli.config.unwrap_or_else(default_config_path);
    let overrides = Overrides {
        server: cli.server,
        library: cli.library,
    };
    let config = resolve_config(&path, std::env::var(BASE_URL_ENV).ok(), &overrides)?;

    if let Commands::Config { save } = cli.command {
        return settings::run_config(&config, &path, save);
    }

    let client: Box<dyn CatalogClient> = if cli.demo {
        Box::new(DemoCatalog::new(config.call_number_display))
    } else {
        Box::new(HttpCatalogClient::new(config.clone())?)
    };

    match cli.command {
        Commands::Search { terms, field, page } => {
            search::run_search(client.as_ref(), &config, &terms, field, page).await?;
        }
        Commands::Show { id } => show::run_show(client.as_ref(), &config, id).await?,
        Commands::Marc { id } => show::run_marc(client.as_ref(), id).await?,
        Commands::Libraries => libraries::run_libraries(client.as_ref()).await?,
        Commands::Config { .. } => {}
    }
    Ok(())
}
