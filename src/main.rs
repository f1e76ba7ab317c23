//! Offer ontology service
//!
//! Command-line interface: run the HTTP API or issue single queries.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use oferta_ontology::config::LogLevel;
use oferta_ontology::server::run_server;
use oferta_ontology::{NormalizedRecord, OntologyConfig, OntologyService};

#[derive(Parser)]
#[command(name = "oferta")]
#[command(version)]
#[command(about = "Query the tourism offer ontology or serve it over HTTP", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the standard search path)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// SPARQL query endpoint, overriding the configuration
    #[arg(long, global = true, value_name = "URL")]
    endpoint: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Quiet mode (warnings and errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },
    /// List top-level categories
    Categories,
    /// List direct subcategories of a category
    Subcategories {
        #[arg(value_name = "CATEGORY")]
        category: String,
    },
    /// List offers rated above a threshold
    Rated {
        /// Rating threshold (defaults to the configured one)
        #[arg(long, allow_hyphen_values = true)]
        threshold: Option<f64>,
    },
    /// List instances of a category and its subcategories
    Instances {
        #[arg(value_name = "CATEGORY")]
        category: String,
    },
    /// Free-text search over offers
    Search {
        #[arg(value_name = "TERM")]
        term: String,
        /// Page size
        #[arg(long, allow_hyphen_values = true)]
        limit: Option<i64>,
        /// Records to skip
        #[arg(long, allow_hyphen_values = true)]
        offset: Option<i64>,
    },
    /// Inspect or create configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a commented configuration template
    Init {
        #[arg(value_name = "PATH", default_value = "oferta.toml")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Command::Config {
        action: ConfigAction::Init { path },
    } = &cli.command
    {
        return init_config(path);
    }

    let config = load_config(&cli)?;
    init_logging(config.general.log_level);
    debug!(endpoint = %config.store.endpoint, "configuration loaded");

    match cli.command {
        Command::Serve { host, port } => {
            let mut server = config.server.clone();
            if let Some(host) = host {
                server.host = host;
            }
            if let Some(port) = port {
                server.port = port;
            }
            let service = OntologyService::from_config(&config)?;
            run_server(service, server).await.context("HTTP server stopped")?;
        }
        Command::Categories => {
            let service = OntologyService::from_config(&config)?;
            print_records(&service.root_categories().await?)?;
        }
        Command::Subcategories { category } => {
            let service = OntologyService::from_config(&config)?;
            print_records(&service.subcategories_of(&category).await?)?;
        }
        Command::Rated { threshold } => {
            let service = OntologyService::from_config(&config)?;
            let records = match threshold {
                Some(t) => service.rated_offers_above(t).await?,
                None => service.rated_offers().await?,
            };
            print_records(&records)?;
        }
        Command::Instances { category } => {
            let service = OntologyService::from_config(&config)?;
            print_records(&service.instances_of_category(&category).await?)?;
        }
        Command::Search { term, limit, offset } => {
            let service = OntologyService::from_config(&config)?;
            let page = service.page(limit, offset)?;
            print_records(&service.free_text_search(&term, page).await?)?;
        }
        // `config init` returned above
        Command::Config { .. } => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<OntologyConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = OntologyConfig::load_from_file(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            config.apply_env_overrides()?;
            config
        }
        None => OntologyConfig::load().context("Failed to load configuration")?,
    };

    if let Some(endpoint) = &cli.endpoint {
        config.store.endpoint = endpoint.clone();
    }
    if cli.verbose {
        config.general.log_level = LogLevel::Verbose;
    } else if cli.quiet {
        config.general.log_level = LogLevel::Quiet;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// `RUST_LOG` wins over the configured level
fn init_logging(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.filter_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    fs::write(path, OntologyConfig::default_config_content())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn print_records(records: &[NormalizedRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records).context("Failed to serialize records")?;
    println!("{}", json);
    Ok(())
}
