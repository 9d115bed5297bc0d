//! Trawl - search front end for mirrored file indexes
//!
//! Trawl serves a small HTML and JSON search interface on top of an
//! Elasticsearch index of files found on mirror servers.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use trawl_core::{Result, TrawlConfig, TrawlError};
use trawl_infra::{init_logger, LoggerConfig};
use trawl_serve::ServerBuilder;

#[derive(Parser)]
#[command(name = "trawl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Trawl - search front end for mirrored file indexes")]
#[command(long_about = r#"
Trawl answers search queries against an Elasticsearch index of files and
renders the hits as an HTML results page or as raw JSON.

Configuration is read from an optional YAML or JSON file and can be
overridden with TRAWL_* environment variables, for example
TRAWL_BACKEND__URL=http://search:9200.
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the search server
    Serve {
        /// Server host address
        #[arg(long)]
        host: Option<String>,

        /// Server port
        #[arg(short, long)]
        port: Option<u16>,

        /// Hits per result page
        #[arg(long)]
        per_page: Option<u64>,

        /// Search backend URL
        #[arg(long)]
        backend_url: Option<String>,
    },

    /// Write a default configuration file
    Init {
        /// Configuration file path
        #[arg(default_value = "trawl.yaml")]
        path: PathBuf,
    },

    /// Validate configuration file
    Validate {
        /// Configuration file to validate
        path: PathBuf,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            ref host,
            port,
            per_page,
            ref backend_url,
        } => {
            let mut config = TrawlConfig::load(cli.config.as_deref())?;
            if let Some(url) = backend_url {
                config.backend.url = url.parse()?;
            }
            setup_logging(&cli, &config)?;

            let mut builder = ServerBuilder::new(config);
            if let Some(host) = host {
                builder = builder.host(host.clone());
            }
            if let Some(port) = port {
                builder = builder.port(port);
            }
            if let Some(per_page) = per_page {
                builder = builder.per_page(per_page);
            }

            info!("Starting Trawl v{}", env!("CARGO_PKG_VERSION"));
            builder.build()?.start().await?;
        }

        Commands::Init { ref path } => {
            setup_logging(&cli, &TrawlConfig::default())?;
            handle_init(path)?;
        }

        Commands::Validate { ref path } => {
            setup_logging(&cli, &TrawlConfig::default())?;
            handle_validate(path)?;
        }

        Commands::Version => {
            println!("{}", trawl_core::version_info());
        }
    }

    Ok(())
}

fn setup_logging(cli: &Cli, config: &TrawlConfig) -> Result<()> {
    let mut logger = LoggerConfig::from_settings(&config.logging)?;
    if cli.verbose {
        logger.level = "debug".to_string();
    }
    init_logger(logger)
}

fn handle_init(path: &PathBuf) -> Result<()> {
    info!("Initializing Trawl configuration at {:?}", path);

    if path.exists() {
        return Err(TrawlError::validation(format!(
            "Configuration file already exists: {:?}. Remove it first or use a different path.",
            path
        )));
    }

    TrawlConfig::default().to_file(path)?;

    println!("Configuration initialized at {:?}", path);
    println!(
        "Run 'trawl --config {:?} serve' to start the server",
        path
    );

    Ok(())
}

fn handle_validate(path: &PathBuf) -> Result<()> {
    info!("Validating configuration at {:?}", path);

    if !path.exists() {
        return Err(TrawlError::not_found(format!(
            "Configuration file not found: {:?}",
            path
        )));
    }

    let config = TrawlConfig::from_file(path)?;
    match config.validate() {
        Ok(()) => {
            println!("Configuration is valid");
            println!("  Backend: {}/{}", config.backend.url, config.backend.index);
            println!("  Listen: {}:{}", config.server.host, config.server.port);
            println!("  Hits per page: {}", config.search.per_page);
            Ok(())
        }
        Err(e) => {
            println!("Configuration is invalid: {}", e);
            Err(e)
        }
    }
}
