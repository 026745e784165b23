use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use mtfetch::commands;
use mtfetch::core::config::Config;

#[derive(Parser)]
#[clap(name = "mtfetch")]
#[clap(about = "Download pretrained machine-translation models")]
#[clap(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Path to a TOML config file (default: ./mtfetch.toml, then the user config dir)
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logging on stderr
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download one or more model sets
    Fetch {
        /// Model sets to fetch (see `mtfetch list`)
        sets: Vec<String>,
        /// Fetch every configured set
        #[clap(long, conflicts_with = "sets")]
        all: bool,
        /// Root directory for model sets (default: models_root from config)
        #[clap(long)]
        root: Option<PathBuf>,
        /// Skip TLS certificate verification
        #[clap(long)]
        insecure: bool,
        /// Use the set's mirror URL instead of its base URL
        #[clap(long)]
        mirror: bool,
        /// Request timeout in seconds
        #[clap(long, value_parser = clap::value_parser!(u64).range(1..))]
        timeout: Option<u64>,
    },
    /// List configured model sets and whether they are on disk
    List {
        /// Root directory for model sets (default: models_root from config)
        #[clap(long)]
        root: Option<PathBuf>,
        /// Print as JSON
        #[clap(long)]
        json: bool,
    },
    /// Write the current configuration to a TOML file
    Init {
        /// Destination file (default: ./mtfetch.toml)
        #[clap(long)]
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[clap(long)]
        force: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Fetch {
            sets,
            all,
            root,
            insecure,
            mirror,
            timeout,
        } => {
            let options = commands::fetch::FetchOptions {
                sets,
                all,
                root,
                insecure,
                mirror,
                timeout_secs: timeout,
            };
            commands::fetch::fetch_sets(&config, &options)?;
        }
        Commands::List { root, json } => {
            commands::list::list_sets(&config, root.as_deref(), json)?;
        }
        Commands::Init { path, force } => {
            commands::init::init_config(&config, path.as_deref(), force)?;
        }
    }

    Ok(())
}
