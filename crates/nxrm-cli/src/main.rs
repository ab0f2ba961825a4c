//! nxrm CLI - Declarative administration of Sonatype Nexus Repository

use clap::{Args, Parser, Subcommand};
use nxrm_client::{ClientConfig, DEFAULT_API_BASE_PATH, DEFAULT_TIMEOUT};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;
mod document;
mod error;
mod exit_codes;

use error::Result;

#[derive(Parser)]
#[command(name = "nxrm")]
#[command(author = "nxrm Contributors")]
#[command(version)]
#[command(about = "Declarative administration of Sonatype Nexus Repository", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    connection: ConnectionArgs,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

/// Server connection settings
#[derive(Args, Clone, Debug)]
pub struct ConnectionArgs {
    /// Server URL
    #[arg(long, global = true, env = "NXRM_SERVER_URL")]
    url: Option<String>,

    /// Username for basic authentication
    #[arg(long, global = true, env = "NXRM_SERVER_USERNAME")]
    username: Option<String>,

    /// Password for basic authentication
    #[arg(long, global = true, env = "NXRM_SERVER_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// REST API prefix
    #[arg(long, global = true, default_value = DEFAULT_API_BASE_PATH)]
    api_base_path: String,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT)]
    timeout: u64,
}

impl ConnectionArgs {
    /// Whether a server was given at all
    pub fn has_url(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.is_empty())
    }

    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(
            self.url.clone().unwrap_or_default(),
            self.username.clone().unwrap_or_default(),
            self.password.clone().unwrap_or_default(),
        );
        config.api_base_path = self.api_base_path.clone();
        config.timeout = self.timeout;
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List resource and data source types
    Resources {
        /// List data sources instead of resources
        #[arg(long)]
        data_sources: bool,

        /// Only show types containing this text
        #[arg(long)]
        filter: Option<String>,
    },

    /// Print the schema of a type as JSON
    Schema {
        /// Type name, e.g. nxrm_repository_maven_hosted
        type_name: String,

        /// Look the name up among data sources
        #[arg(long)]
        data_source: bool,
    },

    /// Show the changes applying a document would make
    Plan {
        type_name: String,

        /// Resource document (YAML or JSON)
        #[arg(short = 'f', long)]
        config: PathBuf,

        /// State file holding the prior state
        #[arg(short, long)]
        state: Option<PathBuf>,

        /// Output the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create, update or replace a resource and write its state
    Apply {
        type_name: String,

        /// Resource document (YAML or JSON)
        #[arg(short = 'f', long)]
        config: PathBuf,

        /// State file, created or updated
        #[arg(short, long)]
        state: PathBuf,
    },

    /// Re-read a resource and update its state file
    Refresh {
        type_name: String,

        #[arg(short, long)]
        state: PathBuf,
    },

    /// Delete a resource and remove its state file
    Destroy {
        type_name: String,

        #[arg(short, long)]
        state: PathBuf,
    },

    /// Import an existing server object by its identifier
    Import {
        type_name: String,

        /// Import identifier, e.g. a repository name or `user_id,source`
        id: String,

        /// Write the state here instead of printing it
        #[arg(short, long)]
        state: Option<PathBuf>,
    },

    /// Read a data source
    Data {
        type_name: String,

        /// Lookup arguments (YAML or JSON); defaults to none
        #[arg(short = 'f', long)]
        config: Option<PathBuf>,
    },
}

fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let conn = &cli.connection;
    match cli.command {
        Commands::Resources {
            data_sources,
            filter,
        } => commands::resources::run(data_sources, filter.as_deref()),

        Commands::Schema {
            type_name,
            data_source,
        } => commands::schema::run(&type_name, data_source),

        Commands::Plan {
            type_name,
            config,
            state,
            json,
        } => commands::plan::run(conn, &type_name, &config, state.as_deref(), json).await,

        Commands::Apply {
            type_name,
            config,
            state,
        } => commands::apply::run(conn, &type_name, &config, &state).await,

        Commands::Refresh { type_name, state } => {
            commands::refresh::run(conn, &type_name, &state).await
        }

        Commands::Destroy { type_name, state } => {
            commands::destroy::run(conn, &type_name, &state).await
        }

        Commands::Import {
            type_name,
            id,
            state,
        } => commands::import::run(conn, &type_name, &id, state.as_deref()).await,

        Commands::Data { type_name, config } => {
            commands::data::run(conn, &type_name, config.as_deref()).await
        }
    }
}

fn main() {
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start async runtime: {}", e);
            std::process::exit(exit_codes::ERROR);
        }
    };

    if let Err(err) = runtime.block_on(run(cli)) {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}
