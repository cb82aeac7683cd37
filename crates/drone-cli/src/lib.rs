//! Drone CLI - Command-line client for the drone deployment daemon
//!
//! This CLI lets operators:
//! - Inspect the daemon version and the apps it manages
//! - Start, stop, restart, update and clean apps from a JSON manifest
//! - Package a local directory and deploy it as a tarball

use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

use commands::deploy::{DeployArgs, PackArgs};
use commands::{deploy, info, lifecycle};
use config::{CliConfig, DEFAULT_MANIFEST};
pub use error::{CliError, CliResult};
use output::OutputFormat;

/// Drone CLI application
#[derive(Parser, Debug)]
#[command(name = "drone")]
#[command(about = "Drone - command-line client for the drone deployment daemon", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Daemon host
    #[arg(short = 'H', long, env = "DRONE_HOST", global = true)]
    pub host: Option<String>,

    /// Daemon port
    #[arg(short, long, env = "DRONE_PORT", global = true)]
    pub port: Option<u16>,

    /// App manifest [default: ./config.json]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty, global = true)]
    pub output: OutputFormat,

    /// CLI settings file
    #[arg(long, env = "DRONE_SETTINGS", global = true)]
    pub settings: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the daemon version
    Version,

    /// Detailed info on all apps
    Apps,

    /// Detailed info on one app
    App {
        /// App name
        app_name: String,
    },

    /// List running drones
    Running,

    /// Start the app described by the manifest
    Start,

    /// Stop an app
    Stop {
        /// App name
        app_name: String,
    },

    /// Restart an app
    Restart {
        /// App name
        app_name: String,
    },

    /// Send the manifest to the daemon as an update
    Update,

    /// Stop an app and remove its files from the daemon
    Clean {
        /// App name [default: name from the manifest]
        app_name: Option<String>,

        /// Skip confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Package a directory and deploy it
    Deploy(DeployArgs),

    /// Package a directory into a local tarball
    Pack(PackArgs),

    /// Show configuration
    Config,
}

/// Run using the current process arguments.
pub async fn run() -> CliResult<()> {
    run_with_args(std::env::args_os()).await
}

/// Run using the provided argument iterator.
pub async fn run_with_args<I, T>(args: I) -> CliResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    init_tracing(cli.verbose);
    execute(cli).await
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "drone_cli=debug,drone_pack=debug"
    } else {
        "warn"
    };
    // Already installed when called more than once in the same process.
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_ansi(std::io::stderr().is_terminal())
                .with_writer(std::io::stderr),
        )
        .try_init();
}

/// Execute a parsed command line
pub async fn execute(cli: Cli) -> CliResult<()> {
    // Load settings
    let settings = CliConfig::load(cli.settings.as_deref())?;
    let host = settings.resolve_host(cli.host.as_deref());
    let port = settings.resolve_port(cli.port);
    let manifest = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST));

    debug!(
        host = %host,
        port,
        config = %manifest.display(),
        "Resolved options"
    );

    // Create client
    let client = client::DroneClient::new(&host, port, settings.timeout())?;
    let format = cli.output;

    // Execute command
    match cli.command {
        Commands::Version => info::version(&client, format).await,
        Commands::Apps => info::apps(&client, format).await,
        Commands::App { app_name } => info::app(&client, &app_name, format).await,
        Commands::Running => info::running(&client, format).await,
        Commands::Start => lifecycle::start(&client, &manifest, cli.verbose, format).await,
        Commands::Stop { app_name } => lifecycle::stop(&client, &app_name, format).await,
        Commands::Restart { app_name } => lifecycle::restart(&client, &app_name, format).await,
        Commands::Update => lifecycle::update(&client, &manifest, cli.verbose, format).await,
        Commands::Clean { app_name, yes } => {
            lifecycle::clean(
                &client,
                app_name.as_deref(),
                &manifest,
                yes,
                cli.verbose,
                format,
            )
            .await
        }
        Commands::Deploy(args) => {
            deploy::deploy(&client, args, cli.config.as_deref(), &settings, format).await
        }
        Commands::Pack(args) => deploy::pack(args).await,
        Commands::Config => {
            println!("Endpoint: {}", client.base_url());
            println!("Manifest: {}", manifest.display());
            match cli.settings.map(PathBuf::from).or_else(CliConfig::default_config_path) {
                Some(path) => println!("Settings: {}", path.display()),
                None => println!("Settings: (none)"),
            }
            println!("User: {}", settings.user.as_deref().unwrap_or("(unset)"));
            println!("Timeout: {}s", settings.timeout().as_secs());
            Ok(())
        }
    }
}
