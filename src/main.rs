use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;

use toshl_cli::commands::{self, Command};
use toshl_cli::config::Config;
use toshl_cli::logging;
use toshl_cli::toshl::CachedToshlClient;

#[derive(Parser, Debug)]
#[command(name = "toshl")]
#[command(about = "Command line client for Toshl Finance")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/toshl-cli/config.yaml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Ignore any cached reference data
  #[arg(long, global = true)]
  force_refresh: bool,

  /// Print JSON instead of text
  #[arg(long, global = true)]
  json: bool,

  /// Mirror logs to stderr
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let mut config = Config::load(args.config.as_deref())?;

  // Command line flag wins over the config file
  if args.force_refresh {
    config.cache.force_refresh = true;
  }

  let _guard = logging::init(&config.log, args.verbose)?;
  tracing::debug!(?config, "configuration loaded");

  let client = CachedToshlClient::new(&config)?;

  let mut stdout = std::io::stdout().lock();
  commands::run(args.command, &client, args.json, &mut stdout).await
}
