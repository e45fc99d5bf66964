use clap::Parser;
use color_eyre::Result;
use payzenix::permissions::Role;
use payzenix::{app, config, logging};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "payzenix")]
#[command(about = "A terminal client for the PayZenix payroll and loans API")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/payzenix/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Role to act as, overriding the config file
  #[arg(short, long, value_enum)]
  role: Option<Role>,

  /// Tab to open on start
  #[arg(short, long, value_enum)]
  tab: Option<app::Tab>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let _log_guard = logging::init()?;

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;

  // Override role if specified on command line
  let config = if let Some(role) = args.role {
    config::Config { role, ..config }
  } else {
    config
  };

  // Initialize and run the app
  let mut app = app::App::new(config, args.tab)?;
  app.run().await?;

  Ok(())
}
