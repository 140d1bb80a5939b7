mod core;
mod web;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::net::IpAddr;
use tracing_subscriber::EnvFilter;

use crate::core::config::{self, Settings};
use crate::core::roulette::{self, Mode, Outcome};

#[derive(Parser)]
#[command(
    name = "roulette",
    version,
    about = "Shuffle or pick names, optionally stable for the day"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve {
        /// Address to bind (overrides roulette.bind)
        #[arg(long)]
        bind: Option<IpAddr>,
        /// Port to listen on (overrides roulette.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Shuffle a list of names
    Shuffle(SpinArgs),

    /// Pick one name from a list
    Pick(SpinArgs),

    /// Read or change configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args)]
struct SpinArgs {
    /// Names separated by ',' or ';'
    names: String,
    /// Same result for everyone until midnight
    #[arg(short, long)]
    today: bool,
    /// Pretend it is this instant (RFC 3339)
    #[arg(long)]
    at: Option<String>,
    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// List all values in the config file
    #[command(alias = "ls")]
    List,
    /// Print one value
    Get { key: String },
    /// Set a value
    Set { key: String, value: String },
    /// Remove a value
    #[command(alias = "rm")]
    Unset { key: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => cmd_serve(None, None)?,
        Some(Commands::Serve { bind, port }) => cmd_serve(bind, port)?,
        Some(Commands::Shuffle(args)) => cmd_spin(false, &args)?,
        Some(Commands::Pick(args)) => cmd_spin(true, &args)?,
        Some(Commands::Config { action }) => cmd_config(action)?,
    }

    Ok(())
}

fn cmd_serve(bind: Option<IpAddr>, port: Option<u16>) -> Result<()> {
    init_tracing();

    let mut settings = Settings::load()?;
    if let Some(bind) = bind {
        settings.bind = bind;
    }
    if let Some(port) = port {
        settings.port = port;
    }

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(web::serve(settings))
}

fn cmd_spin(pick: bool, args: &SpinArgs) -> Result<()> {
    let day_offset = config::day_offset()?;
    let mode = Mode::from_flags(pick, args.today);
    let now = match &args.at {
        Some(at) => DateTime::parse_from_rfc3339(at)
            .with_context(|| format!("invalid --at '{}': expected RFC 3339", at))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let outcome = roulette::spin(&args.names, mode, now, day_offset)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }
    match outcome {
        Outcome::Shuffled { names, .. } => {
            for (i, name) in names.iter().enumerate() {
                println!("{:>3}. {}", i + 1, name);
            }
        }
        Outcome::Picked { name, .. } => println!("{}", name),
    }
    Ok(())
}

fn cmd_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::List => {
            let values = config::list();
            if values.is_empty() {
                println!("No config values. Set one with: roulette config set <key> <value>");
                return Ok(());
            }
            let mut keys: Vec<&String> = values.keys().collect();
            keys.sort();
            for key in keys {
                println!("{} = {}", key, values[key]);
            }
        }
        ConfigAction::Get { key } => {
            let value = config::get(&key).ok_or_else(|| anyhow::anyhow!("'{}' is not set", key))?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            config::validate(&key, &value)?;
            config::set(&key, &value)?;
            println!("Set {} = {}", key, value);
        }
        ConfigAction::Unset { key } => {
            config::unset(&key)?;
            println!("Unset {}", key);
        }
    }
    Ok(())
}

/// Initialize tracing from `RUST_LOG`, defaulting to info.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
