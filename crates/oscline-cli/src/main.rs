//! oscline - Command-line tool for Open Sound Control
//!
//! Listen for OSC messages on a UDP port, or send one.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use oscline_core::{OscAddress, OscMessage};
use oscline_router::{OscClient, OscServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod args;
mod config;
mod listen;

/// oscline - Open Sound Control listener and sender
#[derive(Parser)]
#[command(name = "oscline")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path (TOML server config for `listen`)
    #[arg(short, long, global = true, env = "OSCLINE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print incoming OSC messages
    Listen {
        /// Bind address
        #[arg(short, long)]
        bind: Option<String>,

        /// UDP port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Only show messages matching these address patterns
        #[arg(short = 'm', long = "pattern")]
        patterns: Vec<String>,

        /// Print one JSON object per message
        #[arg(long)]
        json: bool,
    },

    /// Send one OSC message
    Send {
        /// Target host
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Target port
        #[arg(short, long, default_value_t = oscline_core::DEFAULT_PORT)]
        port: u16,

        /// OSC address, e.g. /synth/1/gain
        address: String,

        /// Arguments (i:1 h:1 f:0.5 d:0.5 s:text c:x T F N I, or bare values)
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Show version and protocol info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(&cli.log_level, cli.json_logs)?;

    // Handle Ctrl+C
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received shutdown signal");
                let _ = shutdown_tx.send(()).await;
            }
            Err(e) => warn!("Failed to listen for ctrl+c: {}", e),
        }
    });

    match cli.command {
        Commands::Listen {
            bind,
            port,
            patterns,
            json,
        } => {
            let mut server_config = match &cli.config {
                Some(path) => config::load(path)?,
                None => OscServerConfig::default(),
            };
            config::override_bind(&mut server_config, bind.as_deref(), port);

            if !json {
                println!(
                    "{} Starting OSC listener on {}",
                    "OSCLINE".cyan().bold(),
                    server_config.bind_addr
                );
            }
            listen::run_listen(server_config, patterns, json, &mut shutdown_rx).await?;
        }

        Commands::Send {
            host,
            port,
            address,
            args,
        } => {
            send_message(&host, port, &address, &args).await?;
        }

        Commands::Info => {
            print_info();
        }
    }

    Ok(())
}

fn setup_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("Failed to parse log level")?;

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).compact())
            .init();
    }

    Ok(())
}

async fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    tokio::net::lookup_host((host, port))
        .await
        .with_context(|| format!("Failed to resolve {}", host))?
        .next()
        .with_context(|| format!("No address found for {}", host))
}

async fn send_message(host: &str, port: u16, address: &str, raw_args: &[String]) -> Result<()> {
    let address = OscAddress::parse(address).with_context(|| format!("Invalid address {}", address))?;
    let mut message = OscMessage::new(address);
    message.arguments = args::parse_args(raw_args)?;

    let target = resolve(host, port).await?;
    let client = OscClient::connect(target).await?;
    let sent = client.send_message(message.clone()).await?;

    println!(
        "{} Sent {} {} ({} bytes) to {}",
        "OK".green().bold(),
        message.address.path().yellow(),
        message.type_tags(),
        sent,
        target
    );

    Ok(())
}

fn print_info() {
    println!("{}", "oscline - Open Sound Control toolkit".cyan().bold());
    println!();
    println!("Version:    {}", env!("CARGO_PKG_VERSION"));
    println!("Platform:   {}", std::env::consts::OS);
    println!("Arch:       {}", std::env::consts::ARCH);
    println!();
    println!("{}", "Protocol:".green());
    println!("  - OSC 1.0 over UDP (max {} byte datagrams)", oscline_core::MAX_DATAGRAM_SIZE);
    println!("  - Type tags: i f d s b t h c r T F N I");
    println!(
        "  - Bundles nested up to {} levels",
        oscline_core::packet::MAX_BUNDLE_DEPTH
    );
    println!("  - Patterns: ? * [abc] [a-z] [!x] {{foo,bar}}");
    println!();
    println!("{}", "Examples:".green());
    println!("  oscline listen --port 9000                      # Print everything");
    println!("  oscline listen --pattern '/synth/*/gain'        # Filter by pattern");
    println!("  oscline send --port 9000 /synth/1/gain f:0.5    # Send a float");
    println!("  oscline send /note 60 100 T                     # Inferred types");
}
