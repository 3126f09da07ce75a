mod config;
mod demo;
mod ws_server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::DEFAULT_CONFIG_PATH;
use demo::Demo;
use std::path::PathBuf;
use timeline_sync::TimeMs;
use ws_server::ServerState;

#[derive(Parser)]
#[command(name = "backend")]
#[command(about = "Sync server for the browser timeline widget")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the WebSocket server timeline clients connect to
    Serve {
        #[arg(long, short, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Overrides `server.port` from the config file
        #[arg(long)]
        port: Option<u16>,
    },
    /// Validate a config file and print the effective settings
    CheckConfig {
        #[arg(long, short, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { config, port } => serve(config, port).await,
        Commands::CheckConfig { config } => check_config(config),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn serve(config_path: PathBuf, port: Option<u16>) -> Result<()> {
    let mut config = config::load_or_default(&config_path)?;
    if let Some(port) = port {
        config.server.port = port;
    }

    let demo = Demo::seeded(&config.demo, TimeMs::now());
    let state = ServerState::new(config, demo);
    ws_server::start_server(state).await
}

fn check_config(config_path: PathBuf) -> Result<()> {
    let config = config::load_config(&config_path)?;
    let demo = Demo::seeded(&config.demo, TimeMs::now());
    println!("{}: ok", config_path.display());
    println!("{:#?}", config);
    println!("demo schedule: {} items", demo.provider().len());
    Ok(())
}
