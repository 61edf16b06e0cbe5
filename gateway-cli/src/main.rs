//! Program Gateway CLI
//!
//! Command-line interface for uploading and managing programs on a gateway.

mod commands;
mod config;
mod id_resolver;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "gateway")]
#[command(about = "Program Gateway CLI", long_about = None)]
struct Cli {
    /// Gateway URL
    #[arg(long, env = "GATEWAY_URL", default_value = "http://localhost:8080")]
    url: String,

    /// API token used for uploads and deletes
    #[arg(long, env = "GATEWAY_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        gateway_url: cli.url,
        token: cli.token,
    };

    handle_command(cli.command, &config).await
}
