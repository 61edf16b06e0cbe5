//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod program;

pub use program::ProgramCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Program management
    Program {
        #[command(subcommand)]
        command: ProgramCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Program { command } => program::handle_program_command(command, config).await,
    }
}
