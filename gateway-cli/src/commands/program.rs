//! Program command handlers
//!
//! Handles all program-related CLI commands including upload,
//! listing, viewing, deletion, and artifact download.

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use colored::*;
use gateway_client::{ClientError, GatewayClient};
use gateway_core::artifact;
use gateway_core::dto::program::{CreateProgram, ProgramView};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::id_resolver::resolve_program_id;

/// Program subcommands
#[derive(Subcommand)]
pub enum ProgramCommands {
    /// Upload a program from a directory or a tar archive
    Upload {
        /// Directory to pack, or an existing tar archive
        path: PathBuf,

        /// Program title
        #[arg(short, long)]
        title: String,

        /// File to run inside the artifact
        #[arg(short, long)]
        entrypoint: String,

        /// Program description
        #[arg(short, long)]
        description: Option<String>,

        /// Working directory inside the artifact (server default: ./)
        #[arg(long)]
        working_dir: Option<String>,

        /// Program version (server default: 0.0.0)
        #[arg(long = "program-version")]
        program_version: Option<String>,

        /// Dependencies (comma-separated)
        #[arg(long = "dependency", value_delimiter = ',')]
        dependencies: Vec<String>,

        /// Environment variables as KEY=value pairs
        #[arg(long = "env", value_parser = parse_key_val)]
        env_vars: Vec<(String, String)>,

        /// Arguments as KEY=value pairs
        #[arg(long = "arg", value_parser = parse_key_val)]
        arguments: Vec<(String, String)>,

        /// Tags (comma-separated)
        #[arg(long = "tag", value_delimiter = ',')]
        tags: Vec<String>,

        /// Make the program public
        #[arg(long)]
        public: bool,
    },
    /// List programs
    List {
        /// Page to show; all programs are listed when omitted
        #[arg(short, long)]
        page: Option<u64>,
    },
    /// Get program details
    Get {
        /// Program ID or unambiguous prefix
        id: String,

        /// Print the raw JSON representation
        #[arg(long)]
        json: bool,
    },
    /// Delete a program
    Delete {
        /// Program ID or unambiguous prefix
        id: String,
    },
    /// Download the artifact of a program
    Download {
        /// Program ID or unambiguous prefix
        id: String,

        /// Output file (default: <id>.tar)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Parse a single key=value pair
fn parse_key_val(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("invalid KEY=value: no `=` found in `{}`", s))?;
    if key.is_empty() {
        bail!("invalid KEY=value: empty key in `{}`", s);
    }
    Ok((key.to_string(), value.to_string()))
}

/// Handle program commands
///
/// Routes program subcommands to their respective handlers.
pub async fn handle_program_command(command: ProgramCommands, config: &Config) -> Result<()> {
    let client = config.client();

    let result = match command {
        ProgramCommands::Upload {
            path,
            title,
            entrypoint,
            description,
            working_dir,
            program_version,
            dependencies,
            env_vars,
            arguments,
            tags,
            public,
        } => {
            let req = CreateProgram {
                title,
                description,
                entrypoint,
                working_dir,
                version: program_version,
                dependencies,
                env_vars: env_vars.into_iter().collect(),
                arguments: arguments.into_iter().collect(),
                tags,
                public,
            };
            upload_program(&client, &path, req).await
        }
        ProgramCommands::List { page } => list_programs(&client, page).await,
        ProgramCommands::Get { id, json } => get_program(&client, &id, json).await,
        ProgramCommands::Delete { id } => delete_program(&client, &id).await,
        ProgramCommands::Download { id, output } => download_artifact(&client, &id, output).await,
    };

    if let Err(err) = &result
        && let Some(ClientError::Validation(errors)) = err.downcast_ref::<ClientError>()
    {
        eprintln!("{}", "✗ The gateway rejected the program:".red().bold());
        for (field, messages) in errors.iter() {
            for message in messages {
                eprintln!("  {}: {}", field.yellow(), message);
            }
        }
    }

    result
}

/// Read the artifact to upload: a directory is packed, a file must already
/// be a tar archive.
fn load_artifact(path: &Path) -> Result<Vec<u8>> {
    if path.is_dir() {
        return artifact::pack_directory(path)
            .with_context(|| format!("Failed to pack directory: {}", path.display()));
    }

    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read artifact file: {}", path.display()))?;
    artifact::inspect(&data)
        .with_context(|| format!("{} is not a usable tar archive", path.display()))?;
    Ok(data)
}

/// Upload a new program
async fn upload_program(client: &GatewayClient, path: &Path, req: CreateProgram) -> Result<()> {
    let data = load_artifact(path)?;
    let size = data.len();

    let program = client.create_program(req, data).await?;

    println!("{}", "✓ Program uploaded successfully!".green().bold());
    println!("  ID:       {}", program.id.to_string().cyan());
    println!("  Title:    {}", program.title.bold());
    println!("  Version:  {}", program.version);
    println!("  Artifact: {} ({} bytes)", program.artifact.dimmed(), size);

    Ok(())
}

/// List programs
async fn list_programs(client: &GatewayClient, page: Option<u64>) -> Result<()> {
    let (programs, count) = match page {
        Some(page) => {
            let page = client.list_programs(Some(page)).await?;
            (page.results, page.count)
        }
        None => {
            let programs = client.list_all_programs().await?;
            let count = programs.len() as u64;
            (programs, count)
        }
    };

    if programs.is_empty() {
        println!("{}", "No programs found.".yellow());
    } else {
        println!(
            "{}",
            format!("Showing {} of {} program(s):", programs.len(), count).bold()
        );
        println!();
        for program in &programs {
            print_program_summary(program);
        }
    }

    Ok(())
}

/// Get and display a single program
async fn get_program(client: &GatewayClient, id: &str, json: bool) -> Result<()> {
    let uuid = resolve_program_id(client, id).await?;
    let program = client.get_program(uuid).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&program)?);
    } else {
        print_program_details(&program);
    }

    Ok(())
}

/// Delete a program
async fn delete_program(client: &GatewayClient, id: &str) -> Result<()> {
    let uuid = resolve_program_id(client, id).await?;

    client.delete_program(uuid).await?;

    println!(
        "{}",
        format!("✓ Program {} deleted successfully!", uuid)
            .green()
            .bold()
    );

    Ok(())
}

/// Download a program artifact to disk
async fn download_artifact(client: &GatewayClient, id: &str, output: Option<PathBuf>) -> Result<()> {
    let uuid = resolve_program_id(client, id).await?;
    let data = client.download_artifact(uuid).await?;

    let output = output.unwrap_or_else(|| PathBuf::from(format!("{}.tar", uuid)));
    std::fs::write(&output, &data)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "{}",
        format!("✓ Artifact saved to {} ({} bytes)", output.display(), data.len())
            .green()
            .bold()
    );

    Ok(())
}

/// Print a program summary
fn print_program_summary(program: &ProgramView) {
    println!("  {} {}", "▸".cyan(), program.title.bold());
    println!("    ID:      {}", program.id.to_string().dimmed());
    println!("    Version: {}", program.version.dimmed());
    println!("    Owner:   {}", program.owner.dimmed());
    println!(
        "    Created: {}",
        program
            .created
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    if !program.tags.is_empty() {
        println!("    Tags:    {}", program.tags.join(", ").dimmed());
    }
    println!();
}

/// Print detailed program information
fn print_program_details(program: &ProgramView) {
    println!("{}", "Program Details:".bold());
    println!("  ID:           {}", program.id.to_string().cyan());
    println!("  Title:        {}", program.title.bold());
    if let Some(desc) = &program.description {
        println!("  Description:  {}", desc);
    }
    println!("  Entrypoint:   {}", program.entrypoint);
    println!("  Working dir:  {}", program.working_dir);
    println!("  Version:      {}", program.version);
    println!("  Owner:        {}", program.owner);
    println!(
        "  Visibility:   {}",
        if program.public { "public" } else { "private" }
    );
    println!(
        "  Created:      {}",
        program.created.format("%Y-%m-%d %H:%M:%S")
    );
    println!("  Artifact:     {}", program.artifact);
    if !program.dependencies.is_empty() {
        println!("  Dependencies: {}", program.dependencies.join(", "));
    }
    if !program.tags.is_empty() {
        println!("  Tags:         {}", program.tags.join(", "));
    }
    print_mapping("Environment", &program.env_vars);
    print_mapping("Arguments", &program.arguments);
}

fn print_mapping(label: &str, values: &BTreeMap<String, String>) {
    if values.is_empty() {
        return;
    }
    println!("\n{}", format!("{}:", label).bold());
    for (key, value) in values {
        println!("  {}={}", key.cyan(), value);
    }
}
