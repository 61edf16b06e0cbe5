//! ID resolver module
//!
//! Lets users name a program by a short, unambiguous prefix of its UUID
//! instead of the full identifier.

use anyhow::{Context, Result, anyhow};
use gateway_client::GatewayClient;
use uuid::Uuid;

/// Identifier that can be either a full UUID or an unambiguous prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdOrPrefix {
    Full(Uuid),
    Prefix(String),
}

impl IdOrPrefix {
    /// Parse as a full UUID first, otherwise keep the lowercased prefix.
    pub fn parse(input: &str) -> Self {
        match Uuid::parse_str(input) {
            Ok(uuid) => IdOrPrefix::Full(uuid),
            Err(_) => IdOrPrefix::Prefix(input.trim().to_lowercase()),
        }
    }
}

/// Resolve a program ID or prefix to a full UUID
///
/// A full UUID is returned as-is. A prefix is matched against every listed
/// program and must select exactly one.
pub async fn resolve_program_id(client: &GatewayClient, input: &str) -> Result<Uuid> {
    let prefix = match IdOrPrefix::parse(input) {
        IdOrPrefix::Full(uuid) => return Ok(uuid),
        IdOrPrefix::Prefix(prefix) => prefix,
    };

    if prefix.is_empty() {
        return Err(anyhow!("Program ID cannot be empty"));
    }

    let programs = client
        .list_all_programs()
        .await
        .context("Failed to fetch programs for ID resolution")?;

    match_prefix(&prefix, programs.iter().map(|p| p.id))
}

fn match_prefix(prefix: &str, ids: impl Iterator<Item = Uuid>) -> Result<Uuid> {
    let matches: Vec<Uuid> = ids
        .filter(|id| id.to_string().starts_with(prefix))
        .collect();

    match matches.as_slice() {
        [] => Err(anyhow!(
            "No program found with ID starting with '{}'",
            prefix
        )),
        [id] => Ok(*id),
        _ => {
            let ids: Vec<String> = matches.iter().map(Uuid::to_string).collect();
            Err(anyhow!(
                "Ambiguous prefix '{}' matches multiple programs: {}",
                prefix,
                ids.join(", ")
            ))
        }
    }
}
