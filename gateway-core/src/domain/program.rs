//! Program domain types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Working directory used when a submission does not name one.
pub const DEFAULT_WORKING_DIR: &str = "./";

/// Version used when a submission does not name one.
pub const DEFAULT_VERSION: &str = "0.0.0";

/// Program definition
///
/// A user-submitted executable artifact plus the metadata needed to run it.
/// Structure shared between server (persists) and client (displays).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub entrypoint: String,
    pub working_dir: String,
    pub version: String,
    /// Storage key of the uploaded tar archive
    pub artifact: String,
    pub dependencies: Vec<String>,
    pub env_vars: BTreeMap<String, String>,
    pub arguments: BTreeMap<String, String>,
    pub tags: Vec<String>,
    pub public: bool,
    /// Username of the principal that created the program
    pub owner: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Program {
    /// Storage key under which the artifact of program `id` is kept.
    pub fn artifact_key(id: Uuid) -> String {
        format!("programs/{}.tar", id)
    }
}
