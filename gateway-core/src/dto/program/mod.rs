//! Program DTOs for client/server communication

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::domain::program::Program;

/// Program as rendered by the API
///
/// Mirrors the persisted [`Program`] except that `artifact` is the path the
/// archive can be downloaded from rather than the internal storage key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub entrypoint: String,
    pub working_dir: String,
    pub version: String,
    pub artifact: String,
    pub dependencies: Vec<String>,
    pub env_vars: BTreeMap<String, String>,
    pub arguments: BTreeMap<String, String>,
    pub tags: Vec<String>,
    pub public: bool,
    pub owner: String,
    pub created: chrono::DateTime<chrono::Utc>,
}

impl ProgramView {
    /// Render `program` for the API version mounted under `/{version}`.
    pub fn new(program: &Program, version: &str) -> Self {
        Self {
            id: program.id,
            title: program.title.clone(),
            description: program.description.clone(),
            entrypoint: program.entrypoint.clone(),
            working_dir: program.working_dir.clone(),
            version: program.version.clone(),
            artifact: format!("/{}/programs/{}/artifact/", version, program.id),
            dependencies: program.dependencies.clone(),
            env_vars: program.env_vars.clone(),
            arguments: program.arguments.clone(),
            tags: program.tags.clone(),
            public: program.public,
            owner: program.owner.clone(),
            created: program.created_at,
        }
    }
}

/// Request to create a new program
///
/// The artifact bytes travel next to this struct as the multipart file part.
/// `working_dir` and `version` fall back to server defaults when `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateProgram {
    pub title: String,
    pub description: Option<String>,
    pub entrypoint: String,
    pub working_dir: Option<String>,
    pub version: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub env_vars: BTreeMap<String, String>,
    #[serde(default)]
    pub arguments: BTreeMap<String, String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub public: bool,
}
