//! Program Service
//!
//! Business logic for program management.

use bytes::Bytes;
use gateway_core::domain::program::Program;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::Principal;
use crate::repository::RepositoryError;
use crate::serializer::NewProgram;
use crate::state::AppState;
use crate::storage::StorageError;

/// Service error type
#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("program {0} not found")]
    NotFound(Uuid),

    #[error("page {0} is out of range")]
    InvalidPage(u64),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, ProgramError>;

/// One page of programs plus the position it was taken from
#[derive(Debug, Clone)]
pub struct Listing {
    pub count: u64,
    pub page: u64,
    pub page_size: u64,
    pub programs: Vec<Program>,
}

impl Listing {
    pub fn has_next(&self) -> bool {
        self.page.saturating_mul(self.page_size) < self.count
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Create a new program owned by `owner`
///
/// The artifact is stored first; if the record cannot be inserted the
/// artifact is removed again so a failed create leaves nothing behind.
pub async fn create_program(state: &AppState, owner: &Principal, req: NewProgram) -> Result<Program> {
    let id = Uuid::new_v4();
    let key = Program::artifact_key(id);
    let size = req.artifact.len();

    state.artifacts.put(&key, req.artifact).await?;

    let program = Program {
        id,
        title: req.title,
        description: req.description,
        entrypoint: req.entrypoint,
        working_dir: req.working_dir,
        version: req.version,
        artifact: key,
        dependencies: req.dependencies,
        env_vars: req.env_vars,
        arguments: req.arguments,
        tags: req.tags,
        public: req.public,
        owner: owner.username.clone(),
        created_at: chrono::Utc::now(),
    };

    if let Err(err) = state.programs.insert(&program).await {
        if let Err(cleanup) = state.artifacts.delete(&program.artifact).await {
            tracing::warn!(
                "Failed to remove artifact {} after aborted create: {}",
                program.artifact,
                cleanup
            );
        }
        return Err(err.into());
    }

    tracing::info!(
        "Program created: {} ({}) by {}, artifact {} bytes",
        program.title,
        program.id,
        program.owner,
        size
    );

    Ok(program)
}

/// Get a program by ID
pub async fn get_program(state: &AppState, id: Uuid) -> Result<Program> {
    let program = state
        .programs
        .find_by_id(id)
        .await?
        .ok_or(ProgramError::NotFound(id))?;

    Ok(program)
}

/// List one page of programs, newest first
///
/// `page` is 1-based. Page 1 is always valid, even when there are no
/// programs; any other page past the end is rejected.
pub async fn list_programs(state: &AppState, page: u64, page_size: u64) -> Result<Listing> {
    if page == 0 || page_size == 0 {
        return Err(ProgramError::InvalidPage(page));
    }

    let count = state.programs.count().await?;
    let offset = (page - 1).saturating_mul(page_size);

    if page > 1 && offset >= count {
        return Err(ProgramError::InvalidPage(page));
    }

    let programs = state.programs.list_page(offset, page_size).await?;

    Ok(Listing {
        count,
        page,
        page_size,
        programs,
    })
}

/// Delete a program and its artifact
pub async fn delete_program(state: &AppState, id: Uuid) -> Result<()> {
    let program = get_program(state, id).await?;

    let deleted = state.programs.delete(id).await?;
    if !deleted {
        return Err(ProgramError::NotFound(id));
    }

    match state.artifacts.delete(&program.artifact).await {
        Ok(()) | Err(StorageError::NotFound(_)) => {}
        Err(e) => tracing::warn!("Orphaned artifact {} for program {}: {}", program.artifact, id, e),
    }

    tracing::info!("Program deleted: {}", id);

    Ok(())
}

/// Fetch the stored artifact of a program
pub async fn get_artifact(state: &AppState, id: Uuid) -> Result<(Program, Bytes)> {
    let program = get_program(state, id).await?;
    let data = state.artifacts.get(&program.artifact).await?;
    Ok((program, data))
}
