//! Repository Module
//!
//! Data access layer for the gateway.
//! [`ProgramRepository`] is the seam between the service layer and the
//! persistent store; Postgres is the production backend and the in-memory
//! backend serves development runs and tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use gateway_core::domain::program::Program;
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryProgramRepository;
pub use postgres::PgProgramRepository;

/// Repository error type
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt record {id}: {reason}")]
    Corrupt { id: Uuid, reason: String },
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Persistent store of Program records
///
/// Each call is atomic on its own: an insert either stores the whole record
/// or nothing, a delete either removes the record or leaves it untouched.
#[async_trait]
pub trait ProgramRepository: Send + Sync {
    /// Store a new program
    async fn insert(&self, program: &Program) -> Result<()>;

    /// Find a program by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Program>>;

    /// List programs newest first, skipping `offset` and returning at most `limit`
    async fn list_page(&self, offset: u64, limit: u64) -> Result<Vec<Program>>;

    /// Total number of stored programs
    async fn count(&self) -> Result<u64>;

    /// Delete a program by ID, returning whether a record was removed
    async fn delete(&self, id: Uuid) -> Result<bool>;
}
