//! Program Repository (Postgres)
//!
//! Handles all database operations related to programs.

use async_trait::async_trait;
use gateway_core::domain::program::Program;
use sqlx::PgPool;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::{ProgramRepository, RepositoryError, Result};

/// Postgres-backed program repository
#[derive(Debug, Clone)]
pub struct PgProgramRepository {
    pool: PgPool,
}

impl PgProgramRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProgramRepository for PgProgramRepository {
    async fn insert(&self, program: &Program) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO programs (
                id, title, description, entrypoint, working_dir, version, artifact,
                dependencies, env_vars, arguments, tags, public, owner, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(program.id)
        .bind(&program.title)
        .bind(&program.description)
        .bind(&program.entrypoint)
        .bind(&program.working_dir)
        .bind(&program.version)
        .bind(&program.artifact)
        .bind(&program.dependencies)
        .bind(sqlx::types::Json(&program.env_vars))
        .bind(sqlx::types::Json(&program.arguments))
        .bind(&program.tags)
        .bind(program.public)
        .bind(&program.owner)
        .bind(program.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Program>> {
        let row = sqlx::query_as::<_, ProgramRow>(
            r#"
            SELECT id, title, description, entrypoint, working_dir, version, artifact,
                   dependencies, env_vars, arguments, tags, public, owner, created_at
            FROM programs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Program::try_from).transpose()
    }

    async fn list_page(&self, offset: u64, limit: u64) -> Result<Vec<Program>> {
        let rows = sqlx::query_as::<_, ProgramRow>(
            r#"
            SELECT id, title, description, entrypoint, working_dir, version, artifact,
                   dependencies, env_vars, arguments, tags, public, owner, created_at
            FROM programs
            ORDER BY created_at DESC, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(to_i64(limit))
        .bind(to_i64(offset))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Program::try_from).collect()
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM programs")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM programs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct ProgramRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    entrypoint: String,
    working_dir: String,
    version: String,
    artifact: String,
    dependencies: Vec<String>,
    env_vars: serde_json::Value,
    arguments: serde_json::Value,
    tags: Vec<String>,
    public: bool,
    owner: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<ProgramRow> for Program {
    type Error = RepositoryError;

    fn try_from(row: ProgramRow) -> Result<Self> {
        let env_vars = decode_mapping(row.id, "env_vars", row.env_vars)?;
        let arguments = decode_mapping(row.id, "arguments", row.arguments)?;

        Ok(Program {
            id: row.id,
            title: row.title,
            description: row.description,
            entrypoint: row.entrypoint,
            working_dir: row.working_dir,
            version: row.version,
            artifact: row.artifact,
            dependencies: row.dependencies,
            env_vars,
            arguments,
            tags: row.tags,
            public: row.public,
            owner: row.owner,
            created_at: row.created_at,
        })
    }
}

fn decode_mapping(
    id: Uuid,
    column: &str,
    value: serde_json::Value,
) -> Result<BTreeMap<String, String>> {
    serde_json::from_value(value).map_err(|e| RepositoryError::Corrupt {
        id,
        reason: format!("{}: {}", column, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(env_vars: serde_json::Value) -> ProgramRow {
        ProgramRow {
            id: Uuid::new_v4(),
            title: "Awesome program".to_string(),
            description: None,
            entrypoint: "program.py".to_string(),
            working_dir: "./".to_string(),
            version: "0.0.1".to_string(),
            artifact: "programs/a.tar".to_string(),
            dependencies: vec!["requests".to_string()],
            env_vars,
            arguments: json!({}),
            tags: vec![],
            public: false,
            owner: "test_user".to_string(),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_row_conversion_decodes_mappings() {
        let program = Program::try_from(row(json!({"DEBUG": "true"}))).unwrap();
        assert_eq!(program.env_vars.get("DEBUG").map(String::as_str), Some("true"));
        assert_eq!(program.dependencies, vec!["requests".to_string()]);
    }

    #[test]
    fn test_row_conversion_reports_corrupt_mapping() {
        let result = Program::try_from(row(json!(["not", "a", "map"])));
        assert!(matches!(result, Err(RepositoryError::Corrupt { .. })));
    }

    #[test]
    fn test_to_i64_saturates() {
        assert_eq!(to_i64(5), 5);
        assert_eq!(to_i64(u64::MAX), i64::MAX);
    }
}
