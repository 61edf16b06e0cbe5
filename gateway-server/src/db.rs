use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // Create programs table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS programs (
            id UUID PRIMARY KEY,
            title VARCHAR(255) NOT NULL,
            description TEXT,
            entrypoint VARCHAR(255) NOT NULL,
            working_dir VARCHAR(255) NOT NULL DEFAULT './',
            version VARCHAR(255) NOT NULL DEFAULT '0.0.0',
            artifact VARCHAR(255) NOT NULL,
            dependencies TEXT[] NOT NULL DEFAULT '{}',
            env_vars JSONB NOT NULL DEFAULT '{}',
            arguments JSONB NOT NULL DEFAULT '{}',
            tags TEXT[] NOT NULL DEFAULT '{}',
            public BOOLEAN NOT NULL DEFAULT FALSE,
            owner TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Tables created with bounded columns are widened in place
    sqlx::query(
        "ALTER TABLE programs ALTER COLUMN description TYPE TEXT, ALTER COLUMN owner TYPE TEXT",
    )
    .execute(pool)
    .await?;

    // Listing walks newest first
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_programs_created_at ON programs(created_at DESC, id)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_programs_owner ON programs(owner)")
        .execute(pool)
        .await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}
