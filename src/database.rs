use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password;
use crate::config::{AdminSeed, Config};
use crate::error::AppResult;

pub type Database = PgPool;

pub async fn create_database_connection(config: &Config) -> Result<Database, sqlx::Error> {
    // Postgres aborts a stalled statement on its own; the client side is
    // bounded by `with_timeout` and the pool's acquire timeout.
    let options = PgConnectOptions::from_str(&config.database_url)?.options([(
        "statement_timeout",
        config.store_timeout.as_millis().to_string(),
    )]);

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.store_timeout)
        .connect_with(options)
        .await?;

    tracing::info!("Database connected successfully");
    Ok(pool)
}

pub async fn run_migrations(pool: &Database) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Migrations executed successfully");
    Ok(())
}

/// Runs one store call under `limit`; an expired call becomes an internal
/// error instead of hanging the request.
pub async fn with_timeout<T, F>(limit: Duration, call: F) -> AppResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    Ok(tokio::time::timeout(limit, call).await??)
}

/// Creates the configured admin account (active) if the username is free.
pub async fn ensure_admin(pool: &Database, seed: &AdminSeed) -> AppResult<()> {
    let password_hash = password::hash_password(&seed.password)?;

    let inserted = sqlx::query(
        r#"INSERT INTO users (id, username, email, password_hash, role, status)
           VALUES ($1, $2, $3, $4, 'admin', 'active')
           ON CONFLICT DO NOTHING"#,
    )
    .bind(Uuid::new_v4())
    .bind(&seed.username)
    .bind(&seed.email)
    .bind(&password_hash)
    .execute(pool)
    .await?;

    if inserted.rows_affected() > 0 {
        tracing::info!(username = %seed.username, "Admin account created");
    }
    Ok(())
}
