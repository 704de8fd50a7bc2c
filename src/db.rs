use std::time::Duration;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;

use crate::config::AppConfig;

/// Unique columns of the users table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

impl UniqueField {
    pub fn as_str(self) -> &'static str {
        match self {
            UniqueField::Username => "username",
            UniqueField::Email => "email",
        }
    }

    pub fn conflict_message(self) -> &'static str {
        match self {
            UniqueField::Username => "Username already exists",
            UniqueField::Email => "Email already exists",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("{} already exists", .0.as_str())]
    Conflict(UniqueField),
    #[error(transparent)]
    Backend(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Builds the pool without opening a connection; the startup gate does that.
pub fn connect_lazy(config: &AppConfig) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect_lazy(&config.database_url)
        .context("parse DATABASE_URL")
}

/// Round-trip used as the readiness probe.
pub async fn ping(db: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(db).await?;
    Ok(())
}

/// Runs idempotent DDL statements in order.
pub async fn apply_schema(db: &PgPool, statements: &[&str]) -> Result<(), sqlx::Error> {
    for stmt in statements {
        tracing::debug!(sql = %stmt, "applying schema statement");
        sqlx::query(stmt).execute(db).await?;
    }
    Ok(())
}

/// Errors worth waiting out while the database is still coming up.
pub fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolTimedOut => true,
        // class 08: connection exception, 57P03: cannot_connect_now
        sqlx::Error::Database(db_err) => db_err
            .code()
            .map(|code| code.starts_with("08") || code == "57P03")
            .unwrap_or(false),
        _ => false,
    }
}

/// Name of the violated unique constraint, if `err` is a unique violation.
pub fn unique_violation(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            Some(db_err.constraint().unwrap_or_default().to_string())
        }
        _ => None,
    }
}
