use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::warn;

use super::repo_types::{NewUser, User};
use crate::{
    db::{self, StoreError, StoreResult, UniqueField},
    startup::SchemaTarget,
    validation::Page,
};

const SCHEMA: &[&str] = &[r#"
    CREATE TABLE IF NOT EXISTS users (
        id         BIGSERIAL PRIMARY KEY,
        username   VARCHAR(50) NOT NULL,
        email      VARCHAR(255) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT uq_users_username UNIQUE (username),
        CONSTRAINT uq_users_email UNIQUE (email)
    )
    "#];

/// Persistence for users. Users are never updated or deleted.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Rejects a taken username or email with [`StoreError::Conflict`].
    async fn create(&self, new: NewUser) -> StoreResult<User>;
    async fn get(&self, id: i64) -> StoreResult<User>;
    async fn list(&self, page: Page) -> StoreResult<Vec<User>>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

async fn column_taken(
    tx: &mut Transaction<'_, Postgres>,
    field: UniqueField,
    value: &str,
) -> Result<bool, sqlx::Error> {
    let sql = match field {
        UniqueField::Username => "SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)",
        UniqueField::Email => "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)",
    };
    sqlx::query_scalar::<_, bool>(sql)
        .bind(value)
        .fetch_one(&mut **tx)
        .await
}

fn constraint_field(constraint: &str) -> Option<UniqueField> {
    match constraint {
        "uq_users_username" => Some(UniqueField::Username),
        "uq_users_email" => Some(UniqueField::Email),
        _ => None,
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, new: NewUser) -> StoreResult<User> {
        let mut tx = self.db.begin().await?;

        // Check-then-insert: two concurrent registrations can both pass these
        // checks; the table constraints catch the loser below.
        if column_taken(&mut tx, UniqueField::Username, &new.username).await? {
            return Err(StoreError::Conflict(UniqueField::Username));
        }
        if column_taken(&mut tx, UniqueField::Email, &new.email).await? {
            return Err(StoreError::Conflict(UniqueField::Email));
        }

        let inserted = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email)
            VALUES ($1, $2)
            RETURNING id, username, email, created_at
            "#,
        )
        .bind(&new.username)
        .bind(&new.email)
        .fetch_one(&mut *tx)
        .await;

        let user = match inserted {
            Ok(user) => user,
            Err(e) => {
                if let Some(field) = db::unique_violation(&e).as_deref().and_then(constraint_field) {
                    warn!(field = field.as_str(), "lost registration race to a concurrent insert");
                    return Err(StoreError::Conflict(field));
                }
                return Err(e.into());
            }
        };
        tx.commit().await?;
        Ok(user)
    }

    async fn get(&self, id: i64) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn list(&self, page: Page) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, created_at
            FROM users
            ORDER BY id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl SchemaTarget for PgUserStore {
    async fn probe(&self) -> Result<(), sqlx::Error> {
        db::ping(&self.db).await
    }

    async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        db::apply_schema(&self.db, SCHEMA).await
    }
}
