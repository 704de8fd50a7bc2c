use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{NewNote, Note, NotePatch};
use crate::{
    db::{self, StoreError, StoreResult},
    startup::SchemaTarget,
    validation::Page,
};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS notes (
        id         BIGSERIAL PRIMARY KEY,
        title      VARCHAR(255) NOT NULL,
        content    TEXT NOT NULL,
        user_id    BIGINT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ
    )
    "#,
    "CREATE INDEX IF NOT EXISTS ix_notes_user_id ON notes (user_id)",
    // title lookups are not served by any route; kept for the existing schema
    "CREATE INDEX IF NOT EXISTS ix_notes_title ON notes (title)",
];

/// Persistence for notes. Every call is self-contained; no state outlives it.
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn create(&self, new: NewNote) -> StoreResult<Note>;
    async fn get(&self, id: i64) -> StoreResult<Note>;
    /// Notes of one user in insertion order.
    async fn list(&self, user_id: i64, page: Page) -> StoreResult<Vec<Note>>;
    async fn update(&self, id: i64, patch: NotePatch) -> StoreResult<Note>;
    async fn delete(&self, id: i64) -> StoreResult<()>;
}

#[derive(Clone)]
pub struct PgNoteStore {
    db: PgPool,
}

impl PgNoteStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NoteStore for PgNoteStore {
    async fn create(&self, new: NewNote) -> StoreResult<Note> {
        let mut tx = self.db.begin().await?;
        let note = sqlx::query_as::<_, Note>(
            r#"
            INSERT INTO notes (title, content, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, content, user_id, created_at, updated_at
            "#,
        )
        .bind(&new.title)
        .bind(&new.content)
        .bind(new.user_id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(note)
    }

    async fn get(&self, id: i64) -> StoreResult<Note> {
        sqlx::query_as::<_, Note>(
            r#"
            SELECT id, title, content, user_id, created_at, updated_at
            FROM notes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn list(&self, user_id: i64, page: Page) -> StoreResult<Vec<Note>> {
        let rows = sqlx::query_as::<_, Note>(
            r#"
            SELECT id, title, content, user_id, created_at, updated_at
            FROM notes
            WHERE user_id = $1
            ORDER BY id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn update(&self, id: i64, patch: NotePatch) -> StoreResult<Note> {
        // A missing row drops `tx` unused, which rolls it back.
        let mut tx = self.db.begin().await?;
        let note = sqlx::query_as::<_, Note>(
            r#"
            UPDATE notes
            SET title      = COALESCE($2, title),
                content    = COALESCE($3, content),
                updated_at = now()
            WHERE id = $1
            RETURNING id, title, content, user_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(patch.title)
        .bind(patch.content)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound)?;
        tx.commit().await?;
        Ok(note)
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let mut tx = self.db.begin().await?;
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl SchemaTarget for PgNoteStore {
    async fn probe(&self) -> Result<(), sqlx::Error> {
        db::ping(&self.db).await
    }

    async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        db::apply_schema(&self.db, SCHEMA).await
    }
}
