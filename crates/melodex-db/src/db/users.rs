//! User repository

use melodex_core::models::{DownloadRecord, User, UserRole};
use melodex_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an account. A duplicate email maps to a 400, not a 500.
    #[tracing::instrument(skip(self, password_hash), fields(db.table = "users", db.operation = "insert"))]
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User, AppError> {
        sqlx::query_as::<Postgres, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::BadRequest("Email already registered".to_string())
            }
            _ => AppError::Database(e),
        })
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(
            sqlx::query_as::<Postgres, User>("SELECT * FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(
            sqlx::query_as::<Postgres, User>("SELECT * FROM users WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn list_all(&self) -> Result<Vec<User>, AppError> {
        Ok(
            sqlx::query_as::<Postgres, User>("SELECT * FROM users ORDER BY created_at DESC, id")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    /// Partial profile update; `None` fields keep their current value.
    #[tracing::instrument(skip(self, password_hash), fields(db.table = "users", db.operation = "update"))]
    pub async fn update_profile(
        &self,
        id: Uuid,
        name: Option<&str>,
        email: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<Option<User>, AppError> {
        sqlx::query_as::<Postgres, User>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::BadRequest("Email already registered".to_string())
            }
            _ => AppError::Database(e),
        })
    }

    pub async fn set_role(&self, id: Uuid, role: UserRole) -> Result<Option<User>, AppError> {
        Ok(sqlx::query_as::<Postgres, User>(
            "UPDATE users SET role = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Delete an account. The user's tracks, wishlist, history, and
    /// playlists cascade at the database level.
    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "delete"))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_by_role(&self, role: UserRole) -> Result<i64, AppError> {
        Ok(
            sqlx::query_scalar::<Postgres, i64>("SELECT COUNT(*) FROM users WHERE role = $1")
                .bind(role)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    /// Add a track to the wishlist. Returns false when it was already there
    /// (the primary key makes this a no-op, not an error).
    pub async fn wishlist_add(&self, user_id: Uuid, track_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO wishlist_items (user_id, track_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, track_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(track_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove a track from the wishlist. Returns false if it was not there.
    pub async fn wishlist_remove(&self, user_id: Uuid, track_id: Uuid) -> Result<bool, AppError> {
        let result =
            sqlx::query("DELETE FROM wishlist_items WHERE user_id = $1 AND track_id = $2")
                .bind(user_id)
                .bind(track_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Append one download-history row. A single INSERT, so concurrent
    /// downloads by the same user never lose an entry.
    #[tracing::instrument(skip(self), fields(db.table = "download_history", db.operation = "insert"))]
    pub async fn history_append(&self, user_id: Uuid, track_id: Uuid) -> Result<(), AppError> {
        sqlx::query("INSERT INTO download_history (user_id, track_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(track_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Full download history for a user, newest first, joined with track
    /// metadata. Never deduplicated.
    pub async fn history_for_user(&self, user_id: Uuid) -> Result<Vec<DownloadRecord>, AppError> {
        Ok(sqlx::query_as::<Postgres, DownloadRecord>(
            r#"
            SELECT h.track_id, t.title, t.artist, t.category, t.cover_image_url, h.downloaded_at
            FROM download_history h
            JOIN tracks t ON t.id = h.track_id
            WHERE h.user_id = $1
            ORDER BY h.downloaded_at DESC, h.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }
}
