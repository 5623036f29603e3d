//! Track repository
//!
//! All reads assemble a full [`Track`] (row + ordered variants). Variant
//! rows for listings are fetched in one batched query to avoid N+1.

use crate::db::transaction::TransactionGuard;
use melodex_core::models::{Category, Track, TrackRow, TrackSort, TrackVariant, VariantType};
use melodex_core::AppError;
use sqlx::{PgPool, Postgres};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone)]
pub struct TrackRepository {
    pool: PgPool,
}

impl TrackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a track and its variant rows in one transaction.
    #[tracing::instrument(skip(self, variants), fields(db.table = "tracks", db.operation = "insert"))]
    pub async fn create(
        &self,
        owner_id: Uuid,
        title: &str,
        artist: &str,
        category: Category,
        cover_image_url: &str,
        variants: &[(VariantType, String)],
    ) -> Result<Track, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let row: TrackRow = sqlx::query_as::<Postgres, TrackRow>(
            r#"
            INSERT INTO tracks (title, artist, category, cover_image_url, owner_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(artist)
        .bind(category)
        .bind(cover_image_url)
        .bind(owner_id)
        .fetch_one(&mut **tx)
        .await?;

        for (variant_type, url) in variants {
            sqlx::query(
                "INSERT INTO track_variants (track_id, variant_type, url) VALUES ($1, $2, $3)",
            )
            .bind(row.id)
            .bind(variant_type)
            .bind(url)
            .execute(&mut **tx)
            .await?;
        }

        tx.commit().await?;
        self.get(row.id)
            .await?
            .ok_or_else(|| AppError::Internal("Track vanished after insert".to_string()))
    }

    /// Fetch a full track by id.
    pub async fn get(&self, id: Uuid) -> Result<Option<Track>, AppError> {
        let row: Option<TrackRow> =
            sqlx::query_as::<Postgres, TrackRow>("SELECT * FROM tracks WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(row) = row else { return Ok(None) };
        let variants = self.variants_for(row.id).await?;
        Ok(Some(Track::from_row(row, variants)))
    }

    /// Fetch only the `tracks` row (ownership checks, counters).
    pub async fn get_row(&self, id: Uuid) -> Result<Option<TrackRow>, AppError> {
        Ok(
            sqlx::query_as::<Postgres, TrackRow>("SELECT * FROM tracks WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    /// List tracks with an optional category filter and deterministic sort.
    /// `Category::All` (or no filter) matches every track.
    #[tracing::instrument(skip(self), fields(db.table = "tracks", db.operation = "select"))]
    pub async fn list(
        &self,
        category: Option<Category>,
        sort: TrackSort,
    ) -> Result<Vec<Track>, AppError> {
        let filter = category.filter(|c| *c != Category::All);

        // Sort clause comes from a closed enum, never from user input.
        let rows: Vec<TrackRow> = match filter {
            Some(cat) => {
                let sql = format!(
                    "SELECT * FROM tracks WHERE category = $1 ORDER BY {}",
                    sort.order_by()
                );
                sqlx::query_as::<Postgres, TrackRow>(&sql)
                    .bind(cat)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("SELECT * FROM tracks ORDER BY {}", sort.order_by());
                sqlx::query_as::<Postgres, TrackRow>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        self.assemble(rows).await
    }

    /// Tracks owned by one user, newest first.
    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Track>, AppError> {
        let rows: Vec<TrackRow> = sqlx::query_as::<Postgres, TrackRow>(
            "SELECT * FROM tracks WHERE owner_id = $1 ORDER BY created_at DESC, id",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        self.assemble(rows).await
    }

    /// Tracks on a user's wishlist, most recently added first.
    pub async fn list_wishlist(&self, user_id: Uuid) -> Result<Vec<Track>, AppError> {
        let rows: Vec<TrackRow> = sqlx::query_as::<Postgres, TrackRow>(
            r#"
            SELECT t.* FROM tracks t
            JOIN wishlist_items w ON w.track_id = t.id
            WHERE w.user_id = $1
            ORDER BY w.added_at DESC, t.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        self.assemble(rows).await
    }

    /// Distinct tracks a user has downloaded (admin user-details view).
    pub async fn list_downloaded(&self, user_id: Uuid) -> Result<Vec<Track>, AppError> {
        let rows: Vec<TrackRow> = sqlx::query_as::<Postgres, TrackRow>(
            r#"
            SELECT DISTINCT t.* FROM tracks t
            JOIN download_history h ON h.track_id = t.id
            WHERE h.user_id = $1
            ORDER BY t.created_at DESC, t.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        self.assemble(rows).await
    }

    /// Partial update of track fields plus variant upserts, in one
    /// transaction. `None` fields keep their current value; each supplied
    /// variant replaces the existing row for its type or adds a new one.
    #[tracing::instrument(skip(self, variants), fields(db.table = "tracks", db.operation = "update"))]
    pub async fn update(
        &self,
        id: Uuid,
        title: Option<&str>,
        artist: Option<&str>,
        category: Option<Category>,
        cover_image_url: Option<&str>,
        variants: &[(VariantType, String)],
    ) -> Result<Option<Track>, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let updated = sqlx::query(
            r#"
            UPDATE tracks SET
                title = COALESCE($2, title),
                artist = COALESCE($3, artist),
                category = COALESCE($4, category),
                cover_image_url = COALESCE($5, cover_image_url),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(artist)
        .bind(category)
        .bind(cover_image_url)
        .execute(&mut **tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        for (variant_type, url) in variants {
            sqlx::query(
                r#"
                INSERT INTO track_variants (track_id, variant_type, url)
                VALUES ($1, $2, $3)
                ON CONFLICT (track_id, variant_type) DO UPDATE SET url = EXCLUDED.url
                "#,
            )
            .bind(id)
            .bind(variant_type)
            .bind(url)
            .execute(&mut **tx)
            .await?;
        }

        tx.commit().await?;
        self.get(id).await
    }

    /// Delete a track; variant rows cascade. Returns false if absent.
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tracks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// URL of one variant, if the track and variant exist.
    pub async fn variant_url(
        &self,
        track_id: Uuid,
        variant_type: VariantType,
    ) -> Result<Option<String>, AppError> {
        Ok(sqlx::query_scalar::<Postgres, String>(
            "SELECT url FROM track_variants WHERE track_id = $1 AND variant_type = $2",
        )
        .bind(track_id)
        .bind(variant_type)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Atomic counter bump. Concurrent downloads of the same track never
    /// lose an increment. Returns false if the track is gone.
    #[tracing::instrument(skip(self), fields(db.table = "tracks", db.operation = "update"))]
    pub async fn increment_download_count(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE tracks SET download_count = download_count + 1, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_all(&self) -> Result<i64, AppError> {
        Ok(
            sqlx::query_scalar::<Postgres, i64>("SELECT COUNT(*) FROM tracks")
                .fetch_one(&self.pool)
                .await?,
        )
    }

    pub async fn total_downloads(&self) -> Result<i64, AppError> {
        Ok(sqlx::query_scalar::<Postgres, i64>(
            "SELECT COALESCE(SUM(download_count), 0)::BIGINT FROM tracks",
        )
        .fetch_one(&self.pool)
        .await?)
    }

    pub async fn count_by_owner(&self, owner_id: Uuid) -> Result<i64, AppError> {
        Ok(
            sqlx::query_scalar::<Postgres, i64>("SELECT COUNT(*) FROM tracks WHERE owner_id = $1")
                .bind(owner_id)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    pub async fn total_downloads_by_owner(&self, owner_id: Uuid) -> Result<i64, AppError> {
        Ok(sqlx::query_scalar::<Postgres, i64>(
            "SELECT COALESCE(SUM(download_count), 0)::BIGINT FROM tracks WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?)
    }

    /// Variants for one track, in response order (full, vocal, instrumental).
    async fn variants_for(&self, track_id: Uuid) -> Result<Vec<TrackVariant>, AppError> {
        Ok(sqlx::query_as::<Postgres, TrackVariant>(
            r#"
            SELECT variant_type, url FROM track_variants
            WHERE track_id = $1
            ORDER BY variant_type
            "#,
        )
        .bind(track_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Assemble full tracks from rows with one batched variant query.
    async fn assemble(&self, rows: Vec<TrackRow>) -> Result<Vec<Track>, AppError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let variant_rows: Vec<(Uuid, TrackVariant)> = sqlx::query_as::<
            Postgres,
            (Uuid, VariantType, String),
        >(
            r#"
            SELECT track_id, variant_type, url FROM track_variants
            WHERE track_id = ANY($1)
            ORDER BY track_id, variant_type
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|(track_id, variant_type, url)| (track_id, TrackVariant { variant_type, url }))
        .collect();

        let mut by_track: HashMap<Uuid, Vec<TrackVariant>> = HashMap::new();
        for (track_id, variant) in variant_rows {
            by_track.entry(track_id).or_default().push(variant);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let variants = by_track.remove(&row.id).unwrap_or_default();
                Track::from_row(row, variants)
            })
            .collect())
    }
}
