//! Genres collection

use async_trait::async_trait;
use uuid::Uuid;

use super::PgStore;
use crate::{
    error::AppResult,
    models::genre::{Genre, NewGenre},
};

#[async_trait]
pub trait GenresRepository: Send + Sync {
    /// All genres, ordered by name
    async fn list(&self) -> AppResult<Vec<Genre>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Genre>>;

    /// First genre with exactly this name
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Genre>>;

    /// Genres among `ids` that exist, in the order of `ids`
    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Genre>>;

    async fn count(&self) -> AppResult<i64>;

    async fn save(&self, genre: &NewGenre) -> AppResult<Genre>;

    async fn remove(&self, id: Uuid) -> AppResult<bool>;
}

#[async_trait]
impl GenresRepository for PgStore {
    async fn list(&self) -> AppResult<Vec<Genre>> {
        let rows = sqlx::query_as::<_, Genre>("SELECT * FROM genres ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Genre>> {
        let row = sqlx::query_as::<_, Genre>("SELECT * FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Genre>> {
        let row = sqlx::query_as::<_, Genre>("SELECT * FROM genres WHERE name = $1 LIMIT 1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Genre>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, Genre>(
            r#"
            SELECT g.id, g.name
            FROM unnest($1::uuid[]) WITH ORDINALITY AS wanted(id, position)
            JOIN genres g ON g.id = wanted.id
            ORDER BY wanted.position
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM genres")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn save(&self, genre: &NewGenre) -> AppResult<Genre> {
        let row = sqlx::query_as::<_, Genre>("INSERT INTO genres (id, name) VALUES ($1, $2) RETURNING *")
            .bind(Uuid::new_v4())
            .bind(&genre.name)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn remove(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM genres WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
