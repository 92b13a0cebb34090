//! Book instances (copies) collection

use async_trait::async_trait;
use sqlx::{postgres::PgRow, Row};
use uuid::Uuid;

use super::{BooksRepository, PgStore};
use crate::{
    error::AppResult,
    models::book_instance::{BookInstance, BookInstanceDetail, BookInstanceStatus, NewBookInstance},
};

#[async_trait]
pub trait BookInstancesRepository: Send + Sync {
    /// All copies with their book populated
    async fn list_populated(&self) -> AppResult<Vec<BookInstanceDetail>>;

    /// Copy with its book populated
    async fn find_populated(&self, id: Uuid) -> AppResult<Option<BookInstanceDetail>>;

    async fn find_by_book(&self, book_id: Uuid) -> AppResult<Vec<BookInstance>>;

    async fn count(&self) -> AppResult<i64>;

    async fn count_by_status(&self, status: BookInstanceStatus) -> AppResult<i64>;

    async fn save(&self, instance: &NewBookInstance) -> AppResult<BookInstance>;

    async fn remove(&self, id: Uuid) -> AppResult<bool>;
}

fn instance_from_row(row: &PgRow) -> AppResult<BookInstance> {
    let status: String = row.try_get("status")?;
    Ok(BookInstance {
        id: row.try_get("id")?,
        book_id: row.try_get("book_id")?,
        imprint: row.try_get("imprint")?,
        status: status.parse()?,
        due_back: row.try_get("due_back")?,
    })
}

impl PgStore {
    async fn populate_instances(&self, instances: Vec<BookInstance>) -> AppResult<Vec<BookInstanceDetail>> {
        let books = BooksRepository::list(self).await?;
        Ok(instances
            .into_iter()
            .map(|instance| {
                let book = books.iter().find(|b| b.id == instance.book_id).cloned();
                BookInstanceDetail { instance, book }
            })
            .collect())
    }
}

#[async_trait]
impl BookInstancesRepository for PgStore {
    async fn list_populated(&self) -> AppResult<Vec<BookInstanceDetail>> {
        let rows = sqlx::query("SELECT * FROM book_instances ORDER BY due_back, imprint")
            .fetch_all(&self.pool)
            .await?;
        let instances = rows.iter().map(instance_from_row).collect::<AppResult<Vec<_>>>()?;
        self.populate_instances(instances).await
    }

    async fn find_populated(&self, id: Uuid) -> AppResult<Option<BookInstanceDetail>> {
        let row = sqlx::query("SELECT * FROM book_instances WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let instance = instance_from_row(&row)?;
        let book = BooksRepository::find_by_id(self, instance.book_id).await?;
        Ok(Some(BookInstanceDetail { instance, book }))
    }

    async fn find_by_book(&self, book_id: Uuid) -> AppResult<Vec<BookInstance>> {
        let rows = sqlx::query("SELECT * FROM book_instances WHERE book_id = $1 ORDER BY due_back")
            .bind(book_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(instance_from_row).collect()
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_by_status(&self, status: BookInstanceStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = $1")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn save(&self, instance: &NewBookInstance) -> AppResult<BookInstance> {
        let row = sqlx::query(
            r#"
            INSERT INTO book_instances (id, book_id, imprint, status, due_back)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(instance.book_id)
        .bind(&instance.imprint)
        .bind(instance.status.as_str())
        .bind(instance.due_back)
        .fetch_one(&self.pool)
        .await?;
        instance_from_row(&row)
    }

    async fn remove(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM book_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
