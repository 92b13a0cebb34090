//! Books collection

use async_trait::async_trait;
use sqlx::{postgres::PgRow, Postgres, Row, Transaction};
use uuid::Uuid;

use super::{AuthorsRepository, GenresRepository, PgStore};
use crate::{
    error::AppResult,
    models::{
        author::Author,
        book::{Book, BookDetail, BookListing, NewBook},
    },
};

const BOOK_SELECT: &str = r#"
    SELECT b.id, b.title, b.summary, b.isbn, b.author_id,
           ARRAY(
               SELECT bg.genre_id FROM book_genres bg
               WHERE bg.book_id = b.id
               ORDER BY bg.position
           ) AS genre_ids
    FROM books b
"#;

#[async_trait]
pub trait BooksRepository: Send + Sync {
    /// All books with their author populated, ordered by title
    async fn list_populated(&self) -> AppResult<Vec<BookListing>>;

    /// All books, ordered by title
    async fn list(&self) -> AppResult<Vec<Book>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Book>>;

    /// Book with author and genres populated
    async fn find_populated(&self, id: Uuid) -> AppResult<Option<BookDetail>>;

    async fn find_by_author(&self, author_id: Uuid) -> AppResult<Vec<Book>>;

    async fn find_by_genre(&self, genre_id: Uuid) -> AppResult<Vec<Book>>;

    async fn count(&self) -> AppResult<i64>;

    async fn save(&self, book: &NewBook) -> AppResult<Book>;

    async fn replace(&self, id: Uuid, book: &NewBook) -> AppResult<Option<Book>>;

    async fn remove(&self, id: Uuid) -> AppResult<bool>;
}

impl PgStore {
    async fn insert_book_genres(
        tx: &mut Transaction<'_, Postgres>,
        book_id: Uuid,
        genre_ids: &[Uuid],
    ) -> AppResult<()> {
        for (position, genre_id) in genre_ids.iter().enumerate() {
            sqlx::query("INSERT INTO book_genres (book_id, genre_id, position) VALUES ($1, $2, $3)")
                .bind(book_id)
                .bind(genre_id)
                .bind(position as i32)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }
}

fn listing_from_row(row: &PgRow) -> AppResult<BookListing> {
    let author_id: Option<Uuid> = row.try_get("author_ref")?;
    let author = match author_id {
        Some(id) => Some(Author {
            id,
            first_name: row.try_get("first_name")?,
            family_name: row.try_get("family_name")?,
            date_of_birth: row.try_get("date_of_birth")?,
            date_of_death: row.try_get("date_of_death")?,
        }),
        None => None,
    };

    Ok(BookListing {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        author,
    })
}

#[async_trait]
impl BooksRepository for PgStore {
    async fn list_populated(&self) -> AppResult<Vec<BookListing>> {
        let rows = sqlx::query(
            r#"
            SELECT b.id, b.title, a.id AS author_ref, a.first_name, a.family_name,
                   a.date_of_birth, a.date_of_death
            FROM books b
            LEFT JOIN authors a ON a.id = b.author_id
            ORDER BY b.title
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(listing_from_row).collect()
    }

    async fn list(&self) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>(&format!("{} ORDER BY b.title", BOOK_SELECT))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, Book>(&format!("{} WHERE b.id = $1", BOOK_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_populated(&self, id: Uuid) -> AppResult<Option<BookDetail>> {
        let Some(book) = BooksRepository::find_by_id(self, id).await? else {
            return Ok(None);
        };

        let (author, genres) = tokio::try_join!(
            AuthorsRepository::find_by_id(self, book.author_id),
            GenresRepository::find_many(self, &book.genre_ids),
        )?;

        Ok(Some(BookDetail { book, author, genres }))
    }

    async fn find_by_author(&self, author_id: Uuid) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>(&format!(
            "{} WHERE b.author_id = $1 ORDER BY b.title",
            BOOK_SELECT
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_by_genre(&self, genre_id: Uuid) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>(&format!(
            r#"{}
            WHERE EXISTS (
                SELECT 1 FROM book_genres bg WHERE bg.book_id = b.id AND bg.genre_id = $1
            )
            ORDER BY b.title"#,
            BOOK_SELECT
        ))
        .bind(genre_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn save(&self, book: &NewBook) -> AppResult<Book> {
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO books (id, title, summary, isbn, author_id)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(&book.title)
        .bind(&book.summary)
        .bind(&book.isbn)
        .bind(book.author_id)
        .execute(&mut *tx)
        .await?;

        Self::insert_book_genres(&mut tx, id, &book.genre_ids).await?;
        tx.commit().await?;

        Ok(book.clone().into_book(id))
    }

    async fn replace(&self, id: Uuid, book: &NewBook) -> AppResult<Option<Book>> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = $2, summary = $3, isbn = $4, author_id = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&book.title)
        .bind(&book.summary)
        .bind(&book.isbn)
        .bind(book.author_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        Self::insert_book_genres(&mut tx, id, &book.genre_ids).await?;
        tx.commit().await?;

        Ok(Some(book.clone().into_book(id)))
    }

    async fn remove(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
