//! In-memory store
//!
//! Keeps every collection in process-local maps behind one `RwLock`. Used by
//! the test suites and by `store.backend = "memory"`; data does not survive
//! a restart.

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AuthorsRepository, BookInstancesRepository, BooksRepository, GenresRepository};
use crate::{
    error::AppResult,
    models::{
        Author, Book, BookDetail, BookInstance, BookInstanceDetail, BookInstanceStatus, BookListing, Genre,
        NewAuthor, NewBook, NewBookInstance, NewGenre,
    },
};

#[derive(Debug, Default)]
struct Collections {
    authors: IndexMap<Uuid, Author>,
    genres: IndexMap<Uuid, Genre>,
    books: IndexMap<Uuid, Book>,
    book_instances: IndexMap<Uuid, BookInstance>,
}

impl Collections {
    fn books_where(&self, predicate: impl Fn(&Book) -> bool) -> Vec<Book> {
        let mut books: Vec<Book> = self.books.values().filter(|b| predicate(b)).cloned().collect();
        books.sort_by(|a, b| a.title.cmp(&b.title));
        books
    }

    fn populate_instance(&self, instance: &BookInstance) -> BookInstanceDetail {
        BookInstanceDetail {
            instance: instance.clone(),
            book: self.books.get(&instance.book_id).cloned(),
        }
    }
}

/// Thread-safe in-memory implementation of every collection trait
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthorsRepository for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Author>> {
        let data = self.inner.read().await;
        let mut authors: Vec<Author> = data.authors.values().cloned().collect();
        authors.sort_by(|a, b| {
            a.family_name
                .cmp(&b.family_name)
                .then_with(|| a.first_name.cmp(&b.first_name))
        });
        Ok(authors)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Author>> {
        Ok(self.inner.read().await.authors.get(&id).cloned())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.inner.read().await.authors.len() as i64)
    }

    async fn save(&self, author: &NewAuthor) -> AppResult<Author> {
        let author = author.clone().into_author(Uuid::new_v4());
        self.inner.write().await.authors.insert(author.id, author.clone());
        Ok(author)
    }

    async fn replace(&self, id: Uuid, author: &NewAuthor) -> AppResult<Option<Author>> {
        let mut data = self.inner.write().await;
        match data.authors.get_mut(&id) {
            Some(existing) => {
                *existing = author.clone().into_author(id);
                Ok(Some(existing.clone()))
            }
            None => Ok(None),
        }
    }

    async fn remove(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.inner.write().await.authors.shift_remove(&id).is_some())
    }
}

#[async_trait]
impl GenresRepository for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Genre>> {
        let data = self.inner.read().await;
        let mut genres: Vec<Genre> = data.genres.values().cloned().collect();
        genres.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(genres)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Genre>> {
        Ok(self.inner.read().await.genres.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Genre>> {
        let data = self.inner.read().await;
        Ok(data.genres.values().find(|g| g.name == name).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Genre>> {
        let data = self.inner.read().await;
        Ok(ids.iter().filter_map(|id| data.genres.get(id).cloned()).collect())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.inner.read().await.genres.len() as i64)
    }

    async fn save(&self, genre: &NewGenre) -> AppResult<Genre> {
        let genre = genre.clone().into_genre(Uuid::new_v4());
        self.inner.write().await.genres.insert(genre.id, genre.clone());
        Ok(genre)
    }

    async fn remove(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.inner.write().await.genres.shift_remove(&id).is_some())
    }
}

#[async_trait]
impl BooksRepository for MemoryStore {
    async fn list_populated(&self) -> AppResult<Vec<BookListing>> {
        let data = self.inner.read().await;
        Ok(data
            .books_where(|_| true)
            .into_iter()
            .map(|book| BookListing {
                author: data.authors.get(&book.author_id).cloned(),
                id: book.id,
                title: book.title,
            })
            .collect())
    }

    async fn list(&self) -> AppResult<Vec<Book>> {
        Ok(self.inner.read().await.books_where(|_| true))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Book>> {
        Ok(self.inner.read().await.books.get(&id).cloned())
    }

    async fn find_populated(&self, id: Uuid) -> AppResult<Option<BookDetail>> {
        let data = self.inner.read().await;
        Ok(data.books.get(&id).map(|book| BookDetail {
            author: data.authors.get(&book.author_id).cloned(),
            genres: book
                .genre_ids
                .iter()
                .filter_map(|id| data.genres.get(id).cloned())
                .collect(),
            book: book.clone(),
        }))
    }

    async fn find_by_author(&self, author_id: Uuid) -> AppResult<Vec<Book>> {
        Ok(self.inner.read().await.books_where(|b| b.author_id == author_id))
    }

    async fn find_by_genre(&self, genre_id: Uuid) -> AppResult<Vec<Book>> {
        Ok(self.inner.read().await.books_where(|b| b.genre_ids.contains(&genre_id)))
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.inner.read().await.books.len() as i64)
    }

    async fn save(&self, book: &NewBook) -> AppResult<Book> {
        let book = book.clone().into_book(Uuid::new_v4());
        self.inner.write().await.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn replace(&self, id: Uuid, book: &NewBook) -> AppResult<Option<Book>> {
        let mut data = self.inner.write().await;
        match data.books.get_mut(&id) {
            Some(existing) => {
                *existing = book.clone().into_book(id);
                Ok(Some(existing.clone()))
            }
            None => Ok(None),
        }
    }

    async fn remove(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.inner.write().await.books.shift_remove(&id).is_some())
    }
}

#[async_trait]
impl BookInstancesRepository for MemoryStore {
    async fn list_populated(&self) -> AppResult<Vec<BookInstanceDetail>> {
        let data = self.inner.read().await;
        let mut instances: Vec<&BookInstance> = data.book_instances.values().collect();
        instances.sort_by(|a, b| a.due_back.cmp(&b.due_back).then_with(|| a.imprint.cmp(&b.imprint)));
        Ok(instances
            .into_iter()
            .map(|instance| data.populate_instance(instance))
            .collect())
    }

    async fn find_populated(&self, id: Uuid) -> AppResult<Option<BookInstanceDetail>> {
        let data = self.inner.read().await;
        Ok(data.book_instances.get(&id).map(|instance| data.populate_instance(instance)))
    }

    async fn find_by_book(&self, book_id: Uuid) -> AppResult<Vec<BookInstance>> {
        let data = self.inner.read().await;
        Ok(data
            .book_instances
            .values()
            .filter(|instance| instance.book_id == book_id)
            .cloned()
            .collect())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.inner.read().await.book_instances.len() as i64)
    }

    async fn count_by_status(&self, status: BookInstanceStatus) -> AppResult<i64> {
        let data = self.inner.read().await;
        Ok(data.book_instances.values().filter(|i| i.status == status).count() as i64)
    }

    async fn save(&self, instance: &NewBookInstance) -> AppResult<BookInstance> {
        let instance = instance.clone().into_instance(Uuid::new_v4());
        self.inner
            .write()
            .await
            .book_instances
            .insert(instance.id, instance.clone());
        Ok(instance)
    }

    async fn remove(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.inner.write().await.book_instances.shift_remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_populate_resolves_references() {
        let store = MemoryStore::new();
        let author = AuthorsRepository::save(
            &store,
            &NewAuthor {
                first_name: "Ursula".to_string(),
                family_name: "LeGuin".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let genre = GenresRepository::save(&store, &NewGenre { name: "Fantasy".to_string() })
            .await
            .unwrap();
        let book = BooksRepository::save(
            &store,
            &NewBook {
                title: "A Wizard of Earthsea".to_string(),
                summary: "Ged".to_string(),
                isbn: "9780547773742".to_string(),
                author_id: author.id,
                genre_ids: vec![genre.id, Uuid::new_v4()],
            },
        )
        .await
        .unwrap();

        let detail = BooksRepository::find_populated(&store, book.id).await.unwrap().unwrap();
        assert_eq!(detail.author, Some(author.clone()));
        assert_eq!(detail.genres, vec![genre.clone()]);

        assert_eq!(store.find_by_author(author.id).await.unwrap().len(), 1);
        assert_eq!(store.find_by_genre(genre.id).await.unwrap().len(), 1);

        let listing = BooksRepository::list_populated(&store).await.unwrap();
        assert_eq!(listing[0].author.as_ref().map(Author::name), Some("LeGuin, Ursula".to_string()));
    }

    #[tokio::test]
    async fn test_count_by_status() {
        let store = MemoryStore::new();
        let due_back = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        for status in [BookInstanceStatus::Available, BookInstanceStatus::Available, BookInstanceStatus::Loaned] {
            BookInstancesRepository::save(
                &store,
                &NewBookInstance {
                    book_id: Uuid::new_v4(),
                    imprint: "Parnassus, 1968".to_string(),
                    status,
                    due_back,
                },
            )
            .await
            .unwrap();
        }

        assert_eq!(store.count_by_status(BookInstanceStatus::Available).await.unwrap(), 2);
        assert_eq!(BookInstancesRepository::count(&store).await.unwrap(), 3);
    }
}
