//! Repository layer for catalog storage
//!
//! Each collection is reached through its own trait so handlers can be
//! driven against PostgreSQL in production and against [`MemoryStore`] in
//! tests. A [`Repository`] bundles one handle per collection and is cloned
//! into every service; nothing here is process-global.

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod genres;
pub mod memory;

use std::sync::Arc;

use sqlx::{Pool, Postgres};

pub use authors::AuthorsRepository;
pub use book_instances::BookInstancesRepository;
pub use books::BooksRepository;
pub use genres::GenresRepository;
pub use memory::MemoryStore;

/// PostgreSQL-backed store implementing every collection trait
#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Main repository struct holding one handle per collection
#[derive(Clone)]
pub struct Repository {
    pub authors: Arc<dyn AuthorsRepository>,
    pub genres: Arc<dyn GenresRepository>,
    pub books: Arc<dyn BooksRepository>,
    pub book_instances: Arc<dyn BookInstancesRepository>,
}

impl Repository {
    /// Create a repository over the given database pool
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self::from_store(PgStore::new(pool))
    }

    /// Create a repository over fresh, empty in-memory collections
    pub fn in_memory() -> Self {
        Self::from_store(MemoryStore::new())
    }

    /// Use one store for every collection
    pub fn from_store<S>(store: S) -> Self
    where
        S: AuthorsRepository + GenresRepository + BooksRepository + BookInstancesRepository + 'static,
    {
        let store = Arc::new(store);
        Self {
            authors: store.clone(),
            genres: store.clone(),
            books: store.clone(),
            book_instances: store,
        }
    }
}
