//! Catalog services

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod catalog;
pub mod genres;

use crate::repository::Repository;

pub use authors::AuthorService;
pub use book_instances::BookInstanceService;
pub use books::BookService;
pub use catalog::CatalogService;
pub use genres::GenreService;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub authors: AuthorService,
    pub books: BookService,
    pub genres: GenreService,
    pub book_instances: BookInstanceService,
    pub catalog: CatalogService,
}

impl Services {
    /// Create all services over one repository
    pub fn new(repository: Repository) -> Self {
        Self {
            authors: AuthorService::new(repository.clone()),
            books: BookService::new(repository.clone()),
            genres: GenreService::new(repository.clone()),
            book_instances: BookInstanceService::new(repository.clone()),
            catalog: CatalogService::new(repository),
        }
    }
}
