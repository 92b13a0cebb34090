//! Genre service

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Book, Genre, GenreForm, NewGenre},
    pipeline::{Resource, ResourceViews, Submission},
    repository::Repository,
    validation::{FormFields, FormInput},
    views::View,
};

#[derive(Clone)]
pub struct GenreService {
    repository: Repository,
}

impl GenreService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl Resource for GenreService {
    type Summary = Genre;
    type Record = Genre;
    type Related = Vec<Book>;
    type Options = ();
    type Candidate = NewGenre;

    const VIEWS: ResourceViews = ResourceViews {
        noun: "Genre",
        list_url: "/catalog/genres",
        list_template: "genre_list",
        list_title: "Genre List",
        list_key: "genre_list",
        detail_template: "genre_detail",
        record_key: "genre",
        related_key: Some("genre_books"),
        form_template: "genre_form",
        create_title: "Create Genre",
        update_title: "Update Genre",
        delete_template: "genre_delete",
        delete_title: "Delete Genre",
    };

    async fn list(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.list().await
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<Genre>> {
        self.repository.genres.find_by_id(id).await
    }

    async fn related(&self, id: Uuid) -> AppResult<Vec<Book>> {
        self.repository.books.find_by_genre(id).await
    }

    fn has_dependents(books: &Vec<Book>) -> bool {
        !books.is_empty()
    }

    async fn options(&self) -> AppResult<()> {
        Ok(())
    }

    fn form_view(&self, view: View, _options: (), genre: Option<&NewGenre>) -> AppResult<View> {
        match genre {
            Some(genre) => view.with("genre", genre),
            None => Ok(view),
        }
    }

    fn check(&self, form: &FormFields) -> Submission<NewGenre> {
        let form = GenreForm::from_fields(form);
        let report = form.report();
        Submission::new(form.into(), report)
    }

    /// Redirects to an existing genre of the same name instead of inserting
    /// a second one. Two concurrent submissions can still both insert.
    async fn insert(&self, genre: NewGenre) -> AppResult<String> {
        if let Some(existing) = self.repository.genres.find_by_name(&genre.name).await? {
            tracing::debug!(name = %genre.name, "Genre already exists");
            return Ok(existing.url());
        }
        Ok(self.repository.genres.save(&genre).await?.url())
    }

    async fn remove(&self, id: Uuid) -> AppResult<()> {
        self.repository.genres.remove(id).await?;
        Ok(())
    }
}
