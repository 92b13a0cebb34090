//! Catalog home page service

use serde::Serialize;

use crate::{
    error::AppResult,
    fetch::ParallelFetch,
    models::BookInstanceStatus,
    repository::Repository,
    views::{Outcome, View},
};

/// Record counts shown on the home page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub book_count: i64,
    pub book_instance_count: i64,
    pub book_instance_available_count: i64,
    pub author_count: i64,
    pub genre_count: i64,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Count every collection concurrently
    pub async fn summary(&self) -> AppResult<CatalogSummary> {
        let repo = &self.repository;
        let mut fetched = ParallelFetch::new()
            .add("book_count", repo.books.count())
            .add("book_instance_count", repo.book_instances.count())
            .add(
                "book_instance_available_count",
                repo.book_instances.count_by_status(BookInstanceStatus::Available),
            )
            .add("author_count", repo.authors.count())
            .add("genre_count", repo.genres.count())
            .run()
            .await?;

        Ok(CatalogSummary {
            book_count: fetched.take("book_count")?,
            book_instance_count: fetched.take("book_instance_count")?,
            book_instance_available_count: fetched.take("book_instance_available_count")?,
            author_count: fetched.take("author_count")?,
            genre_count: fetched.take("genre_count")?,
        })
    }

    /// Home page. A failed count is shown on the page, not raised.
    pub async fn home(&self) -> AppResult<Outcome> {
        let view = View::new("index", "Local Library Home");
        let view = match self.summary().await {
            Ok(summary) => view.with("data", summary)?,
            Err(e) => {
                tracing::warn!(error = %e, "Catalog counts unavailable");
                view.with("error", e.to_string())?
            }
        };
        Ok(Outcome::Render(view))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        models::{NewAuthor, NewGenre},
        repository::authors::MockAuthorsRepository,
    };
    use std::sync::Arc;

    #[tokio::test]
    async fn test_summary_counts() {
        let repository = Repository::in_memory();
        repository.genres.save(&NewGenre { name: "Fantasy".to_string() }).await.unwrap();
        repository
            .authors
            .save(&NewAuthor {
                first_name: "Ursula".to_string(),
                family_name: "LeGuin".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let summary = CatalogService::new(repository).summary().await.unwrap();
        assert_eq!(
            summary,
            CatalogSummary {
                author_count: 1,
                genre_count: 1,
                ..Default::default()
            }
        );
    }

    #[tokio::test]
    async fn test_home_renders_count_failure() {
        let mut authors = MockAuthorsRepository::new();
        authors
            .expect_count()
            .returning(|| Err(AppError::Internal("connection reset".to_string())));

        let mut repository = Repository::in_memory();
        repository.authors = Arc::new(authors);

        let outcome = CatalogService::new(repository).home().await.unwrap();
        let view = outcome.view().unwrap();
        assert_eq!(view.template, "index");
        assert!(view.get("data").is_none());
        assert!(view.get("error").unwrap().as_str().unwrap().contains("connection reset"));
    }
}
