//! Author service

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Author, AuthorForm, Book, NewAuthor},
    pipeline::{Editable, Resource, ResourceViews, Submission},
    repository::Repository,
    validation::{FormFields, FormInput},
    views::View,
};

#[derive(Clone)]
pub struct AuthorService {
    repository: Repository,
}

impl AuthorService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl Resource for AuthorService {
    type Summary = Author;
    type Record = Author;
    type Related = Vec<Book>;
    type Options = ();
    type Candidate = NewAuthor;

    const VIEWS: ResourceViews = ResourceViews {
        noun: "Author",
        list_url: "/catalog/authors",
        list_template: "author_list",
        list_title: "Author List",
        list_key: "author_list",
        detail_template: "author_detail",
        record_key: "author",
        related_key: Some("author_books"),
        form_template: "author_form",
        create_title: "Create Author",
        update_title: "Update Author",
        delete_template: "author_delete",
        delete_title: "Delete Author",
    };

    async fn list(&self) -> AppResult<Vec<Author>> {
        self.repository.authors.list().await
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<Author>> {
        self.repository.authors.find_by_id(id).await
    }

    /// Books written by the author
    async fn related(&self, id: Uuid) -> AppResult<Vec<Book>> {
        self.repository.books.find_by_author(id).await
    }

    fn has_dependents(books: &Vec<Book>) -> bool {
        !books.is_empty()
    }

    async fn options(&self) -> AppResult<()> {
        Ok(())
    }

    fn form_view(&self, view: View, _options: (), candidate: Option<&NewAuthor>) -> AppResult<View> {
        match candidate {
            Some(author) => view.with("author", author),
            None => Ok(view),
        }
    }

    fn check(&self, form: &FormFields) -> Submission<NewAuthor> {
        let form = AuthorForm::from_fields(form);
        let report = form.report();
        Submission::new(form.into(), report)
    }

    async fn insert(&self, author: NewAuthor) -> AppResult<String> {
        Ok(self.repository.authors.save(&author).await?.url())
    }

    async fn remove(&self, id: Uuid) -> AppResult<()> {
        self.repository.authors.remove(id).await?;
        Ok(())
    }
}

#[async_trait]
impl Editable for AuthorService {
    async fn load(&self, id: Uuid) -> AppResult<Option<NewAuthor>> {
        Ok(self.repository.authors.find_by_id(id).await?.map(NewAuthor::from))
    }

    async fn replace(&self, id: Uuid, author: NewAuthor) -> AppResult<Option<String>> {
        Ok(self
            .repository
            .authors
            .replace(id, &author)
            .await?
            .map(|author| author.url()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::AppError, pipeline, repository::authors::MockAuthorsRepository};
    use std::sync::Arc;

    fn form(pairs: &[(&str, &str)]) -> FormFields {
        FormFields::from_pairs(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())))
    }

    #[test]
    fn test_empty_names_report_both_rules() {
        let service = AuthorService::new(Repository::in_memory());
        let Submission::Rejected(_, report) = service.check(&form(&[("first_name", ""), ("family_name", "Le Guin")]))
        else {
            panic!("expected rejection");
        };

        assert_eq!(
            report.messages(),
            vec![
                "First name must be specified.",
                "First name has non-alphanumeric characters.",
                "Family name has non-alphanumeric characters.",
            ]
        );
    }

    #[test]
    fn test_dates_sanitized() {
        let service = AuthorService::new(Repository::in_memory());
        let submission = service.check(&form(&[
            ("first_name", " Ursula "),
            ("family_name", "LeGuin"),
            ("date_of_birth", "1929-10-21"),
            ("date_of_death", ""),
        ]));

        let Submission::Accepted(author) = submission else {
            panic!("expected acceptance");
        };
        assert_eq!(author.first_name, "Ursula");
        assert_eq!(author.date_of_birth, chrono::NaiveDate::from_ymd_opt(1929, 10, 21));
        assert_eq!(author.date_of_death, None);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut authors = MockAuthorsRepository::new();
        authors
            .expect_list()
            .returning(|| Err(AppError::Internal("connection reset".to_string())));

        let mut repository = Repository::in_memory();
        repository.authors = Arc::new(authors);

        let result = pipeline::list(&AuthorService::new(repository)).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
