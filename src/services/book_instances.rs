//! Book instance service

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Book, BookInstanceDetail, BookInstanceForm, BookInstanceInput, BookInstanceStatus},
    pipeline::{Resource, ResourceViews, Submission},
    repository::Repository,
    validation::{FormFields, FormInput},
    views::View,
};

#[derive(Clone)]
pub struct BookInstanceService {
    repository: Repository,
}

impl BookInstanceService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl Resource for BookInstanceService {
    type Summary = BookInstanceDetail;
    type Record = BookInstanceDetail;
    /// Nothing references a copy
    type Related = ();
    type Options = Vec<Book>;
    type Candidate = BookInstanceInput;

    const VIEWS: ResourceViews = ResourceViews {
        noun: "BookInstance",
        list_url: "/catalog/bookinstances",
        list_template: "bookinstance_list",
        list_title: "Book Instance List",
        list_key: "bookinstance_list",
        detail_template: "bookinstance_detail",
        record_key: "bookinstance",
        related_key: None,
        form_template: "bookinstance_form",
        create_title: "Create BookInstance",
        update_title: "Update BookInstance",
        delete_template: "bookinstance_delete",
        delete_title: "Delete BookInstance",
    };

    async fn list(&self) -> AppResult<Vec<BookInstanceDetail>> {
        self.repository.book_instances.list_populated().await
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<BookInstanceDetail>> {
        self.repository.book_instances.find_populated(id).await
    }

    async fn related(&self, _id: Uuid) -> AppResult<()> {
        Ok(())
    }

    fn has_dependents(_: &()) -> bool {
        false
    }

    fn detail_title(instance: &BookInstanceDetail) -> String {
        format!("Copy: {}", instance.book_title())
    }

    async fn options(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    fn form_view(&self, view: View, books: Vec<Book>, instance: Option<&BookInstanceInput>) -> AppResult<View> {
        let view = view
            .with("book_list", books)?
            .with("status_list", BookInstanceStatus::LABELS)?;
        match instance {
            Some(instance) => view.with("selected_book", &instance.book)?.with("bookinstance", instance),
            None => Ok(view),
        }
    }

    fn check(&self, form: &FormFields) -> Submission<BookInstanceInput> {
        let form = BookInstanceForm::from_fields(form);
        let report = form.report();
        Submission::new(form.into(), report)
    }

    async fn insert(&self, instance: BookInstanceInput) -> AppResult<String> {
        let instance = instance.to_new_instance(Utc::now().date_naive())?;
        Ok(self.repository.book_instances.save(&instance).await?.url())
    }

    async fn remove(&self, id: Uuid) -> AppResult<()> {
        self.repository.book_instances.remove(id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> FormFields {
        FormFields::from_pairs(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())))
    }

    #[test]
    fn test_unknown_status_rejected() {
        let service = BookInstanceService::new(Repository::in_memory());
        let book = Uuid::nil().to_string();
        let submission = service.check(&form(&[
            ("book", book.as_str()),
            ("imprint", "Ace, 1990"),
            ("status", "Lost"),
        ]));

        let Submission::Rejected(instance, report) = submission else {
            panic!("expected rejection");
        };
        assert_eq!(instance.status, "Lost");
        assert_eq!(report.messages(), vec!["Invalid status"]);
    }

    #[test]
    fn test_invalid_due_back_rejected() {
        let service = BookInstanceService::new(Repository::in_memory());
        let book = Uuid::nil().to_string();
        let submission = service.check(&form(&[
            ("book", book.as_str()),
            ("imprint", "Ace, 1990"),
            ("due_back", "next tuesday"),
        ]));

        let Submission::Rejected(instance, report) = submission else {
            panic!("expected rejection");
        };
        assert_eq!(instance.due_back, None);
        assert_eq!(report.messages(), vec!["Invalid date"]);
    }

    #[test]
    fn test_malformed_book_reference_rejected() {
        let service = BookInstanceService::new(Repository::in_memory());
        let submission = service.check(&form(&[("book", "42"), ("imprint", "Ace, 1990")]));

        let Submission::Rejected(instance, report) = submission else {
            panic!("expected rejection");
        };
        assert_eq!(instance.book, "42");
        assert_eq!(report.messages(), vec!["Book must be a valid reference."]);
    }

    #[tokio::test]
    async fn test_insert_applies_defaults() {
        let repository = Repository::in_memory();
        let service = BookInstanceService::new(repository.clone());
        let url = service
            .insert(BookInstanceInput {
                book: Uuid::new_v4().to_string(),
                imprint: "Ace, 1990".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let instances = repository.book_instances.list_populated().await.unwrap();
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].instance.url(), url);
        assert_eq!(instances[0].instance.status, BookInstanceStatus::Maintenance);
        assert_eq!(instances[0].instance.due_back, Utc::now().date_naive());
    }
}
