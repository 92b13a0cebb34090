//! Book service

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::AppResult,
    fetch::ParallelFetch,
    models::{Author, BookDetail, BookForm, BookInput, BookInstance, BookListing, Genre},
    pipeline::{Editable, Resource, ResourceViews, Submission},
    repository::Repository,
    validation::{FormFields, FormInput},
    views::View,
};

/// Reference lists shown by the book form
#[derive(Debug, Clone, Default)]
pub struct BookFormOptions {
    pub authors: Vec<Author>,
    pub genres: Vec<Genre>,
}

/// Genre checkbox, ticked when the book carries that genre
#[derive(Serialize)]
struct GenreChoice<'a> {
    #[serde(flatten)]
    genre: &'a Genre,
    checked: bool,
}

#[derive(Clone)]
pub struct BookService {
    repository: Repository,
}

impl BookService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl Resource for BookService {
    type Summary = BookListing;
    type Record = BookDetail;
    type Related = Vec<BookInstance>;
    type Options = BookFormOptions;
    type Candidate = BookInput;

    const VIEWS: ResourceViews = ResourceViews {
        noun: "Book",
        list_url: "/catalog/books",
        list_template: "book_list",
        list_title: "Book List",
        list_key: "book_list",
        detail_template: "book_detail",
        record_key: "book",
        related_key: Some("book_instances"),
        form_template: "book_form",
        create_title: "Create Book",
        update_title: "Update Book",
        delete_template: "book_delete",
        delete_title: "Delete Book",
    };

    async fn list(&self) -> AppResult<Vec<BookListing>> {
        self.repository.books.list_populated().await
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<BookDetail>> {
        self.repository.books.find_populated(id).await
    }

    /// Copies of the book
    async fn related(&self, id: Uuid) -> AppResult<Vec<BookInstance>> {
        self.repository.book_instances.find_by_book(id).await
    }

    fn has_dependents(instances: &Vec<BookInstance>) -> bool {
        !instances.is_empty()
    }

    fn detail_title(book: &BookDetail) -> String {
        book.book.title.clone()
    }

    async fn options(&self) -> AppResult<BookFormOptions> {
        let mut fetched = ParallelFetch::new()
            .add("authors", self.repository.authors.list())
            .add("genres", self.repository.genres.list())
            .run()
            .await?;

        Ok(BookFormOptions {
            authors: fetched.take("authors")?,
            genres: fetched.take("genres")?,
        })
    }

    fn form_view(&self, view: View, options: BookFormOptions, book: Option<&BookInput>) -> AppResult<View> {
        let genres: Vec<GenreChoice> = options
            .genres
            .iter()
            .map(|genre| GenreChoice {
                genre,
                checked: book.is_some_and(|b| b.has_genre(&genre.id)),
            })
            .collect();

        let view = view.with("authors", &options.authors)?.with("genres", genres)?;
        match book {
            Some(book) => view.with("book", book),
            None => Ok(view),
        }
    }

    fn check(&self, form: &FormFields) -> Submission<BookInput> {
        let form = BookForm::from_fields(form);
        let report = form.report();
        Submission::new(form.into(), report)
    }

    async fn insert(&self, book: BookInput) -> AppResult<String> {
        let book = book.to_new_book()?;
        Ok(self.repository.books.save(&book).await?.url())
    }

    async fn remove(&self, id: Uuid) -> AppResult<()> {
        self.repository.books.remove(id).await?;
        Ok(())
    }
}

#[async_trait]
impl Editable for BookService {
    async fn load(&self, id: Uuid) -> AppResult<Option<BookInput>> {
        Ok(self.repository.books.find_by_id(id).await?.map(BookInput::from))
    }

    async fn replace(&self, id: Uuid, book: BookInput) -> AppResult<Option<String>> {
        let book = book.to_new_book()?;
        Ok(self.repository.books.replace(id, &book).await?.map(|book| book.url()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewGenre;

    fn book_form(author: &str, genres: &[&str]) -> FormFields {
        let mut pairs = vec![
            ("title".to_string(), "Dune".to_string()),
            ("author".to_string(), author.to_string()),
            ("summary".to_string(), "Spice".to_string()),
            ("isbn".to_string(), "9780441013593".to_string()),
        ];
        pairs.extend(genres.iter().map(|g| ("genre".to_string(), g.to_string())));
        FormFields::from_pairs(pairs)
    }

    #[test]
    fn test_single_genre_is_coerced_to_list() {
        let service = BookService::new(Repository::in_memory());
        let genre = Uuid::new_v4().to_string();
        let form = book_form(&Uuid::nil().to_string(), &[genre.as_str()]);

        let Submission::Accepted(book) = service.check(&form) else {
            panic!("expected acceptance");
        };
        assert_eq!(book.genre, vec![genre]);
    }

    #[test]
    fn test_malformed_references_are_violations() {
        let service = BookService::new(Repository::in_memory());
        let genre = Uuid::new_v4().to_string();
        let form = book_form("not-an-id", &[genre.as_str(), "g1"]);

        let Submission::Rejected(book, report) = service.check(&form) else {
            panic!("expected rejection");
        };
        assert_eq!(book.author, "not-an-id");
        assert_eq!(book.genre, vec![genre, "g1".to_string()]);
        assert_eq!(
            report.messages(),
            vec!["Author must be a valid reference.", "Genre must be a valid reference."]
        );
        assert_eq!(report.iter().map(|v| v.field.as_str()).collect::<Vec<_>>(), vec!["author", "genre"]);
    }

    #[test]
    fn test_missing_fields_reported_in_order() {
        let service = BookService::new(Repository::in_memory());
        let Submission::Rejected(book, report) = service.check(&FormFields::new()) else {
            panic!("expected rejection");
        };
        assert!(book.genre.is_empty());
        assert_eq!(
            report.messages(),
            vec![
                "Title must not be empty.",
                "Author must not be empty.",
                "Summary must not be empty.",
                "ISBN must not be empty",
            ]
        );
    }

    #[tokio::test]
    async fn test_form_marks_selected_genres() {
        let repository = Repository::in_memory();
        let fantasy = repository.genres.save(&NewGenre { name: "Fantasy".to_string() }).await.unwrap();
        repository.genres.save(&NewGenre { name: "Poetry".to_string() }).await.unwrap();

        let service = BookService::new(repository);
        let options = service.options().await.unwrap();
        let book = BookInput {
            genre: vec![fantasy.id.to_string()],
            ..Default::default()
        };

        let view = service
            .form_view(View::new("book_form", "Create Book"), options, Some(&book))
            .unwrap();
        let genres = view.get("genres").unwrap().as_array().unwrap();
        assert_eq!(genres[0]["name"], "Fantasy");
        assert_eq!(genres[0]["checked"], true);
        assert_eq!(genres[1]["checked"], false);
    }
}
