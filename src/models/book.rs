//! Book model and its populated forms

use serde::{Serialize, Serializer};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::{Author, Genre};
use crate::{
    error::{AppError, AppResult},
    validation::{reference, references, FormFields, FormInput},
};

/// Book record as stored: references are ids
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author_id: Uuid,
    /// Selected genres, in submission order
    pub genre_ids: Vec<Uuid>,
}

impl Book {
    pub fn url(&self) -> String {
        format!("/catalog/book/{}", self.id)
    }
}

impl Serialize for Book {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct BookView<'a> {
            id: &'a Uuid,
            title: &'a str,
            summary: &'a str,
            isbn: &'a str,
            author: &'a Uuid,
            genre: &'a [Uuid],
            url: String,
        }

        BookView {
            id: &self.id,
            title: &self.title,
            summary: &self.summary,
            isbn: &self.isbn,
            author: &self.author_id,
            genre: &self.genre_ids,
            url: self.url(),
        }
        .serialize(serializer)
    }
}

/// Book row for the list view, with its author populated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookListing {
    pub id: Uuid,
    pub title: String,
    pub author: Option<Author>,
}

impl Serialize for BookListing {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct BookListingView<'a> {
            id: &'a Uuid,
            title: &'a str,
            author: Option<&'a Author>,
            url: String,
        }

        BookListingView {
            id: &self.id,
            title: &self.title,
            author: self.author.as_ref(),
            url: format!("/catalog/book/{}", self.id),
        }
        .serialize(serializer)
    }
}

/// Book with author and genres populated.
///
/// `author` is `None` when the reference no longer resolves; unresolved
/// genre ids are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDetail {
    pub book: Book,
    pub author: Option<Author>,
    pub genres: Vec<Genre>,
}

impl Serialize for BookDetail {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct BookDetailView<'a> {
            id: &'a Uuid,
            title: &'a str,
            summary: &'a str,
            isbn: &'a str,
            author: Option<&'a Author>,
            genre: &'a [Genre],
            url: String,
        }

        BookDetailView {
            id: &self.book.id,
            title: &self.book.title,
            summary: &self.book.summary,
            isbn: &self.book.isbn,
            author: self.author.as_ref(),
            genre: &self.genres,
            url: self.book.url(),
        }
        .serialize(serializer)
    }
}

/// Book form as submitted. A single genre checkbox arrives as a scalar and
/// is coerced to a list.
#[derive(Debug, Clone, Default, Validate)]
pub struct BookForm {
    #[validate(length(min = 1, message = "Title must not be empty."))]
    pub title: String,
    #[validate(
        length(min = 1, message = "Author must not be empty."),
        custom(function = "reference", message = "Author must be a valid reference.")
    )]
    pub author: String,
    #[validate(length(min = 1, message = "Summary must not be empty."))]
    pub summary: String,
    #[validate(length(min = 1, message = "ISBN must not be empty"))]
    pub isbn: String,
    #[validate(custom(function = "references", message = "Genre must be a valid reference."))]
    pub genre: Vec<String>,
}

impl FormInput for BookForm {
    const FIELDS: &'static [&'static str] = &["title", "author", "summary", "isbn", "genre"];

    fn from_fields(fields: &FormFields) -> Self {
        Self {
            title: fields.text("title"),
            author: fields.text("author"),
            summary: fields.text("summary"),
            isbn: fields.text("isbn"),
            genre: fields.list("genre").iter().map(|g| g.trim().to_string()).collect(),
        }
    }
}

impl From<BookForm> for BookInput {
    fn from(form: BookForm) -> Self {
        Self {
            title: form.title,
            author: form.author,
            summary: form.summary,
            isbn: form.isbn,
            genre: form.genre,
        }
    }
}

/// Sanitized book submission.
///
/// References stay as submitted text so a rejected form can be shown back
/// exactly as the user filled it in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub summary: String,
    pub isbn: String,
    pub genre: Vec<String>,
}

impl BookInput {
    /// Resolve the submitted references into ids
    pub fn to_new_book(&self) -> AppResult<NewBook> {
        let author_id = parse_reference("author", &self.author)?;
        let mut genre_ids = Vec::with_capacity(self.genre.len());
        for id in &self.genre {
            let id = parse_reference("genre", id)?;
            if !genre_ids.contains(&id) {
                genre_ids.push(id);
            }
        }

        Ok(NewBook {
            title: self.title.clone(),
            summary: self.summary.clone(),
            isbn: self.isbn.clone(),
            author_id,
            genre_ids,
        })
    }

    pub fn has_genre(&self, id: &Uuid) -> bool {
        let id = id.to_string();
        self.genre.iter().any(|g| *g == id)
    }
}

impl From<Book> for BookInput {
    fn from(book: Book) -> Self {
        Self {
            title: book.title,
            author: book.author_id.to_string(),
            summary: book.summary,
            isbn: book.isbn,
            genre: book.genre_ids.iter().map(Uuid::to_string).collect(),
        }
    }
}

/// Book ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author_id: Uuid,
    pub genre_ids: Vec<Uuid>,
}

impl NewBook {
    pub fn into_book(self, id: Uuid) -> Book {
        Book {
            id,
            title: self.title,
            summary: self.summary,
            isbn: self.isbn,
            author_id: self.author_id,
            genre_ids: self.genre_ids,
        }
    }
}

pub(crate) fn parse_reference(field: &str, value: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|_| AppError::BadRequest(format!("Invalid {} reference: {}", field, value)))
}
