//! Book instance (physical copy) model

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{book::parse_reference, format_date, Book};
use crate::{
    error::{AppError, AppResult},
    validation::{iso8601_date, reference, to_date, FormFields, FormInput},
};

/// Circulation status of a copy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookInstanceStatus {
    Available,
    #[default]
    Maintenance,
    Loaned,
    Reserved,
}

impl BookInstanceStatus {
    /// Every accepted status label, in display order
    pub const LABELS: &'static [&'static str] = &["Available", "Maintenance", "Loaned", "Reserved"];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookInstanceStatus::Available => "Available",
            BookInstanceStatus::Maintenance => "Maintenance",
            BookInstanceStatus::Loaned => "Loaned",
            BookInstanceStatus::Reserved => "Reserved",
        }
    }
}

impl fmt::Display for BookInstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookInstanceStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(BookInstanceStatus::Available),
            "Maintenance" => Ok(BookInstanceStatus::Maintenance),
            "Loaned" => Ok(BookInstanceStatus::Loaned),
            "Reserved" => Ok(BookInstanceStatus::Reserved),
            other => Err(AppError::BadRequest(format!("Unknown status: {}", other))),
        }
    }
}

/// Copy record as stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookInstance {
    pub id: Uuid,
    pub book_id: Uuid,
    pub imprint: String,
    pub status: BookInstanceStatus,
    pub due_back: NaiveDate,
}

impl BookInstance {
    pub fn url(&self) -> String {
        format!("/catalog/bookinstance/{}", self.id)
    }

    pub fn due_back_formatted(&self) -> String {
        format_date(self.due_back)
    }
}

impl Serialize for BookInstance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        BookInstanceView::new(self, None).serialize(serializer)
    }
}

/// Copy with its book populated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookInstanceDetail {
    pub instance: BookInstance,
    pub book: Option<Book>,
}

impl BookInstanceDetail {
    pub fn book_title(&self) -> &str {
        self.book.as_ref().map(|b| b.title.as_str()).unwrap_or_default()
    }
}

impl Serialize for BookInstanceDetail {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        BookInstanceView::new(&self.instance, Some(self.book.as_ref())).serialize(serializer)
    }
}

#[derive(Serialize)]
struct BookInstanceView<'a> {
    id: &'a Uuid,
    #[serde(serialize_with = "serialize_book_ref")]
    book: BookRef<'a>,
    imprint: &'a str,
    status: BookInstanceStatus,
    due_back: NaiveDate,
    due_back_formatted: String,
    url: String,
}

enum BookRef<'a> {
    Id(&'a Uuid),
    Populated(Option<&'a Book>),
}

fn serialize_book_ref<S: Serializer>(book: &BookRef<'_>, serializer: S) -> Result<S::Ok, S::Error> {
    match book {
        BookRef::Id(id) => id.serialize(serializer),
        BookRef::Populated(book) => book.serialize(serializer),
    }
}

impl<'a> BookInstanceView<'a> {
    fn new(instance: &'a BookInstance, populated: Option<Option<&'a Book>>) -> Self {
        Self {
            id: &instance.id,
            book: match populated {
                Some(book) => BookRef::Populated(book),
                None => BookRef::Id(&instance.book_id),
            },
            imprint: &instance.imprint,
            status: instance.status,
            due_back: instance.due_back,
            due_back_formatted: instance.due_back_formatted(),
            url: instance.url(),
        }
    }
}

/// One of [`BookInstanceStatus::LABELS`]; skipped when empty
fn status_label(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || BookInstanceStatus::LABELS.iter().any(|label| *label == value) {
        Ok(())
    } else {
        Err(ValidationError::new("status"))
    }
}

/// Copy form as submitted
#[derive(Debug, Clone, Default, Validate)]
pub struct BookInstanceForm {
    #[validate(
        length(min = 1, message = "Book must be specified"),
        custom(function = "reference", message = "Book must be a valid reference.")
    )]
    pub book: String,
    #[validate(length(min = 1, message = "Imprint must be specified"))]
    pub imprint: String,
    #[validate(custom(function = "status_label", message = "Invalid status"))]
    pub status: String,
    #[validate(custom(function = "iso8601_date", message = "Invalid date"))]
    pub due_back: String,
}

impl FormInput for BookInstanceForm {
    const FIELDS: &'static [&'static str] = &["book", "imprint", "status", "due_back"];

    fn from_fields(fields: &FormFields) -> Self {
        Self {
            book: fields.text("book"),
            imprint: fields.text("imprint"),
            status: fields.text("status"),
            due_back: fields.text("due_back"),
        }
    }
}

impl From<BookInstanceForm> for BookInstanceInput {
    fn from(form: BookInstanceForm) -> Self {
        Self {
            due_back: to_date(&form.due_back),
            book: form.book,
            imprint: form.imprint,
            status: form.status,
        }
    }
}

/// Sanitized copy submission, kept as text for re-rendering
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookInstanceInput {
    pub book: String,
    pub imprint: String,
    pub status: String,
    pub due_back: Option<NaiveDate>,
}

impl BookInstanceInput {
    /// Resolve references and defaults. A missing status means
    /// `Maintenance`, a missing due date means `today`.
    pub fn to_new_instance(&self, today: NaiveDate) -> AppResult<NewBookInstance> {
        let status = if self.status.is_empty() {
            BookInstanceStatus::default()
        } else {
            self.status.parse()?
        };

        Ok(NewBookInstance {
            book_id: parse_reference("book", &self.book)?,
            imprint: self.imprint.clone(),
            status,
            due_back: self.due_back.unwrap_or(today),
        })
    }
}

/// Copy ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBookInstance {
    pub book_id: Uuid,
    pub imprint: String,
    pub status: BookInstanceStatus,
    pub due_back: NaiveDate,
}

impl NewBookInstance {
    pub fn into_instance(self, id: Uuid) -> BookInstance {
        BookInstance {
            id,
            book_id: self.book_id,
            imprint: self.imprint,
            status: self.status,
            due_back: self.due_back,
        }
    }
}
