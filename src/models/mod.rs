//! Data models for the Local Library catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;

use chrono::NaiveDate;

// Re-export commonly used types
pub use author::{Author, AuthorForm, NewAuthor};
pub use book::{Book, BookDetail, BookForm, BookInput, BookListing, NewBook};
pub use book_instance::{
    BookInstance, BookInstanceDetail, BookInstanceForm, BookInstanceInput, BookInstanceStatus, NewBookInstance,
};
pub use genre::{Genre, GenreForm, NewGenre};

/// Display format used for every date shown in views, e.g. "Jun 7, 1954"
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}
