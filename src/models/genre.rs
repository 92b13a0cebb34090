//! Genre model

use serde::{Serialize, Serializer};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::validation::{FormFields, FormInput};

/// Genre record. Names are unique by convention only.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Genre {
    pub id: Uuid,
    pub name: String,
}

impl Genre {
    pub fn url(&self) -> String {
        format!("/catalog/genre/{}", self.id)
    }
}

impl Serialize for Genre {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct GenreView<'a> {
            id: &'a Uuid,
            name: &'a str,
            url: String,
        }

        GenreView {
            id: &self.id,
            name: &self.name,
            url: self.url(),
        }
        .serialize(serializer)
    }
}

/// Genre form as submitted
#[derive(Debug, Clone, Default, Validate)]
pub struct GenreForm {
    #[validate(length(min = 1, message = "Genre name required"))]
    pub name: String,
}

impl FormInput for GenreForm {
    const FIELDS: &'static [&'static str] = &["name"];

    fn from_fields(fields: &FormFields) -> Self {
        Self {
            name: fields.text("name"),
        }
    }
}

impl From<GenreForm> for NewGenre {
    fn from(form: GenreForm) -> Self {
        Self { name: form.name }
    }
}

/// Sanitized genre submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewGenre {
    pub name: String,
}

impl NewGenre {
    pub fn into_genre(self, id: Uuid) -> Genre {
        Genre { id, name: self.name }
    }
}
