//! Author model and related types

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::format_date;
use crate::validation::{alphanumeric, iso8601_date, to_date, FormFields, FormInput};

/// Author record from the store
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Author {
    pub id: Uuid,
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// "Family, First". Empty when either part is missing, so views can
    /// fall back to something else instead of printing a dangling comma.
    pub fn name(&self) -> String {
        if self.first_name.is_empty() || self.family_name.is_empty() {
            return String::new();
        }
        format!("{}, {}", self.family_name, self.first_name)
    }

    pub fn lifespan(&self) -> String {
        let birth = self.date_of_birth.map(format_date).unwrap_or_default();
        let death = self.date_of_death.map(format_date).unwrap_or_default();
        format!("{} - {}", birth, death)
    }

    pub fn url(&self) -> String {
        format!("/catalog/author/{}", self.id)
    }
}

impl Serialize for Author {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct AuthorView<'a> {
            id: &'a Uuid,
            first_name: &'a str,
            family_name: &'a str,
            date_of_birth: Option<NaiveDate>,
            date_of_death: Option<NaiveDate>,
            name: String,
            lifespan: String,
            url: String,
        }

        AuthorView {
            id: &self.id,
            first_name: &self.first_name,
            family_name: &self.family_name,
            date_of_birth: self.date_of_birth,
            date_of_death: self.date_of_death,
            name: self.name(),
            lifespan: self.lifespan(),
            url: self.url(),
        }
        .serialize(serializer)
    }
}

/// Author form as submitted, names trimmed
#[derive(Debug, Clone, Default, Validate)]
pub struct AuthorForm {
    #[validate(
        length(min = 1, message = "First name must be specified."),
        custom(function = "alphanumeric", message = "First name has non-alphanumeric characters.")
    )]
    pub first_name: String,
    #[validate(
        length(min = 1, message = "Family name must be specified."),
        custom(function = "alphanumeric", message = "Family name has non-alphanumeric characters.")
    )]
    pub family_name: String,
    #[validate(custom(function = "iso8601_date", message = "Invalid date of birth"))]
    pub date_of_birth: String,
    #[validate(custom(function = "iso8601_date", message = "Invalid date of death"))]
    pub date_of_death: String,
}

impl FormInput for AuthorForm {
    const FIELDS: &'static [&'static str] = &["first_name", "family_name", "date_of_birth", "date_of_death"];

    fn from_fields(fields: &FormFields) -> Self {
        Self {
            first_name: fields.text("first_name"),
            family_name: fields.text("family_name"),
            date_of_birth: fields.text("date_of_birth"),
            date_of_death: fields.text("date_of_death"),
        }
    }
}

impl From<AuthorForm> for NewAuthor {
    fn from(form: AuthorForm) -> Self {
        Self {
            date_of_birth: to_date(&form.date_of_birth),
            date_of_death: to_date(&form.date_of_death),
            first_name: form.first_name,
            family_name: form.family_name,
        }
    }
}

/// Sanitized author submission, ready to be stored
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewAuthor {
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl NewAuthor {
    pub fn into_author(self, id: Uuid) -> Author {
        Author {
            id,
            first_name: self.first_name,
            family_name: self.family_name,
            date_of_birth: self.date_of_birth,
            date_of_death: self.date_of_death,
        }
    }
}

impl From<Author> for NewAuthor {
    fn from(author: Author) -> Self {
        Self {
            first_name: author.first_name,
            family_name: author.family_name,
            date_of_birth: author.date_of_birth,
            date_of_death: author.date_of_death,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tolkien() -> Author {
        Author {
            id: Uuid::nil(),
            first_name: "John".to_string(),
            family_name: "Tolkien".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1892, 1, 3),
            date_of_death: NaiveDate::from_ymd_opt(1973, 9, 2),
        }
    }

    #[test]
    fn test_name() {
        assert_eq!(tolkien().name(), "Tolkien, John");

        let mut unnamed = tolkien();
        unnamed.first_name.clear();
        assert_eq!(unnamed.name(), "");
    }

    #[test]
    fn test_lifespan() {
        assert_eq!(tolkien().lifespan(), "Jan 3, 1892 - Sep 2, 1973");

        let mut living = tolkien();
        living.date_of_death = None;
        assert_eq!(living.lifespan(), "Jan 3, 1892 - ");
    }

    #[test]
    fn test_form_converts_dates() {
        let form = AuthorForm {
            first_name: "Jorge".to_string(),
            family_name: "Borges".to_string(),
            date_of_birth: "1899-08".to_string(),
            date_of_death: String::new(),
        };
        assert!(form.report().is_empty());

        let author = NewAuthor::from(form);
        assert_eq!(author.date_of_birth, NaiveDate::from_ymd_opt(1899, 8, 1));
        assert_eq!(author.date_of_death, None);
    }

    #[test]
    fn test_serialized_view_carries_derived_fields() {
        let value = serde_json::to_value(tolkien()).unwrap();
        assert_eq!(value["name"], "Tolkien, John");
        assert_eq!(value["url"], format!("/catalog/author/{}", Uuid::nil()));
        assert_eq!(value["date_of_birth"], "1892-01-03");
    }
}
