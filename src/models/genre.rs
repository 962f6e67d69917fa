//! Genre model and form

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::CATALOG_PREFIX;
use crate::validation::{FieldRule, FormFields, FormSchema, Validated};

/// Genre record as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Genre {
    pub id: Uuid,
    pub name: String,
}

impl Genre {
    pub fn url(&self) -> String {
        genre_url(self.id)
    }
}

pub fn genre_url(id: Uuid) -> String {
    format!("{}/genre/{}", CATALOG_PREFIX, id)
}

/// Sanitized genre form; `name` is in stored (escaped) form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreForm {
    pub name: String,
}

impl GenreForm {
    fn schema() -> FormSchema {
        FormSchema::new(vec![FieldRule::new("name")
            .required("Genre name required")
            .escape()])
    }

    pub fn validate(fields: &FormFields) -> Validated<Self> {
        Self::schema()
            .apply(fields)
            .into_outcome(|s| Self { name: s.value("name") })
    }

    pub fn into_genre(self, id: Uuid) -> Genre {
        Genre { id, name: self.name }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        let form = GenreForm::validate(&FormFields::from([("name", "  Science & Fiction ")])).unwrap();
        assert_eq!(form.name, "Science &amp; Fiction");

        let rejected = GenreForm::validate(&FormFields::from([("name", "   ")])).unwrap_err();
        assert_eq!(rejected.errors[0].msg, "Genre name required");
    }

    #[test]
    fn test_url() {
        let genre = GenreForm { name: "Poetry".into() }.into_genre(Uuid::nil());
        assert_eq!(genre.url(), "/catalog/genre/00000000-0000-0000-0000-000000000000");
    }
}
