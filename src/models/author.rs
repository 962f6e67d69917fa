//! Author model and form

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{format_date_med, format_form_date, CATALOG_PREFIX};
use crate::validation::{parse_iso_date, FieldRule, FormFields, FormSchema, Validated};

/// Maximum length of each name part
pub const NAME_MAX_LEN: usize = 100;

/// Author record as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Author {
    pub id: Uuid,
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// Full display name, "Unknown" when both parts are empty
    pub fn name(&self) -> String {
        if self.first_name.is_empty() && self.family_name.is_empty() {
            return "Unknown".to_string();
        }
        format!("{} {}", self.first_name, self.family_name)
    }

    /// "Jan 2, 1920 - Unknown"
    pub fn lifespan_formatted(&self) -> String {
        let birth = self
            .date_of_birth
            .map(format_date_med)
            .unwrap_or_else(|| "Unknown".to_string());
        let death = self
            .date_of_death
            .map(format_date_med)
            .unwrap_or_else(|| "Unknown".to_string());
        format!("{} - {}", birth, death)
    }

    pub fn date_of_birth_form_value(&self) -> String {
        self.date_of_birth.map(format_form_date).unwrap_or_default()
    }

    pub fn date_of_death_form_value(&self) -> String {
        self.date_of_death.map(format_form_date).unwrap_or_default()
    }

    pub fn url(&self) -> String {
        author_url(self.id)
    }
}

pub fn author_url(id: Uuid) -> String {
    format!("{}/author/{}", CATALOG_PREFIX, id)
}

/// Sanitized author form. Names are in stored (escaped) form, dates as
/// submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorForm {
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: String,
    pub date_of_death: String,
}

impl AuthorForm {
    fn schema() -> FormSchema {
        FormSchema::new(vec![
            FieldRule::new("first_name")
                .required("First name must be specified")
                .max_length(NAME_MAX_LEN, "First name must not exceed 100 characters")
                .escape()
                .alphanumeric("First name has non-alphanumeric characters"),
            FieldRule::new("family_name")
                .required("Family name must be specified")
                .max_length(NAME_MAX_LEN, "Family name must not exceed 100 characters")
                .escape()
                .alphanumeric("Family name has non-alphanumeric characters"),
            FieldRule::new("date_of_birth")
                .optional()
                .iso_date("Invalid date of birth"),
            FieldRule::new("date_of_death")
                .optional()
                .iso_date("Invalid date of death"),
        ])
    }

    pub fn validate(fields: &FormFields) -> Validated<Self> {
        Self::schema().apply(fields).into_outcome(|s| Self {
            first_name: s.value("first_name"),
            family_name: s.value("family_name"),
            date_of_birth: s.value("date_of_birth"),
            date_of_death: s.value("date_of_death"),
        })
    }

    pub fn into_author(self, id: Uuid) -> Author {
        Author {
            id,
            date_of_birth: parse_iso_date(&self.date_of_birth),
            date_of_death: parse_iso_date(&self.date_of_death),
            first_name: self.first_name,
            family_name: self.family_name,
        }
    }
}
