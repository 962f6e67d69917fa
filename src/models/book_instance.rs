//! Book instance (physical copy) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use uuid::Uuid;

use super::{format_date_med, format_form_date, Book, CATALOG_PREFIX};
use crate::validation::{parse_iso_date, FieldRule, FormFields, FormSchema, Validated};

/// Availability of a copy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookInstanceStatus {
    Available,
    #[default]
    Maintenance,
    Loaned,
    Reserved,
}

/// Accepted status values, in the order shown in the form
pub const STATUS_VALUES: &[&str] = &["Maintenance", "Available", "Loaned", "Reserved"];

impl BookInstanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookInstanceStatus::Available => "Available",
            BookInstanceStatus::Maintenance => "Maintenance",
            BookInstanceStatus::Loaned => "Loaned",
            BookInstanceStatus::Reserved => "Reserved",
        }
    }
}

impl std::fmt::Display for BookInstanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookInstanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(BookInstanceStatus::Available),
            "Maintenance" => Ok(BookInstanceStatus::Maintenance),
            "Loaned" => Ok(BookInstanceStatus::Loaned),
            "Reserved" => Ok(BookInstanceStatus::Reserved),
            _ => Err(format!("Invalid book instance status: {}", s)),
        }
    }
}

// SQLx conversion for BookInstanceStatus (stored as text)
impl sqlx::Type<Postgres> for BookInstanceStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for BookInstanceStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BookInstanceStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Copy record as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct BookInstance {
    pub id: Uuid,
    pub book: Uuid,
    pub imprint: String,
    pub status: BookInstanceStatus,
    pub due_back: NaiveDate,
}

impl BookInstance {
    pub fn url(&self) -> String {
        book_instance_url(self.id)
    }

    pub fn due_back_formatted(&self) -> String {
        format_date_med(self.due_back)
    }

    pub fn due_back_form_value(&self) -> String {
        format_form_date(self.due_back)
    }
}

pub fn book_instance_url(id: Uuid) -> String {
    format!("{}/bookinstance/{}", CATALOG_PREFIX, id)
}

/// Copy with its book expanded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookInstanceWithBook {
    pub instance: BookInstance,
    pub book: Option<Book>,
}

/// Sanitized copy form. `imprint` is in stored (escaped) form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookInstanceForm {
    pub book: String,
    pub imprint: String,
    pub status: String,
    pub due_back: String,
}

impl BookInstanceForm {
    fn schema() -> FormSchema {
        FormSchema::new(vec![
            FieldRule::new("book")
                .required("Book must be specified")
                .escape()
                .identifier("Invalid book"),
            FieldRule::new("imprint")
                .required("Imprint must be specified")
                .escape(),
            FieldRule::new("status")
                .optional()
                .escape()
                .one_of(STATUS_VALUES, "Invalid status"),
            FieldRule::new("due_back").optional().iso_date("Invalid date"),
        ])
    }

    pub fn validate(fields: &FormFields) -> Validated<Self> {
        Self::schema().apply(fields).into_outcome(|s| Self {
            book: s.value("book"),
            imprint: s.value("imprint"),
            status: s.value("status"),
            due_back: s.value("due_back"),
        })
    }

    pub fn book_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.book).ok()
    }

    /// Empty status means Maintenance, empty due date means `today`.
    pub fn into_instance(self, id: Uuid, book: Uuid, today: NaiveDate) -> BookInstance {
        BookInstance {
            id,
            book,
            status: self.status.parse().unwrap_or_default(),
            due_back: parse_iso_date(&self.due_back).unwrap_or(today),
            imprint: self.imprint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn test_status_round_trip_and_default() {
        for value in STATUS_VALUES {
            let status: BookInstanceStatus = value.parse().unwrap();
            assert_eq!(status.as_str(), *value);
        }
        assert!("Lost".parse::<BookInstanceStatus>().is_err());
        assert_eq!(BookInstanceStatus::default(), BookInstanceStatus::Maintenance);
    }

    #[test]
    fn test_invalid_due_back() {
        let fields = FormFields::new(vec![
            ("book".into(), Uuid::new_v4().to_string()),
            ("imprint".into(), "Ace, 1990".into()),
            ("status".into(), "Available".into()),
            ("due_back".into(), "not-a-date".into()),
        ]);
        let rejected = BookInstanceForm::validate(&fields).unwrap_err();
        assert_eq!(rejected.errors.len(), 1);
        assert_eq!(rejected.errors[0].msg, "Invalid date");
        assert_eq!(rejected.form.due_back, "not-a-date");
    }

    #[test]
    fn test_non_ascii_due_back_is_invalid() {
        let fields = FormFields::new(vec![
            ("book".into(), Uuid::new_v4().to_string()),
            ("imprint".into(), "Ace".into()),
            ("due_back".into(), "２０２４-０１-０２".into()),
        ]);
        let rejected = BookInstanceForm::validate(&fields).unwrap_err();
        assert_eq!(rejected.errors[0].msg, "Invalid date");
    }

    #[test]
    fn test_invalid_status() {
        let fields = FormFields::new(vec![
            ("book".into(), Uuid::new_v4().to_string()),
            ("imprint".into(), "Ace".into()),
            ("status".into(), "Lost".into()),
        ]);
        let rejected = BookInstanceForm::validate(&fields).unwrap_err();
        assert_eq!(rejected.errors[0].msg, "Invalid status");
    }

    #[test]
    fn test_defaults_applied() {
        let book = Uuid::new_v4();
        let fields = FormFields::new(vec![
            ("book".into(), book.to_string()),
            ("imprint".into(), "Ace".into()),
            ("status".into(), "".into()),
            ("due_back".into(), "".into()),
        ]);
        let form = BookInstanceForm::validate(&fields).unwrap();
        assert_eq!(form.book_id(), Some(book));

        let instance = form.into_instance(Uuid::new_v4(), book, today());
        assert_eq!(instance.status, BookInstanceStatus::Maintenance);
        assert_eq!(instance.due_back, today());
        assert_eq!(instance.due_back_formatted(), "May 1, 2024");
        assert_eq!(instance.due_back_form_value(), "2024-05-01");
        assert_eq!(instance.url(), format!("/catalog/bookinstance/{}", instance.id));
    }
}
