//! Book model, populated views of it, and the book form

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{Author, Genre, CATALOG_PREFIX};
use crate::validation::{FieldRule, FormFields, FormSchema, Validated};

/// Book record as stored. `author` and `genre` reference other documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author: Uuid,
    pub genre: Vec<Uuid>,
}

impl Book {
    pub fn url(&self) -> String {
        book_url(self.id)
    }
}

pub fn book_url(id: Uuid) -> String {
    format!("{}/book/{}", CATALOG_PREFIX, id)
}

/// Book with its author expanded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookWithAuthor {
    pub book: Book,
    pub author: Option<Author>,
}

/// Book with author and genres expanded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDetail {
    pub book: Book,
    pub author: Option<Author>,
    pub genres: Vec<Genre>,
}

/// Projection used for selection lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct BookTitle {
    pub id: Uuid,
    pub title: String,
}

/// Sanitized book form. Text fields are in stored (escaped) form; `author`
/// and `genre` hold the submitted identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub summary: String,
    pub isbn: String,
    pub genre: Vec<String>,
}

impl BookForm {
    fn schema() -> FormSchema {
        FormSchema::new(vec![
            FieldRule::new("title")
                .required("Title must not be empty.")
                .escape(),
            FieldRule::new("author")
                .required("Author must not be empty.")
                .escape()
                .identifier("Invalid author"),
            FieldRule::new("summary")
                .required("Summary must not be empty.")
                .escape(),
            FieldRule::new("isbn")
                .required("ISBN must not be empty")
                .escape(),
            FieldRule::many("genre").escape().identifier("Invalid genre"),
        ])
    }

    pub fn validate(fields: &FormFields) -> Validated<Self> {
        Self::schema().apply(fields).into_outcome(|s| Self {
            title: s.value("title"),
            author: s.value("author"),
            summary: s.value("summary"),
            isbn: s.value("isbn"),
            genre: s.list("genre"),
        })
    }

    pub fn author_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.author).ok()
    }

    pub fn genre_ids(&self) -> Vec<Uuid> {
        self.genre
            .iter()
            .filter_map(|g| Uuid::parse_str(g).ok())
            .collect()
    }

    pub fn into_book(self, id: Uuid, author: Uuid) -> Book {
        let genre = self.genre_ids();
        Book {
            id,
            title: self.title,
            summary: self.summary,
            isbn: self.isbn,
            author,
            genre,
        }
    }
}
