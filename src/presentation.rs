//! Presentation adapter.
//!
//! Stored text is escaped on write. Every record handed to a template goes
//! through this module exactly once: text fields are decoded back to their
//! original characters and the derived display values are computed. The
//! template engine escapes again on output.

use serde::Serialize;
use uuid::Uuid;

use crate::models::{
    Author, AuthorForm, Book, BookDetail, BookForm, BookInstance, BookInstanceForm, BookTitle,
    Genre, GenreForm,
};
use crate::validation::decode;

/// Reverse write-time escaping on every text field of a record.
pub trait Unescape {
    fn unescaped(&self) -> Self;
}

impl Unescape for Author {
    fn unescaped(&self) -> Self {
        Self {
            first_name: decode(&self.first_name),
            family_name: decode(&self.family_name),
            ..self.clone()
        }
    }
}

impl Unescape for Genre {
    fn unescaped(&self) -> Self {
        Self {
            name: decode(&self.name),
            ..self.clone()
        }
    }
}

impl Unescape for Book {
    fn unescaped(&self) -> Self {
        Self {
            title: decode(&self.title),
            summary: decode(&self.summary),
            isbn: decode(&self.isbn),
            ..self.clone()
        }
    }
}

impl Unescape for BookInstance {
    fn unescaped(&self) -> Self {
        Self {
            imprint: decode(&self.imprint),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthorView {
    pub id: String,
    pub url: String,
    pub first_name: String,
    pub family_name: String,
    pub name: String,
    pub lifespan: String,
    pub date_of_birth: String,
    pub date_of_death: String,
}

impl From<&Author> for AuthorView {
    fn from(author: &Author) -> Self {
        let author = author.unescaped();
        Self {
            id: author.id.to_string(),
            url: author.url(),
            name: author.name(),
            lifespan: author.lifespan_formatted(),
            date_of_birth: author.date_of_birth_form_value(),
            date_of_death: author.date_of_death_form_value(),
            first_name: author.first_name,
            family_name: author.family_name,
        }
    }
}

impl AuthorView {
    /// Values of a rejected form, for redisplay.
    pub fn from_form(form: &AuthorForm) -> Self {
        let first_name = decode(&form.first_name);
        let family_name = decode(&form.family_name);
        Self {
            name: format!("{} {}", first_name, family_name).trim().to_string(),
            first_name,
            family_name,
            date_of_birth: form.date_of_birth.clone(),
            date_of_death: form.date_of_death.clone(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenreView {
    pub id: String,
    pub url: String,
    pub name: String,
}

impl From<&Genre> for GenreView {
    fn from(genre: &Genre) -> Self {
        let genre = genre.unescaped();
        Self {
            id: genre.id.to_string(),
            url: genre.url(),
            name: genre.name,
        }
    }
}

impl GenreView {
    pub fn from_form(form: &GenreForm) -> Self {
        Self {
            name: decode(&form.name),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookView {
    pub id: String,
    pub url: String,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author_id: String,
    pub author: Option<AuthorView>,
    pub genres: Vec<GenreView>,
}

impl From<&Book> for BookView {
    fn from(book: &Book) -> Self {
        let book = book.unescaped();
        Self {
            id: book.id.to_string(),
            url: book.url(),
            author_id: book.author.to_string(),
            title: book.title,
            summary: book.summary,
            isbn: book.isbn,
            author: None,
            genres: Vec::new(),
        }
    }
}

impl From<&BookDetail> for BookView {
    fn from(detail: &BookDetail) -> Self {
        Self {
            author: detail.author.as_ref().map(AuthorView::from),
            genres: detail.genres.iter().map(GenreView::from).collect(),
            ..Self::from(&detail.book)
        }
    }
}

impl BookView {
    pub fn with_author(mut self, author: Option<&Author>) -> Self {
        self.author = author.map(AuthorView::from);
        self
    }

    pub fn from_form(form: &BookForm) -> Self {
        Self {
            title: decode(&form.title),
            summary: decode(&form.summary),
            isbn: decode(&form.isbn),
            author_id: decode(&form.author),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookInstanceView {
    pub id: String,
    pub url: String,
    pub imprint: String,
    pub status: String,
    pub due_back: String,
    pub due_back_form: String,
    pub book_id: String,
    pub book: Option<BookView>,
}

impl From<&BookInstance> for BookInstanceView {
    fn from(instance: &BookInstance) -> Self {
        let instance = instance.unescaped();
        Self {
            id: instance.id.to_string(),
            url: instance.url(),
            status: instance.status.to_string(),
            due_back: instance.due_back_formatted(),
            due_back_form: instance.due_back_form_value(),
            book_id: instance.book.to_string(),
            imprint: instance.imprint,
            book: None,
        }
    }
}

impl BookInstanceView {
    pub fn with_book(mut self, book: Option<&Book>) -> Self {
        self.book = book.map(BookView::from);
        self
    }

    pub fn from_form(form: &BookInstanceForm) -> Self {
        Self {
            imprint: decode(&form.imprint),
            status: decode(&form.status),
            due_back_form: form.due_back.clone(),
            book_id: decode(&form.book),
            ..Self::default()
        }
    }
}

/// Entry of the author select list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorOption {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

pub fn author_options(authors: &[Author], selected: &str) -> Vec<AuthorOption> {
    authors
        .iter()
        .map(|a| {
            let view = AuthorView::from(a);
            AuthorOption {
                selected: view.id == selected,
                id: view.id,
                name: view.name,
            }
        })
        .collect()
}

/// Entry of the genre checkbox group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreOption {
    pub id: String,
    pub name: String,
    pub checked: bool,
}

pub fn genre_options(genres: &[Genre], checked: &[Uuid]) -> Vec<GenreOption> {
    genres
        .iter()
        .map(|g| GenreOption {
            id: g.id.to_string(),
            name: decode(&g.name),
            checked: checked.contains(&g.id),
        })
        .collect()
}

/// Entry of the book select list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookOption {
    pub id: String,
    pub title: String,
    pub selected: bool,
}

pub fn book_options(books: &[BookTitle], selected: &str) -> Vec<BookOption> {
    books
        .iter()
        .map(|b| {
            let id = b.id.to_string();
            BookOption {
                selected: id == selected,
                id,
                title: decode(&b.title),
            }
        })
        .collect()
}

/// Entry of the status select list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusOption {
    pub value: &'static str,
    pub selected: bool,
}

pub fn status_options(selected: &str) -> Vec<StatusOption> {
    crate::models::book_instance::STATUS_VALUES
        .iter()
        .map(|&value| StatusOption {
            value,
            selected: value == selected,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::escape;
    use chrono::NaiveDate;

    fn stored_author() -> Author {
        Author {
            id: Uuid::new_v4(),
            first_name: escape("Ngũgĩ"),
            family_name: escape("wa Thiong'o"),
            date_of_birth: NaiveDate::from_ymd_opt(1938, 1, 5),
            date_of_death: None,
        }
    }

    #[test]
    fn test_author_view_decodes_and_derives() {
        let author = stored_author();
        let view = AuthorView::from(&author);
        assert_eq!(view.family_name, "wa Thiong'o");
        assert_eq!(view.name, "Ngũgĩ wa Thiong'o");
        assert_eq!(view.lifespan, "Jan 5, 1938 - Unknown");
        assert_eq!(view.date_of_birth, "1938-01-05");
        assert_eq!(view.url, author.url());
    }

    #[test]
    fn test_unescape_is_idempotent_on_plain_text() {
        let genre = Genre {
            id: Uuid::new_v4(),
            name: "Science Fiction".into(),
        };
        assert_eq!(genre.unescaped(), genre);
        assert_eq!(genre.unescaped().unescaped(), genre);
    }

    #[test]
    fn test_form_redisplay_decodes_once() {
        let form = GenreForm {
            name: escape("Fish & Chips"),
        };
        assert_eq!(GenreView::from_form(&form).name, "Fish & Chips");

        let form = BookForm {
            title: escape("a &amp; b"),
            ..BookForm::default()
        };
        assert_eq!(BookView::from_form(&form).title, "a &amp; b");
    }

    #[test]
    fn test_genre_options_checked() {
        let genres = vec![
            Genre { id: Uuid::new_v4(), name: "Fantasy".into() },
            Genre { id: Uuid::new_v4(), name: escape("Horror & Gothic") },
        ];
        let options = genre_options(&genres, &[genres[1].id]);
        assert!(!options[0].checked);
        assert!(options[1].checked);
        assert_eq!(options[1].name, "Horror & Gothic");
    }

    #[test]
    fn test_select_options() {
        let author = stored_author();
        let options = author_options(std::slice::from_ref(&author), &author.id.to_string());
        assert!(options[0].selected);

        let titles = vec![BookTitle { id: Uuid::new_v4(), title: escape("<Dune>") }];
        let options = book_options(&titles, "");
        assert_eq!(options[0].title, "<Dune>");
        assert!(!options[0].selected);

        let statuses = status_options("Loaned");
        assert_eq!(statuses.iter().filter(|s| s.selected).count(), 1);
        assert_eq!(statuses[0].value, "Maintenance");
    }
}
