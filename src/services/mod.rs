//! Controller flows.
//!
//! One service per entity plus the catalog home page. Every flow returns a
//! [`Page`](crate::views::Page): a view to render or a URL to redirect to.
//! Field validation failures and blocked deletions are ordinary pages, only
//! missing records and backend failures are errors.

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod catalog;
pub mod genres;

use uuid::Uuid;

use crate::{repository::Repository, validation::FieldError};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub authors: authors::AuthorsService,
    pub books: books::BooksService,
    pub genres: genres::GenresService,
    pub book_instances: book_instances::BookInstancesService,
    pub catalog: catalog::CatalogService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            authors: authors::AuthorsService::new(repository.clone()),
            books: books::BooksService::new(repository.clone()),
            genres: genres::GenresService::new(repository.clone()),
            book_instances: book_instances::BookInstancesService::new(repository.clone()),
            catalog: catalog::CatalogService::new(repository),
        }
    }
}

/// Identifier taken from a URL path segment
pub(crate) fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

/// Error list of a freshly displayed form
pub(crate) fn no_errors() -> Vec<FieldError> {
    Vec::new()
}
