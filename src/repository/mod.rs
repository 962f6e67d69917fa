//! Repository layer for database operations.
//!
//! One trait per entity collection. Controllers receive the collections they
//! need through [`Repository`] instead of looking them up globally, so the
//! same flows run against Postgres or the in-memory store.

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod genres;
pub mod memory;

use std::sync::Arc;

use sqlx::{Pool, Postgres};

pub use authors::AuthorsRepository;
pub use book_instances::BookInstancesRepository;
pub use books::BooksRepository;
pub use genres::GenresRepository;
pub use memory::MemoryStore;

/// Handles on every entity collection
#[derive(Clone)]
pub struct Repository {
    pub authors: Arc<dyn AuthorsRepository>,
    pub genres: Arc<dyn GenresRepository>,
    pub books: Arc<dyn BooksRepository>,
    pub book_instances: Arc<dyn BookInstancesRepository>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            authors: Arc::new(authors::PgAuthorsRepository::new(pool.clone())),
            genres: Arc::new(genres::PgGenresRepository::new(pool.clone())),
            books: Arc::new(books::PgBooksRepository::new(pool.clone())),
            book_instances: Arc::new(book_instances::PgBookInstancesRepository::new(pool)),
        }
    }

    /// Repository whose collections all live in `store`
    pub fn in_memory(store: MemoryStore) -> Self {
        Self {
            authors: Arc::new(store.clone()),
            genres: Arc::new(store.clone()),
            books: Arc::new(store.clone()),
            book_instances: Arc::new(store),
        }
    }
}
