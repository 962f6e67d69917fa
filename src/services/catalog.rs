//! Catalog home page

use serde::Serialize;

use crate::{
    error::AppResult,
    models::BookInstanceStatus,
    repository::Repository,
    views::{Page, View},
};

/// Record counts shown on the home page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogCounts {
    pub book_count: i64,
    pub book_instance_count: i64,
    pub book_instance_available_count: i64,
    pub author_count: i64,
    pub genre_count: i64,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn counts(&self) -> AppResult<CatalogCounts> {
        let repo = &self.repository;
        let (books, copies, available, authors, genres) = tokio::try_join!(
            repo.books.count(),
            repo.book_instances.count(),
            repo.book_instances.count_by_status(BookInstanceStatus::Available),
            repo.authors.count(),
            repo.genres.count(),
        )?;

        Ok(CatalogCounts {
            book_count: books,
            book_instance_count: copies,
            book_instance_available_count: available,
            author_count: authors,
            genre_count: genres,
        })
    }

    /// Home page. A failed count is shown on the page instead of failing
    /// the request.
    pub async fn home(&self) -> Page {
        let view = View::new("index.html", "Local Library Home");
        match self.counts().await {
            Ok(data) => view.with("data", &data).into(),
            Err(err) => view.with("error", &err.public_message()).into(),
        }
    }
}
