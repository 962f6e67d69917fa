//! Genre pages

use uuid::Uuid;

use super::{no_errors, parse_id};
use crate::{
    error::{AppError, AppResult},
    models::{Book, Genre, GenreForm},
    presentation::{BookView, GenreView},
    repository::Repository,
    validation::{FieldError, FormFields, Rejected},
    views::{Page, View},
};

const LIST_URL: &str = "/catalog/genres";

fn not_found() -> AppError {
    AppError::NotFound("Genre not found".to_string())
}

#[derive(Clone)]
pub struct GenresService {
    repository: Repository,
}

impl GenresService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Page> {
        let genres = self.repository.genres.list().await?;
        let genre_list: Vec<GenreView> = genres.iter().map(GenreView::from).collect();

        Ok(View::new("genre_list.html", "Genre List")
            .with("genre_list", &genre_list)
            .into())
    }

    /// One genre with the books tagged with it
    pub async fn detail(&self, id: &str) -> AppResult<Page> {
        let id = parse_id(id).ok_or_else(not_found)?;
        let (genre, books) = self.with_books(id).await?;
        let genre = genre.ok_or_else(not_found)?;

        Ok(View::new("genre_detail.html", "Genre Detail")
            .with("genre", &GenreView::from(&genre))
            .with("genre_books", &book_views(&books))
            .into())
    }

    pub fn create_form(&self) -> Page {
        form_view("Create Genre", &GenreView::default(), &no_errors())
    }

    /// Create a genre, or redirect to the one already stored under the same
    /// name.
    pub async fn create(&self, fields: FormFields) -> AppResult<Page> {
        let form = match GenreForm::validate(&fields) {
            Ok(form) => form,
            Err(Rejected { form, errors }) => {
                return Ok(form_view("Create Genre", &GenreView::from_form(&form), &errors));
            }
        };

        // Not atomic: two concurrent creates of one name can both insert.
        if let Some(existing) = self.repository.genres.find_by_name(&form.name).await? {
            tracing::info!("Genre {} already exists", existing.id);
            return Ok(Page::redirect(existing.url()));
        }

        let genre = form.into_genre(Uuid::new_v4());
        self.repository.genres.insert(&genre).await?;
        tracing::info!("Created genre {}", genre.id);
        Ok(Page::redirect(genre.url()))
    }

    pub async fn update_form(&self, id: &str) -> AppResult<Page> {
        let id = parse_id(id).ok_or_else(not_found)?;
        let genre = self
            .repository
            .genres
            .find_by_id(id)
            .await?
            .ok_or_else(not_found)?;

        Ok(form_view("Update Genre", &GenreView::from(&genre), &no_errors()))
    }

    pub async fn update(&self, id: &str, fields: FormFields) -> AppResult<Page> {
        let id = parse_id(id).ok_or_else(not_found)?;
        let form = match GenreForm::validate(&fields) {
            Ok(form) => form,
            Err(Rejected { form, errors }) => {
                return Ok(form_view("Update Genre", &GenreView::from_form(&form), &errors));
            }
        };

        let genre = form.into_genre(id);
        if !self.repository.genres.replace(&genre).await? {
            return Err(not_found());
        }
        tracing::info!("Updated genre {}", genre.id);
        Ok(Page::redirect(genre.url()))
    }

    pub async fn delete_form(&self, id: &str) -> AppResult<Page> {
        let Some(id) = parse_id(id) else {
            return Ok(Page::redirect(LIST_URL));
        };
        let (genre, books) = self.with_books(id).await?;
        let Some(genre) = genre else {
            return Ok(Page::redirect(LIST_URL));
        };

        Ok(delete_view(&genre, &books))
    }

    /// Delete unless some book is still tagged with the genre
    pub async fn delete(&self, id: &str) -> AppResult<Page> {
        let Some(id) = parse_id(id) else {
            return Ok(Page::redirect(LIST_URL));
        };
        let (genre, books) = self.with_books(id).await?;
        let Some(genre) = genre else {
            return Ok(Page::redirect(LIST_URL));
        };

        if !books.is_empty() {
            tracing::info!("Delete of genre {} blocked by {} book(s)", id, books.len());
            return Ok(delete_view(&genre, &books));
        }

        self.repository.genres.delete(id).await?;
        tracing::info!("Deleted genre {}", id);
        Ok(Page::redirect(LIST_URL))
    }

    async fn with_books(&self, id: Uuid) -> AppResult<(Option<Genre>, Vec<Book>)> {
        tokio::try_join!(
            self.repository.genres.find_by_id(id),
            self.repository.books.find_by_genre(id),
        )
    }
}

fn book_views(books: &[Book]) -> Vec<BookView> {
    books.iter().map(BookView::from).collect()
}

fn form_view(title: &str, genre: &GenreView, errors: &[FieldError]) -> Page {
    View::new("genre_form.html", title)
        .with("genre", genre)
        .with("errors", errors)
        .into()
}

fn delete_view(genre: &Genre, books: &[Book]) -> Page {
    View::new("genre_delete.html", "Delete Genre")
        .with("genre", &GenreView::from(genre))
        .with("genre_books", &book_views(books))
        .into()
}
