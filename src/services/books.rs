//! Book pages

use uuid::Uuid;

use super::{no_errors, parse_id};
use crate::{
    error::{AppError, AppResult},
    models::{Book, BookForm, BookInstance},
    presentation::{author_options, genre_options, BookInstanceView, BookView},
    repository::Repository,
    validation::{FieldError, FormFields, Rejected},
    views::{Page, View},
};

const LIST_URL: &str = "/catalog/books";

/// Accepted form with the resolved author, or the form to redisplay
type Checked = Result<(BookForm, Uuid), Rejected<BookForm>>;

fn not_found() -> AppError {
    AppError::NotFound("Book not found".to_string())
}

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All books sorted by title, with their authors
    pub async fn list(&self) -> AppResult<Page> {
        let books = self.repository.books.list_with_author().await?;
        let book_list: Vec<BookView> = books
            .iter()
            .map(|b| BookView::from(&b.book).with_author(b.author.as_ref()))
            .collect();

        Ok(View::new("book_list.html", "Book List")
            .with("book_list", &book_list)
            .into())
    }

    /// One book with author, genres and copies
    pub async fn detail(&self, id: &str) -> AppResult<Page> {
        let id = parse_id(id).ok_or_else(not_found)?;
        let (detail, copies) = tokio::try_join!(
            self.repository.books.find_detail(id),
            self.repository.book_instances.find_by_book(id),
        )?;
        let book = BookView::from(&detail.ok_or_else(not_found)?);

        Ok(View::new("book_detail.html", &book.title)
            .with("book", &book)
            .with("book_instances", &copy_views(&copies))
            .into())
    }

    pub async fn create_form(&self) -> AppResult<Page> {
        self.form_view("Create Book", &BookView::default(), &[], &no_errors())
            .await
    }

    pub async fn create(&self, fields: FormFields) -> AppResult<Page> {
        let (form, author) = match self.check(&fields).await? {
            Ok(accepted) => accepted,
            Err(rejected) => return self.redisplay("Create Book", rejected).await,
        };

        let book = form.into_book(Uuid::new_v4(), author);
        self.repository.books.insert(&book).await?;
        tracing::info!("Created book {}", book.id);
        Ok(Page::redirect(book.url()))
    }

    /// Form prefilled with the stored book, its genres checked
    pub async fn update_form(&self, id: &str) -> AppResult<Page> {
        let id = parse_id(id).ok_or_else(not_found)?;
        let book = self
            .repository
            .books
            .find_by_id(id)
            .await?
            .ok_or_else(not_found)?;

        self.form_view("Update Book", &BookView::from(&book), &book.genre, &no_errors())
            .await
    }

    pub async fn update(&self, id: &str, fields: FormFields) -> AppResult<Page> {
        let id = parse_id(id).ok_or_else(not_found)?;
        let (form, author) = match self.check(&fields).await? {
            Ok(accepted) => accepted,
            Err(rejected) => return self.redisplay("Update Book", rejected).await,
        };

        let book = form.into_book(id, author);
        if !self.repository.books.replace(&book).await? {
            return Err(not_found());
        }
        tracing::info!("Updated book {}", book.id);
        Ok(Page::redirect(book.url()))
    }

    pub async fn delete_form(&self, id: &str) -> AppResult<Page> {
        let Some(id) = parse_id(id) else {
            return Ok(Page::redirect(LIST_URL));
        };
        let (book, copies) = self.with_copies(id).await?;
        let Some(book) = book else {
            return Ok(Page::redirect(LIST_URL));
        };

        Ok(delete_view(&book, &copies))
    }

    /// Delete unless copies of the book remain
    pub async fn delete(&self, id: &str) -> AppResult<Page> {
        let Some(id) = parse_id(id) else {
            return Ok(Page::redirect(LIST_URL));
        };
        let (book, copies) = self.with_copies(id).await?;
        let Some(book) = book else {
            return Ok(Page::redirect(LIST_URL));
        };

        if !copies.is_empty() {
            tracing::info!("Delete of book {} blocked by {} copies", id, copies.len());
            return Ok(delete_view(&book, &copies));
        }

        self.repository.books.delete(id).await?;
        tracing::info!("Deleted book {}", id);
        Ok(Page::redirect(LIST_URL))
    }

    /// Field validation, then existence of the selected author
    async fn check(&self, fields: &FormFields) -> AppResult<Checked> {
        let form = match BookForm::validate(fields) {
            Ok(form) => form,
            Err(rejected) => return Ok(Err(rejected)),
        };

        let author = match form.author_id() {
            Some(id) => self.repository.authors.find_by_id(id).await?,
            None => None,
        };
        Ok(match author {
            Some(author) => Ok((form, author.id)),
            None => Err(Rejected {
                form,
                errors: vec![FieldError::new("author", "Author must exist")],
            }),
        })
    }

    async fn redisplay(&self, title: &str, rejected: Rejected<BookForm>) -> AppResult<Page> {
        let Rejected { form, errors } = rejected;
        self.form_view(title, &BookView::from_form(&form), &form.genre_ids(), &errors)
            .await
    }

    /// The book form with every author and genre to choose from
    async fn form_view(
        &self,
        title: &str,
        book: &BookView,
        checked: &[Uuid],
        errors: &[FieldError],
    ) -> AppResult<Page> {
        let (authors, genres) = tokio::try_join!(
            self.repository.authors.list(),
            self.repository.genres.list(),
        )?;

        Ok(View::new("book_form.html", title)
            .with("book", book)
            .with("authors", &author_options(&authors, &book.author_id))
            .with("genres", &genre_options(&genres, checked))
            .with("errors", errors)
            .into())
    }

    async fn with_copies(&self, id: Uuid) -> AppResult<(Option<Book>, Vec<BookInstance>)> {
        tokio::try_join!(
            self.repository.books.find_by_id(id),
            self.repository.book_instances.find_by_book(id),
        )
    }
}

fn copy_views(copies: &[BookInstance]) -> Vec<BookInstanceView> {
    copies.iter().map(BookInstanceView::from).collect()
}

fn delete_view(book: &Book, copies: &[BookInstance]) -> Page {
    View::new("book_delete.html", "Delete Book")
        .with("book", &BookView::from(book))
        .with("book_instances", &copy_views(copies))
        .into()
}
