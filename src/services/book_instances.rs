//! Book instance (copy) pages

use chrono::Utc;
use uuid::Uuid;

use super::{no_errors, parse_id};
use crate::{
    error::{AppError, AppResult},
    models::{BookInstanceForm, BookInstanceWithBook},
    presentation::{book_options, status_options, BookInstanceView},
    repository::Repository,
    validation::{FieldError, FormFields, Rejected},
    views::{Page, View},
};

const LIST_URL: &str = "/catalog/bookinstances";

type Checked = Result<(BookInstanceForm, Uuid), Rejected<BookInstanceForm>>;

fn not_found() -> AppError {
    AppError::NotFound("Book copy not found".to_string())
}

fn instance_view(found: &BookInstanceWithBook) -> BookInstanceView {
    BookInstanceView::from(&found.instance).with_book(found.book.as_ref())
}

#[derive(Clone)]
pub struct BookInstancesService {
    repository: Repository,
}

impl BookInstancesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All copies sorted by status, with their book
    pub async fn list(&self) -> AppResult<Page> {
        let copies = self.repository.book_instances.list_with_book().await?;
        let bookinstance_list: Vec<BookInstanceView> = copies.iter().map(instance_view).collect();

        Ok(View::new("bookinstance_list.html", "Book Instance List")
            .with("bookinstance_list", &bookinstance_list)
            .into())
    }

    pub async fn detail(&self, id: &str) -> AppResult<Page> {
        let id = parse_id(id).ok_or_else(not_found)?;
        let found = self
            .repository
            .book_instances
            .find_with_book(id)
            .await?
            .ok_or_else(not_found)?;

        let bookinstance = instance_view(&found);
        let book_title = bookinstance
            .book
            .as_ref()
            .map(|b| b.title.as_str())
            .unwrap_or_default();

        Ok(View::new("bookinstance_detail.html", &format!("Copy: {}", book_title))
            .with("bookinstance", &bookinstance)
            .into())
    }

    pub async fn create_form(&self) -> AppResult<Page> {
        self.form_view("Create Book Instance", &BookInstanceView::default(), &no_errors())
            .await
    }

    pub async fn create(&self, fields: FormFields) -> AppResult<Page> {
        let (form, book) = match self.check(&fields).await? {
            Ok(accepted) => accepted,
            Err(rejected) => return self.redisplay("Create Book Instance", rejected).await,
        };

        let instance = form.into_instance(Uuid::new_v4(), book, Utc::now().date_naive());
        self.repository.book_instances.insert(&instance).await?;
        tracing::info!("Created book instance {} of book {}", instance.id, book);
        Ok(Page::redirect(instance.url()))
    }

    pub async fn update_form(&self, id: &str) -> AppResult<Page> {
        let id = parse_id(id).ok_or_else(not_found)?;
        let found = self
            .repository
            .book_instances
            .find_with_book(id)
            .await?
            .ok_or_else(not_found)?;

        self.form_view("Update Book Instance", &instance_view(&found), &no_errors())
            .await
    }

    pub async fn update(&self, id: &str, fields: FormFields) -> AppResult<Page> {
        let id = parse_id(id).ok_or_else(not_found)?;
        let (form, book) = match self.check(&fields).await? {
            Ok(accepted) => accepted,
            Err(rejected) => return self.redisplay("Update Book Instance", rejected).await,
        };

        let instance = form.into_instance(id, book, Utc::now().date_naive());
        if !self.repository.book_instances.replace(&instance).await? {
            return Err(not_found());
        }
        tracing::info!("Updated book instance {}", instance.id);
        Ok(Page::redirect(instance.url()))
    }

    pub async fn delete_form(&self, id: &str) -> AppResult<Page> {
        let Some(id) = parse_id(id) else {
            return Ok(Page::redirect(LIST_URL));
        };
        let Some(found) = self.repository.book_instances.find_with_book(id).await? else {
            return Ok(Page::redirect(LIST_URL));
        };

        Ok(View::new("bookinstance_delete.html", "Delete Book Instance")
            .with("bookinstance", &instance_view(&found))
            .into())
    }

    /// Copies have no dependents: deletion always proceeds
    pub async fn delete(&self, id: &str) -> AppResult<Page> {
        if let Some(id) = parse_id(id) {
            self.repository.book_instances.delete(id).await?;
            tracing::info!("Deleted book instance {}", id);
        }
        Ok(Page::redirect(LIST_URL))
    }

    /// Field validation, then existence of the selected book
    async fn check(&self, fields: &FormFields) -> AppResult<Checked> {
        let form = match BookInstanceForm::validate(fields) {
            Ok(form) => form,
            Err(rejected) => return Ok(Err(rejected)),
        };

        let book = match form.book_id() {
            Some(id) => self.repository.books.find_by_id(id).await?,
            None => None,
        };
        Ok(match book {
            Some(book) => Ok((form, book.id)),
            None => Err(Rejected {
                form,
                errors: vec![FieldError::new("book", "Book must exist")],
            }),
        })
    }

    async fn redisplay(
        &self,
        title: &str,
        rejected: Rejected<BookInstanceForm>,
    ) -> AppResult<Page> {
        let bookinstance = BookInstanceView::from_form(&rejected.form);
        self.form_view(title, &bookinstance, &rejected.errors).await
    }

    /// The copy form with every book title to choose from
    async fn form_view(
        &self,
        title: &str,
        bookinstance: &BookInstanceView,
        errors: &[FieldError],
    ) -> AppResult<Page> {
        let titles = self.repository.books.list_titles().await?;

        Ok(View::new("bookinstance_form.html", title)
            .with("bookinstance", bookinstance)
            .with("book_list", &book_options(&titles, &bookinstance.book_id))
            .with("statuses", &status_options(&bookinstance.status))
            .with("errors", errors)
            .into())
    }
}
