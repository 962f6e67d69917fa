//! Author pages

use uuid::Uuid;

use super::{no_errors, parse_id};
use crate::{
    error::{AppError, AppResult},
    models::{Author, AuthorForm, Book},
    presentation::{AuthorView, BookView},
    repository::Repository,
    validation::{FieldError, FormFields, Rejected},
    views::{Page, View},
};

const LIST_URL: &str = "/catalog/authors";

fn not_found() -> AppError {
    AppError::NotFound("Author not found".to_string())
}

fn book_views(books: &[Book]) -> Vec<BookView> {
    books.iter().map(BookView::from).collect()
}

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
}

impl AuthorsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All authors sorted by family name
    pub async fn list(&self) -> AppResult<Page> {
        let authors = self.repository.authors.list().await?;
        let author_list: Vec<AuthorView> = authors.iter().map(AuthorView::from).collect();

        Ok(View::new("author_list.html", "Author List")
            .with("author_list", &author_list)
            .into())
    }

    /// One author with the books they wrote
    pub async fn detail(&self, id: &str) -> AppResult<Page> {
        let id = parse_id(id).ok_or_else(not_found)?;
        let (author, books) = tokio::try_join!(
            self.repository.authors.find_by_id(id),
            self.repository.books.find_by_author(id),
        )?;
        let author = author.ok_or_else(not_found)?;

        Ok(View::new("author_detail.html", "Author Detail")
            .with("author", &AuthorView::from(&author))
            .with("author_books", &book_views(&books))
            .into())
    }

    pub fn create_form(&self) -> Page {
        form_view("Create Author", &AuthorView::default(), &no_errors())
    }

    pub async fn create(&self, fields: FormFields) -> AppResult<Page> {
        let form = match AuthorForm::validate(&fields) {
            Ok(form) => form,
            Err(Rejected { form, errors }) => {
                return Ok(form_view("Create Author", &AuthorView::from_form(&form), &errors));
            }
        };

        let author = form.into_author(Uuid::new_v4());
        self.repository.authors.insert(&author).await?;
        tracing::info!("Created author {}", author.id);
        Ok(Page::redirect(author.url()))
    }

    pub async fn update_form(&self, id: &str) -> AppResult<Page> {
        let id = parse_id(id).ok_or_else(not_found)?;
        let author = self
            .repository
            .authors
            .find_by_id(id)
            .await?
            .ok_or_else(not_found)?;

        Ok(form_view("Update Author", &AuthorView::from(&author), &no_errors()))
    }

    /// Replace the stored author, keeping its identifier
    pub async fn update(&self, id: &str, fields: FormFields) -> AppResult<Page> {
        let id = parse_id(id).ok_or_else(not_found)?;
        let form = match AuthorForm::validate(&fields) {
            Ok(form) => form,
            Err(Rejected { form, errors }) => {
                return Ok(form_view("Update Author", &AuthorView::from_form(&form), &errors));
            }
        };

        let author = form.into_author(id);
        if !self.repository.authors.replace(&author).await? {
            return Err(not_found());
        }
        tracing::info!("Updated author {}", author.id);
        Ok(Page::redirect(author.url()))
    }

    /// Confirmation page. A missing author counts as already deleted.
    pub async fn delete_form(&self, id: &str) -> AppResult<Page> {
        let Some(id) = parse_id(id) else {
            return Ok(Page::redirect(LIST_URL));
        };
        let (author, books) = self.with_books(id).await?;
        let Some(author) = author else {
            return Ok(Page::redirect(LIST_URL));
        };

        Ok(delete_view(&author, &books))
    }

    /// Delete unless the author still has books
    pub async fn delete(&self, id: &str) -> AppResult<Page> {
        let Some(id) = parse_id(id) else {
            return Ok(Page::redirect(LIST_URL));
        };
        let (author, books) = self.with_books(id).await?;
        let Some(author) = author else {
            return Ok(Page::redirect(LIST_URL));
        };

        if !books.is_empty() {
            tracing::info!("Delete of author {} blocked by {} book(s)", id, books.len());
            return Ok(delete_view(&author, &books));
        }

        self.repository.authors.delete(id).await?;
        tracing::info!("Deleted author {}", id);
        Ok(Page::redirect(LIST_URL))
    }

    async fn with_books(&self, id: Uuid) -> AppResult<(Option<Author>, Vec<Book>)> {
        tokio::try_join!(
            self.repository.authors.find_by_id(id),
            self.repository.books.find_by_author(id),
        )
    }
}

fn form_view(title: &str, author: &AuthorView, errors: &[FieldError]) -> Page {
    View::new("author_form.html", title)
        .with("author", author)
        .with("errors", errors)
        .into()
}

fn delete_view(author: &Author, books: &[Book]) -> Page {
    View::new("author_delete.html", "Delete Author")
        .with("author", &AuthorView::from(author))
        .with("author_books", &book_views(books))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{authors::MockAuthorsRepository, MemoryStore};
    use crate::validation::escape;
    use std::sync::Arc;

    fn service() -> (AuthorsService, Repository) {
        let repository = Repository::in_memory(MemoryStore::new());
        (AuthorsService::new(repository.clone()), repository)
    }

    fn herbert_fields() -> FormFields {
        FormFields::from([
            ("first_name", "Frank"),
            ("family_name", "Herbert"),
            ("date_of_birth", "1920-10-08"),
            ("date_of_death", ""),
        ])
    }

    fn expect_view(page: Page) -> View {
        match page {
            Page::View(view) => view,
            Page::Redirect(url) => panic!("unexpected redirect to {}", url),
        }
    }

    fn expect_redirect(page: Page) -> String {
        match page {
            Page::Redirect(url) => url,
            Page::View(view) => panic!("unexpected view {}", view.template),
        }
    }

    #[tokio::test]
    async fn test_create_and_detail() {
        let (service, repository) = service();
        let url = expect_redirect(service.create(herbert_fields()).await.unwrap());

        let authors = repository.authors.list().await.unwrap();
        assert_eq!(authors.len(), 1);
        assert_eq!(url, authors[0].url());

        let id = authors[0].id.to_string();
        let view = expect_view(service.detail(&id).await.unwrap());
        assert_eq!(view.template, "author_detail.html");
        assert_eq!(view.get("author").unwrap()["name"], "Frank Herbert");
        assert_eq!(view.get("author").unwrap()["lifespan"], "Oct 8, 1920 - Unknown");
    }

    #[tokio::test]
    async fn test_create_with_empty_first_name_redisplays() {
        let (service, repository) = service();
        let fields = FormFields::from([("first_name", ""), ("family_name", "Herbert")]);
        let view = expect_view(service.create(fields).await.unwrap());

        assert_eq!(view.template, "author_form.html");
        let errors = view.get("errors").unwrap().as_array().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0]["msg"], "First name must be specified");
        assert_eq!(view.get("author").unwrap()["family_name"], "Herbert");
        assert_eq!(repository.authors.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_detail_of_missing_author_is_not_found() {
        let (service, _) = service();
        let err = service.detail(&Uuid::new_v4().to_string()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = service.update_form("not-an-id").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_keeps_identifier() {
        let (service, repository) = service();
        service.create(herbert_fields()).await.unwrap();
        let id = repository.authors.list().await.unwrap()[0].id;

        let fields = FormFields::from([("first_name", "Brian"), ("family_name", "Herbert")]);
        let url = expect_redirect(service.update(&id.to_string(), fields).await.unwrap());
        assert!(url.ends_with(&id.to_string()));

        let authors = repository.authors.list().await.unwrap();
        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].id, id);
        assert_eq!(authors[0].first_name, "Brian");
        assert_eq!(authors[0].date_of_birth, None);
    }

    #[tokio::test]
    async fn test_update_of_missing_author_is_not_found() {
        let (service, _) = service();
        let err = service
            .update(&Uuid::new_v4().to_string(), herbert_fields())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_blocked_while_books_exist() {
        let (service, repository) = service();
        service.create(herbert_fields()).await.unwrap();
        let author = repository.authors.list().await.unwrap().remove(0);
        let book = Book {
            id: Uuid::new_v4(),
            title: escape("Dune"),
            summary: "s".into(),
            isbn: "i".into(),
            author: author.id,
            genre: vec![],
        };
        repository.books.insert(&book).await.unwrap();

        let id = author.id.to_string();
        let view = expect_view(service.delete_form(&id).await.unwrap());
        assert_eq!(view.get("author_books").unwrap().as_array().unwrap().len(), 1);

        let view = expect_view(service.delete(&id).await.unwrap());
        assert_eq!(view.template, "author_delete.html");
        assert_eq!(repository.authors.count().await.unwrap(), 1);

        let other = FormFields::from([("first_name", "Ursula"), ("family_name", "LeGuin")]);
        service.create(other).await.unwrap();

        repository.books.delete(book.id).await.unwrap();
        let url = expect_redirect(service.delete(&id).await.unwrap());
        assert_eq!(url, LIST_URL);
        let remaining = repository.authors.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].family_name, "LeGuin");
    }

    #[tokio::test]
    async fn test_delete_form_of_missing_author_redirects() {
        let (service, _) = service();
        let url = expect_redirect(service.delete_form(&Uuid::new_v4().to_string()).await.unwrap());
        assert_eq!(url, LIST_URL);
        let url = expect_redirect(service.delete_form("garbage").await.unwrap());
        assert_eq!(url, LIST_URL);
    }

    #[tokio::test]
    async fn test_persistence_failure_propagates() {
        let mut authors = MockAuthorsRepository::new();
        authors
            .expect_insert()
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));

        let mut repository = Repository::in_memory(MemoryStore::new());
        repository.authors = Arc::new(authors);
        let service = AuthorsService::new(repository);

        let err = service.create(herbert_fields()).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }
}
