//! Book instances (copies) repository

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Book, BookInstance, BookInstanceStatus, BookInstanceWithBook},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookInstancesRepository: Send + Sync {
    /// All copies sorted by status, each with its book expanded
    async fn list_with_book(&self) -> AppResult<Vec<BookInstanceWithBook>>;

    /// One copy with its book expanded
    async fn find_with_book(&self, id: Uuid) -> AppResult<Option<BookInstanceWithBook>>;

    /// Copies of `book_id`
    async fn find_by_book(&self, book_id: Uuid) -> AppResult<Vec<BookInstance>>;

    async fn insert(&self, instance: &BookInstance) -> AppResult<()>;

    /// Replace the whole document stored under `instance.id`. Returns false
    /// when there is no such document.
    async fn replace(&self, instance: &BookInstance) -> AppResult<bool>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;

    async fn count(&self) -> AppResult<i64>;

    async fn count_by_status(&self, status: BookInstanceStatus) -> AppResult<i64>;
}

#[derive(Clone)]
pub struct PgBookInstancesRepository {
    pool: Pool<Postgres>,
}

impl PgBookInstancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn books_by_id(&self, ids: Vec<Uuid>) -> AppResult<HashMap<Uuid, Book>> {
        let rows = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|b| (b.id, b)).collect())
    }
}

#[async_trait]
impl BookInstancesRepository for PgBookInstancesRepository {
    async fn list_with_book(&self) -> AppResult<Vec<BookInstanceWithBook>> {
        let instances =
            sqlx::query_as::<_, BookInstance>("SELECT * FROM book_instances ORDER BY status")
                .fetch_all(&self.pool)
                .await?;

        let books = self
            .books_by_id(instances.iter().map(|i| i.book).collect())
            .await?;

        Ok(instances
            .into_iter()
            .map(|instance| BookInstanceWithBook {
                book: books.get(&instance.book).cloned(),
                instance,
            })
            .collect())
    }

    async fn find_with_book(&self, id: Uuid) -> AppResult<Option<BookInstanceWithBook>> {
        let Some(instance) =
            sqlx::query_as::<_, BookInstance>("SELECT * FROM book_instances WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
        else {
            return Ok(None);
        };

        let mut books = self.books_by_id(vec![instance.book]).await?;
        Ok(Some(BookInstanceWithBook {
            book: books.remove(&instance.book),
            instance,
        }))
    }

    async fn find_by_book(&self, book_id: Uuid) -> AppResult<Vec<BookInstance>> {
        let rows = sqlx::query_as::<_, BookInstance>(
            "SELECT * FROM book_instances WHERE book = $1 ORDER BY status",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert(&self, instance: &BookInstance) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO book_instances (id, book, imprint, status, due_back)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(instance.id)
        .bind(instance.book)
        .bind(&instance.imprint)
        .bind(instance.status)
        .bind(instance.due_back)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn replace(&self, instance: &BookInstance) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE book_instances
            SET book = $2, imprint = $3, status = $4, due_back = $5
            WHERE id = $1
            "#,
        )
        .bind(instance.id)
        .bind(instance.book)
        .bind(&instance.imprint)
        .bind(instance.status)
        .bind(instance.due_back)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM book_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_by_status(&self, status: BookInstanceStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
