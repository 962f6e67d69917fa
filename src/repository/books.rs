//! Books repository

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Author, Book, BookDetail, BookTitle, BookWithAuthor, Genre},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BooksRepository: Send + Sync {
    /// All books sorted by title, each with its author expanded
    async fn list_with_author(&self) -> AppResult<Vec<BookWithAuthor>>;

    /// One book with author and genres expanded
    async fn find_detail(&self, id: Uuid) -> AppResult<Option<BookDetail>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Book>>;

    /// Books written by `author_id`, sorted by title
    async fn find_by_author(&self, author_id: Uuid) -> AppResult<Vec<Book>>;

    /// Books tagged with `genre_id`, sorted by title
    async fn find_by_genre(&self, genre_id: Uuid) -> AppResult<Vec<Book>>;

    /// Id and title of every book, sorted by title
    async fn list_titles(&self) -> AppResult<Vec<BookTitle>>;

    async fn insert(&self, book: &Book) -> AppResult<()>;

    /// Replace the whole document stored under `book.id`. Returns false
    /// when there is no such document.
    async fn replace(&self, book: &Book) -> AppResult<bool>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;

    async fn count(&self) -> AppResult<i64>;
}

#[derive(Clone)]
pub struct PgBooksRepository {
    pool: Pool<Postgres>,
}

impl PgBooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn authors_by_id(&self, ids: Vec<Uuid>) -> AppResult<HashMap<Uuid, Author>> {
        let rows = sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|a| (a.id, a)).collect())
    }

    async fn genres_by_id(&self, ids: Vec<Uuid>) -> AppResult<Vec<Genre>> {
        let rows = sqlx::query_as::<_, Genre>("SELECT * FROM genres WHERE id = ANY($1) ORDER BY name")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl BooksRepository for PgBooksRepository {
    async fn list_with_author(&self) -> AppResult<Vec<BookWithAuthor>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY title")
            .fetch_all(&self.pool)
            .await?;

        let authors = self
            .authors_by_id(books.iter().map(|b| b.author).collect())
            .await?;

        Ok(books
            .into_iter()
            .map(|book| BookWithAuthor {
                author: authors.get(&book.author).cloned(),
                book,
            })
            .collect())
    }

    async fn find_detail(&self, id: Uuid) -> AppResult<Option<BookDetail>> {
        let Some(book) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let (mut authors, genres) = tokio::try_join!(
            self.authors_by_id(vec![book.author]),
            self.genres_by_id(book.genre.clone()),
        )?;

        Ok(Some(BookDetail {
            author: authors.remove(&book.author),
            genres,
            book,
        }))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_author(&self, author_id: Uuid) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE author = $1 ORDER BY title")
            .bind(author_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_genre(&self, genre_id: Uuid) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE $1 = ANY(genre) ORDER BY title",
        )
        .bind(genre_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_titles(&self) -> AppResult<Vec<BookTitle>> {
        let rows = sqlx::query_as::<_, BookTitle>("SELECT id, title FROM books ORDER BY title")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn insert(&self, book: &Book) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO books (id, title, summary, isbn, author, genre)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.summary)
        .bind(&book.isbn)
        .bind(book.author)
        .bind(&book.genre)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn replace(&self, book: &Book) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = $2, summary = $3, isbn = $4, author = $5, genre = $6
            WHERE id = $1
            "#,
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.summary)
        .bind(&book.isbn)
        .bind(book.author)
        .bind(&book.genre)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
