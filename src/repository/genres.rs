//! Genres repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{error::AppResult, models::Genre};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenresRepository: Send + Sync {
    /// All genres, sorted by name
    async fn list(&self) -> AppResult<Vec<Genre>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Genre>>;

    /// Exact match on the stored (escaped) name
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Genre>>;

    async fn insert(&self, genre: &Genre) -> AppResult<()>;

    /// Replace the whole document stored under `genre.id`. Returns false
    /// when there is no such document.
    async fn replace(&self, genre: &Genre) -> AppResult<bool>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;

    async fn count(&self) -> AppResult<i64>;
}

#[derive(Clone)]
pub struct PgGenresRepository {
    pool: Pool<Postgres>,
}

impl PgGenresRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GenresRepository for PgGenresRepository {
    async fn list(&self) -> AppResult<Vec<Genre>> {
        let rows = sqlx::query_as::<_, Genre>("SELECT * FROM genres ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Genre>> {
        let row = sqlx::query_as::<_, Genre>("SELECT * FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Genre>> {
        let row = sqlx::query_as::<_, Genre>("SELECT * FROM genres WHERE name = $1 LIMIT 1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert(&self, genre: &Genre) -> AppResult<()> {
        sqlx::query("INSERT INTO genres (id, name) VALUES ($1, $2)")
            .bind(genre.id)
            .bind(&genre.name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn replace(&self, genre: &Genre) -> AppResult<bool> {
        let result = sqlx::query("UPDATE genres SET name = $2 WHERE id = $1")
            .bind(genre.id)
            .bind(&genre.name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM genres WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM genres")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
