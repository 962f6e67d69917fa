//! In-memory document store.
//!
//! Keeps every collection as a vector in insertion order behind one
//! async read-write lock. Clones share the same data. Used by the tests and by
//! the `memory` storage backend.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AuthorsRepository, BookInstancesRepository, BooksRepository, GenresRepository};
use crate::{
    error::AppResult,
    models::{
        Author, Book, BookDetail, BookInstance, BookInstanceStatus, BookInstanceWithBook,
        BookTitle, BookWithAuthor, Genre,
    },
};

#[derive(Debug, Default)]
struct Collections {
    authors: Vec<Author>,
    genres: Vec<Genre>,
    books: Vec<Book>,
    book_instances: Vec<BookInstance>,
}

/// Shared in-memory storage for all four collections
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Identity of a stored document
trait Document: Clone {
    fn id(&self) -> Uuid;
}

impl Document for Author {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Document for Genre {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Document for Book {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Document for BookInstance {
    fn id(&self) -> Uuid {
        self.id
    }
}

fn find<T: Document>(docs: &[T], id: Uuid) -> Option<T> {
    docs.iter().find(|d| d.id() == id).cloned()
}

fn replace<T: Document>(docs: &mut [T], doc: &T) -> bool {
    match docs.iter_mut().find(|d| d.id() == doc.id()) {
        Some(slot) => {
            *slot = doc.clone();
            true
        }
        None => false,
    }
}

fn remove<T: Document>(docs: &mut Vec<T>, id: Uuid) {
    docs.retain(|d| d.id() != id);
}

fn sorted_by<T: Clone, K: Ord>(docs: &[T], key: impl Fn(&T) -> K) -> Vec<T> {
    let mut out = docs.to_vec();
    out.sort_by_key(key);
    out
}

#[async_trait]
impl AuthorsRepository for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Author>> {
        let data = self.inner.read().await;
        Ok(sorted_by(&data.authors, |a| a.family_name.clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Author>> {
        Ok(find(&self.inner.read().await.authors, id))
    }

    async fn insert(&self, author: &Author) -> AppResult<()> {
        self.inner.write().await.authors.push(author.clone());
        Ok(())
    }

    async fn replace(&self, author: &Author) -> AppResult<bool> {
        Ok(replace(&mut self.inner.write().await.authors, author))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        remove(&mut self.inner.write().await.authors, id);
        Ok(())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.inner.read().await.authors.len() as i64)
    }
}

#[async_trait]
impl GenresRepository for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Genre>> {
        let data = self.inner.read().await;
        Ok(sorted_by(&data.genres, |g| g.name.clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Genre>> {
        Ok(find(&self.inner.read().await.genres, id))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Genre>> {
        let data = self.inner.read().await;
        Ok(data.genres.iter().find(|g| g.name == name).cloned())
    }

    async fn insert(&self, genre: &Genre) -> AppResult<()> {
        self.inner.write().await.genres.push(genre.clone());
        Ok(())
    }

    async fn replace(&self, genre: &Genre) -> AppResult<bool> {
        Ok(replace(&mut self.inner.write().await.genres, genre))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        remove(&mut self.inner.write().await.genres, id);
        Ok(())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.inner.read().await.genres.len() as i64)
    }
}

#[async_trait]
impl BooksRepository for MemoryStore {
    async fn list_with_author(&self) -> AppResult<Vec<BookWithAuthor>> {
        let data = self.inner.read().await;
        Ok(sorted_by(&data.books, |b| b.title.clone())
            .into_iter()
            .map(|book| BookWithAuthor {
                author: find(&data.authors, book.author),
                book,
            })
            .collect())
    }

    async fn find_detail(&self, id: Uuid) -> AppResult<Option<BookDetail>> {
        let data = self.inner.read().await;
        Ok(find(&data.books, id).map(|book| {
            let genres = data
                .genres
                .iter()
                .filter(|g| book.genre.contains(&g.id))
                .cloned()
                .collect::<Vec<_>>();
            BookDetail {
                author: find(&data.authors, book.author),
                genres: sorted_by(&genres, |g| g.name.clone()),
                book,
            }
        }))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Book>> {
        Ok(find(&self.inner.read().await.books, id))
    }

    async fn find_by_author(&self, author_id: Uuid) -> AppResult<Vec<Book>> {
        let data = self.inner.read().await;
        let books: Vec<Book> = data
            .books
            .iter()
            .filter(|b| b.author == author_id)
            .cloned()
            .collect();
        Ok(sorted_by(&books, |b| b.title.clone()))
    }

    async fn find_by_genre(&self, genre_id: Uuid) -> AppResult<Vec<Book>> {
        let data = self.inner.read().await;
        let books: Vec<Book> = data
            .books
            .iter()
            .filter(|b| b.genre.contains(&genre_id))
            .cloned()
            .collect();
        Ok(sorted_by(&books, |b| b.title.clone()))
    }

    async fn list_titles(&self) -> AppResult<Vec<BookTitle>> {
        let data = self.inner.read().await;
        Ok(sorted_by(&data.books, |b| b.title.clone())
            .into_iter()
            .map(|b| BookTitle {
                id: b.id,
                title: b.title,
            })
            .collect())
    }

    async fn insert(&self, book: &Book) -> AppResult<()> {
        self.inner.write().await.books.push(book.clone());
        Ok(())
    }

    async fn replace(&self, book: &Book) -> AppResult<bool> {
        Ok(replace(&mut self.inner.write().await.books, book))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        remove(&mut self.inner.write().await.books, id);
        Ok(())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.inner.read().await.books.len() as i64)
    }
}

#[async_trait]
impl BookInstancesRepository for MemoryStore {
    async fn list_with_book(&self) -> AppResult<Vec<BookInstanceWithBook>> {
        let data = self.inner.read().await;
        Ok(sorted_by(&data.book_instances, |i| i.status.as_str())
            .into_iter()
            .map(|instance| BookInstanceWithBook {
                book: find(&data.books, instance.book),
                instance,
            })
            .collect())
    }

    async fn find_with_book(&self, id: Uuid) -> AppResult<Option<BookInstanceWithBook>> {
        let data = self.inner.read().await;
        Ok(find(&data.book_instances, id).map(|instance| BookInstanceWithBook {
            book: find(&data.books, instance.book),
            instance,
        }))
    }

    async fn find_by_book(&self, book_id: Uuid) -> AppResult<Vec<BookInstance>> {
        let data = self.inner.read().await;
        let copies: Vec<BookInstance> = data
            .book_instances
            .iter()
            .filter(|i| i.book == book_id)
            .cloned()
            .collect();
        Ok(sorted_by(&copies, |i| i.status.as_str()))
    }

    async fn insert(&self, instance: &BookInstance) -> AppResult<()> {
        self.inner.write().await.book_instances.push(instance.clone());
        Ok(())
    }

    async fn replace(&self, instance: &BookInstance) -> AppResult<bool> {
        Ok(replace(&mut self.inner.write().await.book_instances, instance))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        remove(&mut self.inner.write().await.book_instances, id);
        Ok(())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.inner.read().await.book_instances.len() as i64)
    }

    async fn count_by_status(&self, status: BookInstanceStatus) -> AppResult<i64> {
        let data = self.inner.read().await;
        Ok(data
            .book_instances
            .iter()
            .filter(|i| i.status == status)
            .count() as i64)
    }
}
