//! Persistence boundary for books.

mod memory;
mod sqlite;

pub use memory::InMemoryBookRepository;
pub use sqlite::{SqliteBookRepository, BOOKS_TABLE};

use async_trait::async_trait;
use thiserror::Error;

use super::models::{Book, BookFields, BookId};

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The storage layer's uniqueness constraint rejected the write.
    #[error("a book with ISBN {0} already exists")]
    DuplicateIsbn(String),

    #[error("book storage unavailable")]
    Unavailable(#[source] anyhow::Error),
}

impl RepositoryError {
    pub fn unavailable(err: impl Into<anyhow::Error>) -> Self {
        Self::Unavailable(err.into())
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Storage for books.
///
/// Implementations must enforce ISBN uniqueness themselves and report
/// violations as [`RepositoryError::DuplicateIsbn`]; each write is atomic.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// All books in id order
    async fn get_all(&self) -> RepositoryResult<Vec<Book>>;

    async fn get_by_id(&self, id: BookId) -> RepositoryResult<Option<Book>>;

    async fn find_by_isbn(&self, isbn: &str) -> RepositoryResult<Option<Book>>;

    /// Store a new book, assigning its id and `created_at`
    async fn insert(&self, fields: BookFields) -> RepositoryResult<Book>;

    /// Replace the mutable fields of a book; `None` if it does not exist
    async fn replace(&self, id: BookId, fields: BookFields) -> RepositoryResult<Option<Book>>;

    /// Delete a book; `false` if it did not exist
    async fn remove(&self, id: BookId) -> RepositoryResult<bool>;

    /// Liveness probe
    async fn ping(&self) -> RepositoryResult<()>;
}
