//! Book lifecycle rules: validation, ISBN uniqueness and the CRUD operations.

use std::sync::Arc;

use thiserror::Error;

use super::models::{Book, BookId, BookPayload};
use super::repository::{BookRepository, RepositoryError};
use super::validation;

/// Outcome of a failed book operation.
#[derive(Debug, Error)]
pub enum BookError {
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("a book with ISBN {isbn} already exists")]
    Conflict { isbn: String },

    #[error("book {0} not found")]
    NotFound(BookId),

    #[error("book storage failure")]
    Infrastructure(#[source] anyhow::Error),
}

impl From<RepositoryError> for BookError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateIsbn(isbn) => BookError::Conflict { isbn },
            RepositoryError::Unavailable(source) => BookError::Infrastructure(source),
        }
    }
}

pub type BookResult<T> = Result<T, BookError>;

/// Orchestrates validation, conflict checks and repository calls.
#[derive(Clone)]
pub struct BookService {
    repository: Arc<dyn BookRepository>,
}

impl BookService {
    pub fn new(repository: Arc<dyn BookRepository>) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> BookResult<Vec<Book>> {
        let books = self.repository.get_all().await.inspect_err(log_failure)?;
        tracing::info!(count = books.len(), "retrieved books");
        Ok(books)
    }

    pub async fn get(&self, id: BookId) -> BookResult<Book> {
        let book = self.find(id).await?;
        tracing::info!(book_id = id, "retrieved book");
        Ok(book)
    }

    pub async fn create(&self, payload: &BookPayload) -> BookResult<Book> {
        let fields = validation::parse_fields(payload).map_err(BookError::Validation)?;

        // Early exit only; the store's uniqueness constraint decides.
        if self
            .repository
            .find_by_isbn(&fields.isbn)
            .await
            .inspect_err(log_failure)?
            .is_some()
        {
            tracing::warn!(isbn = %fields.isbn, "ISBN already exists");
            return Err(BookError::Conflict { isbn: fields.isbn });
        }

        let book = self.repository.insert(fields).await.map_err(|err| {
            log_failure(&err);
            BookError::from(err)
        })?;

        tracing::info!(book_id = book.id, title = %book.title, "created book");
        Ok(book)
    }

    /// Full replace of title/author/year/isbn; `id` and `created_at` are kept.
    pub async fn update(&self, id: BookId, payload: &BookPayload) -> BookResult<Book> {
        self.find(id).await?;

        let fields = validation::parse_fields(payload).map_err(BookError::Validation)?;

        if let Some(existing) = self
            .repository
            .find_by_isbn(&fields.isbn)
            .await
            .inspect_err(log_failure)?
        {
            if existing.id != id {
                tracing::warn!(book_id = id, other_id = existing.id, "ISBN conflict on update");
                return Err(BookError::Conflict { isbn: fields.isbn });
            }
        }

        let book = self
            .repository
            .replace(id, fields)
            .await
            .map_err(|err| {
                log_failure(&err);
                BookError::from(err)
            })?
            .ok_or(BookError::NotFound(id))?;

        tracing::info!(book_id = id, "updated book");
        Ok(book)
    }

    pub async fn delete(&self, id: BookId) -> BookResult<()> {
        self.find(id).await?;

        if !self.repository.remove(id).await.inspect_err(log_failure)? {
            return Err(BookError::NotFound(id));
        }

        tracing::info!(book_id = id, "deleted book");
        Ok(())
    }

    /// Storage liveness, for health reporting.
    pub async fn health(&self) -> BookResult<()> {
        self.repository.ping().await.inspect_err(log_failure)?;
        Ok(())
    }

    async fn find(&self, id: BookId) -> BookResult<Book> {
        self.repository
            .get_by_id(id)
            .await
            .inspect_err(log_failure)?
            .ok_or_else(|| {
                tracing::warn!(book_id = id, "book not found");
                BookError::NotFound(id)
            })
    }
}

fn log_failure(err: &RepositoryError) {
    if let RepositoryError::Unavailable(source) = err {
        tracing::error!(error = ?source, "book storage failure");
    }
}
