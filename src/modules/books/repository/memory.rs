use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BookRepository, RepositoryError, RepositoryResult};
use crate::modules::books::models::{Book, BookFields, BookId};
use crate::utils;

/// Process-local book store.
#[derive(Default)]
pub struct InMemoryBookRepository {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    books: BTreeMap<BookId, Book>,
    last_id: BookId,
}

impl State {
    fn isbn_taken(&self, isbn: &str, except: Option<BookId>) -> bool {
        self.books
            .values()
            .any(|book| book.isbn == isbn && Some(book.id) != except)
    }
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn get_all(&self) -> RepositoryResult<Vec<Book>> {
        Ok(self.state.read().await.books.values().cloned().collect())
    }

    async fn get_by_id(&self, id: BookId) -> RepositoryResult<Option<Book>> {
        Ok(self.state.read().await.books.get(&id).cloned())
    }

    async fn find_by_isbn(&self, isbn: &str) -> RepositoryResult<Option<Book>> {
        let state = self.state.read().await;
        Ok(state.books.values().find(|book| book.isbn == isbn).cloned())
    }

    async fn insert(&self, fields: BookFields) -> RepositoryResult<Book> {
        let mut state = self.state.write().await;
        if state.isbn_taken(&fields.isbn, None) {
            return Err(RepositoryError::DuplicateIsbn(fields.isbn));
        }

        state.last_id += 1;
        let book = Book {
            id: state.last_id,
            title: fields.title,
            author: fields.author,
            year: fields.year,
            isbn: fields.isbn,
            created_at: utils::now_utc(),
        };
        state.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn replace(&self, id: BookId, fields: BookFields) -> RepositoryResult<Option<Book>> {
        let mut state = self.state.write().await;
        if !state.books.contains_key(&id) {
            return Ok(None);
        }
        if state.isbn_taken(&fields.isbn, Some(id)) {
            return Err(RepositoryError::DuplicateIsbn(fields.isbn));
        }

        let Some(book) = state.books.get_mut(&id) else {
            return Ok(None);
        };
        book.title = fields.title;
        book.author = fields.author;
        book.year = fields.year;
        book.isbn = fields.isbn;
        Ok(Some(book.clone()))
    }

    async fn remove(&self, id: BookId) -> RepositoryResult<bool> {
        Ok(self.state.write().await.books.remove(&id).is_some())
    }

    async fn ping(&self) -> RepositoryResult<()> {
        Ok(())
    }
}
