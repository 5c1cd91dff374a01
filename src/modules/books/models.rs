use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

/// Store-assigned book identifier.
pub type BookId = i64;

/// Raw request payload for create/update, checked field by field.
pub type BookPayload = Map<String, Value>;

/// A persisted book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier, never reused
    pub id: BookId,
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
    /// Publication year
    pub year: i32,
    /// ISBN, unique across all books
    pub isbn: String,
    /// When the book was created (RFC 3339)
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Validated title/author/year/isbn, as accepted by the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookFields {
    pub title: String,
    pub author: String,
    pub year: i32,
    pub isbn: String,
}

/// `GET /books` response body.
#[derive(Debug, Serialize)]
pub struct BookList {
    pub books: Vec<Book>,
    pub total: usize,
}

impl From<Vec<Book>> for BookList {
    fn from(books: Vec<Book>) -> Self {
        let total = books.len();
        Self { books, total }
    }
}

/// `GET /books/{id}` response body.
#[derive(Debug, Serialize)]
pub struct BookEnvelope {
    pub book: Book,
}

/// Create/update response body.
#[derive(Debug, Serialize)]
pub struct BookMutation {
    pub message: &'static str,
    pub book: Book,
}

/// Response body carrying only a message.
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}
