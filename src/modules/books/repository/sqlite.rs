use async_trait::async_trait;
use bookshelf_db::{is_unique_violation, Database};
use bookshelf_kernel::SchemaStatement;
use rusqlite::{params, OptionalExtension, Row};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use super::{BookRepository, RepositoryError, RepositoryResult};
use crate::modules::books::models::{Book, BookFields, BookId};
use crate::utils;

/// `books` table; the UNIQUE constraint on `isbn` is the authoritative conflict check.
pub const BOOKS_TABLE: SchemaStatement = SchemaStatement {
    id: "001_books",
    sql: r#"
        CREATE TABLE IF NOT EXISTS books (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            title      TEXT    NOT NULL,
            author     TEXT    NOT NULL,
            year       INTEGER NOT NULL,
            isbn       TEXT    NOT NULL UNIQUE,
            created_at TEXT    NOT NULL
        );
        "#,
};

const SELECT_BOOK: &str = "SELECT id, title, author, year, isbn, created_at FROM books";

/// Book storage in SQLite.
pub struct SqliteBookRepository {
    db: Database,
}

impl SqliteBookRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    let created_at: String = row.get(5)?;
    let created_at = OffsetDateTime::parse(&created_at, &Rfc3339).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(err))
    })?;

    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        year: row.get(3)?,
        isbn: row.get(4)?,
        created_at,
    })
}

/// Map a write failure, turning UNIQUE violations into conflicts.
fn write_error(err: rusqlite::Error, isbn: String) -> RepositoryError {
    if is_unique_violation(&err) {
        RepositoryError::DuplicateIsbn(isbn)
    } else {
        RepositoryError::unavailable(err)
    }
}

#[async_trait]
impl BookRepository for SqliteBookRepository {
    async fn get_all(&self) -> RepositoryResult<Vec<Book>> {
        let conn = self.db.connection().await;
        let mut stmt = conn
            .prepare(&format!("{SELECT_BOOK} ORDER BY id"))
            .map_err(RepositoryError::unavailable)?;
        let books = stmt
            .query_map([], book_from_row)
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(RepositoryError::unavailable)?;
        Ok(books)
    }

    async fn get_by_id(&self, id: BookId) -> RepositoryResult<Option<Book>> {
        let conn = self.db.connection().await;
        conn.query_row(&format!("{SELECT_BOOK} WHERE id = ?1"), [id], book_from_row)
            .optional()
            .map_err(RepositoryError::unavailable)
    }

    async fn find_by_isbn(&self, isbn: &str) -> RepositoryResult<Option<Book>> {
        let conn = self.db.connection().await;
        conn.query_row(&format!("{SELECT_BOOK} WHERE isbn = ?1"), [isbn], book_from_row)
            .optional()
            .map_err(RepositoryError::unavailable)
    }

    async fn insert(&self, fields: BookFields) -> RepositoryResult<Book> {
        let created_at = utils::now_utc();
        let stamp = created_at
            .format(&Rfc3339)
            .map_err(RepositoryError::unavailable)?;

        let conn = self.db.connection().await;
        conn.execute(
            "INSERT INTO books (title, author, year, isbn, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![fields.title, fields.author, fields.year, fields.isbn, stamp],
        )
        .map_err(|err| write_error(err, fields.isbn.clone()))?;

        Ok(Book {
            id: conn.last_insert_rowid(),
            title: fields.title,
            author: fields.author,
            year: fields.year,
            isbn: fields.isbn,
            created_at,
        })
    }

    async fn replace(&self, id: BookId, fields: BookFields) -> RepositoryResult<Option<Book>> {
        let mut conn = self.db.connection().await;
        // The row is read back before commit; a failed read leaves it unchanged.
        let tx = conn.transaction().map_err(RepositoryError::unavailable)?;
        let changed = tx
            .execute(
                "UPDATE books SET title = ?1, author = ?2, year = ?3, isbn = ?4 WHERE id = ?5",
                params![fields.title, fields.author, fields.year, fields.isbn, id],
            )
            .map_err(|err| write_error(err, fields.isbn.clone()))?;

        if changed == 0 {
            return Ok(None);
        }

        let book = tx
            .query_row(&format!("{SELECT_BOOK} WHERE id = ?1"), [id], book_from_row)
            .optional()
            .map_err(RepositoryError::unavailable)?;
        tx.commit().map_err(RepositoryError::unavailable)?;
        Ok(book)
    }

    async fn remove(&self, id: BookId) -> RepositoryResult<bool> {
        let conn = self.db.connection().await;
        let deleted = conn
            .execute("DELETE FROM books WHERE id = ?1", [id])
            .map_err(RepositoryError::unavailable)?;
        Ok(deleted > 0)
    }

    async fn ping(&self) -> RepositoryResult<()> {
        self.db.ping().await.map_err(RepositoryError::unavailable)
    }
}
