//! HTTP handlers for `/books`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bookshelf_http::{error::AppError, extract::JsonObject};

use super::models::{BookEnvelope, BookId, BookList, BookMutation, Message};
use super::service::{BookError, BookService};

pub const BOOK_NOT_FOUND: &str = "Book not found";
pub const ISBN_CONFLICT: &str = "Book with this ISBN already exists";
pub const ISBN_CONFLICT_ON_UPDATE: &str = "Another book with this ISBN already exists";

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::Validation(errors) => AppError::validation(errors),
            BookError::Conflict { .. } => AppError::conflict(ISBN_CONFLICT),
            BookError::NotFound(_) => AppError::not_found(BOOK_NOT_FOUND),
            BookError::Infrastructure(source) => AppError::Internal(source),
        }
    }
}

pub fn router(service: BookService) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/{id}", get(get_book).put(update_book).delete(delete_book))
        .with_state(service)
}

/// Ids that are not integers cannot name a book.
fn book_id(raw: &str) -> Result<BookId, AppError> {
    raw.parse().map_err(|_| {
        tracing::warn!(id = raw, "book id is not an integer");
        AppError::not_found(BOOK_NOT_FOUND)
    })
}

async fn list_books(State(service): State<BookService>) -> Result<Json<BookList>, AppError> {
    let books = service.list().await?;
    Ok(Json(books.into()))
}

async fn create_book(
    State(service): State<BookService>,
    JsonObject(payload): JsonObject,
) -> Result<(StatusCode, Json<BookMutation>), AppError> {
    let book = service.create(&payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(BookMutation {
            message: "Book created successfully",
            book,
        }),
    ))
}

async fn get_book(
    Path(id): Path<String>,
    State(service): State<BookService>,
) -> Result<Json<BookEnvelope>, AppError> {
    let book = service.get(book_id(&id)?).await?;
    Ok(Json(BookEnvelope { book }))
}

async fn update_book(
    Path(id): Path<String>,
    State(service): State<BookService>,
    JsonObject(payload): JsonObject,
) -> Result<Json<BookMutation>, AppError> {
    let book = service
        .update(book_id(&id)?, &payload)
        .await
        .map_err(|err| match err {
            BookError::Conflict { .. } => AppError::conflict(ISBN_CONFLICT_ON_UPDATE),
            other => other.into(),
        })?;

    Ok(Json(BookMutation {
        message: "Book updated successfully",
        book,
    }))
}

async fn delete_book(
    Path(id): Path<String>,
    State(service): State<BookService>,
) -> Result<Json<Message>, AppError> {
    service.delete(book_id(&id)?).await?;
    Ok(Json(Message {
        message: "Book deleted successfully",
    }))
}
