use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use bookshelf_app::books::models::{Book, BookFields, BookId};
use bookshelf_app::books::repository::{
    BookRepository, InMemoryBookRepository, RepositoryError, RepositoryResult,
};
use bookshelf_app::Application;
use bookshelf_kernel::settings::{Settings, StorageBackend};

fn settings(backend: StorageBackend) -> Settings {
    let mut settings = Settings::default();
    settings.database.backend = backend;
    settings.database.path = ":memory:".to_string();
    settings
}

async fn app(backend: StorageBackend) -> Router {
    Application::build(settings(backend)).await.unwrap().router()
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn dune() -> Value {
    json!({
        "title": "Dune",
        "author": "Herbert",
        "year": 1965,
        "isbn": "9780441013593"
    })
}

async fn dune_lifecycle(router: Router) {
    let (status, body) = send(&router, Method::POST, "/books", Some(dune())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Book created successfully");
    assert_eq!(body["book"]["id"], 1);
    assert_eq!(body["book"]["isbn"], "9780441013593");
    assert!(body["book"]["created_at"].is_string());
    let created = body["book"].clone();

    let (status, body) = send(&router, Method::POST, "/books", Some(dune())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({ "error": "Book with this ISBN already exists" }));

    let (status, body) = send(&router, Method::GET, "/books/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "book": created }));

    let (status, body) = send(&router, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "books": [created], "total": 1 }));

    let (status, body) = send(&router, Method::DELETE, "/books/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Book deleted successfully" }));

    let (status, body) = send(&router, Method::GET, "/books/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Book not found" }));

    let (status, _) = send(&router, Method::DELETE, "/books/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn dune_lifecycle_in_memory() {
    dune_lifecycle(app(StorageBackend::Memory).await).await;
}

#[tokio::test]
async fn dune_lifecycle_in_sqlite() {
    dune_lifecycle(app(StorageBackend::Sqlite).await).await;
}

async fn list_in_id_order(router: Router) {
    let titles = ["Dune", "Dune Messiah", "Children of Dune"];
    for (index, title) in titles.iter().enumerate() {
        let mut book = dune();
        book["title"] = json!(title);
        book["isbn"] = json!(format!("isbn-{index}"));
        let (status, _) = send(&router, Method::POST, "/books", Some(book)).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    send(&router, Method::DELETE, "/books/2", None).await;

    let (status, body) = send(&router, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    let listed: Vec<(i64, &str)> = body["books"]
        .as_array()
        .unwrap()
        .iter()
        .map(|book| (book["id"].as_i64().unwrap(), book["title"].as_str().unwrap()))
        .collect();
    assert_eq!(listed, vec![(1, "Dune"), (3, "Children of Dune")]);
}

#[tokio::test]
async fn list_is_in_id_order_in_memory() {
    list_in_id_order(app(StorageBackend::Memory).await).await;
}

#[tokio::test]
async fn list_is_in_id_order_in_sqlite() {
    list_in_id_order(app(StorageBackend::Sqlite).await).await;
}

#[tokio::test]
async fn only_the_sqlite_backend_opens_a_database() {
    let sqlite = Application::build(settings(StorageBackend::Sqlite)).await.unwrap();
    let database = sqlite.database().unwrap();
    assert_eq!(database.path(), None);

    let memory = Application::build(settings(StorageBackend::Memory)).await.unwrap();
    assert!(memory.database().is_none());
}

#[tokio::test]
async fn create_reports_all_validation_errors() {
    let router = app(StorageBackend::Memory).await;
    let (status, body) = send(
        &router,
        Method::POST,
        "/books",
        Some(json!({ "title": " ", "year": "abc" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "errors": [
                "Title is required",
                "Author is required",
                "Year must be a valid integer",
                "ISBN is required"
            ]
        })
    );
}

#[tokio::test]
async fn missing_or_unusable_body_is_rejected() {
    let router = app(StorageBackend::Memory).await;
    let expected = json!({ "error": "No JSON data provided" });

    let (status, body) = send(&router, Method::POST, "/books", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, expected);

    let (status, body) = send(&router, Method::POST, "/books", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, expected);

    let (status, body) = send(&router, Method::PUT, "/books/1", Some(json!([1, 2]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, expected);
}

#[tokio::test]
async fn update_conflicts_only_with_other_books() {
    let router = app(StorageBackend::Sqlite).await;
    send(&router, Method::POST, "/books", Some(dune())).await;
    let mut messiah = dune();
    messiah["title"] = json!("Dune Messiah");
    messiah["year"] = json!(1969);
    messiah["isbn"] = json!("9780593098233");
    send(&router, Method::POST, "/books", Some(messiah.clone())).await;

    let mut clash = messiah.clone();
    clash["isbn"] = json!("9780441013593");
    let (status, body) = send(&router, Method::PUT, "/books/2", Some(clash)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({ "error": "Another book with this ISBN already exists" }));

    messiah["author"] = json!("Frank Herbert");
    let (status, body) = send(&router, Method::PUT, "/books/2", Some(messiah)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Book updated successfully");
    assert_eq!(body["book"]["id"], 2);
    assert_eq!(body["book"]["author"], "Frank Herbert");
}

#[tokio::test]
async fn update_of_missing_book_is_not_found() {
    let router = app(StorageBackend::Memory).await;
    let (status, body) = send(&router, Method::PUT, "/books/42", Some(dune())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Book not found" }));
}

#[tokio::test]
async fn non_integer_id_is_not_found() {
    let router = app(StorageBackend::Memory).await;
    let (status, body) = send(&router, Method::GET, "/books/abc", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Book not found" }));
}

#[tokio::test]
async fn health_reports_connected_storage() {
    let router = app(StorageBackend::Sqlite).await;
    let (status, body) = send(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "healthy", "database": "connected" }));
}

/// Storage that has gone away.
struct OfflineStore;

fn offline<T>() -> RepositoryResult<T> {
    Err(RepositoryError::unavailable(anyhow::anyhow!(
        "connection to 10.0.0.5 refused"
    )))
}

#[async_trait]
impl BookRepository for OfflineStore {
    async fn get_all(&self) -> RepositoryResult<Vec<Book>> {
        offline()
    }
    async fn get_by_id(&self, _id: BookId) -> RepositoryResult<Option<Book>> {
        offline()
    }
    async fn find_by_isbn(&self, _isbn: &str) -> RepositoryResult<Option<Book>> {
        offline()
    }
    async fn insert(&self, _fields: BookFields) -> RepositoryResult<Book> {
        offline()
    }
    async fn replace(&self, _id: BookId, _fields: BookFields) -> RepositoryResult<Option<Book>> {
        offline()
    }
    async fn remove(&self, _id: BookId) -> RepositoryResult<bool> {
        offline()
    }
    async fn ping(&self) -> RepositoryResult<()> {
        offline()
    }
}

#[tokio::test]
async fn storage_failures_are_generic_500s() {
    let router = Application::with_repository(
        settings(StorageBackend::Memory),
        Arc::new(OfflineStore),
        None,
    )
    .await
    .unwrap()
    .router();
    let expected = json!({ "error": "Internal server error" });

    let (status, body) = send(&router, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, expected);

    let (status, body) = send(&router, Method::POST, "/books", Some(dune())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, expected);

    let (status, body) = send(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "status": "unhealthy", "database": "disconnected" }));
}

#[tokio::test]
async fn validation_runs_before_storage_is_touched() {
    let router = Application::with_repository(
        settings(StorageBackend::Memory),
        Arc::new(InMemoryBookRepository::new()),
        None,
    )
    .await
    .unwrap()
    .router();

    let (status, body) = send(
        &router,
        Method::POST,
        "/books",
        Some(json!({ "title": "Dune", "author": "Herbert", "year": 9999, "isbn": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let range = body["errors"][0].as_str().unwrap();
    assert!(range.starts_with("Year must be between 0 and "));

    let (_, body) = send(&router, Method::GET, "/books", None).await;
    assert_eq!(body["total"], 0);
}
