//! Router tests over the in-process storage backend

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use home_library::api::create_router;
use home_library::models::{Book, NewBook, NewShelf, Shelf};
use home_library::repository::{MemoryRepository, Repository, Storage};
use home_library::{AppConfig, AppError, AppResult, AppState};

fn test_router() -> Router {
    router_with(Arc::new(MemoryRepository::new()))
}

fn router_with(repository: Repository) -> Router {
    create_router(AppState::new(AppConfig::default(), repository))
}

async fn request(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(payload) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&payload).expect("Failed to serialize body")))
            .expect("Failed to build request"),
        None => builder.body(Body::empty()).expect("Failed to build request"),
    };

    let response = router.clone().oneshot(req).await.expect("Failed to route request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("Failed to read body");
    let parsed = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Failed to parse response")
    };
    (status, parsed)
}

async fn create_shelf(router: &Router, name: &str) -> String {
    let (status, body) = request(router, Method::POST, "/api/shelves", Some(json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().expect("No id in response").to_string()
}

async fn create_book(router: &Router, shelf_id: &str, isbn: &str) -> Value {
    let (status, body) = request(
        router,
        Method::POST,
        "/api/books",
        Some(json!({
            "isbn": isbn,
            "title": "Test Book",
            "authors": ["A. Writer"],
            "cover": "https://example.com/cover.jpg",
            "shelfId": shelf_id,
            "isRead": false,
            "notes": ""
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn test_health_check() {
    let router = test_router();

    let (status, body) = request(&router, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = request(&router, Method::GET, "/api/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_create_and_list_shelves() {
    let router = test_router();

    let (status, created) = request(&router, Method::POST, "/api/shelves", Some(json!({ "name": "Fiction" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Fiction");
    assert!(created["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(created["createdAt"].is_string());

    let (status, listed) = request(&router, Method::GET, "/api/shelves", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let uri = format!("/api/shelves/{}", created["id"].as_str().unwrap());
    let (status, fetched) = request(&router, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_create_shelf_requires_name() {
    let router = test_router();

    let (status, body) = request(&router, Method::POST, "/api/shelves", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = request(&router, Method::POST, "/api/shelves", Some(json!({ "name": 7 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_book_returns_full_record() {
    let router = test_router();
    let shelf_id = create_shelf(&router, "Fiction").await;

    let book = create_book(&router, &shelf_id, "9780143127741").await;
    assert_eq!(book["shelfId"], shelf_id.as_str());
    assert_eq!(book["isbn"], "9780143127741");
    assert_eq!(book["isRead"], false);
    assert!(book["addedAt"].is_string());

    let uri = format!("/api/books/{}", book["id"].as_str().unwrap());
    let (status, fetched) = request(&router, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, book);
}

#[tokio::test]
async fn test_create_book_missing_title_writes_nothing() {
    let router = test_router();
    let shelf_id = create_shelf(&router, "Fiction").await;

    let (status, body) = request(
        &router,
        Method::POST,
        "/api/books",
        Some(json!({
            "isbn": "111",
            "authors": [],
            "cover": "",
            "shelfId": shelf_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (_, books) = request(&router, Method::GET, "/api/books", None).await;
    assert_eq!(books, json!([]));
}

#[tokio::test]
async fn test_create_book_unknown_shelf() {
    let router = test_router();

    let (status, _) = request(
        &router,
        Method::POST,
        "/api/books",
        Some(json!({
            "isbn": "111",
            "title": "Orphan",
            "authors": [],
            "cover": "",
            "shelfId": "no-such-shelf"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_shelf_cascades() {
    let router = test_router();
    let keep = create_shelf(&router, "Keep").await;
    let drop = create_shelf(&router, "Drop").await;
    create_book(&router, &drop, "111").await;
    create_book(&router, &drop, "222").await;
    let kept = create_book(&router, &keep, "333").await;

    let (status, _) = request(&router, Method::DELETE, &format!("/api/shelves/{}", drop), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, books) = request(&router, Method::GET, "/api/books", None).await;
    assert_eq!(books, json!([kept]));

    let (status, _) = request(&router, Method::GET, &format!("/api/shelves/{}/books", drop), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, listed) = request(&router, Method::GET, &format!("/api/shelves/{}/books", keep), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_read_status_requires_boolean() {
    let router = test_router();
    let shelf_id = create_shelf(&router, "Fiction").await;
    let book = create_book(&router, &shelf_id, "111").await;
    let uri = format!("/api/books/{}/read-status", book["id"].as_str().unwrap());

    let (status, updated) = request(&router, Method::PATCH, &uri, Some(json!({ "isRead": true }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["isRead"], true);

    let (status, body) = request(&router, Method::PATCH, &uri, Some(json!({ "isRead": "true" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_move_book_between_shelves() {
    let router = test_router();
    let from = create_shelf(&router, "From").await;
    let to = create_shelf(&router, "To").await;
    let book = create_book(&router, &from, "111").await;
    let id = book["id"].as_str().unwrap();
    let uri = format!("/api/books/{}/shelf", id);

    let (status, _) = request(&router, Method::PATCH, &uri, Some(json!({ "shelfId": 123 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(&router, Method::PATCH, &uri, Some(json!({ "shelfId": "missing" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, moved) = request(&router, Method::PATCH, &uri, Some(json!({ "shelfId": to }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["shelfId"], to.as_str());

    let (_, fetched) = request(&router, Method::GET, &format!("/api/books/{}", id), None).await;
    assert_eq!(fetched["shelfId"], to.as_str());
}

#[tokio::test]
async fn test_update_notes() {
    let router = test_router();
    let shelf_id = create_shelf(&router, "Fiction").await;
    let book = create_book(&router, &shelf_id, "111").await;
    let uri = format!("/api/books/{}/notes", book["id"].as_str().unwrap());

    let (status, updated) = request(&router, Method::PATCH, &uri, Some(json!({ "notes": "Loved it" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["notes"], "Loved it");
    assert_eq!(updated["title"], book["title"]);

    let (status, _) = request(&router, Method::PATCH, &uri, Some(json!({ "notes": null }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_book_is_not_found() {
    let router = test_router();

    let (status, body) = request(&router, Method::GET, "/api/books/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Book not found");

    let (status, _) = request(
        &router,
        Method::PATCH,
        "/api/books/missing/notes",
        Some(json!({ "notes": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(
        &router,
        Method::PATCH,
        "/api/books/missing/read-status",
        Some(json!({ "isRead": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let shelf_id = create_shelf(&router, "Fiction").await;
    let (status, body) = request(
        &router,
        Method::PATCH,
        "/api/books/missing/shelf",
        Some(json!({ "shelfId": shelf_id })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Book not found");

    let (status, body) = request(&router, Method::GET, "/api/shelves/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Shelf not found");
}

#[tokio::test]
async fn test_deletes_do_not_report_absence() {
    let router = test_router();

    let (status, _) = request(&router, Method::DELETE, "/api/books/missing", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = request(&router, Method::DELETE, "/api/shelves/missing", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_clear_library() {
    let router = test_router();
    let shelf_id = create_shelf(&router, "Fiction").await;
    create_book(&router, &shelf_id, "111").await;
    create_shelf(&router, "Empty").await;

    let (status, _) = request(&router, Method::DELETE, "/api/library", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, books) = request(&router, Method::GET, "/api/books", None).await;
    assert_eq!(books, json!([]));
    let (_, shelves) = request(&router, Method::GET, "/api/shelves", None).await;
    assert_eq!(shelves, json!([]));
}

#[tokio::test]
async fn test_openapi_document_served() {
    let router = test_router();

    let (status, doc) = request(&router, Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/books/{id}/read-status"].is_object());
}

/// Storage whose every call fails, for the 500 paths
struct BrokenStorage;

fn broken<T>() -> AppResult<T> {
    Err(AppError::Internal("connection refused".to_string()))
}

#[async_trait]
impl Storage for BrokenStorage {
    async fn list_shelves(&self) -> AppResult<Vec<Shelf>> {
        broken()
    }
    async fn get_shelf(&self, _id: &str) -> AppResult<Option<Shelf>> {
        broken()
    }
    async fn create_shelf(&self, _data: &NewShelf) -> AppResult<Shelf> {
        broken()
    }
    async fn delete_shelf(&self, _id: &str) -> AppResult<()> {
        broken()
    }
    async fn list_books(&self) -> AppResult<Vec<Book>> {
        broken()
    }
    async fn list_books_by_shelf(&self, _shelf_id: &str) -> AppResult<Vec<Book>> {
        broken()
    }
    async fn get_book(&self, _id: &str) -> AppResult<Option<Book>> {
        broken()
    }
    async fn create_book(&self, _data: &NewBook) -> AppResult<Book> {
        broken()
    }
    async fn update_book_notes(&self, _id: &str, _notes: &str) -> AppResult<Option<Book>> {
        broken()
    }
    async fn update_book_shelf(&self, _id: &str, _shelf_id: &str) -> AppResult<Option<Book>> {
        broken()
    }
    async fn update_book_read_status(&self, _id: &str, _is_read: bool) -> AppResult<Option<Book>> {
        broken()
    }
    async fn delete_book(&self, _id: &str) -> AppResult<()> {
        broken()
    }
    async fn clear_all(&self) -> AppResult<()> {
        broken()
    }
    async fn ping(&self) -> AppResult<()> {
        broken()
    }
}

#[tokio::test]
async fn test_storage_failures_hide_details() {
    let router = router_with(Arc::new(BrokenStorage));

    let (status, body) = request(&router, Method::GET, "/api/books", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch books" }));

    let (status, body) = request(&router, Method::DELETE, "/api/library", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to clear library" }));

    let (status, _) = request(&router, Method::GET, "/api/ready", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    // validation still runs before storage is touched
    let (status, _) = request(&router, Method::POST, "/api/shelves", Some(json!({ "name": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
