//! API integration tests

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use catalog_server::{
    api,
    config::{AppConfig, StorageBackend},
    repository::{MemoryStore, Repository},
    AppState,
};

struct TestResponse {
    status: StatusCode,
    location: Option<String>,
    body: String,
}

fn app() -> Router {
    let mut config = AppConfig::default();
    config.database.backend = StorageBackend::Memory;
    let state = AppState::new(config, Repository::in_memory(MemoryStore::new()))
        .expect("Failed to build application state");
    api::router(state)
}

async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to send request");

    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");

    TestResponse {
        status,
        location,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

/// POST an already urlencoded body
async fn post(app: &Router, uri: &str, body: &str) -> TestResponse {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// Identifier at the end of a redirect location
fn id_of(location: &str) -> &str {
    location.rsplit('/').next().unwrap()
}

async fn create_author(app: &Router) -> String {
    let response = post(
        app,
        "/catalog/author/create",
        "first_name=Frank&family_name=Herbert&date_of_birth=1920-10-08&date_of_death=1986-02-11",
    )
    .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    id_of(&response.location.unwrap()).to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = app();
    let response = get(&app, "/health").await;
    assert_eq!(response.status, StatusCode::OK);

    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["backend"], "memory");

    let response = get(&app, "/ready").await;
    assert_eq!(response.status, StatusCode::OK);
    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_root_redirects_to_catalog() {
    let app = app();
    let response = get(&app, "/").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/catalog"));
}

#[tokio::test]
async fn test_home_page_counts() {
    let app = app();
    create_author(&app).await;

    let response = get(&app, "/catalog").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Local Library Home"));
    assert!(response.body.contains("<strong>Authors:</strong> 1"));
    assert!(response.body.contains("<strong>Books:</strong> 0"));
}

#[tokio::test]
async fn test_create_book_and_show_it() {
    let app = app();
    let author_id = create_author(&app).await;

    let response = post(
        &app,
        "/catalog/book/create",
        &format!(
            "title=Dune&author={}&summary=A+desert+planet+saga&isbn=0441013597",
            author_id
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    let location = response.location.unwrap();
    assert!(location.starts_with("/catalog/book/"));

    let detail = get(&app, &location).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert!(detail.body.contains("Title: Dune"));
    assert!(detail.body.contains("Frank Herbert"));
    assert!(detail.body.contains("There are no copies of this book in the library."));

    let list = get(&app, "/catalog/books").await;
    assert!(list.body.contains("Dune"));
}

#[tokio::test]
async fn test_author_detail_and_form_pages() {
    let app = app();
    let author_id = create_author(&app).await;

    let detail = get(&app, &format!("/catalog/author/{}", author_id)).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert!(detail.body.contains("Author: Frank Herbert"));
    assert!(detail.body.contains("Oct 8, 1920 - Feb 11, 1986"));

    let form = get(&app, &format!("/catalog/author/{}/update", author_id)).await;
    assert_eq!(form.status, StatusCode::OK);
    assert!(form.body.contains("value=\"1920-10-08\""));
}

#[tokio::test]
async fn test_invalid_author_is_redisplayed_once_escaped() {
    let app = app();
    let response = post(
        &app,
        "/catalog/author/create",
        "first_name=O%27Brien&family_name=Flann&date_of_birth=not-a-date",
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("First name has non-alphanumeric characters"));
    assert!(response.body.contains("Invalid date of birth"));
    assert!(response.body.contains("value=\"O&#x27;Brien\""));
    assert!(!response.body.contains("&amp;#x27;"));

    let list = get(&app, "/catalog/authors").await;
    assert!(list.body.contains("There are no authors."));
}

#[tokio::test]
async fn test_genre_names_are_deduplicated_and_shown_plain() {
    let app = app();
    let first = post(&app, "/catalog/genre/create", "name=Sword+%26+Sorcery").await;
    let second = post(&app, "/catalog/genre/create", "name=++Sword+%26+Sorcery+").await;

    assert_eq!(first.status, StatusCode::SEE_OTHER);
    assert_eq!(first.location, second.location);

    let list = get(&app, "/catalog/genres").await;
    assert_eq!(list.body.matches("Sword &amp; Sorcery").count(), 1);
    assert!(!list.body.contains("&amp;amp;"));
}

#[tokio::test]
async fn test_not_found_handling() {
    let app = app();
    let missing = "/catalog/author/6f1c8c0e-4a4e-4a8e-9f43-0c0d3b0e9a11";

    let detail = get(&app, missing).await;
    assert_eq!(detail.status, StatusCode::NOT_FOUND);
    assert!(detail.body.contains("Author not found"));

    let update = get(&app, &format!("{}/update", missing)).await;
    assert_eq!(update.status, StatusCode::NOT_FOUND);

    let delete = get(&app, &format!("{}/delete", missing)).await;
    assert_eq!(delete.status, StatusCode::SEE_OTHER);
    assert_eq!(delete.location.as_deref(), Some("/catalog/authors"));
}

#[tokio::test]
async fn test_author_delete_blocked_then_allowed() {
    let app = app();
    let author_id = create_author(&app).await;
    let book = post(
        &app,
        "/catalog/book/create",
        &format!("title=Dune&author={}&summary=s&isbn=i", author_id),
    )
    .await;
    let book_id = id_of(book.location.as_deref().unwrap()).to_string();

    let confirm = get(&app, &format!("/catalog/book/{}/delete", book_id)).await;
    assert!(confirm.body.contains("Do you really want to delete this Book?"));
    assert!(!confirm.body.contains("type=\"hidden\""));

    let blocked = post(&app, &format!("/catalog/author/{}/delete", author_id), "").await;
    assert_eq!(blocked.status, StatusCode::OK);
    assert!(blocked.body.contains("Delete the following books"));

    let deleted = post(&app, &format!("/catalog/book/{}/delete", book_id), "").await;
    assert_eq!(deleted.location.as_deref(), Some("/catalog/books"));

    let deleted = post(&app, &format!("/catalog/author/{}/delete", author_id), "").await;
    assert_eq!(deleted.status, StatusCode::SEE_OTHER);
    assert_eq!(deleted.location.as_deref(), Some("/catalog/authors"));
}

#[tokio::test]
async fn test_book_instance_lifecycle() {
    let app = app();
    let author_id = create_author(&app).await;
    let book = post(
        &app,
        "/catalog/book/create",
        &format!("title=Dune&author={}&summary=s&isbn=i", author_id),
    )
    .await;
    let book_id = id_of(book.location.as_deref().unwrap()).to_string();

    let created = post(
        &app,
        "/catalog/bookinstance/create",
        &format!("book={}&imprint=Ace%2C+1990&status=Loaned&due_back=2030-01-15", book_id),
    )
    .await;
    assert_eq!(created.status, StatusCode::SEE_OTHER);
    let location = created.location.unwrap();

    let detail = get(&app, &location).await;
    assert!(detail.body.contains("Copy: Dune"));
    assert!(detail.body.contains("Jan 15, 2030"));

    let list = get(&app, "/catalog/bookinstances").await;
    assert!(list.body.contains("Ace, 1990"));

    let blocked = post(&app, &format!("/catalog/book/{}/delete", book_id), "").await;
    assert_eq!(blocked.status, StatusCode::OK);

    let deleted = post(&app, &format!("{}/delete", location), "").await;
    assert_eq!(deleted.location.as_deref(), Some("/catalog/bookinstances"));
}

#[tokio::test]
async fn test_form_body_without_content_type_is_rejected() {
    let app = app();
    let request = Request::post("/catalog/genre/create")
        .body(Body::from("name=Poetry"))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_genre_update_and_delete() {
    let app = app();
    let poetry = post(&app, "/catalog/genre/create", "name=Poetry").await;
    let fantasy = post(&app, "/catalog/genre/create", "name=Fantasy").await;
    let poetry_url = poetry.location.unwrap();
    let fantasy_url = fantasy.location.unwrap();

    let updated = post(&app, &format!("{}/update", poetry_url), "name=Verse").await;
    assert_eq!(updated.status, StatusCode::SEE_OTHER);
    assert_eq!(updated.location.as_deref(), Some(poetry_url.as_str()));
    assert!(get(&app, &poetry_url).await.body.contains("Genre: Verse"));

    let deleted = post(&app, &format!("{}/delete", poetry_url), "").await;
    assert_eq!(deleted.location.as_deref(), Some("/catalog/genres"));

    assert_eq!(get(&app, &poetry_url).await.status, StatusCode::NOT_FOUND);
    assert_eq!(get(&app, &fantasy_url).await.status, StatusCode::OK);
    let list = get(&app, "/catalog/genres").await;
    assert!(list.body.contains("Fantasy"));
    assert!(!list.body.contains("Verse"));
}
