//! Router tests over the in-memory store

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use locallibrary_server::{api, config::StoreBackend, repository::Repository, AppConfig, AppState};

fn app() -> (Router, Repository) {
    let repository = Repository::in_memory();
    let mut config = AppConfig::default();
    config.store.backend = StoreBackend::Memory;
    let state = AppState::new(config, repository.clone());
    (api::router(state), repository)
}

async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_form(app: &Router, uri: &str, body: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app();
    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "healthy");

    let response = get(&app, "/ready").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["store"], "memory");
}

#[tokio::test]
async fn test_index_renders_counts() {
    let (app, _) = app();
    let response = get(&app, "/catalog").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["template"], "index");
    assert_eq!(body["data"]["title"], "Local Library Home");
    assert_eq!(body["data"]["data"]["book_count"], 0);
}

#[tokio::test]
async fn test_create_genre_redirects_with_see_other() {
    let (app, repository) = app();
    let response = post_form(&app, "/catalog/genre/create", "name=Science+Fiction").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let genres = repository.genres.list().await.unwrap();
    assert_eq!(genres[0].name, "Science Fiction");
    assert_eq!(response.headers()[header::LOCATION], genres[0].url().as_str());

    let response = get(&app, &genres[0].url()).await;
    let body = json_body(response).await;
    assert_eq!(body["template"], "genre_detail");
    assert_eq!(body["data"]["genre"]["name"], "Science Fiction");
}

#[tokio::test]
async fn test_rejected_form_is_rendered_with_ok() {
    let (app, repository) = app();
    let response = post_form(&app, "/catalog/author/create", "first_name=&family_name=Herbert").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["template"], "author_form");
    assert_eq!(body["data"]["errors"][0]["field"], "first_name");
    assert!(repository.authors.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_repeated_genre_fields() {
    let (app, _) = app();
    let response = post_form(&app, "/catalog/book/create", "title=Dune&genre=a&genre=b").await;
    let body = json_body(response).await;
    assert_eq!(body["data"]["book"]["genre"], serde_json::json!(["a", "b"]));
}

#[tokio::test]
async fn test_missing_detail_is_404() {
    let (app, _) = app();
    let uri = format!("/catalog/book/{}", uuid::Uuid::new_v4());
    let response = get(&app, &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "NoSuchRecord");
}

#[tokio::test]
async fn test_unsupported_updates_are_501() {
    let (app, _) = app();
    let id = uuid::Uuid::new_v4();

    let response = get(&app, &format!("/catalog/genre/{}/update", id)).await;
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    assert_eq!(json_body(response).await["data"]["title"], "NOT IMPLEMENTED: Genre update GET");

    let response = post_form(&app, &format!("/catalog/bookinstance/{}/update", id), "").await;
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn test_list_routes() {
    let (app, _) = app();
    for (uri, template) in [
        ("/catalog/authors", "author_list"),
        ("/catalog/books", "book_list"),
        ("/catalog/genres", "genre_list"),
        ("/catalog/bookinstances", "bookinstance_list"),
    ] {
        let response = get(&app, uri).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["template"], template);
    }
}
