//! HTTP handlers for the catalog

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod catalog;
pub mod genres;
pub mod health;

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Decoded `application/x-www-form-urlencoded` body, in submission order
pub type FormPairs = Vec<(String, String)>;

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let catalog = Router::new()
        .route("/", get(catalog::index))
        // Authors
        .route("/authors", get(authors::list_authors))
        .route(
            "/author/create",
            get(authors::create_author_form).post(authors::create_author),
        )
        .route("/author/:id", get(authors::get_author))
        .route(
            "/author/:id/delete",
            get(authors::delete_author_form).post(authors::delete_author),
        )
        .route(
            "/author/:id/update",
            get(authors::update_author_form).post(authors::update_author),
        )
        // Books
        .route("/books", get(books::list_books))
        .route("/book/create", get(books::create_book_form).post(books::create_book))
        .route("/book/:id", get(books::get_book))
        .route("/book/:id/delete", get(books::delete_book_form).post(books::delete_book))
        .route("/book/:id/update", get(books::update_book_form).post(books::update_book))
        // Genres
        .route("/genres", get(genres::list_genres))
        .route("/genre/create", get(genres::create_genre_form).post(genres::create_genre))
        .route("/genre/:id", get(genres::get_genre))
        .route("/genre/:id/delete", get(genres::delete_genre_form).post(genres::delete_genre))
        .route("/genre/:id/update", get(genres::update_genre_form).post(genres::update_genre))
        // Book instances
        .route("/bookinstances", get(book_instances::list_book_instances))
        .route(
            "/bookinstance/create",
            get(book_instances::create_book_instance_form).post(book_instances::create_book_instance),
        )
        .route("/bookinstance/:id", get(book_instances::get_book_instance))
        .route(
            "/bookinstance/:id/delete",
            get(book_instances::delete_book_instance_form).post(book_instances::delete_book_instance),
        )
        .route(
            "/bookinstance/:id/update",
            get(book_instances::update_book_instance_form).post(book_instances::update_book_instance),
        );

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/catalog", catalog)
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
