//! Book endpoints

use axum::{
    extract::{Path, State},
    response::Response,
    Form,
};
use uuid::Uuid;

use super::FormPairs;
use crate::{error::AppResult, pipeline, validation::FormFields, AppState};

/// List all books with their authors
pub async fn list_books(State(state): State<AppState>) -> AppResult<Response> {
    state.respond(pipeline::list(&state.services.books).await?)
}

/// Book with its copies
pub async fn get_book(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Response> {
    state.respond(pipeline::detail(&state.services.books, id).await?)
}

pub async fn create_book_form(State(state): State<AppState>) -> AppResult<Response> {
    state.respond(pipeline::create_form(&state.services.books).await?)
}

/// Create a book. `genre` may be submitted zero, one or many times.
pub async fn create_book(State(state): State<AppState>, Form(pairs): Form<FormPairs>) -> AppResult<Response> {
    let form = FormFields::from_pairs(pairs);
    state.respond(pipeline::create(&state.services.books, &form).await?)
}

pub async fn delete_book_form(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Response> {
    state.respond(pipeline::delete_form(&state.services.books, id).await?)
}

/// Delete a book without copies
pub async fn delete_book(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Response> {
    state.respond(pipeline::delete(&state.services.books, id).await?)
}

pub async fn update_book_form(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Response> {
    state.respond(pipeline::update_form(&state.services.books, id).await?)
}

/// Replace a book
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(pairs): Form<FormPairs>,
) -> AppResult<Response> {
    let form = FormFields::from_pairs(pairs);
    state.respond(pipeline::update(&state.services.books, id, &form).await?)
}
