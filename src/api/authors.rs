//! Author endpoints

use axum::{
    extract::{Path, State},
    response::Response,
    Form,
};
use uuid::Uuid;

use super::FormPairs;
use crate::{error::AppResult, pipeline, validation::FormFields, AppState};

/// List all authors
pub async fn list_authors(State(state): State<AppState>) -> AppResult<Response> {
    state.respond(pipeline::list(&state.services.authors).await?)
}

/// Author with their books
pub async fn get_author(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Response> {
    state.respond(pipeline::detail(&state.services.authors, id).await?)
}

/// Empty author form
pub async fn create_author_form(State(state): State<AppState>) -> AppResult<Response> {
    state.respond(pipeline::create_form(&state.services.authors).await?)
}

/// Create an author
pub async fn create_author(State(state): State<AppState>, Form(pairs): Form<FormPairs>) -> AppResult<Response> {
    let form = FormFields::from_pairs(pairs);
    state.respond(pipeline::create(&state.services.authors, &form).await?)
}

/// Delete confirmation, listing the author's books
pub async fn delete_author_form(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Response> {
    state.respond(pipeline::delete_form(&state.services.authors, id).await?)
}

/// Delete an author without books
pub async fn delete_author(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Response> {
    state.respond(pipeline::delete(&state.services.authors, id).await?)
}

/// Update form pre-filled with the author
pub async fn update_author_form(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Response> {
    state.respond(pipeline::update_form(&state.services.authors, id).await?)
}

/// Replace an author
pub async fn update_author(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(pairs): Form<FormPairs>,
) -> AppResult<Response> {
    let form = FormFields::from_pairs(pairs);
    state.respond(pipeline::update(&state.services.authors, id, &form).await?)
}
