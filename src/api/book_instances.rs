//! Book instance endpoints

use axum::{
    extract::{Path, State},
    response::Response,
    Form,
};
use uuid::Uuid;

use super::FormPairs;
use crate::{error::AppResult, pipeline, validation::FormFields, AppState};

/// List all copies with their books
pub async fn list_book_instances(State(state): State<AppState>) -> AppResult<Response> {
    state.respond(pipeline::list(&state.services.book_instances).await?)
}

pub async fn get_book_instance(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Response> {
    state.respond(pipeline::detail(&state.services.book_instances, id).await?)
}

pub async fn create_book_instance_form(State(state): State<AppState>) -> AppResult<Response> {
    state.respond(pipeline::create_form(&state.services.book_instances).await?)
}

/// Create a copy. Status defaults to Maintenance, due date to today.
pub async fn create_book_instance(
    State(state): State<AppState>,
    Form(pairs): Form<FormPairs>,
) -> AppResult<Response> {
    let form = FormFields::from_pairs(pairs);
    state.respond(pipeline::create(&state.services.book_instances, &form).await?)
}

pub async fn delete_book_instance_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    state.respond(pipeline::delete_form(&state.services.book_instances, id).await?)
}

pub async fn delete_book_instance(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Response> {
    state.respond(pipeline::delete(&state.services.book_instances, id).await?)
}

pub async fn update_book_instance_form(
    State(state): State<AppState>,
    Path(_id): Path<Uuid>,
) -> AppResult<Response> {
    state.respond(pipeline::not_supported("BookInstance update GET"))
}

pub async fn update_book_instance(
    State(state): State<AppState>,
    Path(_id): Path<Uuid>,
) -> AppResult<Response> {
    state.respond(pipeline::not_supported("BookInstance update POST"))
}
