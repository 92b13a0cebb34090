//! Genre endpoints

use axum::{
    extract::{Path, State},
    response::Response,
    Form,
};
use uuid::Uuid;

use super::FormPairs;
use crate::{error::AppResult, pipeline, validation::FormFields, AppState};

/// List all genres
pub async fn list_genres(State(state): State<AppState>) -> AppResult<Response> {
    state.respond(pipeline::list(&state.services.genres).await?)
}

/// Genre with the books filed under it
pub async fn get_genre(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Response> {
    state.respond(pipeline::detail(&state.services.genres, id).await?)
}

pub async fn create_genre_form(State(state): State<AppState>) -> AppResult<Response> {
    state.respond(pipeline::create_form(&state.services.genres).await?)
}

/// Create a genre, or redirect to the one that already has this name
pub async fn create_genre(State(state): State<AppState>, Form(pairs): Form<FormPairs>) -> AppResult<Response> {
    let form = FormFields::from_pairs(pairs);
    state.respond(pipeline::create(&state.services.genres, &form).await?)
}

pub async fn delete_genre_form(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Response> {
    state.respond(pipeline::delete_form(&state.services.genres, id).await?)
}

/// Delete a genre no book is filed under
pub async fn delete_genre(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Response> {
    state.respond(pipeline::delete(&state.services.genres, id).await?)
}

pub async fn update_genre_form(State(state): State<AppState>, Path(_id): Path<Uuid>) -> AppResult<Response> {
    state.respond(pipeline::not_supported("Genre update GET"))
}

pub async fn update_genre(State(state): State<AppState>, Path(_id): Path<Uuid>) -> AppResult<Response> {
    state.respond(pipeline::not_supported("Genre update POST"))
}
