//! Author endpoints

use axum::{
    extract::{Path, State},
    response::Response,
};

use super::FormInput;
use crate::AppState;

pub async fn list(State(state): State<AppState>) -> Response {
    state.views.respond(state.services.authors.list().await)
}

pub async fn detail(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    state.views.respond(state.services.authors.detail(&id).await)
}

pub async fn create_form(State(state): State<AppState>) -> Response {
    state.views.respond(Ok(state.services.authors.create_form()))
}

pub async fn create(State(state): State<AppState>, FormInput(fields): FormInput) -> Response {
    state.views.respond(state.services.authors.create(fields).await)
}

pub async fn update_form(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    state.views.respond(state.services.authors.update_form(&id).await)
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    FormInput(fields): FormInput,
) -> Response {
    state.views.respond(state.services.authors.update(&id, fields).await)
}

pub async fn delete_form(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    state.views.respond(state.services.authors.delete_form(&id).await)
}

/// The confirmation form posts back to the author's own delete URL
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    state.views.respond(state.services.authors.delete(&id).await)
}
