//! Genre endpoints

use axum::{
    extract::{Path, State},
    response::Response,
};

use super::FormInput;
use crate::AppState;

pub async fn list(State(state): State<AppState>) -> Response {
    state.views.respond(state.services.genres.list().await)
}

pub async fn detail(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    state.views.respond(state.services.genres.detail(&id).await)
}

pub async fn create_form(State(state): State<AppState>) -> Response {
    state.views.respond(Ok(state.services.genres.create_form()))
}

pub async fn create(State(state): State<AppState>, FormInput(fields): FormInput) -> Response {
    state.views.respond(state.services.genres.create(fields).await)
}

pub async fn update_form(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    state.views.respond(state.services.genres.update_form(&id).await)
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    FormInput(fields): FormInput,
) -> Response {
    state.views.respond(state.services.genres.update(&id, fields).await)
}

pub async fn delete_form(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    state.views.respond(state.services.genres.delete_form(&id).await)
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    state.views.respond(state.services.genres.delete(&id).await)
}
