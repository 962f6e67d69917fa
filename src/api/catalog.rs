//! Home page endpoints

use axum::{
    extract::State,
    response::{Redirect, Response},
};

use crate::{models::CATALOG_PREFIX, views::Page, AppState};

/// `/` has no page of its own
pub async fn root() -> Redirect {
    Redirect::to(CATALOG_PREFIX)
}

pub async fn index(State(state): State<AppState>) -> Response {
    let page: Page = state.services.catalog.home().await;
    state.views.respond(Ok(page))
}
