//! HTTP handlers for the catalog pages

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod catalog;
pub mod genres;
pub mod health;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    response::Response,
    routing::get,
    Form, Router,
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::{error::AppError, validation::FormFields, AppState};

/// Extractor for an urlencoded form body, kept as ordered pairs so that
/// repeated keys survive. A malformed body renders the failure page.
pub struct FormInput(pub FormFields);

#[async_trait]
impl FromRequest<AppState> for FormInput {
    type Rejection = Response;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        match Form::<Vec<(String, String)>>::from_request(req, state).await {
            Ok(Form(pairs)) => Ok(FormInput(FormFields::new(pairs))),
            Err(rejection) => Err(state
                .views
                .respond(Err(AppError::BadRequest(rejection.body_text())))),
        }
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(catalog::root))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/catalog", get(catalog::index))
        // Authors
        .route("/catalog/authors", get(authors::list))
        .route("/catalog/author/create", get(authors::create_form).post(authors::create))
        .route("/catalog/author/:id", get(authors::detail))
        .route("/catalog/author/:id/update", get(authors::update_form).post(authors::update))
        .route("/catalog/author/:id/delete", get(authors::delete_form).post(authors::delete))
        // Books
        .route("/catalog/books", get(books::list))
        .route("/catalog/book/create", get(books::create_form).post(books::create))
        .route("/catalog/book/:id", get(books::detail))
        .route("/catalog/book/:id/update", get(books::update_form).post(books::update))
        .route("/catalog/book/:id/delete", get(books::delete_form).post(books::delete))
        // Genres
        .route("/catalog/genres", get(genres::list))
        .route("/catalog/genre/create", get(genres::create_form).post(genres::create))
        .route("/catalog/genre/:id", get(genres::detail))
        .route("/catalog/genre/:id/update", get(genres::update_form).post(genres::update))
        .route("/catalog/genre/:id/delete", get(genres::delete_form).post(genres::delete))
        // Book instances
        .route("/catalog/bookinstances", get(book_instances::list))
        .route(
            "/catalog/bookinstance/create",
            get(book_instances::create_form).post(book_instances::create),
        )
        .route("/catalog/bookinstance/:id", get(book_instances::detail))
        .route(
            "/catalog/bookinstance/:id/update",
            get(book_instances::update_form).post(book_instances::update),
        )
        .route(
            "/catalog/bookinstance/:id/delete",
            get(book_instances::delete_form).post(book_instances::delete),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
