//! View rendering.
//!
//! Controllers return a [`Page`]: either a named template with its data
//! context, or a redirect. [`Views`] turns pages and errors into HTTP
//! responses. Templates are compiled into the binary.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Serialize;
use tera::{Context, Tera};

use crate::error::{AppError, AppResult};

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../templates/layout.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("error.html", include_str!("../templates/error.html")),
    ("author_list.html", include_str!("../templates/author_list.html")),
    ("author_detail.html", include_str!("../templates/author_detail.html")),
    ("author_form.html", include_str!("../templates/author_form.html")),
    ("author_delete.html", include_str!("../templates/author_delete.html")),
    ("book_list.html", include_str!("../templates/book_list.html")),
    ("book_detail.html", include_str!("../templates/book_detail.html")),
    ("book_form.html", include_str!("../templates/book_form.html")),
    ("book_delete.html", include_str!("../templates/book_delete.html")),
    ("genre_list.html", include_str!("../templates/genre_list.html")),
    ("genre_detail.html", include_str!("../templates/genre_detail.html")),
    ("genre_form.html", include_str!("../templates/genre_form.html")),
    ("genre_delete.html", include_str!("../templates/genre_delete.html")),
    ("bookinstance_list.html", include_str!("../templates/bookinstance_list.html")),
    ("bookinstance_detail.html", include_str!("../templates/bookinstance_detail.html")),
    ("bookinstance_form.html", include_str!("../templates/bookinstance_form.html")),
    ("bookinstance_delete.html", include_str!("../templates/bookinstance_delete.html")),
];

/// A named view with its data context
#[derive(Debug, Clone)]
pub struct View {
    pub template: &'static str,
    pub context: Context,
}

impl View {
    pub fn new(template: &'static str, title: &str) -> Self {
        let mut context = Context::new();
        context.insert("title", title);
        Self { template, context }
    }

    pub fn with<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> Self {
        self.context.insert(key, value);
        self
    }

    /// Context value, for inspection
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.context.get(key)
    }
}

/// Outcome of a controller flow
#[derive(Debug, Clone)]
pub enum Page {
    View(View),
    Redirect(String),
}

impl Page {
    pub fn redirect(url: impl Into<String>) -> Self {
        Page::Redirect(url.into())
    }
}

impl From<View> for Page {
    fn from(view: View) -> Self {
        Page::View(view)
    }
}

/// Template engine holding every catalog view
pub struct Views {
    tera: Tera,
}

impl Views {
    pub fn new() -> AppResult<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.to_vec())?;
        Ok(Self { tera })
    }

    pub fn render(&self, view: &View) -> AppResult<String> {
        Ok(self.tera.render(view.template, &view.context)?)
    }

    /// Turn the outcome of a flow into a response. Errors go to the
    /// failure page with their status.
    pub fn respond(&self, result: AppResult<Page>) -> Response {
        let rendered = result.and_then(|page| match page {
            Page::Redirect(url) => Ok(Redirect::to(&url).into_response()),
            Page::View(view) => self.render(&view).map(|html| Html(html).into_response()),
        });

        match rendered {
            Ok(response) => response,
            Err(err) => self.error_page(err),
        }
    }

    fn error_page(&self, err: AppError) -> Response {
        let status = err.status();
        let message = err.public_message();
        let view = View::new("error.html", "Error")
            .with("message", &message)
            .with("status", &status.as_u16());

        match self.render(&view) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(render_err) => {
                tracing::error!("Failed to render error page: {}", render_err);
                (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_template_compiles() {
        let views = Views::new().unwrap();
        let view = View::new("genre_list.html", "Genre List")
            .with("genre_list", &Vec::<serde_json::Value>::new());
        let html = views.render(&view).unwrap();
        assert!(html.contains("Genre List"));
    }

    #[test]
    fn test_redirect_response() {
        let views = Views::new().unwrap();
        let response = views.respond(Ok(Page::redirect("/catalog/genres")));
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/catalog/genres");
    }

    #[test]
    fn test_error_page_status() {
        let views = Views::new().unwrap();
        let response = views.respond(Err(AppError::NotFound("Author not found".into())));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_output_is_escaped_again() {
        let views = Views::new().unwrap();
        let view = View::new("error.html", "Error")
            .with("message", "<script>")
            .with("status", &500);
        let html = views.render(&view).unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
